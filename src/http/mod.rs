//! HTTP surface of the relay.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (router, middleware stack)
//!     → request.rs (request ID, span, response accounting)
//!     → handlers.rs (decode, validate, deliver)
//!     → response.rs / error.rs (JSON body)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
