//! Contact form relay.
//!
//! Accepts portfolio contact submissions over HTTP, validates and
//! normalizes them, and forwards each one to a single delivery backend
//! (MongoDB, SMTP or a hosted form API).

pub mod config;
pub mod contact;
pub mod delivery;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
