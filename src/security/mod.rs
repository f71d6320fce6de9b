//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin policy, preflight)
//!     → body limit (DefaultBodyLimit, configured in http/server.rs)
//!     → rate_limit.rs (per-IP token bucket, POST /contact only)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod cors;
pub mod rate_limit;
