//! Contact submission domain.
//!
//! # Data Flow
//! ```text
//! POST /contact body
//!     → model.rs (ContactPayload, lenient field decoding)
//!     → validation.rs (presence → normalize → length/format checks)
//!     → ContactSubmission (validated, immutable)
//!     → handed to exactly one delivery sink
//! ```
//!
//! # Design Decisions
//! - Checks run in a fixed order; the first failure is reported
//! - Lengths are counted in characters, not bytes
//! - A submission is never updated or deleted after acceptance

pub mod model;
pub mod validation;

pub use model::{ContactPayload, ContactSubmission};
pub use validation::{
    is_valid_email, is_valid_phone, sanitize_line, ValidationError, MESSAGE_MAX_CHARS,
    MESSAGE_MIN_CHARS, NAME_MAX_CHARS,
};
