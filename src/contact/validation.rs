//! Contact submission validation and normalization.
//!
//! # Rules (checked in order)
//! 1. `name`, `email`, `message` present and non-blank
//! 2. Normalize: name/email lose line breaks and outer whitespace,
//!    email is lowercased, message is trimmed
//! 3. `name` at most 100 characters
//! 4. `email` matches `^[^\s@]+@[^\s@]+\.[^\s@]{2,}$`
//! 5. `message` between 5 and 5000 characters
//! 6. `phone`, when present, matches `^[0-9+()\s-]{7,20}$`
//!
//! # Design Decisions
//! - Matchers are hand-written scans, no regex engine
//! - Error display text is the exact message returned to the client

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::contact::model::{ContactPayload, ContactSubmission};

pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MIN_CHARS: usize = 5;
pub const MESSAGE_MAX_CHARS: usize = 5000;
const PHONE_MIN_CHARS: usize = 7;
const PHONE_MAX_CHARS: usize = 20;

/// A rejected contact submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields (name, email, message) are required.")]
    MissingFields,
    #[error("Name is too long.")]
    NameTooLong,
    #[error("Invalid email format.")]
    InvalidEmail,
    #[error("Message is too short.")]
    MessageTooShort,
    #[error("Message is too long.")]
    MessageTooLong,
    #[error("Invalid phone number.")]
    InvalidPhone,
}

impl ContactSubmission {
    /// Validate and normalize a raw payload received at `received_at`.
    pub fn from_payload(
        payload: ContactPayload,
        received_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let (Some(name), Some(email), Some(message)) = (
            non_blank(payload.name),
            non_blank(payload.email),
            non_blank(payload.message),
        ) else {
            return Err(ValidationError::MissingFields);
        };

        let name = sanitize_line(&name);
        let email = sanitize_line(&email).to_lowercase();
        let message = message.trim().to_string();
        let phone = payload
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        if name.chars().count() > NAME_MAX_CHARS {
            return Err(ValidationError::NameTooLong);
        }
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail);
        }
        let message_len = message.chars().count();
        if message_len < MESSAGE_MIN_CHARS {
            return Err(ValidationError::MessageTooShort);
        }
        if message_len > MESSAGE_MAX_CHARS {
            return Err(ValidationError::MessageTooLong);
        }
        if let Some(phone) = &phone {
            if !is_valid_phone(phone) {
                return Err(ValidationError::InvalidPhone);
            }
        }

        Ok(Self {
            name,
            email,
            message,
            phone,
            created_at: received_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Collapse every run of `\r`/`\n` into one space, then trim.
pub fn sanitize_line(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_break = false;
    for ch in input.chars() {
        if ch == '\r' || ch == '\n' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            in_break = false;
            out.push(ch);
        }
    }
    out.trim().to_string()
}

/// Check an address against `^[^\s@]+@[^\s@]+\.[^\s@]{2,}$`.
///
/// The domain only needs some dot that has at least one character before
/// it and two after it, so the first qualifying dot decides.
pub fn is_valid_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.char_indices().skip(1).find(|&(_, c)| c == '.') {
        Some((dot, _)) => domain[dot + 1..].chars().count() >= 2,
        None => false,
    }
}

/// Check a phone number against `^[0-9+()\s-]{7,20}$`.
pub fn is_valid_phone(candidate: &str) -> bool {
    let len = candidate.chars().count();
    (PHONE_MIN_CHARS..=PHONE_MAX_CHARS).contains(&len)
        && candidate
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '(' | ')' | '-'))
}
