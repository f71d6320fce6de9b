//! Contact payload and record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw `POST /contact` body as sent by the browser.
///
/// Fields that are present but are not strings decode as `None`, so a
/// `{"name": 42}` body is reported as a missing field rather than a
/// malformed payload.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactPayload {
    #[serde(default, deserialize_with = "string_only")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "string_only")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "string_only")]
    pub message: Option<String>,

    /// Optional phone number. Numeric values are accepted and stringified.
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: Option<String>,
}

impl ContactPayload {
    /// Convenience constructor for the three required fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
            phone: None,
        }
    }

    /// Attach a phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// A validated, normalized contact submission.
///
/// Only [`ContactSubmission::from_payload`] produces one, so holding a value
/// means every field invariant already holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
