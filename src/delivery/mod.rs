//! Outbound delivery of accepted submissions.
//!
//! # Data Flow
//! ```text
//! ContactSubmission (validated)
//!     → ContactSink::deliver (exactly one backend per process)
//!         mongo.rs     insert into the contacts collection
//!         smtp.rs      send one notification email
//!         form_api.rs  POST to a third-party form service
//!     → Receipt | DeliveryError
//! ```
//!
//! # Design Decisions
//! - One call per submission; no retries, no queue, no idempotency key
//! - Every error carries a client-safe message separate from its detail
//! - Backends are never combined

pub mod form_api;
pub mod mongo;
pub mod smtp;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RelayConfig;
use crate::contact::ContactSubmission;

pub use form_api::FormApiSink;
pub use mongo::MongoSink;
pub use smtp::SmtpSink;

/// Identifies a delivery backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Mongo,
    Smtp,
    FormApi,
}

impl SinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SinkKind::Mongo => "mongo",
            SinkKind::Smtp => "smtp",
            SinkKind::FormApi => "form_api",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(SinkKind::Mongo),
            "smtp" | "email" => Ok(SinkKind::Smtp),
            "form_api" | "form-api" | "formapi" => Ok(SinkKind::FormApi),
            other => Err(format!("unknown delivery backend: {other}")),
        }
    }
}

/// Proof of a successful delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Backend reference (inserted id, SMTP reply), when one exists.
    pub id: Option<String>,
}

impl Receipt {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }
}

/// Failure to hand a submission to its backend.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{sink} backend is not configured")]
    NotConfigured { sink: SinkKind },

    #[error("{sink} backend unavailable: {detail}")]
    Unavailable { sink: SinkKind, detail: String },

    #[error("{sink} authentication failed: {detail}")]
    Auth { sink: SinkKind, detail: String },

    #[error("{sink} backend timed out: {detail}")]
    Timeout { sink: SinkKind, detail: String },

    #[error("{sink} backend rejected the submission: {detail}")]
    Rejected { sink: SinkKind, detail: String },

    #[error("{sink} transport error: {detail}")]
    Transport { sink: SinkKind, detail: String },
}

impl DeliveryError {
    pub fn sink(&self) -> SinkKind {
        match self {
            DeliveryError::NotConfigured { sink }
            | DeliveryError::Unavailable { sink, .. }
            | DeliveryError::Auth { sink, .. }
            | DeliveryError::Timeout { sink, .. }
            | DeliveryError::Rejected { sink, .. }
            | DeliveryError::Transport { sink, .. } => *sink,
        }
    }

    /// Internal detail, safe to log but not to return in production.
    pub fn detail(&self) -> &str {
        match self {
            DeliveryError::NotConfigured { .. } => "backend credentials missing",
            DeliveryError::Unavailable { detail, .. }
            | DeliveryError::Auth { detail, .. }
            | DeliveryError::Timeout { detail, .. }
            | DeliveryError::Rejected { detail, .. }
            | DeliveryError::Transport { detail, .. } => detail,
        }
    }

    /// Message returned to the browser.
    pub fn public_message(&self) -> &'static str {
        match (self.sink(), self) {
            (SinkKind::Mongo, DeliveryError::NotConfigured { .. })
            | (SinkKind::Mongo, DeliveryError::Unavailable { .. }) => {
                "Database unavailable. Please try again later."
            }
            (SinkKind::Mongo, _) => "Failed to save contact to database.",
            (SinkKind::Smtp, DeliveryError::Auth { .. }) => {
                "Email authentication failed. Please check email configuration."
            }
            (SinkKind::Smtp, DeliveryError::Unavailable { .. }) => {
                "Unable to connect to email server."
            }
            (SinkKind::Smtp, DeliveryError::Timeout { .. }) => {
                "Email server timeout. Please try again."
            }
            _ => "Failed to send message. Please try again later.",
        }
    }
}

/// A backend that accepts validated submissions.
#[async_trait]
pub trait ContactSink: Send + Sync {
    fn kind(&self) -> SinkKind;

    /// Whether the backend has the settings it needs to attempt delivery.
    fn is_configured(&self) -> bool;

    /// Deliver one submission. Called at most once per submission.
    async fn deliver(&self, submission: &ContactSubmission) -> Result<Receipt, DeliveryError>;
}

/// Construct the backend selected by `config.delivery.kind`.
pub fn build_sink(config: &RelayConfig) -> Result<Arc<dyn ContactSink>, DeliveryError> {
    let delivery = &config.delivery;
    let sink: Arc<dyn ContactSink> = match delivery.kind {
        SinkKind::Mongo => Arc::new(MongoSink::new(delivery.mongo.clone())),
        SinkKind::Smtp => Arc::new(SmtpSink::new(
            delivery.smtp.clone(),
            config.timeouts.delivery_secs,
        )?),
        SinkKind::FormApi => Arc::new(FormApiSink::new(
            delivery.form_api.clone(),
            config.timeouts.delivery_secs,
        )?),
    };

    if !sink.is_configured() {
        tracing::warn!(
            sink = %sink.kind(),
            "Delivery backend is not configured; submissions will fail until it is"
        );
    }

    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_kind_parsing() {
        assert_eq!("MongoDB".parse::<SinkKind>(), Ok(SinkKind::Mongo));
        assert_eq!("email".parse::<SinkKind>(), Ok(SinkKind::Smtp));
        assert_eq!("form-api".parse::<SinkKind>(), Ok(SinkKind::FormApi));
        assert!("fax".parse::<SinkKind>().is_err());
    }

    #[test]
    fn test_public_messages() {
        let unavailable = DeliveryError::Unavailable {
            sink: SinkKind::Mongo,
            detail: "server selection timeout".into(),
        };
        assert_eq!(
            unavailable.public_message(),
            "Database unavailable. Please try again later."
        );

        let write = DeliveryError::Rejected {
            sink: SinkKind::Mongo,
            detail: "document failed validation".into(),
        };
        assert_eq!(write.public_message(), "Failed to save contact to database.");

        let auth = DeliveryError::Auth {
            sink: SinkKind::Smtp,
            detail: "535".into(),
        };
        assert_eq!(
            auth.public_message(),
            "Email authentication failed. Please check email configuration."
        );

        let form = DeliveryError::Timeout {
            sink: SinkKind::FormApi,
            detail: "15s".into(),
        };
        assert_eq!(
            form.public_message(),
            "Failed to send message. Please try again later."
        );
    }

    #[test]
    fn test_detail_and_display() {
        let err = DeliveryError::NotConfigured { sink: SinkKind::Smtp };
        assert_eq!(err.to_string(), "smtp backend is not configured");
        assert_eq!(err.detail(), "backend credentials missing");
        assert_eq!(err.sink(), SinkKind::Smtp);
    }

    #[tokio::test]
    async fn test_build_sink_follows_config() {
        let mut config = RelayConfig::default();
        assert_eq!(build_sink(&config).unwrap().kind(), SinkKind::Mongo);

        config.delivery.kind = SinkKind::FormApi;
        let sink = build_sink(&config).unwrap();
        assert_eq!(sink.kind(), SinkKind::FormApi);
        assert!(!sink.is_configured());
    }
}
