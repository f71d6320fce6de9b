//! Third-party form API delivery backend.
//!
//! Forwards each submission as JSON, together with the site's access key,
//! to a hosted form service (Web3Forms-compatible by default).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::FormApiConfig;
use crate::contact::ContactSubmission;
use crate::delivery::{ContactSink, DeliveryError, Receipt, SinkKind};

/// Outbound request body.
#[derive(Debug, Serialize)]
pub struct FormApiRequest<'a> {
    pub access_key: &'a str,
    pub subject: &'a str,
    pub from_name: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
}

/// Reply from the form service. Missing fields are tolerated.
#[derive(Debug, Default, Deserialize)]
struct FormApiReply {
    success: Option<bool>,
    message: Option<String>,
}

/// Relays submissions to a hosted form endpoint.
pub struct FormApiSink {
    config: FormApiConfig,
    client: reqwest::Client,
}

impl FormApiSink {
    pub fn new(config: FormApiConfig, timeout_secs: u64) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DeliveryError::Transport {
                sink: SinkKind::FormApi,
                detail: e.to_string(),
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ContactSink for FormApiSink {
    fn kind(&self) -> SinkKind {
        SinkKind::FormApi
    }

    fn is_configured(&self) -> bool {
        self.config.access_key.is_some()
    }

    async fn deliver(&self, submission: &ContactSubmission) -> Result<Receipt, DeliveryError> {
        let access_key = self
            .config
            .access_key
            .as_deref()
            .ok_or(DeliveryError::NotConfigured { sink: SinkKind::FormApi })?;

        let body = FormApiRequest {
            access_key,
            subject: &self.config.subject,
            from_name: &submission.name,
            name: &submission.name,
            email: &submission.email,
            message: &submission.message,
            phone: submission.phone.as_deref(),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        // A non-JSON reply is judged on the status code alone.
        let reply: FormApiReply = response.json().await.unwrap_or_default();
        let detail = || {
            format!(
                "status {status}: {}",
                reply.message.as_deref().unwrap_or("no message")
            )
        };

        if !status.is_success() || reply.success == Some(false) {
            return Err(DeliveryError::Rejected {
                sink: SinkKind::FormApi,
                detail: detail(),
            });
        }

        Ok(Receipt::default())
    }
}

fn classify_request_error(err: reqwest::Error) -> DeliveryError {
    let sink = SinkKind::FormApi;
    let detail = err.to_string();
    if err.is_timeout() {
        DeliveryError::Timeout { sink, detail }
    } else if err.is_connect() {
        DeliveryError::Unavailable { sink, detail }
    } else {
        DeliveryError::Transport { sink, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactPayload;
    use chrono::Utc;

    fn submission() -> ContactSubmission {
        let payload = ContactPayload::new("Grace", "grace@example.com", "Compilers are fun");
        ContactSubmission::from_payload(payload, Utc::now()).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let s = submission();
        let body = FormApiRequest {
            access_key: "key-123",
            subject: "New contact form submission",
            from_name: &s.name,
            name: &s.name,
            email: &s.email,
            message: &s.message,
            phone: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["access_key"], "key-123");
        assert_eq!(json["email"], "grace@example.com");
        assert!(json.get("phone").is_none());
    }

    #[tokio::test]
    async fn test_missing_access_key() {
        let sink = FormApiSink::new(FormApiConfig::default(), 5).unwrap();
        assert!(!sink.is_configured());
        let err = sink.deliver(&submission()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured { sink: SinkKind::FormApi }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let config = FormApiConfig {
            endpoint: "http://127.0.0.1:9/submit".into(),
            access_key: Some("key".into()),
            ..FormApiConfig::default()
        };
        let sink = FormApiSink::new(config, 5).unwrap();
        let err = sink.deliver(&submission()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Unavailable { .. }));
        assert_eq!(
            err.public_message(),
            "Failed to send message. Please try again later."
        );
    }
}
