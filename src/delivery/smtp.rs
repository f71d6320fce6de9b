//! SMTP delivery backend.
//!
//! Sends one plain-text notification per submission to the site owner, with
//! `Reply-To` pointing at the submitter.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::contact::ContactSubmission;
use crate::delivery::{ContactSink, DeliveryError, Receipt, SinkKind};

/// Reply codes that mean the credentials were refused.
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// Emails submissions through an authenticated SMTP relay.
pub struct SmtpSink {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpSink {
    /// Build the sink. The transport is only created when credentials and a
    /// recipient are present; no connection is opened here.
    pub fn new(config: SmtpConfig, timeout_secs: u64) -> Result<Self, DeliveryError> {
        let transport = match (&config.username, &config.password) {
            (Some(user), Some(pass)) if config.recipient().is_some() => Some(build_transport(
                &config,
                Credentials::new(user.clone(), pass.clone()),
                Duration::from_secs(timeout_secs),
            )?),
            _ => None,
        };

        Ok(Self { config, transport })
    }

    /// Render the notification email for a submission.
    pub fn build_message(&self, submission: &ContactSubmission) -> Result<Message, DeliveryError> {
        let not_configured = || DeliveryError::NotConfigured { sink: SinkKind::Smtp };
        let from: Mailbox = self
            .config
            .sender()
            .ok_or_else(not_configured)?
            .parse()
            .map_err(|e| config_rejected(format!("invalid sender: {e}")))?;
        let to: Mailbox = self
            .config
            .recipient()
            .ok_or_else(not_configured)?
            .parse()
            .map_err(|e| config_rejected(format!("invalid recipient: {e}")))?;

        let mut builder = Message::builder().from(from).to(to);
        // Form-valid addresses can still fail RFC 5322 parsing.
        match submission.email.parse::<Address>() {
            Ok(address) => {
                builder = builder.reply_to(Mailbox::new(Some(submission.name.clone()), address));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Submitter address not usable as Reply-To; omitting it");
            }
        }

        builder
            .subject(format!("{}: {}", self.config.subject, submission.name))
            .header(ContentType::TEXT_PLAIN)
            .body(render_body(submission))
            .map_err(|e| config_rejected(e.to_string()))
    }
}

#[async_trait]
impl ContactSink for SmtpSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Smtp
    }

    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    async fn deliver(&self, submission: &ContactSubmission) -> Result<Receipt, DeliveryError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(DeliveryError::NotConfigured { sink: SinkKind::Smtp })?;

        let message = self.build_message(submission)?;
        let response = transport.send(message).await.map_err(classify_smtp_error)?;

        Ok(Receipt {
            id: response.first_line().map(String::from),
        })
    }
}

fn build_transport(
    config: &SmtpConfig,
    credentials: Credentials,
    timeout: Duration,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
    let builder = if config.starttls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(|e| {
            DeliveryError::Transport {
                sink: SinkKind::Smtp,
                detail: e.to_string(),
            }
        })?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
    };

    Ok(builder
        .port(config.port)
        .credentials(credentials)
        .timeout(Some(timeout))
        .build())
}

fn render_body(submission: &ContactSubmission) -> String {
    let mut body = format!(
        "Name: {}\nEmail: {}\n",
        submission.name, submission.email
    );
    if let Some(phone) = &submission.phone {
        body.push_str(&format!("Phone: {phone}\n"));
    }
    body.push_str(&format!(
        "Received: {}\n\n{}\n",
        submission.created_at.to_rfc3339(),
        submission.message
    ));
    body
}

fn config_rejected(detail: String) -> DeliveryError {
    DeliveryError::Rejected {
        sink: SinkKind::Smtp,
        detail,
    }
}

fn classify_smtp_error(err: SmtpError) -> DeliveryError {
    let sink = SinkKind::Smtp;
    let detail = err.to_string();
    let code = err.status().map(|c| c.to_string());

    if err.is_timeout() {
        DeliveryError::Timeout { sink, detail }
    } else if code.as_deref().is_some_and(|c| AUTH_FAILURE_CODES.contains(&c)) {
        DeliveryError::Auth { sink, detail }
    } else if err.is_permanent() || err.is_transient() {
        DeliveryError::Rejected { sink, detail }
    } else {
        DeliveryError::Unavailable { sink, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactPayload;
    use chrono::Utc;

    fn configured() -> SmtpConfig {
        SmtpConfig {
            username: Some("owner@example.com".into()),
            password: Some("app-password".into()),
            ..SmtpConfig::default()
        }
    }

    fn submission() -> ContactSubmission {
        let payload = ContactPayload::new("Ada Lovelace", "ada@example.com", "Let's build an engine")
            .with_phone("555 123 4567");
        ContactSubmission::from_payload(payload, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_configured_when_credentials_present() {
        let sink = SmtpSink::new(configured(), 15).unwrap();
        assert!(sink.is_configured());
        assert_eq!(sink.kind(), SinkKind::Smtp);
    }

    #[tokio::test]
    async fn test_unconfigured_sink_fails_without_network() {
        let sink = SmtpSink::new(SmtpConfig::default(), 15).unwrap();
        assert!(!sink.is_configured());

        let err = sink.deliver(&submission()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured { sink: SinkKind::Smtp }));
    }

    #[tokio::test]
    async fn test_message_headers_and_body() {
        let sink = SmtpSink::new(configured(), 15).unwrap();
        let message = sink.build_message(&submission()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: New contact form submission: Ada Lovelace"));
        assert!(raw.contains("Reply-To:"));
        assert!(raw.contains("ada@example.com"));
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Phone: 555 123 4567"));
        assert!(raw.contains("Let's build an engine"));
    }

    #[tokio::test]
    async fn test_explicit_recipient_wins() {
        let config = SmtpConfig {
            to: Some("inbox@example.org".into()),
            ..configured()
        };
        let sink = SmtpSink::new(config, 15).unwrap();
        let raw = String::from_utf8(sink.build_message(&submission()).unwrap().formatted()).unwrap();
        assert!(raw.contains("To: inbox@example.org"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_to_is_omitted() {
        let sink = SmtpSink::new(configured(), 15).unwrap();
        for email in ["a,b@example.co", "a@b.c."] {
            let payload = ContactPayload::new("Ada", email, "Let's build an engine");
            let submission = ContactSubmission::from_payload(payload, Utc::now()).unwrap();

            let message = sink.build_message(&submission).unwrap();
            let raw = String::from_utf8(message.formatted()).unwrap();
            assert!(!raw.contains("Reply-To:"), "{email}");
            assert!(raw.contains(&format!("Email: {email}")));
        }
    }
}
