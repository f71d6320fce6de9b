//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::delivery::SinkKind;

/// Root configuration for the contact relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Cross-origin settings for the portfolio frontend.
    pub cors: CorsConfig,

    /// Body limits and error exposure.
    pub security: SecurityConfig,

    /// Per-client rate limiting of `POST /contact`.
    pub rate_limit: RateLimitConfig,

    /// Which backend receives accepted submissions.
    pub delivery: DeliveryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,

    /// Outbound delivery timeout (SMTP, form API) in seconds.
    pub delivery_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            delivery_secs: 15,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty, or containing `*`, allows any origin.
    pub allowed_origins: Vec<String>,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl CorsConfig {
    /// True when no origin restriction applies.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_secs: 3600,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum JSON body size in bytes.
    pub max_body_bytes: usize,

    /// Append internal error detail to 500 responses (non-production only).
    pub expose_error_details: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024, // 1MB
            expose_error_details: false,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Sustained submissions per minute per client IP.
    pub requests_per_minute: u32,

    /// Burst capacity.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_minute: 5,
            burst_size: 3,
        }
    }
}

/// Delivery backend selection and per-backend settings.
///
/// Only the section named by `kind` is used; the others may stay at their
/// defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Active backend.
    pub kind: SinkKind,

    pub mongo: MongoConfig,

    pub smtp: SmtpConfig,

    pub form_api: FormApiConfig,
}

/// MongoDB backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MongoConfig {
    /// Connection string. `None` leaves the backend unconfigured.
    pub uri: Option<String>,

    /// Database name.
    pub database: String,

    /// Collection receiving submissions.
    pub collection: String,

    /// Server selection timeout in seconds.
    pub server_selection_timeout_secs: u64,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: "my_portfolio".to_string(),
            collection: "contacts".to_string(),
            server_selection_timeout_secs: 10,
        }
    }
}

/// SMTP backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP relay host.
    pub host: String,

    /// SMTP port (587 for STARTTLS).
    pub port: u16,

    /// Use STARTTLS; plain connections are only for local test servers.
    pub starttls: bool,

    pub username: Option<String>,

    pub password: Option<String>,

    /// `From` mailbox. Defaults to `username`.
    pub from: Option<String>,

    /// Recipient mailbox. Defaults to `username`.
    pub to: Option<String>,

    /// Subject line prefix.
    pub subject: String,
}

impl SmtpConfig {
    /// Sender mailbox, falling back to the login.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }

    /// Recipient mailbox, falling back to the login.
    pub fn recipient(&self) -> Option<&str> {
        self.to.as_deref().or(self.username.as_deref())
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            starttls: true,
            username: None,
            password: None,
            from: None,
            to: None,
            subject: "New contact form submission".to_string(),
        }
    }
}

/// Third-party form API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FormApiConfig {
    /// Submission endpoint.
    pub endpoint: String,

    /// Access key issued by the form provider.
    pub access_key: Option<String>,

    /// Subject forwarded with each submission.
    pub subject: String,
}

impl Default for FormApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.web3forms.com/submit".to_string(),
            access_key: None,
            subject: "New contact form submission".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
