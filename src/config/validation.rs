//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0, addresses parse)
//! - Check the active delivery backend has what it needs to start
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system
//! - Missing backend credentials are not an error; the endpoint reports
//!   the backend as unavailable instead

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::RelayConfig;
use crate::delivery::SinkKind;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every issue found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::new("timeouts.request_secs", "must be > 0"));
    }
    if config.timeouts.delivery_secs == 0 {
        issues.push(ConfigIssue::new("timeouts.delivery_secs", "must be > 0"));
    }

    if config.security.max_body_bytes == 0 {
        issues.push(ConfigIssue::new("security.max_body_bytes", "must be > 0"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_minute == 0 {
            issues.push(ConfigIssue::new("rate_limit.requests_per_minute", "must be > 0"));
        }
        if config.rate_limit.burst_size == 0 {
            issues.push(ConfigIssue::new("rate_limit.burst_size", "must be > 0"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        issues.push(ConfigIssue::new(
            "observability.metrics_address",
            format!("not a socket address: {}", config.observability.metrics_address),
        ));
    }

    let delivery = &config.delivery;
    match delivery.kind {
        SinkKind::Mongo => {
            if let Some(uri) = &delivery.mongo.uri {
                if !(uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://")) {
                    issues.push(ConfigIssue::new(
                        "delivery.mongo.uri",
                        "must start with mongodb:// or mongodb+srv://",
                    ));
                }
            }
            if delivery.mongo.database.trim().is_empty() {
                issues.push(ConfigIssue::new("delivery.mongo.database", "must not be empty"));
            }
            if delivery.mongo.collection.trim().is_empty() {
                issues.push(ConfigIssue::new("delivery.mongo.collection", "must not be empty"));
            }
        }
        SinkKind::Smtp => {
            if delivery.smtp.host.trim().is_empty() {
                issues.push(ConfigIssue::new("delivery.smtp.host", "must not be empty"));
            }
            if delivery.smtp.port == 0 {
                issues.push(ConfigIssue::new("delivery.smtp.port", "must be > 0"));
            }
        }
        SinkKind::FormApi => match Url::parse(&delivery.form_api.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => issues.push(ConfigIssue::new(
                "delivery.form_api.endpoint",
                format!("not an http(s) URL: {}", delivery.form_api.endpoint),
            )),
        },
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
