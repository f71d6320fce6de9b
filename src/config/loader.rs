//! Configuration loading from disk and environment.
//!
//! Precedence, lowest first: built-in defaults, TOML file, environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ConfigIssue};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse TOML text without validating it.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply the deployment environment variables on top of `config`.
///
/// `lookup` abstracts `std::env::var` so tests can supply a fixed map.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(addr) = var("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(port) = var("PORT") {
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidEnv {
            key: "PORT",
            value: port.clone(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map_or("0.0.0.0", |(host, _)| host);
        config.listener.bind_address = format!("{host}:{port}");
    }

    if let Some(origins) = var("ALLOWED_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(env) = var("NODE_ENV") {
        config.security.expose_error_details = env != "production";
    }

    if let Some(kind) = var("DELIVERY") {
        config.delivery.kind = kind.parse().map_err(|_| ConfigError::InvalidEnv {
            key: "DELIVERY",
            value: kind.clone(),
        })?;
    }

    let mongo = &mut config.delivery.mongo;
    if let Some(uri) = var("MONGO_URI") {
        mongo.uri = Some(uri);
    }
    if let Some(db) = var("MONGO_DB") {
        mongo.database = db;
    }

    let smtp = &mut config.delivery.smtp;
    if let Some(host) = var("SMTP_HOST") {
        smtp.host = host;
    }
    if let Some(user) = var("EMAIL_USER") {
        smtp.username = Some(user);
    }
    if let Some(pass) = var("EMAIL_PASS") {
        smtp.password = Some(pass);
    }
    if let Some(to) = var("EMAIL_TO") {
        smtp.to = Some(to);
    }

    if let Some(key) = var("FORM_ACCESS_KEY") {
        config.delivery.form_api.access_key = Some(key);
    }

    if let Some(level) = var("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    Ok(())
}
