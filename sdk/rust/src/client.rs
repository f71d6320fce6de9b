//! Client for the contact relay HTTP API.

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Body of `POST /contact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactRequest {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }
}

/// Relay reply. Exactly one of `message` (success) or `error` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactResponse {
    /// HTTP status code.
    #[serde(skip)]
    pub status: u16,
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub uptime: f64,
}

pub struct ContactClient {
    client: Client,
    base_url: String,
}

impl ContactClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a contact form. Non-2xx replies are returned, not raised.
    pub async fn submit(&self, req: &ContactRequest) -> Result<ContactResponse, reqwest::Error> {
        let resp = self
            .client
            .post(format!("{}/contact", self.base_url))
            .json(req)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let mut body: ContactResponse = resp.json().await?;
        body.status = status;
        Ok(body)
    }

    pub async fn health(&self) -> Result<HealthResponse, reqwest::Error> {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
