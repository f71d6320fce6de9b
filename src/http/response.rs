//! Success response bodies.

use serde::Serialize;

/// `POST /contact` success body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub message: &'static str,
}

impl SubmitResponse {
    pub fn delivered() -> Self {
        Self {
            ok: true,
            message: "Message submitted successfully.",
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Seconds since the server was constructed.
    pub uptime: f64,
}

/// `GET /test` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    pub ok: bool,
    pub message: &'static str,
    pub timestamp: String,
    pub delivery: &'static str,
    pub delivery_configured: bool,
}
