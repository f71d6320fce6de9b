//! Route handlers.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{SecondsFormat, Utc};

use crate::contact::{ContactPayload, ContactSubmission};
use crate::delivery::DeliveryError;
use crate::http::error::ApiError;
use crate::http::response::{DiagnosticsResponse, HealthResponse, SubmitResponse};
use crate::http::server::AppState;
use crate::observability::metrics::{self, Outcome};

/// `POST /contact`: validate the form and hand it to the delivery sink.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactPayload>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(reason = %rejection.body_text(), "Invalid JSON payload received");
        metrics::record_submission(Outcome::Invalid);
        ApiError::from(rejection)
    })?;

    let submission = ContactSubmission::from_payload(payload, Utc::now()).map_err(|e| {
        tracing::info!(reason = %e, "Contact submission rejected");
        metrics::record_submission(Outcome::Invalid);
        e
    })?;

    let sink = state.sink.kind();
    let start = Instant::now();
    let result = tokio::time::timeout(state.delivery_timeout, state.sink.deliver(&submission))
        .await
        .unwrap_or_else(|_| {
            Err(DeliveryError::Timeout {
                sink,
                detail: format!("no reply within {}s", state.delivery_timeout.as_secs()),
            })
        });
    metrics::record_delivery(sink.as_str(), start);

    match result {
        Ok(receipt) => {
            tracing::info!(
                sink = %sink,
                id = receipt.id.as_deref().unwrap_or("-"),
                email = %submission.email,
                "Contact submission delivered"
            );
            metrics::record_submission(Outcome::Accepted);
            Ok(Json(SubmitResponse::delivered()))
        }
        Err(e) => {
            tracing::error!(sink = %sink, error = %e, "Contact delivery failed");
            metrics::record_submission(Outcome::DeliveryFailed);
            Err(ApiError::Delivery {
                source: e,
                expose_details: state.expose_error_details,
            })
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

/// `GET /test`: confirms the relay is up and reports its delivery backend.
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    Json(DiagnosticsResponse {
        ok: true,
        message: "Backend is working!",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        delivery: state.sink.kind().as_str(),
        delivery_configured: state.sink.is_configured(),
    })
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
