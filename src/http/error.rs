//! API error type and its JSON rendering.
//!
//! Every failure leaves the relay as `{ "ok": false, "error": "<message>" }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::contact::ValidationError;
use crate::delivery::DeliveryError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON payload")]
    InvalidJson,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", .source.public_message())]
    Delivery {
        source: DeliveryError,
        /// Append the internal detail to the client message.
        expose_details: bool,
    },

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Request timed out. Please try again.")]
    RequestTimeout,

    #[error("Not found")]
    NotFound,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Delivery { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Message placed in the `error` field.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Delivery {
                source,
                expose_details: true,
            } => format!("{} ({})", source.public_message(), source.detail()),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidJson
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            error: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::SinkKind;

    fn db_down() -> DeliveryError {
        DeliveryError::Unavailable {
            sink: SinkKind::Mongo,
            detail: "connection refused".into(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Validation(ValidationError::MessageTooShort).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Delivery {
                source: db_down(),
                expose_details: false
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::RequestTimeout.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_message_passthrough() {
        let err = ApiError::from(ValidationError::InvalidEmail);
        assert_eq!(err.client_message(), "Invalid email format.");
    }

    #[test]
    fn test_delivery_detail_only_when_exposed() {
        let hidden = ApiError::Delivery {
            source: db_down(),
            expose_details: false,
        };
        assert_eq!(
            hidden.client_message(),
            "Database unavailable. Please try again later."
        );

        let shown = ApiError::Delivery {
            source: db_down(),
            expose_details: true,
        };
        assert_eq!(
            shown.client_message(),
            "Database unavailable. Please try again later. (connection refused)"
        );
    }

    #[tokio::test]
    async fn test_json_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "ok": false, "error": "Not found" }));
    }
}
