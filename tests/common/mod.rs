//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use contact_relay::contact::ContactSubmission;
use contact_relay::delivery::{ContactSink, DeliveryError, Receipt, SinkKind};
use contact_relay::{HttpServer, RelayConfig, Shutdown};

/// In-memory sink that keeps every delivered submission.
#[derive(Default)]
pub struct RecordingSink {
    pub delivered: Mutex<Vec<ContactSubmission>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl ContactSink for RecordingSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Mongo
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn deliver(&self, submission: &ContactSubmission) -> Result<Receipt, DeliveryError> {
        let mut delivered = self.delivered.lock().unwrap();
        delivered.push(submission.clone());
        Ok(Receipt::with_id(format!("rec-{}", delivered.len())))
    }
}

/// Sink that fails every delivery with the given error.
pub struct FailingSink {
    pub error: fn() -> DeliveryError,
}

#[async_trait]
impl ContactSink for FailingSink {
    fn kind(&self) -> SinkKind {
        (self.error)().sink()
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn deliver(&self, _submission: &ContactSubmission) -> Result<Receipt, DeliveryError> {
        Err((self.error)())
    }
}

/// A relay running on an ephemeral port.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestRelay {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a relay on 127.0.0.1 with an ephemeral port.
pub async fn spawn_relay(config: RelayConfig, sink: Arc<dyn ContactSink>) -> TestRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, sink);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestRelay {
        addr,
        shutdown,
        handle,
    }
}

/// Requests received by the mock form API.
#[derive(Clone, Default)]
pub struct FormApiLog {
    pub bodies: Arc<Mutex<Vec<Value>>>,
}

/// Start a mock form API at `/submit` that answers every request with
/// `status` and `body`.
pub async fn spawn_form_api(status: u16, body: &'static str) -> (String, FormApiLog) {
    let log = FormApiLog::default();

    let app = Router::new()
        .route(
            "/submit",
            post(
                move |State(log): State<FormApiLog>, Json(request): Json<Value>| async move {
                    log.bodies.lock().unwrap().push(request);
                    (
                        StatusCode::from_u16(status).unwrap(),
                        [("content-type", "application/json")],
                        body,
                    )
                },
            ),
        )
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}/submit"), log)
}
