//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS, limits)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::delivery::ContactSink;
use crate::http::handlers::{diagnostics, health, not_found, submit_contact};
use crate::http::request::{
    make_request_span, propagate_request_id_layer, render_timeouts, set_request_id_layer,
    track_requests,
};
use crate::security::cors::cors_layer;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn ContactSink>,
    pub started_at: Instant,
    pub expose_error_details: bool,
    /// Upper bound on one `deliver` call.
    pub delivery_timeout: Duration,
}

/// HTTP server for the contact relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server delivering to `sink`.
    pub fn new(config: RelayConfig, sink: Arc<dyn ContactSink>) -> Self {
        let state = AppState {
            sink,
            started_at: Instant::now(),
            expose_error_details: config.security.expose_error_details,
            delivery_timeout: Duration::from_secs(config.timeouts.delivery_secs),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut contact = post(submit_contact);
        if config.rate_limit.enabled {
            let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
            contact = contact.route_layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));
        }

        Router::new()
            .route("/contact", contact)
            .route("/health", get(health))
            .route("/test", get(diagnostics))
            .fallback(not_found)
            .method_not_allowed_fallback(not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_bytes))
            .layer(cors_layer(&config.cors))
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(render_timeouts))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            sink = %self.config.delivery.kind,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
