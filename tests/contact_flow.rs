//! End-to-end tests against a relay bound to a real socket.

mod common;

use std::sync::Arc;
use std::time::Duration;

use contact_relay::delivery::{DeliveryError, SinkKind};
use contact_relay::RelayConfig;
use contact_sdk::{ContactClient, ContactRequest};

use common::{spawn_relay, FailingSink, RecordingSink};

#[tokio::test]
async fn test_submit_and_health_through_sdk() {
    let sink = Arc::new(RecordingSink::default());
    let relay = spawn_relay(RelayConfig::default(), sink.clone()).await;
    let client = ContactClient::new(&relay.url());

    let health = client.health().await.unwrap();
    assert!(health.ok);

    let request = ContactRequest::new("Linus", "LINUS@Example.org", "Patches welcome.")
        .with_phone("+1 (555) 010-9999");
    let response = client.submit(&request).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.ok);
    assert_eq!(response.message.as_deref(), Some("Message submitted successfully."));
    assert_eq!(response.error, None);

    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].email, "linus@example.org");
    assert_eq!(delivered[0].phone.as_deref(), Some("+1 (555) 010-9999"));
}

#[tokio::test]
async fn test_rejected_submission_is_not_delivered() {
    let sink = Arc::new(RecordingSink::default());
    let relay = spawn_relay(RelayConfig::default(), sink.clone()).await;
    let client = ContactClient::new(&relay.url());

    let response = client
        .submit(&ContactRequest::new("Linus", "not-an-email", "Patches welcome."))
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert!(!response.ok);
    assert_eq!(response.error.as_deref(), Some("Invalid email format."));
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_database_outage_reported_generically() {
    let sink = Arc::new(FailingSink {
        error: || DeliveryError::Unavailable {
            sink: SinkKind::Mongo,
            detail: "server selection timeout".into(),
        },
    });
    let relay = spawn_relay(RelayConfig::default(), sink).await;
    let client = ContactClient::new(&relay.url());

    let response = client
        .submit(&ContactRequest::new("Ada", "ada@example.com", "Hello there"))
        .await
        .unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(
        response.error.as_deref(),
        Some("Database unavailable. Please try again later.")
    );
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let mut config = RelayConfig::default();
    config.rate_limit.enabled = true;
    config.rate_limit.burst_size = 2;
    config.rate_limit.requests_per_minute = 1;

    let sink = Arc::new(RecordingSink::default());
    let relay = spawn_relay(config, sink.clone()).await;
    let client = ContactClient::new(&relay.url());
    let request = ContactRequest::new("Ada", "ada@example.com", "Hello there");

    for _ in 0..2 {
        assert_eq!(client.submit(&request).await.unwrap().status, 200);
    }

    let limited = client.submit(&request).await.unwrap();
    assert_eq!(limited.status, 429);
    assert_eq!(
        limited.error.as_deref(),
        Some("Too many requests. Please try again later.")
    );
    assert_eq!(sink.count(), 2);

    // Health is not rate limited.
    assert!(client.health().await.unwrap().ok);
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let relay = spawn_relay(RelayConfig::default(), Arc::new(RecordingSink::default())).await;
    let client = ContactClient::new(&relay.url());
    assert!(client.health().await.unwrap().ok);

    relay.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), relay.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() {
    let relay = spawn_relay(RelayConfig::default(), Arc::new(RecordingSink::default())).await;
    let http = reqwest::Client::new();

    let res = http
        .get(format!("{}/nope", relay.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Not found");

    let res = http
        .get(format!("{}/contact", relay.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "ok": false, "error": "Not found" }));
}
