//! Integration tests for the interactions webhook.
//!
//! These tests drive the router end to end with signed requests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ed25519_dalek::{Signer, SigningKey};
use interactions::{
    Config, Interaction, InteractionResponse, InteractionServer, InteractionType, ResponseHandle,
};
use tower::ServiceExt;

const ROUTE: &str = "/snowflake/interactions";
const TIMESTAMP: &str = "1700000000";

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[3u8; 32])
}

fn test_config() -> Config {
    let public_key = hex::encode(signing_key().verifying_key().to_bytes());
    Config::new(ROUTE, public_key, "app-id", "app-token").unwrap()
}

fn sign(timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).to_bytes())
}

/// Router whose handler records every interaction and answers with a message.
fn recording_app(config: Config) -> (Router, Arc<Mutex<Vec<Interaction>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let server = InteractionServer::new(config, move |interaction: Interaction, response: ResponseHandle| {
        let reply = match interaction.command_name() {
            Some("beep") => InteractionResponse::message("Boop!").ephemeral(),
            _ => InteractionResponse::message("unknown"),
        };
        recorder.lock().unwrap().push(interaction);
        response.respond(&reply).unwrap();
    })
    .unwrap();

    (server.router(), seen)
}

fn signed_request(body: &'static [u8], signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(ROUTE)
        .header("X-Signature-Timestamp", TIMESTAMP)
        .header("X-Signature-Ed25519", signature)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_ping_answered_with_pong() {
    let (app, seen) = recording_app(test_config());
    let body = br#"{"type":1}"#;

    let response = app
        .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(body_bytes(response).await, br#"{"type":1}"#);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_command_dispatched_once() {
    let (app, seen) = recording_app(test_config());
    let body = br#"{"type":2,"data":{"name":"beep"}}"#;

    let response = app
        .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": 4, "data": {"content": "Boop!", "flags": 64}})
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, InteractionType::ApplicationCommand);
    assert_eq!(seen[0].command_name(), Some("beep"));
}

#[tokio::test]
async fn test_ping_with_mistyped_fields_answered() {
    for body in [
        &br#"{"type":1,"version":"1"}"#[..],
        &br#"{"type":1,"id":123}"#[..],
    ] {
        let (app, seen) = recording_app(test_config());

        let response = app
            .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, br#"{"type":1}"#);
        assert!(seen.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_unknown_type_dispatched() {
    let (app, seen) = recording_app(test_config());
    let body = br#"{"type":300}"#;

    let response = app
        .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, InteractionType::Unknown(300));
}

#[tokio::test]
async fn test_truncated_signature_rejected() {
    let (app, seen) = recording_app(test_config());
    let body = br#"{"type":2,"data":{"name":"beep"}}"#;
    let signature = sign(TIMESTAMP, body);

    let response = app
        .oneshot(signed_request(body, &signature[..signature.len() - 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_bytes(response).await, b"Invalid request signature");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_headers_rejected() {
    let (app, seen) = recording_app(test_config());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(ROUTE)
                .body(Body::from(r#"{"type":1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_bytes(response).await, b"Invalid request signature");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_signature_for_other_body_rejected() {
    let (app, seen) = recording_app(test_config());
    let signature = sign(TIMESTAMP, br#"{"type":1}"#);

    let response = app
        .oneshot(signed_request(
            br#"{"type":2,"data":{"name":"beep"}}"#,
            &signature,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_authenticated_body_is_bad_request() {
    let (app, seen) = recording_app(test_config());
    let body = b"{\"type\":";

    let response = app
        .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_body_over_limit_rejected() {
    let mut config = test_config();
    config.max_body_bytes = 16;
    let (app, seen) = recording_app(config);
    let body = br#"{"type":2,"data":{"name":"beep"}}"#;

    let response = app
        .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_chunked_body_verified() {
    let (app, seen) = recording_app(test_config());
    let body = br#"{"type":2,"data":{"name":"beep"}}"#;
    let chunks: Vec<Result<&'static [u8], std::io::Error>> =
        body.chunks(5).map(Ok).collect();

    let request = Request::builder()
        .method("POST")
        .uri(ROUTE)
        .header("X-Signature-Timestamp", TIMESTAMP)
        .header("X-Signature-Ed25519", sign(TIMESTAMP, body))
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_not_allowed() {
    let (app, _) = recording_app(test_config());

    let response = app
        .oneshot(Request::builder().uri(ROUTE).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_deferred_response_from_task() {
    let server = InteractionServer::new(test_config(), |_: Interaction, response: ResponseHandle| {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            response
                .respond(&InteractionResponse::deferred())
                .unwrap();
        });
    })
    .unwrap();
    let body = br#"{"type":2,"data":{"name":"slow"}}"#;

    let response = server
        .router()
        .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, br#"{"type":5}"#);
}

#[tokio::test]
async fn test_unanswered_interaction_is_server_error() {
    let server =
        InteractionServer::new(test_config(), |_: Interaction, _: ResponseHandle| {}).unwrap();
    let body = br#"{"type":2,"data":{"name":"ignored"}}"#;

    let response = server
        .router()
        .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_held_handle_times_out() {
    let mut config = test_config();
    config.request_timeout_ms = 50;
    let parked = Arc::new(Mutex::new(Vec::new()));
    let holder = parked.clone();
    let server = InteractionServer::new(config, move |_: Interaction, response: ResponseHandle| {
        holder.lock().unwrap().push(response);
    })
    .unwrap();
    let body = br#"{"type":2,"data":{"name":"never"}}"#;

    let response = server
        .router()
        .oneshot(signed_request(body, &sign(TIMESTAMP, body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(parked.lock().unwrap().len(), 1);
}
