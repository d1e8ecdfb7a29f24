//! HTTP endpoint handlers.
//!
//! The interactions endpoint is a thin adapter around the gate:
//! 1. Collect the raw body
//! 2. Run it through the [`VerificationGate`]
//! 3. Write the outcome, or wait for the handler's reply on dispatch

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::dispatch::{Dispatcher, ResponseHandle};
use crate::error::{BodyError, GateError};
use crate::web::body::collect_body;
use crate::web::gate::{
    header_str, Outcome, VerificationGate, REJECTION_BODY, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gate: VerificationGate,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Arc<Config>, gate: VerificationGate, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            gate,
            dispatcher,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Interactions Webhook
// =============================================================================

/// Interactions webhook endpoint.
///
/// Responses:
/// - 401 `Invalid request signature` when verification fails, whatever the cause
/// - 200 `{"type":1}` for a verified ping
/// - whatever the handler answers for any other verified interaction
/// - 400 for an unreadable body or an authenticated body that is not an interaction
/// - 413 when the body exceeds the configured limit
/// - 500 when the handler drops its response handle unanswered
pub async fn interactions_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let timestamp = header_str(&headers, TIMESTAMP_HEADER);
    let signature = header_str(&headers, SIGNATURE_HEADER);

    let raw = match collect_body(body, state.config.max_body_bytes).await {
        Ok(raw) => raw,
        Err(BodyError::TooLarge { limit }) => {
            warn!(limit = limit, "interaction_body_rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(e) => {
            warn!(error = %e, "interaction_body_read_failed");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    info!(body_length = raw.len(), "interaction_received");

    match state.gate.evaluate(timestamp, signature, &raw) {
        Ok(Outcome::Rejected) => (StatusCode::UNAUTHORIZED, REJECTION_BODY).into_response(),
        Ok(Outcome::LivenessReply(pong)) => json_response(StatusCode::OK, pong),
        Ok(Outcome::Dispatch(interaction)) => {
            let (handle, reply) = ResponseHandle::channel();
            state.dispatcher.dispatch(interaction, handle);

            match reply.await {
                Ok(reply) => {
                    info!(status = reply.status.as_u16(), "interaction_answered");
                    json_response(reply.status, reply.body)
                }
                Err(_) => {
                    error!("interaction_handler_no_response");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Interaction was not answered")
                        .into_response()
                }
            }
        }
        Err(GateError::MalformedPayload(_)) => {
            (StatusCode::BAD_REQUEST, "Malformed interaction payload").into_response()
        }
    }
}

fn json_response(status: StatusCode, body: Bytes) -> Response {
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response()
}
