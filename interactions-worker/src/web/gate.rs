//! Verification gate.
//!
//! Decides what happens to a request once its raw body is available:
//!
//! ```text
//! raw body ─ verify ─┬─ invalid ──────────── Rejected
//!                    └─ valid ─ parse ─┬─ Ping ─ LivenessReply
//!                                      └─ other ─ Dispatch
//! ```
//!
//! The gate performs no I/O. The HTTP adapter in `handlers` turns an
//! [`Outcome`] into a response.

use axum::body::Bytes;
use axum::http::HeaderMap;
use ed25519_dalek::VerifyingKey;
use tracing::{info, warn};

use crate::error::{ConfigError, GateError};
use crate::interaction::Interaction;
use crate::web::signature::{is_timestamp_fresh, unix_now, verify_with_key};
use crate::Config;

/// Header carrying the signed timestamp.
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Header carrying the hex-encoded Ed25519 signature.
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";

/// Body of every 401 response. Identical for all failure causes.
pub const REJECTION_BODY: &str = "Invalid request signature";

/// Encoded Pong acknowledgement.
pub const PONG_BODY: &[u8] = br#"{"type":1}"#;

/// Result of running a request through the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Signature missing, malformed, stale or wrong
    Rejected,
    /// Liveness check, to be answered with the given body
    LivenessReply(Bytes),
    /// Verified interaction for the dispatcher
    Dispatch(Interaction),
}

/// Verifies signed interaction requests against the application key.
#[derive(Debug, Clone)]
pub struct VerificationGate {
    key: VerifyingKey,
    max_age: Option<u64>,
}

impl VerificationGate {
    pub fn new(key: VerifyingKey, max_age: Option<u64>) -> Self {
        VerificationGate { key, max_age }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.verifying_key()?, config.signature_max_age))
    }

    /// Run verification, then classify the payload.
    ///
    /// Only an authenticated body is ever parsed. Parse failures of an
    /// authenticated body are returned as errors.
    pub fn evaluate(
        &self,
        timestamp: &str,
        signature: &str,
        raw_body: &[u8],
    ) -> Result<Outcome, GateError> {
        self.evaluate_at(timestamp, signature, raw_body, unix_now())
    }

    pub(crate) fn evaluate_at(
        &self,
        timestamp: &str,
        signature: &str,
        raw_body: &[u8],
        now: u64,
    ) -> Result<Outcome, GateError> {
        if !verify_with_key(&self.key, raw_body, timestamp, signature) {
            warn!(
                has_timestamp = !timestamp.is_empty(),
                has_signature = !signature.is_empty(),
                "interaction_rejected"
            );
            return Ok(Outcome::Rejected);
        }

        if let Some(max_age) = self.max_age {
            if !is_timestamp_fresh(timestamp, max_age, now) {
                warn!("interaction_rejected_stale");
                return Ok(Outcome::Rejected);
            }
        }

        let interaction = Interaction::from_slice(raw_body).map_err(|e| {
            warn!(error = %e, body_length = raw_body.len(), "interaction_payload_malformed");
            GateError::MalformedPayload(e)
        })?;

        if interaction.is_ping() {
            info!("interaction_ping_answered");
            return Ok(Outcome::LivenessReply(Bytes::from_static(PONG_BODY)));
        }

        Ok(Outcome::Dispatch(interaction))
    }
}

/// Read a header as a string, treating absent or non-visible-ASCII values as empty.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{InteractionResponse, InteractionType};
    use axum::http::HeaderValue;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[9u8; 32])
    }

    fn gate(max_age: Option<u64>) -> VerificationGate {
        VerificationGate::new(signing_key().verifying_key(), max_age)
    }

    fn sign(timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(signing_key().sign(&message).to_bytes())
    }

    #[test]
    fn test_pong_body_matches_response_model() {
        assert_eq!(InteractionResponse::pong().to_vec().unwrap(), PONG_BODY);
    }

    #[test]
    fn test_ping_answered_inline() {
        let body = br#"{"type":1}"#;
        let outcome = gate(None)
            .evaluate("1700000000", &sign("1700000000", body), body)
            .unwrap();

        assert_eq!(outcome, Outcome::LivenessReply(Bytes::from_static(PONG_BODY)));
    }

    #[test]
    fn test_command_dispatched() {
        let body = br#"{"type":2,"data":{"name":"beep"}}"#;
        let outcome = gate(None)
            .evaluate("1700000000", &sign("1700000000", body), body)
            .unwrap();

        match outcome {
            Outcome::Dispatch(interaction) => {
                assert_eq!(interaction.kind, InteractionType::ApplicationCommand);
                assert_eq!(interaction.command_name(), Some("beep"));
            }
            other => panic!("expected dispatch, got {:?}", other),
        }
    }

    #[test]
    fn test_ping_with_mistyped_fields_answered() {
        for body in [
            &br#"{"type":1,"version":"1"}"#[..],
            &br#"{"type":1,"id":123}"#[..],
        ] {
            let outcome = gate(None)
                .evaluate("1700000000", &sign("1700000000", body), body)
                .unwrap();

            assert_eq!(outcome, Outcome::LivenessReply(Bytes::from_static(PONG_BODY)));
        }
    }

    #[test]
    fn test_unknown_type_dispatched() {
        let body = br#"{"type":300}"#;
        let outcome = gate(None)
            .evaluate("1700000000", &sign("1700000000", body), body)
            .unwrap();

        match outcome {
            Outcome::Dispatch(interaction) => {
                assert_eq!(interaction.kind, InteractionType::Unknown(300))
            }
            other => panic!("expected dispatch, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_signature_rejected_before_parse() {
        // Garbage body: a parse attempt would surface as an error
        let body = b"definitely not json";
        let signature = sign("1700000000", br#"{"type":1}"#);

        let outcome = gate(None).evaluate("1700000000", &signature, body).unwrap();

        assert_eq!(outcome, Outcome::Rejected);
    }

    #[test]
    fn test_missing_headers_rejected() {
        let outcome = gate(None).evaluate("", "", br#"{"type":1}"#).unwrap();

        assert_eq!(outcome, Outcome::Rejected);
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        let outcome = gate(None)
            .evaluate("1700000000", &signature[..signature.len() - 1], body)
            .unwrap();

        assert_eq!(outcome, Outcome::Rejected);
    }

    #[test]
    fn test_malformed_authenticated_body_is_error() {
        let body = b"{\"type\":";
        let result = gate(None).evaluate("1", &sign("1", body), body);

        assert!(matches!(result, Err(GateError::MalformedPayload(_))));
    }

    #[test]
    fn test_stale_timestamp_rejected_when_enforced() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        let fresh = gate(Some(300))
            .evaluate_at("1700000000", &signature, body, 1700000060)
            .unwrap();
        let stale = gate(Some(300))
            .evaluate_at("1700000000", &signature, body, 1700001000)
            .unwrap();

        assert!(matches!(fresh, Outcome::LivenessReply(_)));
        assert_eq!(stale, Outcome::Rejected);
    }

    #[test]
    fn test_header_str() {
        let mut headers = HeaderMap::new();
        headers.insert("x-signature-timestamp", HeaderValue::from_static("1700000000"));
        headers.insert("x-signature-ed25519", HeaderValue::from_bytes(&[0xff]).unwrap());

        assert_eq!(header_str(&headers, TIMESTAMP_HEADER), "1700000000");
        assert_eq!(header_str(&headers, "X-SIGNATURE-TIMESTAMP"), "1700000000");
        assert_eq!(header_str(&headers, SIGNATURE_HEADER), "");
        assert_eq!(header_str(&headers, "X-Missing"), "");
    }
}
