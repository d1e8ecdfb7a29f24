//! Web server module for receiving signed interactions.
//!
//! This module provides:
//! - Raw body collection straight from the transport stream
//! - Ed25519 verification of `timestamp || body`
//! - The verification gate that answers pings and rejects forgeries
//! - The axum handlers that write the gate's decisions
//!
//! Everything past body collection runs without suspending.

pub mod body;
pub mod gate;
pub mod handlers;
pub mod signature;

pub use body::{collect_body, collect_chunks};
pub use gate::{
    header_str, Outcome, VerificationGate, PONG_BODY, REJECTION_BODY, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
pub use handlers::{health, interactions_webhook, AppState, HealthResponse};
pub use signature::{decode_public_key, is_timestamp_fresh, verify_signature, verify_with_key};
