//! Ed25519 request signature verification.
//!
//! The platform signs every interaction request with the application's key
//! pair. The signed message is the value of the `X-Signature-Timestamp`
//! header immediately followed by the raw request body, and the detached
//! signature arrives hex-encoded in `X-Signature-Ed25519`.

use std::time::{SystemTime, UNIX_EPOCH};

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use tracing::warn;

use crate::error::ConfigError;

/// Verify an interaction request signature.
///
/// # Arguments
///
/// * `raw_body` - The request body exactly as received
/// * `timestamp` - The `X-Signature-Timestamp` header value
/// * `signature_hex` - The `X-Signature-Ed25519` header value
/// * `public_key_hex` - The application's hex-encoded public key
///
/// # Returns
///
/// `true` only if the signature is a valid Ed25519 signature of
/// `timestamp || raw_body` under the given key. Malformed hex or wrong
/// lengths are reported as `false`.
pub fn verify_signature(
    raw_body: &[u8],
    timestamp: &str,
    signature_hex: &str,
    public_key_hex: &str,
) -> bool {
    match decode_public_key(public_key_hex) {
        Ok(key) => verify_with_key(&key, raw_body, timestamp, signature_hex),
        Err(e) => {
            warn!(error = %e, "interaction_signature_invalid_key");
            false
        }
    }
}

/// Verify an interaction request signature against an already decoded key.
pub fn verify_with_key(
    key: &VerifyingKey,
    raw_body: &[u8],
    timestamp: &str,
    signature_hex: &str,
) -> bool {
    let signature = match decode_signature(signature_hex) {
        Some(s) => s,
        None => {
            warn!(
                signature_length = signature_hex.len(),
                "interaction_signature_malformed"
            );
            return false;
        }
    };

    let mut message = Vec::with_capacity(timestamp.len() + raw_body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(raw_body);

    let valid = key.verify(&message, &signature).is_ok();

    if !valid {
        warn!(
            timestamp_length = timestamp.len(),
            body_length = raw_body.len(),
            "interaction_signature_mismatch"
        );
    }

    valid
}

/// Decode a hex-encoded Ed25519 public key.
pub fn decode_public_key(public_key_hex: &str) -> Result<VerifyingKey, ConfigError> {
    let bytes = hex::decode(public_key_hex)
        .map_err(|_| ConfigError::InvalidPublicKey("not valid hex"))?;

    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ConfigError::InvalidPublicKey("expected 32 bytes"))?;

    VerifyingKey::from_bytes(&bytes)
        .map_err(|_| ConfigError::InvalidPublicKey("not a valid curve point"))
}

/// Decode a hex-encoded detached signature, `None` unless exactly 64 bytes.
fn decode_signature(signature_hex: &str) -> Option<Signature> {
    let bytes = hex::decode(signature_hex).ok()?;
    Signature::from_slice(&bytes).ok()
}

/// Check that a signature timestamp is within `max_age_seconds` of `now`.
///
/// Skew is measured in both directions so clocks running ahead are bounded too.
pub fn is_timestamp_fresh(timestamp: &str, max_age_seconds: u64, now: u64) -> bool {
    let signed_at: u64 = match timestamp.parse() {
        Ok(t) => t,
        Err(_) => {
            warn!(timestamp = %timestamp, "interaction_signature_invalid_timestamp");
            return false;
        }
    };

    let age = now.abs_diff(signed_at);

    if age > max_age_seconds {
        warn!(
            signed_at = signed_at,
            current_time = now,
            age_seconds = age,
            max_age_seconds = max_age_seconds,
            "interaction_signature_stale"
        );
        return false;
    }

    true
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
