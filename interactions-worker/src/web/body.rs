//! Raw request body acquisition.
//!
//! Signatures cover the body bytes exactly as sent, so the body is read
//! straight from the transport stream before anything parses it. Chunks are
//! appended in arrival order and the result is only handed on once the
//! stream has completed.

use std::fmt::Display;

use axum::body::{Body, Bytes};
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::error::BodyError;

/// Read an entire request body, failing once more than `limit` bytes arrive.
pub async fn collect_body(body: Body, limit: usize) -> Result<Bytes, BodyError> {
    collect_chunks(body.into_data_stream(), limit).await
}

/// Concatenate every chunk of a byte stream in arrival order.
pub async fn collect_chunks<S, E>(stream: S, limit: usize) -> Result<Bytes, BodyError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut raw = Vec::new();
    let mut chunks = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| BodyError::Read(e.to_string()))?;

        if raw.len() + chunk.len() > limit {
            warn!(
                limit = limit,
                received = raw.len() + chunk.len(),
                "interaction_body_too_large"
            );
            return Err(BodyError::TooLarge { limit });
        }

        raw.extend_from_slice(&chunk);
        chunks += 1;
    }

    debug!(chunks = chunks, body_length = raw.len(), "interaction_body_collected");

    Ok(Bytes::from(raw))
}
