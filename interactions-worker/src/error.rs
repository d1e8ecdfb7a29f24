//! Error types shared across the receiver.

use thiserror::Error;

/// Configuration could not be assembled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(&'static str),

    #[error("interactions route must start with '/': {0}")]
    InvalidRoute(String),
}

/// The raw request body could not be acquired.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(String),
}

/// An authenticated request carried a payload that is not an interaction.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("malformed interaction payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// A reply could not be delivered through a response handle.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to encode interaction response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request is no longer waiting for a response")]
    Closed,
}

/// The server could not be started or stopped cleanly.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
