//! Configuration module for environment variable parsing.
//!
//! The configuration is built once at startup and never mutated afterwards;
//! request handlers share it behind an `Arc`.

use std::env;
use std::fmt;
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use tracing::warn;

use crate::error::ConfigError;
use crate::web::signature::decode_public_key;

/// Default route the platform posts interactions to.
pub const DEFAULT_ROUTE: &str = "/interactions";

/// Client configuration for the interactions receiver.
#[derive(Clone)]
pub struct Config {
    /// Path the webhook is served on (POST only)
    pub route: String,

    /// Hex-encoded Ed25519 public key of the application (32 bytes)
    pub public_key: String,

    /// Application id, held for the surrounding application
    pub client_id: String,

    /// Application token, held for the surrounding application
    pub client_token: String,

    // =========================================================================
    // Web Server Configuration
    // =========================================================================
    /// Port for the web server to listen on
    pub port: u16,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Time budget for collecting the body and producing a reply
    pub request_timeout_ms: u64,

    /// Maximum age in seconds of the signature timestamp, unchecked when unset
    pub signature_max_age: Option<u64>,
}

impl Config {
    /// Build a configuration with default server settings.
    ///
    /// Fails when the route is not absolute or the public key does not decode
    /// to a valid Ed25519 point.
    pub fn new(
        route: impl Into<String>,
        public_key: impl Into<String>,
        client_id: impl Into<String>,
        client_token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Config {
            route: route.into(),
            public_key: public_key.into(),
            client_id: client_id.into(),
            client_token: client_token.into(),
            port: 3001,
            max_body_bytes: 1024 * 1024,
            request_timeout_ms: 3000,
            signature_max_age: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let public_key = env::var("CLIENT_PUBLIC_KEY")
            .map_err(|_| ConfigError::MissingVar("CLIENT_PUBLIC_KEY"))?;

        let config = Config {
            route: env::var("INTERACTIONS_ROUTE").unwrap_or_else(|_| DEFAULT_ROUTE.to_string()),

            public_key: public_key.trim().to_string(),

            client_id: env::var("CLIENT_ID").unwrap_or_default(),

            client_token: env::var("CLIENT_TOKEN").unwrap_or_default(),

            port: parse_var("PORT", 3001),

            max_body_bytes: parse_var("MAX_BODY_BYTES", 1024 * 1024),

            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", 3000),

            signature_max_age: env::var("SIGNATURE_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Decode the configured public key.
    pub fn verifying_key(&self) -> Result<VerifyingKey, ConfigError> {
        decode_public_key(&self.public_key)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.route.starts_with('/') {
            return Err(ConfigError::InvalidRoute(self.route.clone()));
        }
        self.verifying_key().map(|_| ())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("route", &self.route)
            .field("public_key", &self.public_key)
            .field("client_id", &self.client_id)
            .field("client_token", &"<redacted>")
            .field("port", &self.port)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("signature_max_age", &self.signature_max_age)
            .finish()
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(env_var = name, value = %raw, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
