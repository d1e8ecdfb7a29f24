//! Interactions Worker - signed webhook receiver for platform interactions.
//!
//! This library provides the receiving side of the push interaction protocol:
//! - Raw body collection and Ed25519 request verification
//! - Inline answers to liveness pings
//! - Hand-off of every other verified interaction to one application handler
//!
//! ## Architecture
//!
//! ```text
//! POST route → collect body → verify → Ping? → Pong
//!                                  └─ else → InteractionHandler → ResponseHandle
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod interaction;
pub mod server;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{Dispatcher, InteractionHandler, Reply, ResponseHandle};
pub use error::{BodyError, ConfigError, GateError, ResponseError, ServerError};
pub use interaction::{
    Interaction, InteractionResponse, InteractionResponseType, InteractionType, MessageFlags,
};
pub use server::{InteractionServer, ServerHandle};
pub use web::{verify_signature, AppState, Outcome, VerificationGate};
