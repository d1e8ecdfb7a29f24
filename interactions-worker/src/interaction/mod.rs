//! Interaction payload model.
//!
//! This module provides:
//! - The inbound interaction record posted by the platform
//! - The response payloads a handler sends back
//!
//! ## Flow
//!
//! ```text
//! verified body → Interaction → InteractionHandler → InteractionResponse
//! ```

pub mod response;
pub mod types;

pub use response::{InteractionResponse, InteractionResponseType, MessageFlags, ResponseData};
pub use types::{Interaction, InteractionType};
