//! Interaction response payloads.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of reply sent back for an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InteractionResponseType {
    /// Acknowledges a ping
    Pong,
    ChannelMessageWithSource,
    DeferredChannelMessageWithSource,
    DeferredUpdateMessage,
    UpdateMessage,
    ApplicationCommandAutocompleteResult,
    Modal,
}

impl From<InteractionResponseType> for u8 {
    fn from(kind: InteractionResponseType) -> Self {
        match kind {
            InteractionResponseType::Pong => 1,
            InteractionResponseType::ChannelMessageWithSource => 4,
            InteractionResponseType::DeferredChannelMessageWithSource => 5,
            InteractionResponseType::DeferredUpdateMessage => 6,
            InteractionResponseType::UpdateMessage => 7,
            InteractionResponseType::ApplicationCommandAutocompleteResult => 8,
            InteractionResponseType::Modal => 9,
        }
    }
}

impl TryFrom<u8> for InteractionResponseType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(InteractionResponseType::Pong),
            4 => Ok(InteractionResponseType::ChannelMessageWithSource),
            5 => Ok(InteractionResponseType::DeferredChannelMessageWithSource),
            6 => Ok(InteractionResponseType::DeferredUpdateMessage),
            7 => Ok(InteractionResponseType::UpdateMessage),
            8 => Ok(InteractionResponseType::ApplicationCommandAutocompleteResult),
            9 => Ok(InteractionResponseType::Modal),
            other => Err(format!("unknown interaction response type {}", other)),
        }
    }
}

/// Message flag bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageFlags(pub u64);

impl MessageFlags {
    pub const SUPPRESS_EMBEDS: MessageFlags = MessageFlags(1 << 2);
    /// Only the invoking user can see the message
    pub const EPHEMERAL: MessageFlags = MessageFlags(1 << 6);

    pub fn contains(self, other: MessageFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MessageFlags {
    type Output = MessageFlags;

    fn bitor(self, rhs: MessageFlags) -> MessageFlags {
        MessageFlags(self.0 | rhs.0)
    }
}

/// Callback data attached to a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<MessageFlags>,

    /// Embeds, components, choices and anything else the reply carries
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response body for an interaction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: InteractionResponseType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    /// Liveness acknowledgement, serialises to `{"type":1}`.
    pub fn pong() -> Self {
        InteractionResponse {
            kind: InteractionResponseType::Pong,
            data: None,
        }
    }

    /// Reply with a channel message.
    pub fn message(content: impl Into<String>) -> Self {
        InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(ResponseData {
                content: Some(content.into()),
                ..ResponseData::default()
            }),
        }
    }

    /// Acknowledge now and edit the reply later.
    pub fn deferred() -> Self {
        InteractionResponse {
            kind: InteractionResponseType::DeferredChannelMessageWithSource,
            data: None,
        }
    }

    /// Mark the reply as visible to the invoking user only.
    pub fn ephemeral(self) -> Self {
        self.with_flags(MessageFlags::EPHEMERAL)
    }

    pub fn with_flags(mut self, flags: MessageFlags) -> Self {
        let data = self.data.get_or_insert_with(ResponseData::default);
        data.flags = Some(data.flags.unwrap_or_default() | flags);
        self
    }

    /// Attach an arbitrary data field such as `embeds` or `choices`.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.data
            .get_or_insert_with(ResponseData::default)
            .extra
            .insert(name.into(), value);
        self
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
