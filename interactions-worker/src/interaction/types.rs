//! Inbound interaction types.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Discriminator of an inbound interaction.
///
/// Values the receiver does not know about are kept as `Unknown` so newer
/// platform kinds still reach the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum InteractionType {
    /// Liveness check, answered by the receiver itself
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
    Unknown(u64),
}

impl From<u64> for InteractionType {
    fn from(value: u64) -> Self {
        match value {
            1 => InteractionType::Ping,
            2 => InteractionType::ApplicationCommand,
            3 => InteractionType::MessageComponent,
            4 => InteractionType::ApplicationCommandAutocomplete,
            5 => InteractionType::ModalSubmit,
            other => InteractionType::Unknown(other),
        }
    }
}

impl From<InteractionType> for u64 {
    fn from(kind: InteractionType) -> Self {
        match kind {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::ApplicationCommandAutocomplete => 4,
            InteractionType::ModalSubmit => 5,
            InteractionType::Unknown(other) => other,
        }
    }
}

/// An interaction as posted by the platform.
///
/// Only the envelope is typed; command data, member and user objects are
/// left as JSON for the handler to interpret. Fields not listed here are
/// preserved in `extra`. Only `type` is required: a typed envelope field
/// holding a value of another JSON type reads as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: InteractionType,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    /// Continuation token for follow-up messages
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deserialize an optional field, discarding values of an unexpected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

impl Interaction {
    /// Parse an interaction from a verified request body.
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    pub fn is_ping(&self) -> bool {
        self.kind == InteractionType::Ping
    }

    /// Name of the invoked command for command and autocomplete interactions.
    pub fn command_name(&self) -> Option<&str> {
        match self.kind {
            InteractionType::ApplicationCommand | InteractionType::ApplicationCommandAutocomplete => {
                self.data.as_ref()?.get("name")?.as_str()
            }
            _ => None,
        }
    }

    /// Custom id of the component or modal that triggered the interaction.
    pub fn custom_id(&self) -> Option<&str> {
        match self.kind {
            InteractionType::MessageComponent | InteractionType::ModalSubmit => {
                self.data.as_ref()?.get("custom_id")?.as_str()
            }
            _ => None,
        }
    }
}
