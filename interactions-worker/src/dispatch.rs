//! Hand-off of verified interactions to application code.
//!
//! The dispatcher holds exactly one [`InteractionHandler`], set when the
//! server is built. Each verified, non-ping request produces one call to
//! that handler, together with a [`ResponseHandle`] the handler uses to
//! answer. The dispatcher itself never answers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use tokio::sync::oneshot;
use tracing::info;

use crate::error::ResponseError;
use crate::interaction::{Interaction, InteractionResponse};

/// Application logic attached to the receiver.
///
/// `handle` runs synchronously inside request handling. Work that needs to
/// await should move the handle into a spawned task and respond from there;
/// the request stays open until the handle is used or dropped.
pub trait InteractionHandler: Send + Sync + 'static {
    fn handle(&self, interaction: Interaction, response: ResponseHandle);
}

impl<F> InteractionHandler for F
where
    F: Fn(Interaction, ResponseHandle) + Send + Sync + 'static,
{
    fn handle(&self, interaction: Interaction, response: ResponseHandle) {
        self(interaction, response)
    }
}

/// Reply produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Write side of one pending request.
///
/// Responding consumes the handle, so a request can be answered at most
/// once. Dropping it unanswered makes the receiver fail the request.
#[derive(Debug)]
pub struct ResponseHandle {
    tx: oneshot::Sender<Reply>,
}

impl ResponseHandle {
    /// Create a handle and the receiver the transport awaits.
    pub fn channel() -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (ResponseHandle { tx }, rx)
    }

    /// Answer with an interaction response and status 200.
    pub fn respond(self, response: &InteractionResponse) -> Result<(), ResponseError> {
        let body = response.to_vec()?;
        self.respond_raw(StatusCode::OK, body)
    }

    /// Answer with an already encoded JSON body.
    pub fn respond_raw(self, status: StatusCode, body: impl Into<Bytes>) -> Result<(), ResponseError> {
        self.tx
            .send(Reply {
                status,
                body: body.into(),
            })
            .map_err(|_| ResponseError::Closed)
    }

    /// Whether the request is still waiting for an answer.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Routes verified interactions to the registered handler.
#[derive(Clone)]
pub struct Dispatcher {
    handler: Arc<dyn InteractionHandler>,
}

impl Dispatcher {
    pub fn new(handler: impl InteractionHandler) -> Self {
        Dispatcher {
            handler: Arc::new(handler),
        }
    }

    /// Notify the handler of one interaction.
    pub fn dispatch(&self, interaction: Interaction, response: ResponseHandle) {
        info!(
            interaction_id = interaction.id.as_deref().unwrap_or(""),
            interaction_type = u64::from(interaction.kind),
            "interaction_dispatched"
        );

        self.handler.handle(interaction, response);
    }
}
