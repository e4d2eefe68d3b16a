// Session gateway: everything the bot needs from the homeserver
//
// The router and the registry only talk to the `SessionGateway` trait, so
// the Matrix HTTP client can be swapped for a mock in tests.

pub use matrix::{Credentials, MatrixGateway};
pub use sync::SyncStream;

mod matrix;
mod sync;
mod types;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::event::{IncomingEvent, MessageContent};
use crate::room::models::{RoomAlias, RoomId};
use crate::user::UserId;

/// Errors returned by the homeserver or the HTTP layer
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{errcode} ({status}): {message}")]
    Api {
        status: u16,
        errcode: String,
        message: String,
    },

    #[error("Invalid homeserver URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn api(status: u16, errcode: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Api {
            status,
            errcode: errcode.into(),
            message: message.into(),
        }
    }

    /// Whether the requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            GatewayError::Api {
                status, errcode, ..
            } => *status == 404 || errcode == "M_NOT_FOUND",
            _ => false,
        }
    }
}

/// Operations the bot performs against its homeserver session
#[async_trait]
pub trait SessionGateway: Send + Sync {
    async fn resolve_alias(&self, alias: &RoomAlias) -> Result<RoomId, GatewayError>;

    async fn join_room(&self, room_id: &RoomId) -> Result<(), GatewayError>;

    /// Create a private direct-message room with `invitee` as the only invitee
    async fn create_direct_room(&self, invitee: &UserId) -> Result<RoomId, GatewayError>;

    async fn leave_room(&self, room_id: &RoomId) -> Result<(), GatewayError>;

    async fn send_message(
        &self,
        room_id: &RoomId,
        content: &MessageContent,
    ) -> Result<(), GatewayError>;

    async fn get_account_data(&self, event_type: &str) -> Result<Value, GatewayError>;

    async fn set_account_data(&self, event_type: &str, value: &Value)
        -> Result<(), GatewayError>;
}

/// Ordered source of protocol events
///
/// An error is a fatal transport failure; the stream has no other end.
#[async_trait]
pub trait EventSource: Send {
    async fn next_batch(&mut self) -> Result<Vec<IncomingEvent>, GatewayError>;
}
