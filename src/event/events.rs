use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::room::models::RoomId;
use crate::user::UserId;

/// Message type used for greetings
pub const TEXT_MSGTYPE: &str = "m.text";

/// Rich body format used for greetings
pub const HTML_FORMAT: &str = "org.matrix.custom.html";

/// Membership state carried by a membership change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Invite,
    Join,
    Leave,
    Ban,
    Knock,
    Other(String),
}

impl Membership {
    pub fn parse(value: &str) -> Self {
        match value {
            "invite" => Membership::Invite,
            "join" => Membership::Join,
            "leave" => Membership::Leave,
            "ban" => Membership::Ban,
            "knock" => Membership::Knock,
            other => Membership::Other(other.to_string()),
        }
    }
}

/// A user's membership in a room changed
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipChange {
    pub room_id: RoomId,
    pub sender: UserId,
    /// The member whose state changed (the state key of the event)
    pub subject: UserId,
    pub membership: Membership,
}

/// A message was sent to a room
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMessage {
    pub room_id: RoomId,
    pub sender: UserId,
    pub content: MessageContent,
}

/// Events the router knows how to classify
///
/// Anything else the transport receives is dropped before it reaches the
/// router.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingEvent {
    Membership(MembershipChange),
    Message(RoomMessage),
}

impl IncomingEvent {
    pub fn room_id(&self) -> &RoomId {
        match self {
            IncomingEvent::Membership(change) => &change.room_id,
            IncomingEvent::Message(message) => &message.room_id,
        }
    }

    pub fn sender(&self) -> &UserId {
        match self {
            IncomingEvent::Membership(change) => &change.sender,
            IncomingEvent::Message(message) => &message.sender,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            IncomingEvent::Membership(_) => "membership",
            IncomingEvent::Message(_) => "message",
        }
    }
}

/// Content of an `m.room.message` event
///
/// Attachment, edit and relation metadata is kept as opaque JSON so it can be
/// re-emitted exactly as received. Keys without a field of their own, such as
/// `filename`, `geo_uri` or `m.mentions`, are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    pub msgtype: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Value>,
    #[serde(
        rename = "m.new_content",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub new_content: Option<Value>,
    #[serde(
        rename = "m.relates_to",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub relates_to: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageContent {
    /// A plain text message with an HTML rendering
    pub fn html(plain: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            msgtype: TEXT_MSGTYPE.to_string(),
            body: plain.into(),
            format: Some(HTML_FORMAT.to_string()),
            formatted_body: Some(html.into()),
            url: None,
            info: None,
            file: None,
            new_content: None,
            relates_to: None,
            extra: Map::new(),
        }
    }

    /// Copy of this message whose visible body names the original sender
    pub fn attributed_to(&self, sender: &UserId) -> Self {
        Self {
            body: format!("{}: {}", sender, self.body),
            ..self.clone()
        }
    }
}
