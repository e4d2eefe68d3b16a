use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Body of `POST /login`
#[derive(Debug, Serialize)]
pub(super) struct LoginRequest<'a> {
    #[serde(rename = "type")]
    pub login_type: &'static str,
    pub identifier: UserIdentifier<'a>,
    pub password: &'a str,
    pub initial_device_display_name: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct UserIdentifier<'a> {
    #[serde(rename = "type")]
    pub id_type: &'static str,
    pub user: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginResponse {
    pub user_id: String,
    pub access_token: String,
}

/// Body of `POST /createRoom`
#[derive(Debug, Serialize)]
pub(super) struct CreateRoomRequest<'a> {
    pub preset: &'static str,
    pub invite: Vec<&'a str>,
    pub is_direct: bool,
}

/// Any response that names a room, e.g. createRoom, join or alias lookup
#[derive(Debug, Deserialize)]
pub(super) struct RoomIdResponse {
    pub room_id: String,
}

/// Standard error body returned by the homeserver
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponse {
    #[serde(default)]
    pub errcode: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SyncResponse {
    pub next_batch: String,
    #[serde(default)]
    pub rooms: SyncRooms,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SyncRooms {
    #[serde(default)]
    pub join: HashMap<String, JoinedRoom>,
    #[serde(default)]
    pub invite: HashMap<String, InvitedRoom>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct JoinedRoom {
    #[serde(default)]
    pub timeline: EventList,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct InvitedRoom {
    #[serde(default)]
    pub invite_state: EventList,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct EventList {
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// A client event as it appears in a sync response
#[derive(Debug, Deserialize)]
pub(super) struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub sender: String,
    #[serde(default)]
    pub state_key: Option<String>,
    #[serde(default)]
    pub content: Value,
}
