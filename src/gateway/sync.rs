use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::types::{RawEvent, SyncResponse};
use super::{EventSource, GatewayError, MatrixGateway};
use crate::event::{IncomingEvent, Membership, MembershipChange, MessageContent, RoomMessage};
use crate::room::models::RoomId;
use crate::user::UserId;

const MEMBER_EVENT: &str = "m.room.member";
const MESSAGE_EVENT: &str = "m.room.message";

/// Server-side long-poll duration for each `/sync`
const SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Event stream backed by repeated `/sync` calls
///
/// The first sync only establishes the position in the stream: its timeline
/// history is dropped so a restart never re-greets old joins or re-relays old
/// messages. Pending invitations from that first sync are still delivered.
///
/// Invite state is a stripped snapshot of a room the bot has not joined, so
/// the only event taken from it is the invitation addressed to the bot.
pub struct SyncStream {
    gateway: Arc<MatrixGateway>,
    since: Option<String>,
}

impl SyncStream {
    pub fn new(gateway: Arc<MatrixGateway>) -> Self {
        Self {
            gateway,
            since: None,
        }
    }
}

#[async_trait]
impl EventSource for SyncStream {
    async fn next_batch(&mut self) -> Result<Vec<IncomingEvent>, GatewayError> {
        let response = self
            .gateway
            .sync(self.since.as_deref(), SYNC_TIMEOUT)
            .await?;

        let initial = self.since.is_none();
        self.since = Some(response.next_batch.clone());

        let events = collect_events(response, self.gateway.user_id(), initial);
        if initial {
            info!(pending_invites = events.len(), "Initial sync complete");
        } else {
            debug!(count = events.len(), "Sync batch received");
        }

        Ok(events)
    }
}

/// Flatten a sync response into router events, invites first
fn collect_events(response: SyncResponse, self_id: &UserId, initial: bool) -> Vec<IncomingEvent> {
    let mut events = Vec::new();

    for (room_id, room) in response.rooms.invite {
        let room_id = RoomId::new(room_id);
        events.extend(
            room.invite_state
                .events
                .into_iter()
                .filter_map(|raw| convert_event(&room_id, raw))
                .filter(|event| is_invite_for(event, self_id)),
        );
    }

    if initial {
        return events;
    }

    for (room_id, room) in response.rooms.join {
        let room_id = RoomId::new(room_id);
        events.extend(
            room.timeline
                .events
                .into_iter()
                .filter_map(|raw| convert_event(&room_id, raw)),
        );
    }

    events
}

fn is_invite_for(event: &IncomingEvent, user_id: &UserId) -> bool {
    matches!(
        event,
        IncomingEvent::Membership(change)
            if change.membership == Membership::Invite && change.subject == *user_id
    )
}

fn convert_event(room_id: &RoomId, raw: RawEvent) -> Option<IncomingEvent> {
    match raw.event_type.as_str() {
        MEMBER_EVENT => {
            let subject = raw.state_key?;
            let membership = raw.content.get("membership")?.as_str()?;
            Some(IncomingEvent::Membership(MembershipChange {
                room_id: room_id.clone(),
                sender: UserId::new(raw.sender),
                subject: UserId::new(subject),
                membership: Membership::parse(membership),
            }))
        }
        MESSAGE_EVENT => match serde_json::from_value::<MessageContent>(raw.content) {
            Ok(content) => Some(IncomingEvent::Message(RoomMessage {
                room_id: room_id.clone(),
                sender: UserId::new(raw.sender),
                content,
            })),
            Err(e) => {
                // Redacted messages have empty content
                debug!(room_id = %room_id, error = %e, "Skipping undecodable message");
                None
            }
        },
        _ => None,
    }
}
