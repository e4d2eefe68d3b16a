use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::events::{IncomingEvent, Membership, MembershipChange, RoomMessage};
use crate::bot::{accept_invite, relay_message, GreetingOutcome, GreetingSaga};
use crate::direct::DirectRoomRepository;
use crate::gateway::SessionGateway;
use crate::room::models::RoomId;
use crate::room::WatchSet;
use crate::templates::GreetingTemplate;
use crate::user::UserId;

/// What an event asks the bot to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ignore,
    AutoJoin,
    Greet,
    Relay,
}

/// Terminal state reached while handling one event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored,
    Joined(RoomId),
    JoinFailed(RoomId),
    Greeting(GreetingOutcome),
    Relayed,
    RelayFailed,
}

/// Classifies incoming events and runs the matching action
///
/// Events are handled one at a time; every action error is logged here and
/// never escapes `handle_event`.
pub struct EventRouter {
    gateway: Arc<dyn SessionGateway>,
    registry: Arc<dyn DirectRoomRepository>,
    watch_set: WatchSet,
    relay_target: Option<RoomId>,
    template: GreetingTemplate,
    self_id: UserId,
}

impl EventRouter {
    pub fn new(
        gateway: Arc<dyn SessionGateway>,
        registry: Arc<dyn DirectRoomRepository>,
        watch_set: WatchSet,
        relay_target: Option<RoomId>,
        template: GreetingTemplate,
        self_id: UserId,
    ) -> Self {
        Self {
            gateway,
            registry,
            watch_set,
            relay_target,
            template,
            self_id,
        }
    }

    /// Decide which action, if any, an event triggers
    pub async fn classify(&self, event: &IncomingEvent) -> Route {
        match event {
            IncomingEvent::Membership(change) => self.classify_membership(change),
            IncomingEvent::Message(message) => self.classify_message(message).await,
        }
    }

    fn classify_membership(&self, change: &MembershipChange) -> Route {
        match change.membership {
            Membership::Invite if change.subject == self.self_id => Route::AutoJoin,
            Membership::Join
                if change.subject != self.self_id && self.watch_set.contains(&change.room_id) =>
            {
                Route::Greet
            }
            _ => Route::Ignore,
        }
    }

    async fn classify_message(&self, message: &RoomMessage) -> Route {
        let Some(relay_target) = &self.relay_target else {
            return Route::Ignore;
        };
        if message.room_id == *relay_target {
            return Route::Ignore;
        }

        match self
            .registry
            .is_direct_room(&message.sender, &message.room_id)
            .await
        {
            Ok(true) => Route::Relay,
            Ok(false) => Route::Ignore,
            Err(e) => {
                error!(room_id = %message.room_id, sender = %message.sender, error = %e, "Could not check direct rooms");
                Route::Ignore
            }
        }
    }

    /// Handle one event to completion
    #[instrument(skip(self, event), fields(event_type = event.event_type(), room_id = %event.room_id()))]
    pub async fn handle_event(&self, event: &IncomingEvent) -> Outcome {
        let route = self.classify(event).await;

        match (route, event) {
            (Route::AutoJoin, IncomingEvent::Membership(change)) => {
                match accept_invite(self.gateway.as_ref(), &change.room_id, &change.sender).await {
                    Ok(()) => Outcome::Joined(change.room_id.clone()),
                    Err(_) => Outcome::JoinFailed(change.room_id.clone()),
                }
            }
            (Route::Greet, IncomingEvent::Membership(change)) => {
                let saga = GreetingSaga::new(
                    self.gateway.as_ref(),
                    self.registry.as_ref(),
                    &self.template,
                );
                Outcome::Greeting(saga.run(&change.subject).await)
            }
            (Route::Relay, IncomingEvent::Message(message)) => {
                let Some(relay_target) = &self.relay_target else {
                    return Outcome::Ignored;
                };
                match relay_message(self.gateway.as_ref(), relay_target, message).await {
                    Ok(()) => Outcome::Relayed,
                    Err(_) => Outcome::RelayFailed,
                }
            }
            _ => {
                debug!(sender = %event.sender(), "Ignoring event");
                Outcome::Ignored
            }
        }
    }
}
