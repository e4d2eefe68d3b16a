use tracing::{error, info, instrument, warn};

use crate::direct::DirectRoomRepository;
use crate::gateway::SessionGateway;
use crate::room::models::RoomId;
use crate::templates::GreetingTemplate;
use crate::user::UserId;

/// Terminal state of one greeting
#[derive(Debug, Clone, PartialEq)]
pub enum GreetingOutcome {
    /// The greeting was delivered; `registered` is false if the registry
    /// write failed
    Sent { room_id: RoomId, registered: bool },
    /// No room could be created, nothing else was attempted
    CreateFailed,
    /// Sending failed and the bot tried to leave the new room
    RolledBack { room_id: RoomId, left: bool },
}

/// Greet a new member in a fresh private room
///
/// Steps run once each, in order: create the room, record it in the
/// registry, send the greeting. Only a failed send is compensated, by
/// leaving the room; the registry entry stays.
pub struct GreetingSaga<'a> {
    gateway: &'a dyn SessionGateway,
    registry: &'a dyn DirectRoomRepository,
    template: &'a GreetingTemplate,
}

impl<'a> GreetingSaga<'a> {
    pub fn new(
        gateway: &'a dyn SessionGateway,
        registry: &'a dyn DirectRoomRepository,
        template: &'a GreetingTemplate,
    ) -> Self {
        Self {
            gateway,
            registry,
            template,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, user_id: &UserId) -> GreetingOutcome {
        let Some(room_id) = self.create_room(user_id).await else {
            return GreetingOutcome::CreateFailed;
        };

        let registered = self.register(user_id, &room_id).await;

        if self.send_greeting(user_id, &room_id).await {
            info!(user_id = %user_id, room_id = %room_id, "Greeted new member");
            return GreetingOutcome::Sent {
                room_id,
                registered,
            };
        }

        let left = self.rollback(user_id, &room_id).await;
        GreetingOutcome::RolledBack { room_id, left }
    }

    async fn create_room(&self, user_id: &UserId) -> Option<RoomId> {
        match self.gateway.create_direct_room(user_id).await {
            Ok(room_id) => Some(room_id),
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Could not create direct message room");
                None
            }
        }
    }

    async fn register(&self, user_id: &UserId, room_id: &RoomId) -> bool {
        match self.registry.record_room(user_id, room_id).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    user_id = %user_id,
                    room_id = %room_id,
                    error = %e,
                    "Could not record direct room, sending greeting anyway"
                );
                false
            }
        }
    }

    async fn send_greeting(&self, user_id: &UserId, room_id: &RoomId) -> bool {
        match self
            .gateway
            .send_message(room_id, &self.template.to_message())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(user_id = %user_id, room_id = %room_id, error = %e, "Could not send greeting");
                false
            }
        }
    }

    async fn rollback(&self, user_id: &UserId, room_id: &RoomId) -> bool {
        info!(user_id = %user_id, room_id = %room_id, "Leaving direct message room");
        match self.gateway.leave_room(room_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    room_id = %room_id,
                    error = %e,
                    "Could not leave direct message room, abandoning it"
                );
                false
            }
        }
    }
}
