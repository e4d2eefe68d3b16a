use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

use super::models::{DirectRooms, DIRECT_ACCOUNT_DATA};
use crate::gateway::SessionGateway;
use crate::room::models::RoomId;
use crate::shared::AppError;
use crate::user::UserId;

/// Registry of the private rooms the bot opened with each user
#[async_trait]
pub trait DirectRoomRepository: Send + Sync {
    /// Read the whole registry
    async fn load(&self) -> Result<DirectRooms, AppError>;

    /// Read, append `room_id` under `user_id`, write back
    async fn record_room(&self, user_id: &UserId, room_id: &RoomId) -> Result<(), AppError>;

    /// Whether `room_id` is one of the rooms opened with `user_id`
    async fn is_direct_room(&self, user_id: &UserId, room_id: &RoomId) -> Result<bool, AppError> {
        Ok(self.load().await?.contains(user_id, room_id))
    }
}

/// Registry persisted in the session's `m.direct` account data
///
/// Every call goes to the homeserver so other clients' edits to `m.direct`
/// are picked up and preserved.
pub struct AccountDataDirectRoomRepository {
    gateway: Arc<dyn SessionGateway>,
}

impl AccountDataDirectRoomRepository {
    pub fn new(gateway: Arc<dyn SessionGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl DirectRoomRepository for AccountDataDirectRoomRepository {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<DirectRooms, AppError> {
        let value = match self.gateway.get_account_data(DIRECT_ACCOUNT_DATA).await {
            Ok(value) => value,
            Err(e) if e.is_not_found() => {
                debug!("No direct rooms stored yet");
                return Ok(DirectRooms::new());
            }
            Err(e) => return Err(AppError::registry("Could not read direct rooms", e)),
        };

        DirectRooms::from_value(value)
            .map_err(|e| AppError::registry("Stored direct rooms are malformed", e))
    }

    #[instrument(skip(self))]
    async fn record_room(&self, user_id: &UserId, room_id: &RoomId) -> Result<(), AppError> {
        let mut direct = self.load().await?;
        if !direct.add(user_id, room_id) {
            debug!(user_id = %user_id, room_id = %room_id, "Direct room already recorded");
            return Ok(());
        }

        let value = direct
            .to_value()
            .map_err(|e| AppError::registry("Could not encode direct rooms", e))?;
        self.gateway
            .set_account_data(DIRECT_ACCOUNT_DATA, &value)
            .await
            .map_err(|e| AppError::registry("Could not write direct rooms", e))?;

        info!(
            user_id = %user_id,
            room_id = %room_id,
            room_count = direct.rooms_for(user_id).len(),
            "Recorded direct room"
        );
        Ok(())
    }
}

/// In-memory implementation for development and testing
pub struct InMemoryDirectRoomRepository {
    direct: Mutex<DirectRooms>,
}

impl Default for InMemoryDirectRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectRoomRepository {
    pub fn new() -> Self {
        Self {
            direct: Mutex::new(DirectRooms::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, DirectRooms>, AppError> {
        self.direct
            .lock()
            .map_err(|_| AppError::Registry("direct room registry lock poisoned".to_string()))
    }
}

#[async_trait]
impl DirectRoomRepository for InMemoryDirectRoomRepository {
    async fn load(&self) -> Result<DirectRooms, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn record_room(&self, user_id: &UserId, room_id: &RoomId) -> Result<(), AppError> {
        self.lock()?.add(user_id, room_id);
        debug!(user_id = %user_id, room_id = %room_id, "Recorded direct room in memory");
        Ok(())
    }
}
