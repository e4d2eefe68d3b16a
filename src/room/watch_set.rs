use std::collections::HashSet;
use tracing::{error, info, instrument};

use super::models::{RoomId, RoomReference};
use crate::gateway::SessionGateway;
use crate::shared::AppError;

/// Rooms whose joins trigger a greeting; never empty
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSet {
    rooms: HashSet<RoomId>,
}

impl WatchSet {
    pub fn new(rooms: impl IntoIterator<Item = RoomId>) -> Result<Self, AppError> {
        let rooms: HashSet<RoomId> = rooms.into_iter().collect();
        if rooms.is_empty() {
            return Err(AppError::Resolution(
                "Could not resolve or find any of the provided rooms".to_string(),
            ));
        }
        Ok(Self { rooms })
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Resolve a room reference to its stable id
pub async fn resolve_room(
    gateway: &dyn SessionGateway,
    reference: &RoomReference,
) -> Result<RoomId, AppError> {
    match reference {
        RoomReference::Id(room_id) => Ok(room_id.clone()),
        RoomReference::Alias(alias) => gateway
            .resolve_alias(alias)
            .await
            .map_err(|e| AppError::resolution(&format!("Could not find room {}", alias), e)),
    }
}

/// Resolve every watched room, dropping the ones that cannot be found
#[instrument(skip(gateway))]
pub async fn resolve_watch_set(
    gateway: &dyn SessionGateway,
    references: &[RoomReference],
) -> Result<WatchSet, AppError> {
    let mut rooms = Vec::with_capacity(references.len());
    for reference in references {
        match resolve_room(gateway, reference).await {
            Ok(room_id) => rooms.push(room_id),
            Err(e) => error!(room = %reference, error = %e, "Ignoring unresolvable room"),
        }
    }

    let watch_set = WatchSet::new(rooms)?;
    info!(room_count = watch_set.len(), "Watching rooms for new members");
    Ok(watch_set)
}

/// Resolve and join the room messages are relayed to
///
/// Both steps are fatal on failure; `None` disables relaying.
#[instrument(skip(gateway))]
pub async fn resolve_relay_target(
    gateway: &dyn SessionGateway,
    reference: Option<&RoomReference>,
) -> Result<Option<RoomId>, AppError> {
    let Some(reference) = reference else {
        info!("Message relay disabled");
        return Ok(None);
    };

    let room_id = resolve_room(gateway, reference).await?;
    gateway.join_room(&room_id).await.map_err(|e| {
        AppError::resolution(&format!("Could not join relay room {}", room_id), e)
    })?;

    info!(room_id = %room_id, "Redirecting messages to relay room");
    Ok(Some(room_id))
}
