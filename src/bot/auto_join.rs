use tracing::{info, warn};

use crate::gateway::SessionGateway;
use crate::room::models::RoomId;
use crate::shared::AppError;
use crate::user::UserId;

/// Accept an invitation addressed to the bot
///
/// One attempt per invitation; the caller decides what a failure means.
pub async fn accept_invite(
    gateway: &dyn SessionGateway,
    room_id: &RoomId,
    inviter: &UserId,
) -> Result<(), AppError> {
    if let Err(e) = gateway.join_room(room_id).await {
        warn!(room_id = %room_id, inviter = %inviter, error = %e, "Could not join room");
        return Err(AppError::action("Could not join room", e));
    }

    info!(room_id = %room_id, inviter = %inviter, "Joined room after invitation");
    Ok(())
}
