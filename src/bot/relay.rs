use tracing::{debug, error};

use crate::event::RoomMessage;
use crate::gateway::SessionGateway;
use crate::room::models::RoomId;
use crate::shared::AppError;

/// Mirror a message from a greeting room into the relay room
pub async fn relay_message(
    gateway: &dyn SessionGateway,
    relay_room: &RoomId,
    message: &RoomMessage,
) -> Result<(), AppError> {
    let content = message.content.attributed_to(&message.sender);

    if let Err(e) = gateway.send_message(relay_room, &content).await {
        error!(
            from_room = %message.room_id,
            relay_room = %relay_room,
            sender = %message.sender,
            error = %e,
            "Could not relay message"
        );
        return Err(AppError::action("Could not relay message", e));
    }

    debug!(
        from_room = %message.room_id,
        relay_room = %relay_room,
        sender = %message.sender,
        "Relayed message"
    );
    Ok(())
}
