// Library crate for the welcome bot
// This file exposes the public API for the binary and integration tests

pub mod bootstrap;
pub mod bot;
pub mod config;
pub mod direct;
pub mod event;
pub mod gateway;
pub mod room;
pub mod shared;
pub mod templates;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use direct::{DirectRoomRepository, DirectRooms};
pub use event::{EventRouter, IncomingEvent, Outcome};
pub use gateway::{EventSource, GatewayError, SessionGateway};
pub use room::models::{RoomAlias, RoomId, RoomReference};
pub use room::WatchSet;
pub use shared::AppError;
pub use templates::GreetingTemplate;
pub use user::UserId;
