// Direct-conversation registry
pub use models::{DirectRooms, DIRECT_ACCOUNT_DATA};
pub use repository::{
    AccountDataDirectRoomRepository, DirectRoomRepository, InMemoryDirectRoomRepository,
};

mod models;
mod repository;
