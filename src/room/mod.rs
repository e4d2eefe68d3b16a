// Public API - what other modules can use
pub use watch_set::{resolve_relay_target, resolve_room, resolve_watch_set, WatchSet};

pub mod models;
mod watch_set;
