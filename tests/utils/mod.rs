pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use mocks::{GatewayCall, MockGateway, Op, ScriptedEventSource};
#[allow(unused_imports)]
pub use setup::*;
