use std::fmt::Display;
use thiserror::Error;

/// Error taxonomy for the bot
///
/// Startup errors (`Config`, `Resolution`, `Auth`) and `Transport` are fatal
/// and end the process. `Action` and `Registry` errors are scoped to the
/// handling of a single event and are only ever logged by the router.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Room resolution error: {0}")]
    Resolution(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Action failed: {0}")]
    Action(String),

    #[error("Registry error: {0}")]
    Registry(String),
}

impl AppError {
    pub fn action(context: &str, err: impl Display) -> Self {
        AppError::Action(format!("{}: {}", context, err))
    }

    pub fn registry(context: &str, err: impl Display) -> Self {
        AppError::Registry(format!("{}: {}", context, err))
    }

    pub fn resolution(context: &str, err: impl Display) -> Self {
        AppError::Resolution(format!("{}: {}", context, err))
    }
}
