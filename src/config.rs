use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

use crate::gateway::Credentials;
use crate::room::models::RoomReference;
use crate::shared::AppError;

pub const ENV_HOMESERVER: &str = "WELCOME_BOT_HOMESERVER";
pub const ENV_USERNAME: &str = "WELCOME_BOT_USERNAME";
pub const ENV_PASSWORD: &str = "WELCOME_BOT_PASSWORD";

/// Bot configuration as read from the YAML file
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub homeserver: String,
    #[serde(default)]
    pub rooms: Vec<String>,
    #[serde(default)]
    pub redirect_messages: bool,
    #[serde(default)]
    pub redirect_room: String,
    pub html_msg_path: PathBuf,
    pub txt_msg_path: PathBuf,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Config {
    /// Read the config file, apply environment overrides and validate
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Reading config file {}: {}", path.display(), e))
        })?;

        let config = Self::from_yaml(&yaml)?.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, AppError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AppError::Config(format!("Parsing config file: {}", e)))
    }

    /// Replace connection settings with non-empty values from `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fields = [
            (ENV_HOMESERVER, &mut self.homeserver),
            (ENV_USERNAME, &mut self.username),
            (ENV_PASSWORD, &mut self.password),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("homeserver", &self.homeserver),
            ("username", &self.username),
            ("password", &self.password),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(AppError::Config(format!("{} is undefined", name)));
            }
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// Syntactically valid watched rooms; invalid entries are logged and dropped
    pub fn watched_rooms(&self) -> Result<Vec<RoomReference>, AppError> {
        let rooms: Vec<RoomReference> = self
            .rooms
            .iter()
            .filter_map(|room| match room.parse::<RoomReference>() {
                Ok(reference) => Some(reference),
                Err(e) => {
                    error!(room = %room, error = %e, "Room is not valid, ignoring this room");
                    None
                }
            })
            .collect();

        if rooms.is_empty() {
            return Err(AppError::Config(
                "No valid room ids have been provided".to_string(),
            ));
        }
        Ok(rooms)
    }

    /// The relay room, if relaying is enabled and a room is given
    pub fn relay_room(&self) -> Result<Option<RoomReference>, AppError> {
        if !self.redirect_messages {
            return Ok(None);
        }
        if self.redirect_room.is_empty() {
            warn!("Redirection of messages configured, but no room given");
            return Ok(None);
        }
        self.redirect_room.parse().map(Some)
    }
}
