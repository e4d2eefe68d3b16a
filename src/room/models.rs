use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::AppError;

/// Stable room identifier, e.g. `!abcdef:example.org`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub const PREFIX: char = '!';

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-readable room alias, e.g. `#lobby:example.org`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomAlias(String);

impl RoomAlias {
    pub const PREFIX: char = '#';

    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A configured room, either already stable or still needing resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomReference {
    Id(RoomId),
    Alias(RoomAlias),
}

impl FromStr for RoomReference {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(RoomId::PREFIX) {
            Ok(RoomReference::Id(RoomId::new(s)))
        } else if s.starts_with(RoomAlias::PREFIX) {
            Ok(RoomReference::Alias(RoomAlias::new(s)))
        } else {
            Err(AppError::Config(format!(
                "'{}' is neither a room id ('{}…') nor a room alias ('{}…')",
                s,
                RoomId::PREFIX,
                RoomAlias::PREFIX
            )))
        }
    }
}

impl fmt::Display for RoomReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomReference::Id(id) => fmt::Display::fmt(id, f),
            RoomReference::Alias(alias) => fmt::Display::fmt(alias, f),
        }
    }
}
