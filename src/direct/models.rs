use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::room::models::RoomId;
use crate::user::UserId;

/// Account-data key the registry is stored under
pub const DIRECT_ACCOUNT_DATA: &str = "m.direct";

/// Direct-message rooms per user, in the `m.direct` account-data layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectRooms(BTreeMap<UserId, Vec<RoomId>>);

impl DirectRooms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Append `room_id` to the user's rooms; returns false if already present
    pub fn add(&mut self, user_id: &UserId, room_id: &RoomId) -> bool {
        let rooms = self.0.entry(user_id.clone()).or_default();
        if rooms.contains(room_id) {
            return false;
        }
        rooms.push(room_id.clone());
        true
    }

    pub fn contains(&self, user_id: &UserId, room_id: &RoomId) -> bool {
        self.rooms_for(user_id).contains(room_id)
    }

    pub fn rooms_for(&self, user_id: &UserId) -> &[RoomId] {
        self.0.get(user_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn user_count(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_appends_rooms_per_user() {
        let alice = UserId::new("@alice:example.org");
        let mut direct = DirectRooms::new();

        assert!(direct.add(&alice, &RoomId::new("!one:example.org")));
        assert!(direct.add(&alice, &RoomId::new("!two:example.org")));
        assert!(!direct.add(&alice, &RoomId::new("!one:example.org")));

        assert_eq!(
            direct.rooms_for(&alice),
            &[
                RoomId::new("!one:example.org"),
                RoomId::new("!two:example.org")
            ]
        );
        assert_eq!(direct.user_count(), 1);
    }

    #[test]
    fn test_contains_unknown_user() {
        let direct = DirectRooms::new();
        assert!(!direct.contains(
            &UserId::new("@nobody:example.org"),
            &RoomId::new("!one:example.org")
        ));
        assert!(direct.rooms_for(&UserId::new("@nobody:example.org")).is_empty());
    }

    #[test]
    fn test_value_layout() {
        let value = json!({
            "@alice:example.org": ["!one:example.org"],
            "@bob:example.org": ["!two:example.org", "!three:example.org"]
        });

        let direct = DirectRooms::from_value(value.clone()).unwrap();
        assert!(direct.contains(
            &UserId::new("@bob:example.org"),
            &RoomId::new("!three:example.org")
        ));
        assert_eq!(direct.to_value().unwrap(), value);
    }

    #[test]
    fn test_rejects_malformed_value() {
        assert!(DirectRooms::from_value(json!({ "@alice:example.org": "!one" })).is_err());
    }
}
