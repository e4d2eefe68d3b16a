use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use welcome_bot::{
    event::MessageContent, EventSource, GatewayError, IncomingEvent, RoomAlias, RoomId,
    SessionGateway, UserId,
};

// ============================================================================
// Mock Gateway
// ============================================================================

/// Every call the router made, in order
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    ResolveAlias(String),
    JoinRoom(RoomId),
    CreateDirectRoom(UserId),
    LeaveRoom(RoomId),
    SendMessage(RoomId, MessageContent),
    GetAccountData(String),
    SetAccountData(String, Value),
}

/// Gateway operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ResolveAlias,
    JoinRoom,
    CreateDirectRoom,
    LeaveRoom,
    SendMessage,
    GetAccountData,
    SetAccountData,
}

pub struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    failing: Mutex<HashSet<Op>>,
    aliases: Mutex<HashMap<String, RoomId>>,
    account_data: Mutex<HashMap<String, Value>>,
    next_room: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            aliases: Mutex::new(HashMap::new()),
            account_data: Mutex::new(HashMap::new()),
            next_room: AtomicUsize::new(1),
        }
    }

    pub fn with_alias(self, alias: &str, room_id: &str) -> Self {
        self.aliases
            .lock()
            .unwrap()
            .insert(alias.to_string(), RoomId::new(room_id));
        self
    }

    pub fn with_account_data(self, event_type: &str, value: Value) -> Self {
        self.account_data
            .lock()
            .unwrap()
            .insert(event_type.to_string(), value);
        self
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn sent_messages(&self) -> Vec<(RoomId, MessageContent)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::SendMessage(room_id, content) => Some((room_id, content)),
                _ => None,
            })
            .collect()
    }

    pub fn created_rooms(&self) -> Vec<UserId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::CreateDirectRoom(user_id) => Some(user_id),
                _ => None,
            })
            .collect()
    }

    pub fn joined_rooms(&self) -> Vec<RoomId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::JoinRoom(room_id) => Some(room_id),
                _ => None,
            })
            .collect()
    }

    pub fn left_rooms(&self) -> Vec<RoomId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::LeaveRoom(room_id) => Some(room_id),
                _ => None,
            })
            .collect()
    }

    pub fn stored_account_data(&self, event_type: &str) -> Option<Value> {
        self.account_data.lock().unwrap().get(event_type).cloned()
    }

    fn record(&self, call: GatewayCall, op: Op) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&op) {
            return Err(GatewayError::api(500, "M_UNKNOWN", "simulated failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionGateway for MockGateway {
    async fn resolve_alias(&self, alias: &RoomAlias) -> Result<RoomId, GatewayError> {
        self.record(
            GatewayCall::ResolveAlias(alias.as_str().to_string()),
            Op::ResolveAlias,
        )?;
        self.aliases
            .lock()
            .unwrap()
            .get(alias.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::api(404, "M_NOT_FOUND", "Room alias not found"))
    }

    async fn join_room(&self, room_id: &RoomId) -> Result<(), GatewayError> {
        self.record(GatewayCall::JoinRoom(room_id.clone()), Op::JoinRoom)
    }

    async fn create_direct_room(&self, invitee: &UserId) -> Result<RoomId, GatewayError> {
        self.record(
            GatewayCall::CreateDirectRoom(invitee.clone()),
            Op::CreateDirectRoom,
        )?;
        let n = self.next_room.fetch_add(1, Ordering::Relaxed);
        Ok(RoomId::new(format!("!dm{}:example.org", n)))
    }

    async fn leave_room(&self, room_id: &RoomId) -> Result<(), GatewayError> {
        self.record(GatewayCall::LeaveRoom(room_id.clone()), Op::LeaveRoom)
    }

    async fn send_message(
        &self,
        room_id: &RoomId,
        content: &MessageContent,
    ) -> Result<(), GatewayError> {
        self.record(
            GatewayCall::SendMessage(room_id.clone(), content.clone()),
            Op::SendMessage,
        )
    }

    async fn get_account_data(&self, event_type: &str) -> Result<Value, GatewayError> {
        self.record(
            GatewayCall::GetAccountData(event_type.to_string()),
            Op::GetAccountData,
        )?;
        self.stored_account_data(event_type)
            .ok_or_else(|| GatewayError::api(404, "M_NOT_FOUND", "Account data not found"))
    }

    async fn set_account_data(
        &self,
        event_type: &str,
        value: &Value,
    ) -> Result<(), GatewayError> {
        self.record(
            GatewayCall::SetAccountData(event_type.to_string(), value.clone()),
            Op::SetAccountData,
        )?;
        self.account_data
            .lock()
            .unwrap()
            .insert(event_type.to_string(), value.clone());
        Ok(())
    }
}

// ============================================================================
// Scripted Event Source
// ============================================================================

/// Replays prepared batches, then waits forever
pub struct ScriptedEventSource {
    batches: VecDeque<Result<Vec<IncomingEvent>, GatewayError>>,
    on_first_batch: Option<oneshot::Sender<()>>,
}

impl ScriptedEventSource {
    pub fn new() -> Self {
        Self {
            batches: VecDeque::new(),
            on_first_batch: None,
        }
    }

    pub fn with_batch(mut self, events: Vec<IncomingEvent>) -> Self {
        self.batches.push_back(Ok(events));
        self
    }

    pub fn with_transport_error(mut self) -> Self {
        self.batches
            .push_back(Err(GatewayError::Decode("connection reset".to_string())));
        self
    }

    /// Signal `sender` as soon as the first batch is handed out
    pub fn notify_on_first_batch(mut self, sender: oneshot::Sender<()>) -> Self {
        self.on_first_batch = Some(sender);
        self
    }
}

#[async_trait]
impl EventSource for ScriptedEventSource {
    async fn next_batch(&mut self) -> Result<Vec<IncomingEvent>, GatewayError> {
        match self.batches.pop_front() {
            Some(batch) => {
                if let Some(sender) = self.on_first_batch.take() {
                    let _ = sender.send(());
                }
                batch
            }
            None => futures::future::pending().await,
        }
    }
}
