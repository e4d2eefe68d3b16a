use std::sync::Arc;

use welcome_bot::{
    direct::{AccountDataDirectRoomRepository, DIRECT_ACCOUNT_DATA},
    event::{Membership, MembershipChange, MessageContent, RoomMessage},
    DirectRooms, EventRouter, GreetingTemplate, IncomingEvent, RoomId, UserId, WatchSet,
};

use super::mocks::MockGateway;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const BOT: &str = "@welcome:example.org";
pub const LOBBY: &str = "!lobby:example.org";
pub const MODS: &str = "!mods:example.org";
pub const ALICE: &str = "@alice:example.org";

pub const GREETING_TXT: &str = "Welcome to the space!\n\nPlease read the rules.\n";
pub const GREETING_HTML: &str = "<h1>Welcome to the space!</h1>\n<p>Please read the rules.</p>\n";

pub struct TestSetup {
    pub gateway: Arc<MockGateway>,
    pub router: EventRouter,
    pub template: GreetingTemplate,
}

impl TestSetup {
    /// Rooms recorded for `user` in the gateway's account data
    pub fn registry_rooms(&self, user: &str) -> Vec<RoomId> {
        self.gateway
            .stored_account_data(DIRECT_ACCOUNT_DATA)
            .map(|value| DirectRooms::from_value(value).unwrap())
            .map(|direct| direct.rooms_for(&UserId::new(user)).to_vec())
            .unwrap_or_default()
    }

    pub async fn handle_all(&self, events: &[IncomingEvent]) {
        for event in events {
            self.router.handle_event(event).await;
        }
    }
}

pub struct TestSetupBuilder {
    gateway: MockGateway,
    watched: Vec<RoomId>,
    relay_target: Option<RoomId>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            gateway: MockGateway::new(),
            watched: vec![RoomId::new(LOBBY)],
            relay_target: None,
        }
    }

    pub fn with_gateway(mut self, gateway: MockGateway) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_watched_rooms(mut self, rooms: Vec<&str>) -> Self {
        self.watched = rooms.into_iter().map(RoomId::new).collect();
        self
    }

    pub fn with_relay_target(mut self, room: &str) -> Self {
        self.relay_target = Some(RoomId::new(room));
        self
    }

    pub fn build(self) -> TestSetup {
        let gateway = Arc::new(self.gateway);
        let registry = Arc::new(AccountDataDirectRoomRepository::new(gateway.clone()));
        let template = GreetingTemplate::new(GREETING_TXT, GREETING_HTML);

        let router = EventRouter::new(
            gateway.clone(),
            registry,
            WatchSet::new(self.watched).unwrap(),
            self.relay_target,
            template.clone(),
            UserId::new(BOT),
        );

        TestSetup {
            gateway,
            router,
            template,
        }
    }
}

// ============================================================================
// Event Builders
// ============================================================================

pub fn joined(room: &str, user: &str) -> IncomingEvent {
    IncomingEvent::Membership(MembershipChange {
        room_id: RoomId::new(room),
        sender: UserId::new(user),
        subject: UserId::new(user),
        membership: Membership::Join,
    })
}

pub fn invited(room: &str, inviter: &str, invitee: &str) -> IncomingEvent {
    IncomingEvent::Membership(MembershipChange {
        room_id: RoomId::new(room),
        sender: UserId::new(inviter),
        subject: UserId::new(invitee),
        membership: Membership::Invite,
    })
}

pub fn text_message(room: &str, sender: &str, body: &str) -> IncomingEvent {
    message(
        room,
        sender,
        MessageContent {
            msgtype: "m.text".to_string(),
            body: body.to_string(),
            format: None,
            formatted_body: None,
            url: None,
            info: None,
            file: None,
            new_content: None,
            relates_to: None,
            extra: Default::default(),
        },
    )
}

pub fn message(room: &str, sender: &str, content: MessageContent) -> IncomingEvent {
    IncomingEvent::Message(RoomMessage {
        room_id: RoomId::new(room),
        sender: UserId::new(sender),
        content,
    })
}
