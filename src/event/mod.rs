// Event model and routing
//
// The transport turns raw protocol events into `IncomingEvent`s; the router
// classifies each one and drives the matching bot action.

// Public API - what other modules can use
pub use events::{
    IncomingEvent, Membership, MembershipChange, MessageContent, RoomMessage, HTML_FORMAT,
    TEXT_MSGTYPE,
};
pub use router::{EventRouter, Outcome, Route};

// Internal modules
mod events;
mod router;
