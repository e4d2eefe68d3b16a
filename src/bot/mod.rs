// Actions the router can take in response to an event

pub use auto_join::accept_invite;
pub use greeting::{GreetingOutcome, GreetingSaga};
pub use relay::relay_message;

mod auto_join;
mod greeting;
mod relay;
