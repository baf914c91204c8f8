//! Remote editor protocol: message types and the router that applies them.

pub mod message;
pub mod router;

pub use message::{GraphChange, InboundEnvelope, OutboundMessage, Request};
pub use router::{MessageRouter, ProtocolError};
