//! Engine thread and the bridge used to talk to it.

pub mod bridge;
pub mod executor;

pub use bridge::{EngineBridge, EngineCommand, OutboundSender};
pub use executor::Engine;
