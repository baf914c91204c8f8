//! Engine construction helpers

use super::builders::{test_registry, Controls};
use nodegraph_rs::config::{ChannelConfig, SchedulerConfig};
use nodegraph_rs::{Engine, EngineBridge, NodeGraph, OutboundMessage};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Create an engine over the test registry, ready to be ticked or spawned.
pub fn create_test_engine() -> (Engine, EngineBridge, Controls) {
    let controls = Controls::default();
    let graph = NodeGraph::new(test_registry(&controls));
    let channels = ChannelConfig {
        command_capacity: 64,
        message_capacity: 256,
    };
    let (bridge, cmd_rx, msg_tx) = EngineBridge::new(&channels);
    let scheduler = SchedulerConfig { tick_rate_hz: 200 };
    let engine = Engine::new(
        graph,
        &scheduler,
        cmd_rx,
        msg_tx,
        Arc::new(AtomicBool::new(true)),
    );
    (engine, bridge, controls)
}

/// Collect outbound messages until `count` have arrived or `timeout` passes.
pub fn collect_messages(
    bridge: &EngineBridge,
    count: usize,
    timeout: Duration,
) -> Vec<OutboundMessage> {
    let deadline = Instant::now() + timeout;
    let mut messages = Vec::new();
    while messages.len() < count {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match bridge.recv_timeout(remaining) {
            Some(msg) => messages.push(msg),
            None => break,
        }
    }
    messages
}

/// Wait for the first message matching `pred`, discarding everything before it.
pub fn wait_for<F>(bridge: &EngineBridge, timeout: Duration, pred: F) -> Option<OutboundMessage>
where
    F: Fn(&OutboundMessage) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        let msg = bridge.recv_timeout(remaining)?;
        if pred(&msg) {
            return Some(msg);
        }
    }
}
