//! Thread boundary between transport/I-O threads and the engine thread.
//!
//! `EngineBridge` is the handle I/O threads hold. It owns the sending half of
//! the command channel and the receiving half of the outbound channel; the
//! engine owns the other two halves. Decoding happens on the caller's thread
//! in [`EngineBridge::submit_raw`], so the engine only ever sees typed
//! requests.
//!
//! The command channel is bounded. The outbound channel is not: replies to
//! requests and error reports are always delivered, and only `NodeMessage`
//! traffic is shed once `message_capacity` messages are waiting (see
//! [`OutboundSender`]).

use crate::config::ChannelConfig;
use crate::graph::id::{ConnectionId, NodeId};
use crate::protocol::message::{InboundEnvelope, OutboundMessage, Request};
use crate::protocol::router::MessageRouter;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, SendError, Sender};
use serde_json::Value;
use std::time::Duration;

/// Commands delivered to the engine thread.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// A decoded request from the remote editor.
    Message(InboundEnvelope),
    /// Text that failed to decode. Answered with a `MalformedMessage` error.
    Undecodable { raw: String, reason: String },
    /// Stop the engine loop.
    Shutdown,
}

/// Engine-side half of the outbound channel.
#[derive(Debug, Clone)]
pub struct OutboundSender {
    tx: Sender<OutboundMessage>,
    node_message_limit: usize,
}

impl OutboundSender {
    /// Queue a message. Never blocks; fails only once the bridge is gone.
    pub fn send(&self, msg: OutboundMessage) -> Result<(), SendError<OutboundMessage>> {
        self.tx.send(msg)
    }

    /// Whether the backlog has reached the point where node messages are shed.
    pub fn is_saturated(&self) -> bool {
        self.tx.len() >= self.node_message_limit
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct EngineBridge {
    cmd_tx: Sender<EngineCommand>,
    msg_rx: Receiver<OutboundMessage>,
}

impl EngineBridge {
    /// Create a new bridge pair: `(bridge_for_io, cmd_rx, msg_tx)`.
    ///
    /// The engine thread owns `cmd_rx` and `msg_tx`.
    pub fn new(config: &ChannelConfig) -> (Self, Receiver<EngineCommand>, OutboundSender) {
        let (cmd_tx, cmd_rx) = bounded(config.command_capacity);
        let (msg_tx, msg_rx) = unbounded();
        let outbound = OutboundSender {
            tx: msg_tx,
            node_message_limit: config.message_capacity,
        };
        (Self { cmd_tx, msg_rx }, cmd_rx, outbound)
    }

    // --- Outbound ---

    /// Drain all pending outbound messages.
    pub fn drain(&self) -> Vec<OutboundMessage> {
        let mut msgs = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    /// Try to receive a single message without blocking.
    pub fn try_recv(&self) -> Option<OutboundMessage> {
        self.msg_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next message. `None` on timeout or once
    /// the engine has gone away.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<OutboundMessage> {
        match self.msg_rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// The raw outbound receiver, for blocking iteration on a printer thread.
    pub fn messages(&self) -> &Receiver<OutboundMessage> {
        &self.msg_rx
    }

    // --- Inbound ---

    /// Queue a command. Blocks while the command channel is full; returns
    /// false once the engine has shut down.
    pub fn send_command(&self, cmd: EngineCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    pub fn submit(&self, envelope: InboundEnvelope) -> bool {
        self.send_command(EngineCommand::Message(envelope))
    }

    pub fn submit_request(&self, request: Request) -> bool {
        self.submit(InboundEnvelope::new(request))
    }

    /// Decode one wire message on this thread and queue the result.
    /// Undecodable text is still forwarded so the engine can report it.
    pub fn submit_raw(&self, text: &str) -> bool {
        match MessageRouter::decode(text) {
            Ok(envelope) => self.submit(envelope),
            Err(e) => {
                tracing::debug!("Undecodable message: {}", e);
                self.send_command(EngineCommand::Undecodable {
                    raw: text.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    pub fn create_node(&self, type_id: impl Into<String>, data: Option<Value>) {
        let _ = self.submit_request(Request::CreateNode {
            type_id: type_id.into(),
            data,
        });
    }

    pub fn remove_node(&self, node_id: NodeId) {
        let _ = self.submit_request(Request::RemoveNode { node_id });
    }

    pub fn connect(
        &self,
        from_node_id: NodeId,
        from_socket: impl Into<String>,
        to_node_id: NodeId,
        to_socket: impl Into<String>,
    ) {
        let _ = self.submit_request(Request::CreateConnection {
            from_node_id,
            from_socket: from_socket.into(),
            to_node_id,
            to_socket: to_socket.into(),
        });
    }

    pub fn disconnect(&self, connection_id: ConnectionId) {
        let _ = self.submit_request(Request::RemoveConnection {
            connection_id: Some(connection_id),
            to_node_id: None,
            to_socket: None,
        });
    }

    pub fn node_data(&self, node_id: NodeId, data: Value) {
        let _ = self.submit_request(Request::NodeData { node_id, data });
    }

    pub fn request_snapshot(&self) {
        let _ = self.submit_request(Request::RequestSnapshot);
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_raw_decodes_on_caller_thread() {
        let (bridge, cmd_rx, _msg_tx) = EngineBridge::new(&ChannelConfig::default());

        assert!(bridge.submit_raw(r#"{"kind":"RequestSnapshot","requestId":4}"#));
        match cmd_rx.try_recv().unwrap() {
            EngineCommand::Message(env) => {
                assert_eq!(env.request_id, Some(4));
                assert_eq!(env.request, Request::RequestSnapshot);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(bridge.submit_raw("{not json"));
        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            EngineCommand::Undecodable { .. }
        ));
    }

    #[test]
    fn test_drain_collects_everything() {
        let (bridge, _cmd_rx, msg_tx) = EngineBridge::new(&ChannelConfig::default());
        for i in 0..3 {
            msg_tx
                .send(OutboundMessage::NodeMessage {
                    node_id: NodeId(i),
                    data: Value::Null,
                })
                .unwrap();
        }
        assert_eq!(bridge.drain().len(), 3);
        assert!(bridge.try_recv().is_none());
    }

    #[test]
    fn test_outbound_saturates_without_rejecting() {
        let channels = ChannelConfig {
            command_capacity: 4,
            message_capacity: 2,
        };
        let (bridge, _cmd_rx, msg_tx) = EngineBridge::new(&channels);
        for _ in 0..2 {
            assert!(!msg_tx.is_saturated());
            msg_tx
                .send(OutboundMessage::NodeMessage {
                    node_id: NodeId(1),
                    data: Value::Null,
                })
                .unwrap();
        }
        assert!(msg_tx.is_saturated());
        msg_tx
            .send(OutboundMessage::NodeMessage {
                node_id: NodeId(2),
                data: Value::Null,
            })
            .unwrap();
        assert_eq!(msg_tx.len(), 3);
        assert_eq!(bridge.drain().len(), 3);
        assert!(msg_tx.is_empty());
    }

    #[test]
    fn test_send_after_engine_gone() {
        let (bridge, cmd_rx, _msg_tx) = EngineBridge::new(&ChannelConfig::default());
        drop(cmd_rx);
        assert!(!bridge.submit_request(Request::RequestCatalog));
    }
}
