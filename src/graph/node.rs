//! Node abstraction for the graph.
//!
//! A node is a plugin-provided processing unit. It owns its private state and
//! never holds a reference to the graph: during `process` and `on_message` it
//! receives a [`NodeContext`] that borrows a read-only [`GraphView`] of the
//! rest of the graph plus write access to its own outputs and side effects.
//! Side effects (outgoing messages, dirty marks, structural requests) are
//! collected in [`NodeEffects`] and applied by the graph after the call
//! returns.

use crate::graph::connection::{Connection, ConnectionTable};
use crate::graph::graph::NodeEntry;
use crate::graph::id::NodeId;
use crate::protocol::message::Request;
use anyhow::anyhow;
use serde_json::Value;
use std::collections::BTreeMap;

/// Output values of one node, keyed by output socket name.
pub type OutputMap = BTreeMap<String, Value>;

/// Result of a single `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Outputs are up to date; the node becomes clean.
    Ready,
    /// Work was started but has not finished. The node stays dirty and its
    /// consumers are not processed this pass.
    Pending,
}

/// Trait implemented by every node type.
pub trait Node: Send {
    /// Recompute outputs from inputs. Called when the node is dirty.
    fn process(&mut self, _ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
        Ok(ProcessStatus::Ready)
    }

    /// Handle a payload sent to this node by the remote editor.
    fn on_message(&mut self, _payload: &Value, _ctx: &mut NodeContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Persistent state, recorded in snapshots.
    fn data(&self) -> Value {
        Value::Null
    }

    /// Replace persistent state (initial data, snapshot restore, `NodeData`).
    fn set_data(&mut self, _data: &Value) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A message emitted by a node, addressed to the remote editor.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMessage {
    pub node_id: NodeId,
    pub payload: Value,
}

/// Side effects collected while a node runs.
#[derive(Debug, Default)]
pub struct NodeEffects {
    pub messages: Vec<Value>,
    pub mark_dirty: bool,
    pub requests: Vec<Request>,
}

/// Read-only view of the graph handed to a running node.
///
/// The running node's own entry is absent from `nodes` for the duration of
/// the call; its outputs are reachable through [`NodeContext::output`].
#[derive(Clone, Copy)]
pub struct GraphView<'a> {
    pub(crate) nodes: &'a BTreeMap<NodeId, NodeEntry>,
    pub(crate) connections: &'a ConnectionTable,
}

impl<'a> GraphView<'a> {
    pub fn get_input_connection(&self, node: NodeId, socket: &str) -> Option<&'a Connection> {
        self.connections.input(node, socket)
    }

    pub fn get_output_connections(&self, node: NodeId, socket: &str) -> Vec<&'a Connection> {
        self.connections.outputs(node, socket)
    }

    /// Last value written to output `socket` of `node`.
    pub fn output(&self, node: NodeId, socket: &str) -> Option<&'a Value> {
        self.nodes.get(&node).and_then(|e| e.outputs.get(socket))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }
}

/// Context passed to `process` and `on_message`.
pub struct NodeContext<'a> {
    node_id: NodeId,
    view: GraphView<'a>,
    outputs: &'a mut OutputMap,
    effects: &'a mut NodeEffects,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(
        node_id: NodeId,
        view: GraphView<'a>,
        outputs: &'a mut OutputMap,
        effects: &'a mut NodeEffects,
    ) -> Self {
        Self {
            node_id,
            view,
            outputs,
            effects,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn view(&self) -> GraphView<'a> {
        self.view
    }

    pub fn get_input_connection(&self, socket: &str) -> Option<&'a Connection> {
        self.view.get_input_connection(self.node_id, socket)
    }

    pub fn get_output_connections(&self, socket: &str) -> Vec<&'a Connection> {
        self.view.get_output_connections(self.node_id, socket)
    }

    /// Value currently present on the upstream output feeding input `socket`.
    /// `None` when the input is unconnected or the producer has not run yet.
    pub fn input(&self, socket: &str) -> Option<&'a Value> {
        let conn = self.get_input_connection(socket)?;
        self.view.output(conn.from_node, &conn.from_socket)
    }

    /// Numeric input. Unconnected inputs read as `None`; a non-numeric value
    /// is an error.
    pub fn input_f64(&self, socket: &str) -> anyhow::Result<Option<f64>> {
        match self.input(socket) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| anyhow!("input '{}' is not a number: {}", socket, v)),
        }
    }

    pub fn output(&self, socket: &str) -> Option<&Value> {
        self.outputs.get(socket)
    }

    pub fn set_output(&mut self, socket: impl Into<String>, value: Value) {
        self.outputs.insert(socket.into(), value);
    }

    pub fn clear_output(&mut self, socket: &str) {
        self.outputs.remove(socket);
    }

    /// Fire-and-forget message to the remote editor, tagged with this node's id.
    pub fn send_message(&mut self, payload: Value) {
        self.effects.messages.push(payload);
    }

    /// Mark this node (and its consumers) dirty once the current call returns.
    pub fn mark_dirty(&mut self) {
        self.effects.mark_dirty = true;
    }

    /// Queue a structural request. It is applied at the start of the next tick.
    pub fn request(&mut self, request: Request) {
        self.effects.requests.push(request);
    }
}
