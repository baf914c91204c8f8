//! The node graph: exclusive owner of nodes and connections.
//!
//! Every structural operation validates first and mutates second, so a failed
//! operation leaves the graph untouched. Dirty marking is delegated to the
//! [`Scheduler`], which mirrors the graph at node granularity.

use crate::graph::connection::{Connection, ConnectionTable};
use crate::graph::error::{flatten_cause, GraphError, GraphResult, SchedulerError};
use crate::graph::id::{ConnectionId, NodeId};
use crate::graph::node::{GraphView, Node, NodeContext, NodeEffects, NodeMessage, OutputMap};
use crate::graph::registry::NodeRegistry;
use crate::graph::scheduler::{NodeFailure, RunReport, Scheduler};
use crate::graph::snapshot::{GraphSnapshot, NodeRecord, SNAPSHOT_VERSION};
use crate::graph::socket::SocketDirection;
use crate::protocol::message::Request;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Storage slot for one node.
pub struct NodeEntry {
    pub(crate) type_id: String,
    pub(crate) node: Box<dyn Node>,
    pub(crate) outputs: OutputMap,
}

impl fmt::Debug for NodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEntry")
            .field("type_id", &self.type_id)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

pub struct NodeGraph {
    registry: Arc<NodeRegistry>,
    nodes: BTreeMap<NodeId, NodeEntry>,
    connections: ConnectionTable,
    scheduler: Scheduler,
    next_node_id: NodeId,
    next_connection_id: ConnectionId,
    node_messages: Vec<NodeMessage>,
    deferred: VecDeque<Request>,
}

impl fmt::Debug for NodeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("connections", &self.connections.len())
            .field("dirty", &self.scheduler.dirty_nodes().collect::<Vec<_>>())
            .finish()
    }
}

impl NodeGraph {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self {
            registry,
            nodes: BTreeMap::new(),
            connections: ConnectionTable::new(),
            scheduler: Scheduler::new(),
            next_node_id: NodeId(1),
            next_connection_id: ConnectionId(1),
            node_messages: Vec::new(),
            deferred: VecDeque::new(),
        }
    }

    // ==================== Nodes ====================

    /// Create a node of `type_id`, optionally seeding its state. The new node
    /// is dirty.
    pub fn add_node(&mut self, type_id: &str, data: Option<&Value>) -> GraphResult<NodeId> {
        let mut node = self.registry.create(type_id)?;
        if let Some(data) = data {
            node.set_data(data).map_err(|e| GraphError::InvalidNodeData {
                node_id: None,
                cause: flatten_cause(&e),
            })?;
        }

        let id = self.next_node_id;
        self.next_node_id = id.next().ok_or(GraphError::IdsExhausted("node"))?;
        self.insert_node(id, type_id, node);

        tracing::info!("Added node {:?} of type '{}'", id, type_id);
        Ok(id)
    }

    fn insert_node(&mut self, id: NodeId, type_id: &str, node: Box<dyn Node>) {
        self.nodes.insert(
            id,
            NodeEntry {
                type_id: type_id.to_string(),
                node,
                outputs: OutputMap::new(),
            },
        );
        self.scheduler.add_node(id);
    }

    /// Remove a node and every connection touching it. Returns the removed
    /// connections. Consumers of the node are marked dirty; producers are not.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<Vec<Connection>> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }

        let consumers: Vec<NodeId> = self.scheduler.consumers(id).collect();
        for consumer in consumers {
            self.scheduler.mark_dirty(consumer);
        }

        let mut removed = Vec::new();
        for conn_id in self.connections.touching(id) {
            if let Some(conn) = self.connections.remove(conn_id) {
                self.scheduler.remove_edge(conn.from_node, conn.to_node);
                removed.push(conn);
            }
        }

        self.nodes.remove(&id);
        self.scheduler.remove_node(id);

        tracing::info!(
            "Removed node {:?} ({} connection(s) cascaded)",
            id,
            removed.len()
        );
        Ok(removed)
    }

    /// Replace a node's persistent state and mark it dirty.
    pub fn set_node_data(&mut self, id: NodeId, data: &Value) -> GraphResult<()> {
        let entry = self
            .nodes
            .get_mut(&id)
            .ok_or(GraphError::NodeNotFound(id))?;
        entry
            .node
            .set_data(data)
            .map_err(|e| GraphError::InvalidNodeData {
                node_id: Some(id),
                cause: flatten_cause(&e),
            })?;
        self.scheduler.mark_dirty(id);
        tracing::debug!("Updated data of node {:?}", id);
        Ok(())
    }

    pub fn node_data(&self, id: NodeId) -> Option<Value> {
        self.nodes.get(&id).map(|e| e.node.data())
    }

    /// Deliver a remote payload to the node's `on_message`.
    pub fn send_message(&mut self, id: NodeId, payload: &Value) -> GraphResult<()> {
        let (result, effects) = invoke(&mut self.nodes, &self.connections, id, |node, ctx| {
            node.on_message(payload, ctx)
        })
        .ok_or(GraphError::NodeNotFound(id))?;

        self.apply_effects(id, effects);
        result.map_err(|e| GraphError::NodeMessageFailed {
            node_id: id,
            cause: flatten_cause(&e),
        })
    }

    pub fn mark_dirty(&mut self, id: NodeId) -> GraphResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        self.scheduler.mark_dirty(id);
        Ok(())
    }

    /// Last value the node wrote to output `socket`.
    pub fn output(&self, id: NodeId, socket: &str) -> Option<&Value> {
        self.nodes.get(&id).and_then(|e| e.outputs.get(socket))
    }

    pub fn node_type(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|e| e.type_id.as_str())
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ==================== Connections ====================

    /// Connect output `from_socket` of `from` to input `to_socket` of `to`.
    ///
    /// Checks, in order: both nodes exist, both sockets exist with the right
    /// direction, kinds match, the input is free, and the edge keeps the graph
    /// acyclic. The target node is marked dirty.
    pub fn add_connection(
        &mut self,
        from: NodeId,
        from_socket: &str,
        to: NodeId,
        to_socket: &str,
    ) -> GraphResult<ConnectionId> {
        self.validate_connection(from, from_socket, to, to_socket)?;

        let id = self.next_connection_id;
        self.next_connection_id = id.next().ok_or(GraphError::IdsExhausted("connection"))?;
        self.link(Connection {
            id,
            from_node: from,
            from_socket: from_socket.to_string(),
            to_node: to,
            to_socket: to_socket.to_string(),
        })?;

        tracing::info!(
            "Added connection {:?}: {:?}.{} -> {:?}.{}",
            id,
            from,
            from_socket,
            to,
            to_socket
        );
        Ok(id)
    }

    fn validate_connection(
        &self,
        from: NodeId,
        from_socket: &str,
        to: NodeId,
        to_socket: &str,
    ) -> GraphResult<()> {
        let from_entry = self.nodes.get(&from).ok_or(GraphError::NodeNotFound(from))?;
        let to_entry = self.nodes.get(&to).ok_or(GraphError::NodeNotFound(to))?;

        let out = self
            .registry
            .socket(&from_entry.type_id, from_socket, SocketDirection::Output)
            .ok_or_else(|| GraphError::SocketNotFound {
                node_id: from,
                socket: from_socket.to_string(),
                direction: SocketDirection::Output,
            })?;
        let input = self
            .registry
            .socket(&to_entry.type_id, to_socket, SocketDirection::Input)
            .ok_or_else(|| GraphError::SocketNotFound {
                node_id: to,
                socket: to_socket.to_string(),
                direction: SocketDirection::Input,
            })?;

        if !out.accepts_kind_of(input) {
            return Err(GraphError::SocketKindMismatch {
                from_socket: from_socket.to_string(),
                from_kind: out.kind.to_string(),
                to_socket: to_socket.to_string(),
                to_kind: input.kind.to_string(),
            });
        }

        if let Some(existing) = self.connections.input(to, to_socket) {
            return Err(GraphError::InputSocketAlreadyConnected {
                node_id: to,
                socket: to_socket.to_string(),
                existing: existing.id,
            });
        }

        if self.scheduler.would_create_cycle(from, to) {
            return Err(GraphError::WouldCreateCycle { from, to });
        }

        Ok(())
    }

    /// Store an already validated connection.
    fn link(&mut self, connection: Connection) -> GraphResult<()> {
        let (from, to) = (connection.from_node, connection.to_node);
        let socket = connection.to_socket.clone();
        self.connections
            .insert(connection)
            .map_err(|existing| GraphError::InputSocketAlreadyConnected {
                node_id: to,
                socket,
                existing,
            })?;
        self.scheduler.add_edge(from, to);
        self.scheduler.mark_dirty(to);
        Ok(())
    }

    /// Remove a connection and mark its target dirty.
    pub fn remove_connection(&mut self, id: ConnectionId) -> GraphResult<Connection> {
        let conn = self
            .connections
            .remove(id)
            .ok_or(GraphError::ConnectionNotFound(id))?;
        self.scheduler.remove_edge(conn.from_node, conn.to_node);
        self.scheduler.mark_dirty(conn.to_node);

        tracing::info!(
            "Removed connection {:?}: {:?} -> {:?}",
            id,
            conn.from_node,
            conn.to_node
        );
        Ok(conn)
    }

    pub fn get_input_connection(&self, node: NodeId, socket: &str) -> Option<&Connection> {
        self.connections.input(node, socket)
    }

    pub fn get_output_connections(&self, node: NodeId, socket: &str) -> Vec<&Connection> {
        self.connections.outputs(node, socket)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    // ==================== Snapshots ====================

    pub fn serialize(&self) -> GraphSnapshot {
        GraphSnapshot {
            version: SNAPSHOT_VERSION,
            nodes: self
                .nodes
                .iter()
                .map(|(&id, entry)| NodeRecord {
                    id,
                    type_id: entry.type_id.clone(),
                    data: entry.node.data(),
                })
                .collect(),
            connections: self.connections.iter().cloned().collect(),
        }
    }

    /// Replace the whole graph with the contents of `snapshot`.
    ///
    /// The snapshot is built into a fresh graph first; on any error the
    /// current graph is left untouched. Identifier counters never move
    /// backwards.
    pub fn apply_snapshot(&mut self, snapshot: &GraphSnapshot) -> GraphResult<()> {
        let mut fresh = Self::from_snapshot(Arc::clone(&self.registry), snapshot)?;

        fresh.next_node_id = fresh.next_node_id.max(self.next_node_id);
        fresh.next_connection_id = fresh.next_connection_id.max(self.next_connection_id);
        fresh.node_messages = std::mem::take(&mut self.node_messages);
        if !self.deferred.is_empty() {
            tracing::debug!(
                "Dropping {} deferred request(s) from the replaced graph",
                self.deferred.len()
            );
        }

        *self = fresh;
        tracing::info!(
            "Applied snapshot: {} node(s), {} connection(s)",
            self.nodes.len(),
            self.connections.len()
        );
        Ok(())
    }

    /// Build a graph from a snapshot, keeping the recorded identifiers.
    pub fn from_snapshot(registry: Arc<NodeRegistry>, snapshot: &GraphSnapshot) -> GraphResult<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GraphError::InvalidSnapshot(format!(
                "unsupported version {}",
                snapshot.version
            )));
        }

        let mut graph = Self::new(registry);

        for record in &snapshot.nodes {
            if graph.nodes.contains_key(&record.id) {
                return Err(GraphError::InvalidSnapshot(format!(
                    "duplicate node id {:?}",
                    record.id
                )));
            }
            let mut node = graph.registry.create(&record.type_id)?;
            if !record.data.is_null() {
                node.set_data(&record.data)
                    .map_err(|e| GraphError::InvalidNodeData {
                        node_id: Some(record.id),
                        cause: flatten_cause(&e),
                    })?;
            }
            graph.insert_node(record.id, &record.type_id, node);
        }

        for conn in &snapshot.connections {
            if graph.connections.get(conn.id).is_some() {
                return Err(GraphError::InvalidSnapshot(format!(
                    "duplicate connection id {:?}",
                    conn.id
                )));
            }
            graph.validate_connection(conn.from_node, &conn.from_socket, conn.to_node, &conn.to_socket)?;
            graph.link(conn.clone())?;
        }

        if let Some(&max) = graph.nodes.keys().next_back() {
            graph.next_node_id = max.next().ok_or_else(|| {
                GraphError::InvalidSnapshot(format!(
                    "node id {:?} leaves no room for new nodes",
                    max
                ))
            })?;
        }
        if let Some(max) = graph.connections.max_id() {
            graph.next_connection_id = max.next().ok_or_else(|| {
                GraphError::InvalidSnapshot(format!(
                    "connection id {:?} leaves no room for new connections",
                    max
                ))
            })?;
        }

        Ok(graph)
    }

    // ==================== Execution ====================

    /// Process every dirty node once, in dependency order.
    pub fn run_once(&mut self) -> Result<RunReport, SchedulerError> {
        let Self {
            nodes,
            connections,
            scheduler,
            ..
        } = self;

        let mut collected: Vec<(NodeId, NodeEffects)> = Vec::new();
        let report = scheduler.run_once(|id| {
            let Some((result, effects)) =
                invoke(nodes, connections, id, |node, ctx| node.process(ctx))
            else {
                tracing::error!("Scheduled node {:?} is not in the graph", id);
                return Err(NodeFailure {
                    node_id: id,
                    cause: "node missing from graph".to_string(),
                });
            };
            collected.push((id, effects));
            result.map_err(|e| NodeFailure {
                node_id: id,
                cause: flatten_cause(&e),
            })
        })?;

        for (id, effects) in collected {
            self.apply_effects(id, effects);
        }

        Ok(report)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.scheduler.is_dirty(id)
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Messages emitted by nodes since the last call.
    pub fn take_node_messages(&mut self) -> Vec<NodeMessage> {
        std::mem::take(&mut self.node_messages)
    }

    /// Structural requests queued by nodes since the last call.
    pub fn take_deferred_requests(&mut self) -> Vec<Request> {
        self.deferred.drain(..).collect()
    }

    fn apply_effects(&mut self, id: NodeId, effects: NodeEffects) {
        self.node_messages
            .extend(effects.messages.into_iter().map(|payload| NodeMessage {
                node_id: id,
                payload,
            }));
        if effects.mark_dirty && self.nodes.contains_key(&id) {
            self.scheduler.mark_dirty(id);
        }
        self.deferred.extend(effects.requests);
    }
}

/// Call into a node with a context borrowing the rest of the graph.
///
/// The entry is taken out of the map for the duration of the call and put
/// back afterwards. Returns `None` if the node does not exist.
fn invoke<R>(
    nodes: &mut BTreeMap<NodeId, NodeEntry>,
    connections: &ConnectionTable,
    id: NodeId,
    f: impl FnOnce(&mut dyn Node, &mut NodeContext<'_>) -> R,
) -> Option<(R, NodeEffects)> {
    let mut entry = nodes.remove(&id)?;
    let mut effects = NodeEffects::default();
    let result = {
        let view = GraphView {
            nodes: &*nodes,
            connections,
        };
        let mut ctx = NodeContext::new(id, view, &mut entry.outputs, &mut effects);
        f(entry.node.as_mut(), &mut ctx)
    };
    nodes.insert(id, entry);
    Some((result, effects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::ProcessStatus;
    use crate::graph::socket::{kinds, SocketDescriptor};
    use serde_json::json;

    /// Copies its input to its output, or emits `seed` when unconnected.
    struct Relay {
        seed: f64,
    }

    impl Node for Relay {
        fn process(&mut self, ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
            let v = ctx.input_f64("in")?.unwrap_or(self.seed);
            ctx.set_output("out", json!(v));
            Ok(ProcessStatus::Ready)
        }

        fn data(&self) -> Value {
            json!(self.seed)
        }

        fn set_data(&mut self, data: &Value) -> anyhow::Result<()> {
            self.seed = data
                .as_f64()
                .ok_or_else(|| anyhow::anyhow!("seed must be a number"))?;
            Ok(())
        }
    }

    fn registry() -> Arc<NodeRegistry> {
        let mut r = NodeRegistry::new();
        r.register(
            "relay",
            || Box::new(Relay { seed: 0.0 }),
            vec![
                SocketDescriptor::input("in", kinds::NUMBER),
                SocketDescriptor::output("out", kinds::NUMBER),
            ],
        )
        .unwrap();
        r.register(
            "text",
            || Box::new(Relay { seed: 0.0 }),
            vec![
                SocketDescriptor::input("in", kinds::STRING),
                SocketDescriptor::output("out", kinds::STRING),
            ],
        )
        .unwrap();
        Arc::new(r)
    }

    #[test]
    fn test_add_node_assigns_increasing_ids() {
        let mut g = NodeGraph::new(registry());
        let a = g.add_node("relay", None).unwrap();
        let b = g.add_node("relay", None).unwrap();
        assert!(a < b);
        g.remove_node(b).unwrap();
        let c = g.add_node("relay", None).unwrap();
        assert!(c > b);
    }

    #[test]
    fn test_add_node_rejects_bad_data() {
        let mut g = NodeGraph::new(registry());
        let err = g.add_node("relay", Some(&json!("nope"))).unwrap_err();
        assert!(matches!(err, GraphError::InvalidNodeData { .. }));
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn test_connection_validation_order() {
        let mut g = NodeGraph::new(registry());
        let a = g.add_node("relay", None).unwrap();
        let b = g.add_node("relay", None).unwrap();
        let t = g.add_node("text", None).unwrap();

        assert_eq!(
            g.add_connection(a, "out", NodeId(99), "in").unwrap_err(),
            GraphError::NodeNotFound(NodeId(99))
        );
        // Input name used as output
        assert!(matches!(
            g.add_connection(a, "in", b, "in").unwrap_err(),
            GraphError::SocketNotFound {
                direction: SocketDirection::Output,
                ..
            }
        ));
        assert!(matches!(
            g.add_connection(a, "out", t, "in").unwrap_err(),
            GraphError::SocketKindMismatch { .. }
        ));
        assert!(matches!(
            g.add_connection(a, "out", a, "in").unwrap_err(),
            GraphError::WouldCreateCycle { .. }
        ));

        let c = g.add_connection(a, "out", b, "in").unwrap();
        match g.add_connection(a, "out", b, "in").unwrap_err() {
            GraphError::InputSocketAlreadyConnected { existing, .. } => assert_eq!(existing, c),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            g.add_connection(b, "out", a, "in").unwrap_err(),
            GraphError::WouldCreateCycle { .. }
        ));
        assert_eq!(g.connections().count(), 1);
    }

    #[test]
    fn test_values_flow_through_connections() {
        let mut g = NodeGraph::new(registry());
        let a = g.add_node("relay", Some(&json!(4.0))).unwrap();
        let b = g.add_node("relay", None).unwrap();
        g.add_connection(a, "out", b, "in").unwrap();

        let report = g.run_once().unwrap();
        assert_eq!(report.executed, vec![a, b]);
        assert_eq!(g.output(b, "out"), Some(&json!(4.0)));
        assert!(g.run_once().unwrap().is_idle());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut g = NodeGraph::new(registry());
        let a = g.add_node("relay", None).unwrap();
        let b = g.add_node("relay", None).unwrap();
        let c = g.add_node("relay", None).unwrap();
        g.add_connection(a, "out", b, "in").unwrap();
        g.add_connection(b, "out", c, "in").unwrap();
        g.run_once().unwrap();

        let removed = g.remove_node(b).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(g.connections().next().is_none());
        assert!(g.is_dirty(c));
        assert!(!g.is_dirty(a));
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_ids() {
        let mut g = NodeGraph::new(registry());
        let a = g.add_node("relay", Some(&json!(2.0))).unwrap();
        let b = g.add_node("relay", None).unwrap();
        g.add_connection(a, "out", b, "in").unwrap();
        let snap = g.serialize();

        let mut other = NodeGraph::new(registry());
        other.apply_snapshot(&snap).unwrap();
        assert_eq!(other.serialize(), snap);
        let next = other.add_node("relay", None).unwrap();
        assert!(next > b);
    }

    #[test]
    fn test_snapshot_with_max_ids_is_rejected() {
        let mut g = NodeGraph::new(registry());
        g.add_node("relay", None).unwrap();
        let before = g.serialize();

        let mut snap = GraphSnapshot::default();
        snap.nodes.push(NodeRecord {
            id: NodeId(u32::MAX),
            type_id: "relay".into(),
            data: Value::Null,
        });
        assert!(matches!(
            g.apply_snapshot(&snap).unwrap_err(),
            GraphError::InvalidSnapshot(_)
        ));

        let mut snap = GraphSnapshot::default();
        for id in [1, 2] {
            snap.nodes.push(NodeRecord {
                id: NodeId(id),
                type_id: "relay".into(),
                data: Value::Null,
            });
        }
        snap.connections.push(Connection {
            id: ConnectionId(u32::MAX),
            from_node: NodeId(1),
            from_socket: "out".into(),
            to_node: NodeId(2),
            to_socket: "in".into(),
        });
        assert!(matches!(
            g.apply_snapshot(&snap).unwrap_err(),
            GraphError::InvalidSnapshot(_)
        ));
        assert_eq!(g.serialize(), before);
    }

    #[test]
    fn test_exhausted_counters_refuse_new_ids() {
        let mut snap = GraphSnapshot::default();
        for id in [1, u32::MAX - 1] {
            snap.nodes.push(NodeRecord {
                id: NodeId(id),
                type_id: "relay".into(),
                data: Value::Null,
            });
        }
        snap.connections.push(Connection {
            id: ConnectionId(u32::MAX - 1),
            from_node: NodeId(1),
            from_socket: "out".into(),
            to_node: NodeId(u32::MAX - 1),
            to_socket: "in".into(),
        });
        let mut g = NodeGraph::from_snapshot(registry(), &snap).unwrap();

        assert_eq!(
            g.add_node("relay", None).unwrap_err(),
            GraphError::IdsExhausted("node")
        );
        assert_eq!(g.node_count(), 2);

        g.remove_connection(ConnectionId(u32::MAX - 1)).unwrap();
        assert_eq!(
            g.add_connection(NodeId(1), "out", NodeId(u32::MAX - 1), "in")
                .unwrap_err(),
            GraphError::IdsExhausted("connection")
        );
        assert!(g.connections().next().is_none());
    }

    #[test]
    fn test_invalid_snapshot_leaves_graph_untouched() {
        let mut g = NodeGraph::new(registry());
        let a = g.add_node("relay", None).unwrap();
        let before = g.serialize();

        let mut snap = before.clone();
        snap.nodes.push(snap.nodes[0].clone());
        assert!(matches!(
            g.apply_snapshot(&snap).unwrap_err(),
            GraphError::InvalidSnapshot(_)
        ));
        assert_eq!(g.serialize(), before);
        assert!(g.contains_node(a));
    }
}
