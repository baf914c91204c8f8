//! Connections between node sockets.

use crate::graph::id::{ConnectionId, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A directed edge from an output socket to an input socket.
///
/// Connections carry no data; values are read by the consumer through its
/// `NodeContext` from the producer's stored outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    #[serde(rename = "fromNodeId")]
    pub from_node: NodeId,
    pub from_socket: String,
    #[serde(rename = "toNodeId")]
    pub to_node: NodeId,
    pub to_socket: String,
}

impl Connection {
    /// Whether either endpoint is `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from_node == node || self.to_node == node
    }
}

/// Connections indexed by id, by target input, by source output and by node.
///
/// The input index enforces the single-source rule: at most one connection
/// per `(to_node, to_socket)`.
#[derive(Debug, Default, Clone)]
pub struct ConnectionTable {
    by_id: BTreeMap<ConnectionId, Connection>,
    by_input: HashMap<(NodeId, String), ConnectionId>,
    by_output: HashMap<(NodeId, String), BTreeSet<ConnectionId>>,
    by_node: HashMap<NodeId, BTreeSet<ConnectionId>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection. The caller has already validated it; returns the
    /// id of an existing connection on the same input if there is one, in
    /// which case nothing is inserted.
    pub fn insert(&mut self, connection: Connection) -> Result<(), ConnectionId> {
        let key = (connection.to_node, connection.to_socket.clone());
        if let Some(existing) = self.by_input.get(&key) {
            return Err(*existing);
        }
        let id = connection.id;
        self.by_input.insert(key, id);
        self.by_output
            .entry((connection.from_node, connection.from_socket.clone()))
            .or_default()
            .insert(id);
        self.by_node.entry(connection.from_node).or_default().insert(id);
        self.by_node.entry(connection.to_node).or_default().insert(id);
        self.by_id.insert(id, connection);
        Ok(())
    }

    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        let connection = self.by_id.remove(&id)?;
        self.by_input
            .remove(&(connection.to_node, connection.to_socket.clone()));

        let out_key = (connection.from_node, connection.from_socket.clone());
        if let Some(ids) = self.by_output.get_mut(&out_key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_output.remove(&out_key);
            }
        }
        for node in [connection.from_node, connection.to_node] {
            if let Some(ids) = self.by_node.get_mut(&node) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.by_node.remove(&node);
                }
            }
        }
        Some(connection)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.by_id.get(&id)
    }

    /// The connection feeding input `socket` of `node`, if any.
    pub fn input(&self, node: NodeId, socket: &str) -> Option<&Connection> {
        self.by_input
            .get(&(node, socket.to_string()))
            .and_then(|id| self.by_id.get(id))
    }

    /// All connections leaving output `socket` of `node`, in id order.
    pub fn outputs(&self, node: NodeId, socket: &str) -> Vec<&Connection> {
        self.by_output
            .get(&(node, socket.to_string()))
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }

    /// Ids of every connection with `node` as an endpoint, in id order.
    pub fn touching(&self, node: NodeId) -> Vec<ConnectionId> {
        self.by_node
            .get(&node)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn max_id(&self) -> Option<ConnectionId> {
        self.by_id.keys().next_back().copied()
    }
}
