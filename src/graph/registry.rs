//! Node type registry.
//!
//! Maps a node-type identifier to a factory and to metadata describing the
//! type's sockets. The registry is populated at startup and shared read-only
//! (behind an `Arc`) with every graph built from it.

use crate::graph::error::{GraphError, GraphResult};
use crate::graph::node::Node;
use crate::graph::socket::{SocketDescriptor, SocketDirection};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Constructs a fresh node instance.
pub type NodeFactory = Arc<dyn Fn() -> Box<dyn Node> + Send + Sync>;

/// Factory for node types constructed through `Default`.
pub fn default_factory<N: Node + Default + 'static>() -> NodeFactory {
    Arc::new(|| -> Box<dyn Node> { Box::new(N::default()) })
}

/// Metadata for a registered node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeInfo {
    pub type_id: String,
    pub display_name: String,
    pub description: String,
    pub sockets: Vec<SocketDescriptor>,
}

impl NodeTypeInfo {
    pub fn new(type_id: impl Into<String>, sockets: Vec<SocketDescriptor>) -> Self {
        let type_id = type_id.into();
        Self {
            display_name: type_id.clone(),
            type_id,
            description: String::new(),
            sockets,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Look up a socket by name and direction.
    pub fn socket(&self, name: &str, direction: SocketDirection) -> Option<&SocketDescriptor> {
        self.sockets
            .iter()
            .find(|s| s.direction == direction && s.name == name)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &SocketDescriptor> {
        self.sockets.iter().filter(|s| s.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &SocketDescriptor> {
        self.sockets.iter().filter(|s| s.is_output())
    }
}

struct RegisteredType {
    info: NodeTypeInfo,
    factory: NodeFactory,
}

/// Registry of node types, keyed by type identifier.
#[derive(Default)]
pub struct NodeRegistry {
    types: BTreeMap<String, RegisteredType>,
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type with its sockets. Re-registering a type id
    /// replaces the previous entry.
    pub fn register<F>(
        &mut self,
        type_id: impl Into<String>,
        factory: F,
        sockets: Vec<SocketDescriptor>,
    ) -> GraphResult<()>
    where
        F: Fn() -> Box<dyn Node> + Send + Sync + 'static,
    {
        self.register_type(NodeTypeInfo::new(type_id, sockets), Arc::new(factory))
    }

    /// Register a node type with full metadata.
    pub fn register_type(&mut self, info: NodeTypeInfo, factory: NodeFactory) -> GraphResult<()> {
        let mut seen = HashSet::new();
        for socket in &info.sockets {
            if !seen.insert((socket.direction, &*socket.name)) {
                return Err(GraphError::DuplicateSocket {
                    type_id: info.type_id.clone(),
                    socket: socket.name.to_string(),
                    direction: socket.direction,
                });
            }
        }

        if self.types.contains_key(&info.type_id) {
            tracing::warn!("Replacing registered node type '{}'", info.type_id);
        } else {
            tracing::debug!("Registered node type '{}'", info.type_id);
        }
        self.types
            .insert(info.type_id.clone(), RegisteredType { info, factory });
        Ok(())
    }

    /// Construct a new instance of `type_id`.
    pub fn create(&self, type_id: &str) -> GraphResult<Box<dyn Node>> {
        self.types
            .get(type_id)
            .map(|t| (t.factory)())
            .ok_or_else(|| GraphError::UnknownNodeType(type_id.to_string()))
    }

    pub fn info(&self, type_id: &str) -> Option<&NodeTypeInfo> {
        self.types.get(type_id).map(|t| &t.info)
    }

    pub fn socket(
        &self,
        type_id: &str,
        name: &str,
        direction: SocketDirection,
    ) -> Option<&SocketDescriptor> {
        self.info(type_id)?.socket(name, direction)
    }

    /// All registered types, ordered by type id.
    pub fn types(&self) -> impl Iterator<Item = &NodeTypeInfo> {
        self.types.values().map(|t| &t.info)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
