//! Serializable description of a whole graph.
//!
//! A snapshot records every node (id, type, persistent data) and every
//! connection. Applying a snapshot rebuilds an equivalent graph with the same
//! identifiers; node outputs are not recorded and are recomputed on the next
//! pass.

use crate::error::{NodeGraphError, Result};
use crate::graph::connection::Connection;
use crate::graph::id::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub type_id: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Default for GraphSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }
}

impl GraphSnapshot {
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Load a snapshot file (JSON).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeGraphError::Io(e).with_context(format!("reading snapshot {:?}", path)))?;

        serde_json::from_str(&content).map_err(|e| {
            NodeGraphError::Serialization(format!("Failed to parse snapshot {:?}: {}", path, e))
        })
    }

    /// Save as pretty-printed JSON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| {
            NodeGraphError::Serialization(format!("Failed to serialize snapshot: {}", e))
        })?;
        std::fs::write(path, content)?;
        tracing::info!("Saved snapshot to {:?}", path);
        Ok(())
    }
}
