//! Identity types for the node graph.
//!
//! Both IDs are newtypes over `u32` handed out by the owning `NodeGraph` from
//! monotonically increasing counters. An ID is never reused within a graph,
//! so a stale ID held by the remote editor resolves to `NodeNotFound` /
//! `ConnectionNotFound` instead of silently addressing a different object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node inside a `NodeGraph`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The ID following this one, or `None` at `u32::MAX`.
    #[inline]
    pub fn next(self) -> Option<NodeId> {
        self.0.checked_add(1).map(NodeId)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifier of a connection inside a `NodeGraph`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u32);

impl ConnectionId {
    #[inline]
    pub fn next(self) -> Option<ConnectionId> {
        self.0.checked_add(1).map(ConnectionId)
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
