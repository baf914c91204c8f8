//! Graph-specific error types.

use crate::graph::id::{ConnectionId, NodeId};
use crate::graph::socket::SocketDirection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by structural operations and node calls on a `NodeGraph`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("Node {0:?} not found")]
    NodeNotFound(NodeId),

    #[error("Connection {0:?} not found")]
    ConnectionNotFound(ConnectionId),

    #[error("Node {node_id:?} has no {direction} socket named '{socket}'")]
    SocketNotFound {
        node_id: NodeId,
        socket: String,
        direction: SocketDirection,
    },

    #[error("Socket kind mismatch: output '{from_socket}' is '{from_kind}', input '{to_socket}' is '{to_kind}'")]
    SocketKindMismatch {
        from_socket: String,
        from_kind: String,
        to_socket: String,
        to_kind: String,
    },

    #[error("Input '{socket}' of node {node_id:?} is already connected by {existing:?}")]
    InputSocketAlreadyConnected {
        node_id: NodeId,
        socket: String,
        existing: ConnectionId,
    },

    #[error("Connecting {from:?} -> {to:?} would create a cycle")]
    WouldCreateCycle { from: NodeId, to: NodeId },

    #[error("Node {node_id:?} failed to process: {cause}")]
    NodeProcessFailed { node_id: NodeId, cause: String },

    #[error("Node {node_id:?} rejected its data: {cause}")]
    InvalidNodeData { node_id: Option<NodeId>, cause: String },

    #[error("Node {node_id:?} failed to handle message: {cause}")]
    NodeMessageFailed { node_id: NodeId, cause: String },

    #[error("Node type '{type_id}' declares {direction} socket '{socket}' twice")]
    DuplicateSocket {
        type_id: String,
        socket: String,
        direction: SocketDirection,
    },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("No {0} identifiers left")]
    IdsExhausted(&'static str),
}

impl GraphError {
    /// The stable wire name of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::UnknownNodeType(_) => ErrorKind::UnknownNodeType,
            GraphError::NodeNotFound(_) => ErrorKind::NodeNotFound,
            GraphError::ConnectionNotFound(_) => ErrorKind::ConnectionNotFound,
            GraphError::SocketNotFound { .. } => ErrorKind::SocketNotFound,
            GraphError::SocketKindMismatch { .. } => ErrorKind::SocketKindMismatch,
            GraphError::InputSocketAlreadyConnected { .. } => {
                ErrorKind::InputSocketAlreadyConnected
            }
            GraphError::WouldCreateCycle { .. } => ErrorKind::WouldCreateCycle,
            GraphError::NodeProcessFailed { .. } => ErrorKind::NodeProcessFailed,
            GraphError::InvalidNodeData { .. } => ErrorKind::InvalidNodeData,
            GraphError::NodeMessageFailed { .. } => ErrorKind::NodeMessageFailed,
            GraphError::DuplicateSocket { .. } => ErrorKind::DuplicateSocket,
            GraphError::InvalidSnapshot(_) => ErrorKind::InvalidSnapshot,
            GraphError::IdsExhausted(_) => ErrorKind::IdsExhausted,
        }
    }
}

/// Errors raised by the scheduler while ordering a pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Ordering could not consume every dirty node. Only reachable if the
    /// acyclicity check at connection time was bypassed.
    #[error("Cycle detected among nodes {0:?}")]
    CycleDetected(Vec<NodeId>),
}

/// Wire names of every error the engine can report to the remote editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownNodeType,
    NodeNotFound,
    ConnectionNotFound,
    SocketNotFound,
    SocketKindMismatch,
    InputSocketAlreadyConnected,
    WouldCreateCycle,
    NodeProcessFailed,
    InvalidNodeData,
    NodeMessageFailed,
    DuplicateSocket,
    InvalidSnapshot,
    IdsExhausted,
    CycleDetected,
    MalformedMessage,
}

impl From<&SchedulerError> for ErrorKind {
    fn from(err: &SchedulerError) -> Self {
        match err {
            SchedulerError::CycleDetected(_) => ErrorKind::CycleDetected,
        }
    }
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Flatten an `anyhow` chain into a single line (`outer: inner: root`).
pub(crate) fn flatten_cause(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
