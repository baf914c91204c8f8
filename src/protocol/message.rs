//! Wire messages exchanged with the remote editor.
//!
//! Every message is a JSON object tagged by `kind` with camelCase fields.
//! Inbound messages may carry a `requestId`; replies echo it back so the
//! editor can correlate `GraphChanged` / `Error` with the request that caused
//! them.

use crate::graph::connection::Connection;
use crate::graph::error::ErrorKind;
use crate::graph::id::{ConnectionId, NodeId};
use crate::graph::registry::NodeTypeInfo;
use crate::graph::snapshot::GraphSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests the remote editor (or a node, via `NodeContext::request`) can make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Request {
    CreateNode {
        type_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    RemoveNode {
        node_id: NodeId,
    },
    CreateConnection {
        from_node_id: NodeId,
        from_socket: String,
        to_node_id: NodeId,
        to_socket: String,
    },
    /// Either `connection_id`, or `to_node_id` + `to_socket` (an input has at
    /// most one incoming connection, so the target identifies it).
    RemoveConnection {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        connection_id: Option<ConnectionId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_node_id: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_socket: Option<String>,
    },
    /// Delivered to the node's `on_message`.
    NodeData {
        node_id: NodeId,
        data: Value,
    },
    RequestSnapshot,
    ApplySnapshot {
        snapshot: GraphSnapshot,
    },
    RequestCatalog,
}

impl Request {
    /// Whether this request changes graph structure (and therefore always
    /// gets exactly one `GraphChanged` or `Error` reply).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Request::CreateNode { .. }
                | Request::RemoveNode { .. }
                | Request::CreateConnection { .. }
                | Request::RemoveConnection { .. }
                | Request::ApplySnapshot { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Request::CreateNode { .. } => "CreateNode",
            Request::RemoveNode { .. } => "RemoveNode",
            Request::CreateConnection { .. } => "CreateConnection",
            Request::RemoveConnection { .. } => "RemoveConnection",
            Request::NodeData { .. } => "NodeData",
            Request::RequestSnapshot => "RequestSnapshot",
            Request::ApplySnapshot { .. } => "ApplySnapshot",
            Request::RequestCatalog => "RequestCatalog",
        }
    }
}

/// An inbound request plus its optional correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(flatten)]
    pub request: Request,
}

impl InboundEnvelope {
    pub fn new(request: Request) -> Self {
        Self {
            request_id: None,
            request,
        }
    }

    pub fn with_id(request_id: u64, request: Request) -> Self {
        Self {
            request_id: Some(request_id),
            request,
        }
    }
}

impl From<Request> for InboundEnvelope {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}

/// Structural change reported in `GraphChanged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum GraphChange {
    NodeAdded {
        node_id: NodeId,
        type_id: String,
    },
    NodeRemoved {
        node_id: NodeId,
        /// Connections removed along with the node.
        connections: Vec<ConnectionId>,
    },
    ConnectionAdded {
        connection: Connection,
    },
    ConnectionRemoved {
        connection: Connection,
    },
    Snapshot {
        snapshot: GraphSnapshot,
    },
}

/// Messages sent to the remote editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    GraphChanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        change: GraphChange,
    },
    NodeMessage {
        node_id: NodeId,
        data: Value,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        error: ErrorKind,
        message: String,
        /// The request that failed, when there is one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request: Option<Request>,
    },
    Catalog {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
        node_types: Vec<NodeTypeInfo>,
    },
}

impl OutboundMessage {
    pub fn is_error(&self) -> bool {
        matches!(self, OutboundMessage::Error { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            OutboundMessage::Error { error, .. } => Some(*error),
            _ => None,
        }
    }
}
