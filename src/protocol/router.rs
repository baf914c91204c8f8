//! Translation between wire messages and graph operations.
//!
//! The router holds no state of its own. Each inbound request is applied to
//! the graph it is handed and produces the outbound replies for that request:
//! exactly one `GraphChanged` or one `Error` for structural requests, nothing
//! or one `Error` for `NodeData`.

use crate::graph::error::{ErrorKind, GraphError, SchedulerError};
use crate::graph::graph::NodeGraph;
use crate::graph::id::{ConnectionId, NodeId};
use crate::graph::scheduler::NodeFailure;
use crate::protocol::message::{GraphChange, InboundEnvelope, OutboundMessage, Request};
use thiserror::Error;

/// Longest prefix of an undecodable message echoed back in the error.
const MALFORMED_ECHO_LIMIT: usize = 256;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Why a request was refused.
struct Rejection {
    kind: ErrorKind,
    message: String,
}

impl From<GraphError> for Rejection {
    fn from(err: GraphError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageRouter;

impl MessageRouter {
    pub fn decode(text: &str) -> Result<InboundEnvelope, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }

    pub fn encode(message: &OutboundMessage) -> Result<String, ProtocolError> {
        serde_json::to_string(message).map_err(ProtocolError::Encode)
    }

    /// Apply one inbound request to `graph` and return the replies.
    pub fn route(graph: &mut NodeGraph, envelope: InboundEnvelope) -> Vec<OutboundMessage> {
        let InboundEnvelope {
            request_id,
            request,
        } = envelope;
        tracing::debug!("Routing {} (request {:?})", request.kind_name(), request_id);

        match Self::apply(graph, request_id, &request) {
            Ok(Some(reply)) => vec![reply],
            Ok(None) => Vec::new(),
            Err(rejection) => {
                tracing::warn!(
                    "Rejected {} request: {}",
                    request.kind_name(),
                    rejection.message
                );
                vec![OutboundMessage::Error {
                    request_id,
                    error: rejection.kind,
                    message: rejection.message,
                    request: Some(request),
                }]
            }
        }
    }

    fn apply(
        graph: &mut NodeGraph,
        request_id: Option<u64>,
        request: &Request,
    ) -> Result<Option<OutboundMessage>, Rejection> {
        let changed =
            |change: GraphChange| Some(OutboundMessage::GraphChanged { request_id, change });

        match request {
            Request::CreateNode { type_id, data } => {
                let node_id = graph.add_node(type_id, data.as_ref())?;
                Ok(changed(GraphChange::NodeAdded {
                    node_id,
                    type_id: type_id.clone(),
                }))
            }
            Request::RemoveNode { node_id } => {
                let removed = graph.remove_node(*node_id)?;
                Ok(changed(GraphChange::NodeRemoved {
                    node_id: *node_id,
                    connections: removed.into_iter().map(|c| c.id).collect(),
                }))
            }
            Request::CreateConnection {
                from_node_id,
                from_socket,
                to_node_id,
                to_socket,
            } => {
                let id =
                    graph.add_connection(*from_node_id, from_socket, *to_node_id, to_socket)?;
                let connection = graph
                    .connection(id)
                    .cloned()
                    .ok_or(GraphError::ConnectionNotFound(id))?;
                Ok(changed(GraphChange::ConnectionAdded { connection }))
            }
            Request::RemoveConnection {
                connection_id,
                to_node_id,
                to_socket,
            } => {
                let id = Self::resolve_connection(
                    graph,
                    *connection_id,
                    *to_node_id,
                    to_socket.as_deref(),
                )?;
                let connection = graph.remove_connection(id)?;
                Ok(changed(GraphChange::ConnectionRemoved { connection }))
            }
            Request::NodeData { node_id, data } => {
                graph.send_message(*node_id, data)?;
                Ok(None)
            }
            Request::RequestSnapshot => Ok(changed(GraphChange::Snapshot {
                snapshot: graph.serialize(),
            })),
            Request::ApplySnapshot { snapshot } => {
                graph.apply_snapshot(snapshot)?;
                Ok(changed(GraphChange::Snapshot {
                    snapshot: graph.serialize(),
                }))
            }
            Request::RequestCatalog => Ok(Some(OutboundMessage::Catalog {
                request_id,
                node_types: graph.registry().types().cloned().collect(),
            })),
        }
    }

    fn resolve_connection(
        graph: &NodeGraph,
        connection_id: Option<ConnectionId>,
        to_node_id: Option<NodeId>,
        to_socket: Option<&str>,
    ) -> Result<ConnectionId, Rejection> {
        match (connection_id, to_node_id, to_socket) {
            (Some(id), _, _) => Ok(id),
            (None, Some(node), Some(socket)) => {
                if !graph.contains_node(node) {
                    return Err(GraphError::NodeNotFound(node).into());
                }
                graph
                    .get_input_connection(node, socket)
                    .map(|c| c.id)
                    .ok_or_else(|| Rejection {
                        kind: ErrorKind::ConnectionNotFound,
                        message: format!("No connection into input '{}' of {:?}", socket, node),
                    })
            }
            _ => Err(Rejection {
                kind: ErrorKind::MalformedMessage,
                message: "RemoveConnection needs connectionId or toNodeId and toSocket"
                    .to_string(),
            }),
        }
    }

    /// Wrap messages nodes emitted since the last drain.
    pub fn node_messages(graph: &mut NodeGraph) -> Vec<OutboundMessage> {
        graph
            .take_node_messages()
            .into_iter()
            .map(|m| OutboundMessage::NodeMessage {
                node_id: m.node_id,
                data: m.payload,
            })
            .collect()
    }

    pub fn node_failure(failure: &NodeFailure) -> OutboundMessage {
        let err = GraphError::NodeProcessFailed {
            node_id: failure.node_id,
            cause: failure.cause.clone(),
        };
        OutboundMessage::Error {
            request_id: None,
            error: err.kind(),
            message: err.to_string(),
            request: None,
        }
    }

    pub fn scheduler_error(err: &SchedulerError) -> OutboundMessage {
        OutboundMessage::Error {
            request_id: None,
            error: ErrorKind::from(err),
            message: err.to_string(),
            request: None,
        }
    }

    /// Reply to text that could not be decoded.
    pub fn malformed(raw: &str, reason: &str) -> OutboundMessage {
        let echo: String = raw.chars().take(MALFORMED_ECHO_LIMIT).collect();
        OutboundMessage::Error {
            request_id: None,
            error: ErrorKind::MalformedMessage,
            message: format!("{} (input: {})", reason, echo),
            request: None,
        }
    }
}
