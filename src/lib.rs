//! # nodegraph-rs: Live-Editable Node Graph Engine
//!
//! Plugin authors register node types (typed sockets plus a factory) and a
//! remote editor assembles them into a graph, live. The engine keeps the graph
//! structurally valid under concurrent edits and re-executes only what changed.
//!
//! ## Architecture
//!
//! - **Graph**: `NodeGraph` owns nodes and connections; `Scheduler` tracks
//!   dirty nodes and orders them topologically
//! - **Protocol**: JSON wire messages and the stateless `MessageRouter`
//! - **Engine**: the engine thread's tick loop, fed through an `EngineBridge`
//! - **Communication**: Crossbeam channels between I/O threads and the engine
//!
//! ## Example
//!
//! ```ignore
//! use nodegraph_rs::{graph::{NodeGraph, NodeRegistry}, nodes::register_builtin_nodes};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mut registry = NodeRegistry::new();
//! register_builtin_nodes(&mut registry)?;
//! let mut graph = NodeGraph::new(Arc::new(registry));
//!
//! let a = graph.add_node("constant", Some(&json!(5)))?;
//! let b = graph.add_node("double", None)?;
//! graph.add_connection(a, "value", b, "value")?;
//! graph.run_once()?;
//! assert_eq!(graph.output(b, "value"), Some(&json!(10.0)));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod protocol;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{Engine, EngineBridge, EngineCommand};
pub use error::{NodeGraphError, Result};
pub use graph::{
    Connection, ConnectionId, GraphError, GraphSnapshot, Node, NodeContext, NodeGraph, NodeId,
    NodeRegistry, ProcessStatus, SocketDescriptor,
};
pub use protocol::{InboundEnvelope, MessageRouter, OutboundMessage, Request};
