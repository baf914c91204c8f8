//! Node graph data model and scheduling.
//!
//! - [`NodeRegistry`] maps node-type ids to factories and socket metadata.
//! - [`NodeGraph`] owns nodes and connections and enforces the structural
//!   invariants (endpoints exist, one source per input, no cycles).
//! - [`Scheduler`] tracks dirtiness and decides execution order.

pub mod connection;
pub mod error;
#[allow(clippy::module_inception)]
pub mod graph;
pub mod id;
pub mod node;
pub mod registry;
pub mod scheduler;
pub mod snapshot;
pub mod socket;

pub use connection::{Connection, ConnectionTable};
pub use error::{ErrorKind, GraphError, GraphResult, SchedulerError};
pub use graph::NodeGraph;
pub use id::{ConnectionId, NodeId};
pub use node::{GraphView, Node, NodeContext, NodeMessage, ProcessStatus};
pub use registry::{default_factory, NodeFactory, NodeRegistry, NodeTypeInfo};
pub use scheduler::{NodeFailure, RunReport, Scheduler};
pub use snapshot::{GraphSnapshot, NodeRecord};
pub use socket::{kinds, SocketDescriptor, SocketDirection};
