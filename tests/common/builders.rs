//! Test node types and graph builders

use nodegraph_rs::graph::{
    kinds, NodeContext, NodeGraph, NodeId, NodeRegistry, ProcessStatus, SocketDescriptor,
};
use nodegraph_rs::nodes::register_builtin_nodes;
use nodegraph_rs::Node;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared switches and the execution log, visible to every test node.
#[derive(Clone, Default)]
pub struct Controls {
    log: Arc<Mutex<Vec<NodeId>>>,
    fail: Arc<AtomicBool>,
    hold: Arc<AtomicBool>,
}

impl Controls {
    /// Nodes processed since the last call, in order.
    pub fn take_executed(&self) -> Vec<NodeId> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// While held, `pending` nodes report `Pending`.
    pub fn set_holding(&self, hold: bool) {
        self.hold.store(hold, Ordering::SeqCst);
    }

    fn record(&self, id: NodeId) {
        self.log.lock().unwrap().push(id);
    }
}

/// Sums inputs `a` and `b` (missing reads as 0) plus one, and logs each run.
pub struct RecordingNode {
    controls: Controls,
}

impl Node for RecordingNode {
    fn process(&mut self, ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
        self.controls.record(ctx.node_id());
        let a = ctx.input_f64("a")?.unwrap_or(0.0);
        let b = ctx.input_f64("b")?.unwrap_or(0.0);
        ctx.set_output("out", json!(a + b + 1.0));
        Ok(ProcessStatus::Ready)
    }
}

/// Fails while `Controls::set_failing(true)` is in effect.
pub struct FlakyNode {
    controls: Controls,
}

impl Node for FlakyNode {
    fn process(&mut self, ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
        self.controls.record(ctx.node_id());
        if self.controls.fail.load(Ordering::SeqCst) {
            anyhow::bail!("injected failure");
        }
        ctx.set_output("out", json!(1.0));
        Ok(ProcessStatus::Ready)
    }
}

/// Reports `Pending` while `Controls::set_holding(true)` is in effect.
pub struct PendingNode {
    controls: Controls,
}

impl Node for PendingNode {
    fn process(&mut self, ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
        self.controls.record(ctx.node_id());
        if self.controls.hold.load(Ordering::SeqCst) {
            return Ok(ProcessStatus::Pending);
        }
        ctx.set_output("out", json!(1.0));
        Ok(ProcessStatus::Ready)
    }
}

/// A node with only string sockets, for kind-mismatch checks.
pub struct TextNode;

impl Node for TextNode {}

fn number_sockets() -> Vec<SocketDescriptor> {
    vec![
        SocketDescriptor::input("a", kinds::NUMBER),
        SocketDescriptor::input("b", kinds::NUMBER),
        SocketDescriptor::output("out", kinds::NUMBER),
    ]
}

/// Registry with the built-in nodes plus `record`, `flaky`, `pending` and `text`.
pub fn test_registry(controls: &Controls) -> Arc<NodeRegistry> {
    let mut registry = NodeRegistry::new();
    register_builtin_nodes(&mut registry).unwrap();

    let c = controls.clone();
    registry
        .register(
            "record",
            move || Box::new(RecordingNode { controls: c.clone() }),
            number_sockets(),
        )
        .unwrap();
    let c = controls.clone();
    registry
        .register(
            "flaky",
            move || Box::new(FlakyNode { controls: c.clone() }),
            number_sockets(),
        )
        .unwrap();
    let c = controls.clone();
    registry
        .register(
            "pending",
            move || Box::new(PendingNode { controls: c.clone() }),
            number_sockets(),
        )
        .unwrap();
    registry
        .register(
            "text",
            || Box::new(TextNode),
            vec![
                SocketDescriptor::input("text", kinds::STRING),
                SocketDescriptor::output("text", kinds::STRING),
            ],
        )
        .unwrap();

    Arc::new(registry)
}

/// Builder for creating test graphs
pub struct GraphBuilder {
    graph: NodeGraph,
    controls: Controls,
}

impl GraphBuilder {
    pub fn new() -> Self {
        let controls = Controls::default();
        Self {
            graph: NodeGraph::new(test_registry(&controls)),
            controls,
        }
    }

    /// Add a node, returning its id.
    pub fn node(&mut self, type_id: &str) -> NodeId {
        self.graph.add_node(type_id, None).unwrap()
    }

    /// Connect `from.out` to input `socket` of `to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId, socket: &str) -> &mut Self {
        self.graph.add_connection(from, "out", to, socket).unwrap();
        self
    }

    pub fn build(self) -> (NodeGraph, Controls) {
        (self.graph, self.controls)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
