//! Dirty tracking and execution ordering.
//!
//! The scheduler mirrors the graph at node granularity: it knows which nodes
//! exist, which node feeds which (with multiplicity, so that two connections
//! between the same pair can be removed independently) and which nodes are
//! dirty. It never touches node instances; `run_once` is driven by a callback
//! supplied by the owning `NodeGraph`.
//!
//! Invariants:
//! - the dirty set is closed downstream: if a node is dirty, every node
//!   reachable from it is dirty too;
//! - ordering is deterministic: among nodes that are ready at the same time
//!   the smallest `NodeId` runs first.

use crate::graph::error::SchedulerError;
use crate::graph::id::NodeId;
use crate::graph::node::ProcessStatus;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A node whose `process` call returned an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub node_id: NodeId,
    pub cause: String,
}

/// Outcome of one `run_once` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Nodes that ran to completion, in execution order.
    pub executed: Vec<NodeId>,
    /// Nodes that reported `Pending`.
    pub pending: Vec<NodeId>,
    /// Nodes not run because an upstream node failed, is pending or was skipped.
    pub skipped: Vec<NodeId>,
    pub failures: Vec<NodeFailure>,
}

impl RunReport {
    pub fn is_idle(&self) -> bool {
        self.executed.is_empty()
            && self.pending.is_empty()
            && self.skipped.is_empty()
            && self.failures.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    nodes: BTreeSet<NodeId>,
    /// node -> (consumer -> number of connections)
    downstream: BTreeMap<NodeId, BTreeMap<NodeId, usize>>,
    /// node -> (producer -> number of connections)
    upstream: BTreeMap<NodeId, BTreeMap<NodeId, usize>>,
    dirty: BTreeSet<NodeId>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Structure ====================

    /// Track a new node. New nodes start dirty.
    pub fn add_node(&mut self, id: NodeId) {
        self.nodes.insert(id);
        self.dirty.insert(id);
    }

    /// Forget a node. Its edges must already have been removed.
    pub fn remove_node(&mut self, id: NodeId) {
        if self.downstream.get(&id).is_some_and(|d| !d.is_empty())
            || self.upstream.get(&id).is_some_and(|u| !u.is_empty())
        {
            tracing::error!("Removing node {:?} while it still has edges", id);
        }
        self.nodes.remove(&id);
        self.downstream.remove(&id);
        self.upstream.remove(&id);
        self.dirty.remove(&id);
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        *self
            .downstream
            .entry(from)
            .or_default()
            .entry(to)
            .or_insert(0) += 1;
        *self.upstream.entry(to).or_default().entry(from).or_insert(0) += 1;
    }

    /// Remove one instance of the edge `from -> to`.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) {
        decrement(&mut self.downstream, from, to);
        decrement(&mut self.upstream, to, from);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Direct consumers of `id`, ascending.
    pub fn consumers(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.downstream
            .get(&id)
            .into_iter()
            .flat_map(|d| d.keys().copied())
    }

    /// Direct producers feeding `id`, ascending.
    pub fn producers(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.upstream
            .get(&id)
            .into_iter()
            .flat_map(|u| u.keys().copied())
    }

    // ==================== Dirty tracking ====================

    /// Mark `id` and every node downstream of it dirty.
    pub fn mark_dirty(&mut self, id: NodeId) {
        if !self.nodes.contains(&id) {
            return;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            self.dirty.insert(current);
            stack.extend(self.consumers(current));
        }
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.dirty.contains(&id)
    }

    pub fn dirty_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dirty.iter().copied()
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    // ==================== Ordering ====================

    /// Whether adding the edge `from -> to` would close a cycle: true if
    /// `from` is reachable from `to` (including `from == to`).
    pub fn would_create_cycle(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![to];

        while let Some(current) = stack.pop() {
            if current == from {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.consumers(current));
        }
        false
    }

    /// Topological order of the dirty nodes. Ties are broken by ascending id.
    pub fn compute_execution_order(&self) -> Result<Vec<NodeId>, SchedulerError> {
        let mut in_degree: BTreeMap<NodeId, usize> = self
            .dirty
            .iter()
            .map(|&id| {
                let deps = self.producers(id).filter(|p| self.dirty.contains(p)).count();
                (id, deps)
            })
            .collect();

        // Kahn's algorithm with a min-ordered ready set
        let mut ready: BTreeSet<NodeId> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(node) = ready.pop_first() {
            order.push(node);
            for next in self.consumers(node) {
                if let Some(d) = in_degree.get_mut(&next) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(next);
                    }
                }
            }
        }

        if order.len() != in_degree.len() {
            let scheduled: HashSet<NodeId> = order.iter().copied().collect();
            let stuck: Vec<NodeId> = in_degree
                .keys()
                .copied()
                .filter(|id| !scheduled.contains(id))
                .collect();
            return Err(SchedulerError::CycleDetected(stuck));
        }

        Ok(order)
    }

    // ==================== Execution ====================

    /// Run one pass over the dirty nodes.
    ///
    /// `process` is called once per node in execution order, unless one of
    /// the node's direct producers failed, is pending or was skipped earlier
    /// in the same pass. Only nodes that return `Ready` become clean.
    pub fn run_once<F>(&mut self, mut process: F) -> Result<RunReport, SchedulerError>
    where
        F: FnMut(NodeId) -> Result<ProcessStatus, NodeFailure>,
    {
        let order = match self.compute_execution_order() {
            Ok(order) => order,
            Err(e) => {
                tracing::error!("Refusing to run: {}", e);
                return Err(e);
            }
        };

        if !order.is_empty() {
            tracing::debug!("Execution order: {:?}", order);
        }

        let mut report = RunReport::default();
        let mut blocked: HashSet<NodeId> = HashSet::new();

        for node in order {
            if self.producers(node).any(|p| blocked.contains(&p)) {
                blocked.insert(node);
                report.skipped.push(node);
                continue;
            }

            match process(node) {
                Ok(ProcessStatus::Ready) => {
                    self.dirty.remove(&node);
                    report.executed.push(node);
                }
                Ok(ProcessStatus::Pending) => {
                    blocked.insert(node);
                    report.pending.push(node);
                }
                Err(failure) => {
                    tracing::debug!("Node {:?} failed: {}", node, failure.cause);
                    blocked.insert(node);
                    report.failures.push(failure);
                }
            }
        }

        Ok(report)
    }
}

fn decrement(map: &mut BTreeMap<NodeId, BTreeMap<NodeId, usize>>, a: NodeId, b: NodeId) {
    let Some(inner) = map.get_mut(&a) else {
        return;
    };
    if let Some(count) = inner.get_mut(&b) {
        *count -= 1;
        if *count == 0 {
            inner.remove(&b);
        }
    }
    if inner.is_empty() {
        map.remove(&a);
    }
}
