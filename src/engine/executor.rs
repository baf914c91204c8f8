//! Engine executor: the tick loop that owns the graph.
//!
//! The engine runs on a dedicated thread. Each tick:
//! 1. Apply structural requests deferred by nodes during the previous tick.
//! 2. Drain commands from the bridge and route them through the graph.
//! 3. `run_once` over the dirty nodes.
//! 4. Report new node failures and forward node messages.
//!
//! Hosts that own a frame loop call [`Engine::tick`] directly; everything
//! else calls [`Engine::run`], which ticks at the configured rate.

use crate::config::SchedulerConfig;
use crate::engine::bridge::{EngineCommand, OutboundSender};
use crate::graph::error::SchedulerError;
use crate::graph::graph::NodeGraph;
use crate::graph::id::NodeId;
use crate::graph::scheduler::RunReport;
use crate::protocol::message::{InboundEnvelope, OutboundMessage, Request};
use crate::protocol::router::MessageRouter;
use crossbeam_channel::{Receiver, TryRecvError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub struct Engine {
    graph: NodeGraph,
    cmd_rx: Receiver<EngineCommand>,
    msg_tx: OutboundSender,
    running: Arc<AtomicBool>,
    tick: u64,
    tick_rate_hz: u32,
    last_tick_time: Option<Instant>,
    /// Last cause reported per failing node, so a node that keeps failing the
    /// same way is reported once.
    reported_failures: HashMap<NodeId, String>,
    reported_cycle: Option<SchedulerError>,
    dropped_messages: u64,
}

impl Engine {
    pub fn new(
        graph: NodeGraph,
        config: &SchedulerConfig,
        cmd_rx: Receiver<EngineCommand>,
        msg_tx: OutboundSender,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            graph,
            cmd_rx,
            msg_tx,
            running,
            tick: 0,
            tick_rate_hz: config.tick_rate_hz,
            last_tick_time: None,
            reported_failures: HashMap::new(),
            reported_cycle: None,
            dropped_messages: 0,
        }
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Node messages shed because the outbound backlog was saturated.
    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    // ── Main run loop ──

    /// Run the engine until `running` is cleared or Shutdown is received.
    pub fn run(&mut self) {
        tracing::info!("Engine thread started ({} Hz)", self.tick_rate_hz);

        while self.is_running() {
            self.tick();
            self.rate_limit();
        }

        tracing::info!(
            "Engine thread exiting after {} tick(s), {} dropped message(s)",
            self.tick,
            self.dropped_messages
        );
    }

    /// Move the engine onto its own named thread and run it there.
    pub fn spawn(mut self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("nodegraph-engine".to_string())
            .spawn(move || self.run())
    }

    /// One engine step. Returns the report of the scheduler pass, or `None`
    /// if the pass was refused.
    pub fn tick(&mut self) -> Option<RunReport> {
        self.last_tick_time = Some(Instant::now());
        self.tick += 1;

        self.process_deferred();
        self.process_commands();

        let report = match self.graph.run_once() {
            Ok(report) => {
                self.reported_cycle = None;
                self.report_failures(&report);
                if !report.is_idle() {
                    tracing::debug!(
                        "Tick {}: {} executed, {} pending, {} skipped, {} failed",
                        self.tick,
                        report.executed.len(),
                        report.pending.len(),
                        report.skipped.len(),
                        report.failures.len()
                    );
                }
                Some(report)
            }
            Err(e) => {
                if self.reported_cycle.as_ref() != Some(&e) {
                    self.emit(MessageRouter::scheduler_error(&e));
                    self.reported_cycle = Some(e);
                }
                None
            }
        };

        for msg in MessageRouter::node_messages(&mut self.graph) {
            self.emit_node_message(msg);
        }

        report
    }

    fn process_deferred(&mut self) {
        for request in self.graph.take_deferred_requests() {
            tracing::debug!("Applying deferred {} request", request.kind_name());
            self.route(InboundEnvelope::new(request));
        }
    }

    fn process_commands(&mut self) {
        loop {
            match self.cmd_rx.try_recv() {
                Ok(EngineCommand::Message(envelope)) => self.route(envelope),
                Ok(EngineCommand::Undecodable { raw, reason }) => {
                    tracing::warn!("Dropping malformed message: {}", reason);
                    self.emit(MessageRouter::malformed(&raw, &reason));
                }
                Ok(EngineCommand::Shutdown) => {
                    tracing::info!("Shutdown requested");
                    self.running.store(false, Ordering::Relaxed);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::info!("All bridges dropped, stopping engine");
                    self.running.store(false, Ordering::Relaxed);
                    break;
                }
            }
        }
    }

    fn route(&mut self, envelope: InboundEnvelope) {
        let replaces_graph = matches!(envelope.request, Request::ApplySnapshot { .. });
        let replies = MessageRouter::route(&mut self.graph, envelope);
        if replaces_graph && replies.iter().any(|r| !r.is_error()) {
            // Ids in the new graph may match nodes from the old one
            self.reported_failures.clear();
            self.reported_cycle = None;
        }
        for reply in replies {
            self.emit(reply);
        }
    }

    fn report_failures(&mut self, report: &RunReport) {
        for failure in &report.failures {
            if self.reported_failures.get(&failure.node_id) == Some(&failure.cause) {
                continue;
            }
            tracing::warn!(
                "Node {:?} failed to process: {}",
                failure.node_id,
                failure.cause
            );
            self.emit(MessageRouter::node_failure(failure));
            self.reported_failures
                .insert(failure.node_id, failure.cause.clone());
        }

        for node in &report.executed {
            if self.reported_failures.remove(node).is_some() {
                tracing::info!("Node {:?} recovered", node);
            }
        }

        let graph = &self.graph;
        self.reported_failures.retain(|id, _| graph.contains_node(*id));
    }

    /// Deliver a reply or error report. Never blocks and never sheds.
    fn emit(&mut self, msg: OutboundMessage) {
        if self.msg_tx.send(msg).is_err() {
            tracing::debug!("Outbound channel closed, discarding message");
        }
    }

    /// Deliver a node message unless the outbound backlog is saturated.
    fn emit_node_message(&mut self, msg: OutboundMessage) {
        if self.msg_tx.is_saturated() {
            self.dropped_messages += 1;
            tracing::warn!(
                "Outbound backlog at {} message(s), dropped node message ({} total)",
                self.msg_tx.len(),
                self.dropped_messages
            );
            return;
        }
        self.emit(msg);
    }

    fn rate_limit(&self) {
        if self.tick_rate_hz == 0 {
            std::thread::sleep(Duration::from_millis(10));
            return;
        }

        let target_interval = Duration::from_nanos(1_000_000_000 / self.tick_rate_hz as u64);

        if let Some(last) = self.last_tick_time {
            let elapsed = last.elapsed();
            if elapsed < target_interval {
                std::thread::sleep(target_interval - elapsed);
            }
        }
    }
}
