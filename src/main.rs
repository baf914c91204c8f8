//! nodegraph - headless engine host
//!
//! Reads newline-delimited JSON requests from stdin, runs the engine on its
//! own thread and prints outbound messages to stdout, one JSON object per
//! line. Logs go to stderr (and optionally a daily rolling file).
//!
//! Usage: `nodegraph [CONFIG_PATH]`

use nodegraph_rs::{
    config::{EngineConfig, LogFormat, LoggingConfig},
    error::{NodeGraphError, Result, ResultExt},
    graph::{GraphSnapshot, NodeGraph, NodeRegistry},
    nodes::register_builtin_nodes,
    Engine, EngineBridge, MessageRouter,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let compact = config.format == LogFormat::Compact;
    let full_layer =
        (!compact).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let compact_layer = compact.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
    });

    let log_dir = config
        .log_to_file
        .then(|| config.resolved_log_dir())
        .flatten();
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "nodegraph.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(full_layer)
        .with(compact_layer)
        .with(file_layer)
        .init();

    guard
}

fn main() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(EngineConfig::default_path);
    let config = config_path
        .as_ref()
        .map(|path| EngineConfig::load_or_default(path))
        .unwrap_or_default();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config.logging);

    tracing::info!("Starting nodegraph engine");
    if let Some(path) = &config_path {
        tracing::debug!("Config path: {:?}", path);
    }

    let mut registry = NodeRegistry::new();
    register_builtin_nodes(&mut registry).context("Failed to register built-in nodes")?;
    let mut graph = NodeGraph::new(Arc::new(registry));

    if let Some(path) = &config.snapshot.startup_snapshot {
        tracing::info!("Loading startup snapshot from {:?}", path);
        let snapshot = GraphSnapshot::load(path)?;
        graph
            .apply_snapshot(&snapshot)
            .with_context(|| format!("Failed to apply snapshot {:?}", path))?;
    }

    // Create the bridge and spawn the engine thread
    let (bridge, cmd_rx, msg_tx) = EngineBridge::new(&config.channels);
    let running = Arc::new(AtomicBool::new(true));
    let engine = Engine::new(graph, &config.scheduler, cmd_rx, msg_tx, running);
    let engine_handle = engine.spawn()?;

    // Decode stdin on its own thread; EOF shuts the engine down
    let input = bridge.clone();
    std::thread::Builder::new()
        .name("nodegraph-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if !input.submit_raw(line) {
                    break;
                }
            }
            tracing::info!("Input closed");
            input.shutdown();
        })?;

    // Print outbound messages until the engine drops its sender
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for msg in bridge.messages().iter() {
        match MessageRouter::encode(&msg) {
            Ok(text) => {
                writeln!(out, "{}", text)?;
                out.flush()?;
            }
            Err(e) => tracing::error!("{}", e),
        }
    }

    engine_handle
        .join()
        .map_err(|_| NodeGraphError::Channel("engine thread panicked".to_string()))?;

    tracing::info!("Shutting down...");
    Ok(())
}
