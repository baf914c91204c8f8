//! Error handling for nodegraph-rs
//!
//! Layer-specific errors (`GraphError`, `SchedulerError`, `ProtocolError`)
//! live next to the code that raises them. This module defines the crate-level
//! error that wraps them together with host concerns (configuration, files,
//! channels), plus a Result alias.

use crate::graph::error::{GraphError, SchedulerError};
use crate::protocol::router::ProtocolError;
use thiserror::Error;

/// Main error type for nodegraph-rs operations
#[derive(Error, Debug)]
pub enum NodeGraphError {
    /// Structural or node-level graph errors
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Errors raised while ordering a pass
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Wire decoding/encoding errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<NodeGraphError>,
    },
}

impl NodeGraphError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        NodeGraphError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for nodegraph-rs operations
pub type Result<T> = std::result::Result<T, NodeGraphError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<NodeGraphError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
