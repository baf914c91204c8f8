//! Socket descriptors for the node system.
//!
//! Each node type declares its sockets (inputs/outputs) when it is registered.
//! Sockets are not separate objects: at runtime they are addressed as
//! `(node id, socket name, direction)` and resolved against the type's
//! descriptors to validate connections.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Common data-kind tags. Plugins may use any other string.
pub mod kinds {
    pub const NUMBER: &str = "number";
    pub const STRING: &str = "string";
    pub const BOOL: &str = "bool";
}

/// Whether a socket is an input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketDirection {
    Input,
    Output,
}

impl fmt::Display for SocketDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketDirection::Input => write!(f, "input"),
            SocketDirection::Output => write!(f, "output"),
        }
    }
}

/// Descriptor for one socket of a node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketDescriptor {
    pub name: Cow<'static, str>,
    pub direction: SocketDirection,
    /// Data-kind tag. Two sockets can only be connected when their tags match.
    pub kind: Cow<'static, str>,
}

impl SocketDescriptor {
    pub const fn input(name: &'static str, kind: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            direction: SocketDirection::Input,
            kind: Cow::Borrowed(kind),
        }
    }

    pub const fn output(name: &'static str, kind: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            direction: SocketDirection::Output,
            kind: Cow::Borrowed(kind),
        }
    }

    /// Build a descriptor from runtime strings (e.g. plugin-defined sockets).
    pub fn new(
        name: impl Into<String>,
        direction: SocketDirection,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            direction,
            kind: Cow::Owned(kind.into()),
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == SocketDirection::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == SocketDirection::Output
    }

    /// Whether an edge from `self` (output) into `other` (input) carries a compatible kind.
    pub fn accepts_kind_of(&self, other: &SocketDescriptor) -> bool {
        self.kind == other.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_constructors() {
        const IN: SocketDescriptor = SocketDescriptor::input("value", kinds::NUMBER);
        assert!(IN.is_input());
        assert_eq!(IN.name, "value");
        assert_eq!(IN.kind, "number");
    }

    #[test]
    fn test_kind_compatibility() {
        let out = SocketDescriptor::output("out", kinds::NUMBER);
        let num_in = SocketDescriptor::input("in", kinds::NUMBER);
        let str_in = SocketDescriptor::new("in", SocketDirection::Input, kinds::STRING);
        assert!(out.accepts_kind_of(&num_in));
        assert!(!out.accepts_kind_of(&str_in));
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let json = serde_json::to_string(&SocketDirection::Output).unwrap();
        assert_eq!(json, "\"output\"");
    }
}
