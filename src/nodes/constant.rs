//! ConstantNode: emits a user-editable number.
//!
//! The value is set through initial data (`{"value": n}` or a bare number),
//! through `NodeData` messages from the editor, or by applying a snapshot.

use crate::graph::node::{Node, NodeContext, ProcessStatus};
use crate::graph::registry::NodeTypeInfo;
use crate::graph::socket::{kinds, SocketDescriptor};
use anyhow::anyhow;
use serde_json::{json, Value};

pub const TYPE_ID: &str = "constant";

pub const OUTPUT: &str = "value";

pub fn info() -> NodeTypeInfo {
    NodeTypeInfo::new(TYPE_ID, vec![SocketDescriptor::output(OUTPUT, kinds::NUMBER)])
        .with_display_name("Constant")
        .with_description("Outputs a fixed number that can be changed from the editor.")
}

#[derive(Debug, Default)]
pub struct ConstantNode {
    value: f64,
}

impl ConstantNode {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Accepts `5`, `5.0` or `{"value": 5}`.
fn parse_value(data: &Value) -> anyhow::Result<f64> {
    let raw = match data {
        Value::Object(map) => map
            .get("value")
            .ok_or_else(|| anyhow!("missing 'value' field"))?,
        other => other,
    };
    raw.as_f64()
        .ok_or_else(|| anyhow!("expected a number, got {}", raw))
}

impl Node for ConstantNode {
    fn process(&mut self, ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
        ctx.set_output(OUTPUT, json!(self.value));
        Ok(ProcessStatus::Ready)
    }

    fn on_message(&mut self, payload: &Value, ctx: &mut NodeContext<'_>) -> anyhow::Result<()> {
        let value = parse_value(payload)?;
        if value != self.value {
            self.value = value;
            ctx.mark_dirty();
        }
        Ok(())
    }

    fn data(&self) -> Value {
        json!({ "value": self.value })
    }

    fn set_data(&mut self, data: &Value) -> anyhow::Result<()> {
        self.value = parse_value(data)?;
        Ok(())
    }
}
