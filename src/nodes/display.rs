//! DisplayNode: forwards its input to the remote editor.

use crate::graph::node::{Node, NodeContext, ProcessStatus};
use crate::graph::registry::NodeTypeInfo;
use crate::graph::socket::{kinds, SocketDescriptor};
use serde_json::{json, Value};

pub const TYPE_ID: &str = "display";

pub fn info() -> NodeTypeInfo {
    NodeTypeInfo::new(TYPE_ID, vec![SocketDescriptor::input("value", kinds::NUMBER)])
        .with_display_name("Display")
        .with_description("Shows the incoming value in the editor.")
}

#[derive(Debug, Default)]
pub struct DisplayNode {
    last_sent: Option<Value>,
}

impl Node for DisplayNode {
    fn process(&mut self, ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
        let value = ctx.input("value").cloned().unwrap_or(Value::Null);
        if self.last_sent.as_ref() != Some(&value) {
            ctx.send_message(json!({ "value": value }));
            self.last_sent = Some(value);
        }
        Ok(ProcessStatus::Ready)
    }

    /// `{"refresh": true}` re-sends the current value on the next pass.
    fn on_message(&mut self, payload: &Value, ctx: &mut NodeContext<'_>) -> anyhow::Result<()> {
        if payload.get("refresh").and_then(Value::as_bool) == Some(true) {
            self.last_sent = None;
            ctx.mark_dirty();
        }
        Ok(())
    }
}
