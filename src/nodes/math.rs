//! Arithmetic nodes.
//!
//! Unconnected inputs read as `0`. An input carrying something other than a
//! number makes `process` fail, which the scheduler reports and retries.

use crate::graph::node::{Node, NodeContext, ProcessStatus};
use crate::graph::registry::NodeTypeInfo;
use crate::graph::socket::{kinds, SocketDescriptor};
use serde_json::json;

pub const DOUBLE_TYPE_ID: &str = "double";
pub const ADD_TYPE_ID: &str = "add";

pub fn double_info() -> NodeTypeInfo {
    NodeTypeInfo::new(
        DOUBLE_TYPE_ID,
        vec![
            SocketDescriptor::input("value", kinds::NUMBER),
            SocketDescriptor::output("value", kinds::NUMBER),
        ],
    )
    .with_display_name("Double")
    .with_description("Multiplies its input by two.")
}

pub fn add_info() -> NodeTypeInfo {
    NodeTypeInfo::new(
        ADD_TYPE_ID,
        vec![
            SocketDescriptor::input("a", kinds::NUMBER),
            SocketDescriptor::input("b", kinds::NUMBER),
            SocketDescriptor::output("sum", kinds::NUMBER),
        ],
    )
    .with_display_name("Add")
    .with_description("Outputs a + b.")
}

#[derive(Debug, Default)]
pub struct DoubleNode;

impl Node for DoubleNode {
    fn process(&mut self, ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
        let value = ctx.input_f64("value")?.unwrap_or(0.0);
        ctx.set_output("value", json!(value * 2.0));
        Ok(ProcessStatus::Ready)
    }
}

#[derive(Debug, Default)]
pub struct AddNode;

impl Node for AddNode {
    fn process(&mut self, ctx: &mut NodeContext<'_>) -> anyhow::Result<ProcessStatus> {
        let a = ctx.input_f64("a")?.unwrap_or(0.0);
        let b = ctx.input_f64("b")?.unwrap_or(0.0);
        ctx.set_output("sum", json!(a + b));
        Ok(ProcessStatus::Ready)
    }
}
