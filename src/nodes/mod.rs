//! Built-in node implementations.

pub mod constant;
pub mod display;
pub mod math;

pub use constant::ConstantNode;
pub use display::DisplayNode;
pub use math::{AddNode, DoubleNode};

use crate::graph::error::GraphResult;
use crate::graph::registry::{default_factory, NodeRegistry};

/// Register `constant`, `double`, `add` and `display`.
pub fn register_builtin_nodes(registry: &mut NodeRegistry) -> GraphResult<()> {
    registry.register_type(constant::info(), default_factory::<ConstantNode>())?;
    registry.register_type(math::double_info(), default_factory::<DoubleNode>())?;
    registry.register_type(math::add_info(), default_factory::<AddNode>())?;
    registry.register_type(display::info(), default_factory::<DisplayNode>())?;
    Ok(())
}
