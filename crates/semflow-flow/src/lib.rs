//! Control flow graphs over operation trees.
//!
//! [`ControlFlowGraph::build`] lowers a method body into basic blocks
//! whose statements contain no control flow of their own. Conditional
//! expressions, `??`, `?.` and short-circuit operators become branches;
//! intermediate values travel between blocks through flow captures,
//! declared by the `.locals` region they live in.
//!
//! - [`graph`]: blocks, branches and the graph itself
//! - [`region`]: the region tree laid over the blocks
//! - [`dump`]: textual rendering for tests and debugging
//! - [`FlowGraphError`]: construction and consistency errors
//!
//! Invariants of every graph produced:
//!
//! - `B0` is the entry block and the last block is the exit block
//! - every capture reference on a reachable path follows a write to it
//! - regions nest properly and each block knows its innermost region
//! - the statements of all blocks, in order, evaluate in source order

mod builder;
pub mod dump;
pub mod error;
mod finalize;
pub mod graph;
pub mod options;
pub mod region;
mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use dump::GraphDumper;
pub use error::{FlowGraphError, Result};
pub use graph::{
    BasicBlock, BasicBlockKind, ControlFlowBranch, ControlFlowBranchSemantics, ControlFlowConditionKind,
    ControlFlowGraph,
};
pub use options::FlowGraphOptions;
pub use region::{ControlFlowRegion, ControlFlowRegionKind};
