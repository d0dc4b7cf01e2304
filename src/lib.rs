//! semflow: semantic operation trees and control flow graphs for method
//! bodies.
//!
//! ```text
//! bound tree ──OperationBuilder──▶ Operation tree ──ControlFlowGraph::build──▶ blocks + regions
//! (semflow-bound)                 (semflow-operations)                         (semflow-flow)
//! ```
//!
//! [`lower_body`] runs both stages with one set of [`PipelineOptions`].
//! The stage crates are re-exported for callers that need them directly.

pub mod error;
mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{LoweredBody, PipelineOptions, lower_body, lower_method};

pub use semflow_bound as bound;
pub use semflow_core as symbols;
pub use semflow_flow as flow;
pub use semflow_operations as operations;

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{LoweredBody, PipelineOptions, lower_body, lower_method};
    pub use semflow_bound::{BoundExpr, BoundFactory, BoundStmt};
    pub use semflow_core::{
        BlockId, CaptureId, ConstantValue, LabelId, RegionId, Span, SymbolId, SymbolTable, TypeHash, primitives,
    };
    pub use semflow_flow::{
        BasicBlock, BasicBlockKind, ControlFlowBranch, ControlFlowBranchSemantics, ControlFlowConditionKind,
        ControlFlowGraph, ControlFlowRegion, ControlFlowRegionKind, FlowGraphError, FlowGraphOptions, GraphDumper,
    };
    pub use semflow_operations::{
        LoweringOptions, Operation, OperationBuilder, OperationDumper, OperationKind, OperationNode,
        OperationVisitor,
    };
}
