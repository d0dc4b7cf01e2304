//! Bound tree to flow graph in one call.

use semflow_bound::BoundStmt;
use semflow_core::{SymbolId, SymbolTable};
use semflow_flow::{ControlFlowGraph, FlowGraphOptions, GraphDumper};
use semflow_operations::{LoweringOptions, Operation, OperationBuilder, OperationDumper};
use tracing::debug;

use crate::error::Result;

/// Options for both stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineOptions {
    pub lowering: LoweringOptions,
    pub flow: FlowGraphOptions,
}

impl PipelineOptions {
    pub fn with_lowering(mut self, lowering: LoweringOptions) -> Self {
        self.lowering = lowering;
        self
    }

    pub fn with_flow(mut self, flow: FlowGraphOptions) -> Self {
        self.flow = flow;
        self
    }
}

/// A body after both stages: its operation tree and the graph built from
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredBody {
    pub operation: Operation,
    pub graph: ControlFlowGraph,
}

impl LoweredBody {
    /// The operation tree in dump form.
    pub fn dump_operation(&self, symbols: &SymbolTable) -> String {
        OperationDumper::new(symbols).dump(&self.operation)
    }

    /// The flow graph in dump form.
    pub fn dump_graph(&self, symbols: &SymbolTable) -> String {
        GraphDumper::new(symbols).dump(&self.graph)
    }
}

/// Lower a bound method body into operations, then into a flow graph.
///
/// Bodies that failed to bind still lower; the parts that did not bind
/// are flagged invalid.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn lower_body(symbols: &SymbolTable, body: &BoundStmt<'_>, options: &PipelineOptions) -> Result<LoweredBody> {
    let operation = OperationBuilder::new(symbols, options.lowering).build_body(body);
    debug!(invalid = operation.is_invalid(), "operation tree built");
    let graph = ControlFlowGraph::build(&operation, &options.flow)?;
    Ok(LoweredBody { operation, graph })
}

/// [`lower_body`] for the body of `method`, which must be a method in
/// `symbols`.
pub fn lower_method(
    symbols: &SymbolTable,
    method: SymbolId,
    body: &BoundStmt<'_>,
    options: &PipelineOptions,
) -> Result<LoweredBody> {
    let signature = symbols.method(method)?;
    debug!(method = %signature.name, parameters = signature.parameters.len(), "lowering method");
    lower_body(symbols, body, options)
}
