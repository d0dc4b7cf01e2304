//! The finished control flow graph.
//!
//! Blocks are stored in ordinal order: `B0` is the entry block and the
//! last block is the exit block. Each non-exit block has a fallthrough
//! branch and possibly one conditional branch; branches that leave the
//! body abruptly (`throw`, the end of a `finally`) have no destination.

use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use semflow_core::{BlockId, RegionId};
use semflow_operations::Operation;
use tracing::{debug, debug_span};

use crate::builder::build_blocks;
use crate::error::{FlowGraphError, Result};
use crate::finalize::finalize;
use crate::options::FlowGraphOptions;
use crate::region::ControlFlowRegion;

// ============================================================================
// Branches
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicBlockKind {
    Entry,
    Block,
    Exit,
}

impl fmt::Display for BasicBlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Polarity of a block's conditional branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlFlowConditionKind {
    #[default]
    None,
    /// Jump when the branch value is false.
    WhenFalse,
    /// Jump when the branch value is true.
    WhenTrue,
}

/// What taking a branch means for the rest of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlFlowBranchSemantics {
    Regular,
    /// Leaves the body with the block's branch value.
    Return,
    /// Throws the block's branch value.
    Throw,
    /// Rethrows the exception being handled.
    Rethrow,
    /// Control continues wherever the exception machinery decides: the end
    /// of a `finally` or a filter that rejected the exception.
    StructuredExceptionHandling,
    /// The target could not be determined.
    Error,
}

impl fmt::Display for ControlFlowBranchSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One outgoing edge of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFlowBranch {
    pub(crate) source: BlockId,
    pub(crate) destination: Option<BlockId>,
    pub(crate) semantics: ControlFlowBranchSemantics,
    pub(crate) is_conditional_successor: bool,
    pub(crate) entering_regions: Vec<RegionId>,
    pub(crate) leaving_regions: Vec<RegionId>,
    pub(crate) finally_regions: Vec<RegionId>,
}

impl ControlFlowBranch {
    pub fn source(&self) -> BlockId {
        self.source
    }

    pub fn destination(&self) -> Option<BlockId> {
        self.destination
    }

    pub fn semantics(&self) -> ControlFlowBranchSemantics {
        self.semantics
    }

    pub fn is_conditional_successor(&self) -> bool {
        self.is_conditional_successor
    }

    /// Regions entered by taking this edge, outermost first.
    pub fn entering_regions(&self) -> &[RegionId] {
        &self.entering_regions
    }

    /// Regions left by taking this edge, innermost first.
    pub fn leaving_regions(&self) -> &[RegionId] {
        &self.leaving_regions
    }

    /// `finally` regions run on the way out, innermost first.
    pub fn finally_regions(&self) -> &[RegionId] {
        &self.finally_regions
    }
}

// ============================================================================
// Blocks
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub(crate) ordinal: BlockId,
    pub(crate) kind: BasicBlockKind,
    pub(crate) operations: Vec<Operation>,
    pub(crate) branch_value: Option<Operation>,
    pub(crate) condition_kind: ControlFlowConditionKind,
    pub(crate) conditional_successor: Option<ControlFlowBranch>,
    pub(crate) fallthrough_successor: Option<ControlFlowBranch>,
    pub(crate) predecessors: Vec<BlockId>,
    pub(crate) is_reachable: bool,
    pub(crate) enclosing_region: RegionId,
}

impl BasicBlock {
    pub fn ordinal(&self) -> BlockId {
        self.ordinal
    }

    pub fn kind(&self) -> BasicBlockKind {
        self.kind
    }

    /// Statements, in execution order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Condition of the conditional branch, or the value carried by a
    /// `Return` or `Throw` fallthrough.
    pub fn branch_value(&self) -> Option<&Operation> {
        self.branch_value.as_ref()
    }

    pub fn condition_kind(&self) -> ControlFlowConditionKind {
        self.condition_kind
    }

    pub fn conditional_successor(&self) -> Option<&ControlFlowBranch> {
        self.conditional_successor.as_ref()
    }

    pub fn fallthrough_successor(&self) -> Option<&ControlFlowBranch> {
        self.fallthrough_successor.as_ref()
    }

    /// Both outgoing edges, conditional first.
    pub fn successors(&self) -> impl Iterator<Item = &ControlFlowBranch> {
        self.conditional_successor.iter().chain(self.fallthrough_successor.iter())
    }

    /// Sorted, without duplicates.
    pub fn predecessors(&self) -> &[BlockId] {
        &self.predecessors
    }

    pub fn is_reachable(&self) -> bool {
        self.is_reachable
    }

    /// Innermost region containing this block.
    pub fn enclosing_region(&self) -> RegionId {
        self.enclosing_region
    }
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ControlFlowGraph {
    pub(crate) blocks: Vec<BasicBlock>,
    pub(crate) regions: Vec<ControlFlowRegion>,
    pub(crate) capture_count: u32,
}

/// Bodies nesting deeper than this are built on a worker thread with a
/// stack sized for [`FlowGraphOptions::max_depth`].
const INLINE_DEPTH: usize = 64;

/// Worker stack reserved per nesting level.
const STACK_PER_LEVEL: usize = 128 * 1024;

fn nests_deeper_than(body: &Operation, limit: usize) -> bool {
    let mut pending = vec![(body, 1usize)];
    while let Some((op, depth)) = pending.pop() {
        if depth > limit {
            return true;
        }
        pending.extend(op.children().into_iter().map(|child| (child, depth + 1)));
    }
    false
}

fn build_on_worker(body: &Operation, options: &FlowGraphOptions) -> Result<ControlFlowGraph> {
    let stack_size = options
        .max_depth
        .saturating_add(INLINE_DEPTH)
        .saturating_mul(STACK_PER_LEVEL);
    let span = tracing::Span::current();
    debug!(stack_size, "building deeply nested body on a worker thread");
    std::thread::scope(|scope| {
        let worker = std::thread::Builder::new()
            .name("semflow-flow".into())
            .stack_size(stack_size)
            .spawn_scoped(scope, || span.in_scope(|| ControlFlowGraph::build_here(body, options)))
            .map_err(|err| FlowGraphError::WorkerUnavailable {
                detail: err.to_string(),
            })?;
        match worker.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    })
}

impl ControlFlowGraph {
    /// Build the graph of a method body. `body` is usually the block
    /// produced by the operation builder; it is left untouched.
    ///
    /// ```ignore
    /// let graph = ControlFlowGraph::build(&body, &FlowGraphOptions::default())?;
    /// assert_eq!(graph.entry().kind(), BasicBlockKind::Entry);
    /// ```
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(body: &Operation, options: &FlowGraphOptions) -> Result<Self> {
        let _span = debug_span!("flow_graph", span = %body.span()).entered();
        if nests_deeper_than(body, INLINE_DEPTH) {
            build_on_worker(body, options)
        } else {
            Self::build_here(body, options)
        }
    }

    fn build_here(body: &Operation, options: &FlowGraphOptions) -> Result<Self> {
        let built = build_blocks(body, options)?;
        let graph = finalize(built, options);
        debug!(
            blocks = graph.blocks.len(),
            regions = graph.regions.len(),
            captures = graph.capture_count,
            "flow graph built"
        );
        if options.validate {
            graph.validate()?;
        }
        Ok(graph)
    }

    /// All blocks in ordinal order.
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.as_usize())
    }

    pub fn entry(&self) -> &BasicBlock {
        &self.blocks[0]
    }

    pub fn exit(&self) -> &BasicBlock {
        &self.blocks[self.blocks.len() - 1]
    }

    /// The root of the region tree, spanning every block.
    pub fn root(&self) -> &ControlFlowRegion {
        &self.regions[0]
    }

    pub fn region(&self, id: RegionId) -> Option<&ControlFlowRegion> {
        self.regions.get(id.as_usize())
    }

    /// All regions in pre-order; the root comes first.
    pub fn regions(&self) -> &[ControlFlowRegion] {
        &self.regions
    }

    /// Number of capture ids allocated for this body.
    pub fn capture_count(&self) -> u32 {
        self.capture_count
    }

    /// `region` and its ancestors, innermost first.
    pub fn region_path(&self, region: RegionId) -> Vec<RegionId> {
        let mut path = vec![region];
        let mut current = region;
        while let Some(parent) = self.region(current).and_then(ControlFlowRegion::enclosing) {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Statements of every block in ordinal order, branch values included
    /// after the statements of their block.
    pub fn operations_in_order(&self) -> impl Iterator<Item = &Operation> {
        self.blocks
            .iter()
            .flat_map(|block| block.operations.iter().chain(block.branch_value.iter()))
    }

    /// Export the edges as a `petgraph` graph. Node weights are block
    /// ordinals, edge weights are branch semantics; edges without a
    /// destination are left out.
    pub fn to_digraph(&self) -> DiGraph<BlockId, ControlFlowBranchSemantics> {
        let mut graph = DiGraph::with_capacity(self.blocks.len(), self.blocks.len() * 2);
        let nodes: Vec<NodeIndex> = self.blocks.iter().map(|b| graph.add_node(b.ordinal)).collect();
        for block in &self.blocks {
            for branch in block.successors() {
                if let Some(destination) = branch.destination {
                    graph.add_edge(
                        nodes[block.ordinal.as_usize()],
                        nodes[destination.as_usize()],
                        branch.semantics,
                    );
                }
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use petgraph::visit::EdgeRef;
    use semflow_operations::OperationKind;

    use super::*;
    use crate::test_support::*;

    #[test]
    fn digraph_mirrors_block_edges() {
        let f = Fixture::new();
        let value = conditional(f.b(), f.y(), int(1));
        let graph = build(&block(vec![expr_stmt(assign(f.i(), value))], vec![]));
        let digraph = graph.to_digraph();

        assert_eq!(digraph.node_count(), graph.blocks().len());
        let edges: usize = graph
            .blocks()
            .iter()
            .map(|b| b.successors().filter(|s| s.destination().is_some()).count())
            .sum();
        assert_eq!(digraph.edge_count(), edges);
        assert!(
            digraph
                .edge_references()
                .all(|e| *e.weight() == ControlFlowBranchSemantics::Regular)
        );
        assert!(!petgraph::algo::is_cyclic_directed(&digraph));
    }

    #[test]
    fn operations_in_order_include_branch_values() {
        let f = Fixture::new();
        let body = block(vec![if_stmt(f.b(), expr_stmt(f.call(f.y())), None)], vec![]);
        let graph = build(&body);

        let kinds: Vec<OperationKind> = graph.operations_in_order().map(|op| op.kind()).collect();
        assert_eq!(
            kinds,
            vec![OperationKind::ParameterReference, OperationKind::ExpressionStatement]
        );
        assert_eq!(graph.region_path(graph.root().id()), vec![graph.root().id()]);
    }
}
