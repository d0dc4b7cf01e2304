//! Operation tree to basic blocks.
//!
//! [`FlowBuilder`] walks the body once, appending statements to the
//! current block and starting a new block at every branch target. The
//! result is a [`BuiltGraph`]: blocks in layout order plus the region
//! tree, with branches still pointing at builder indices. Packing,
//! renumbering and edge annotation happen in [`crate::finalize`].
//!
//! The `impl FlowBuilder` is split by construct:
//!
//! - `stack`: the evaluation stack and spilling
//! - `labels`: branch targets
//! - `expr`: value-producing operations
//! - `condition`: conditional jumps
//! - `stmt`: statements, loops and switches
//! - `try_catch`: exception handling regions

mod condition;
mod expr;
mod labels;
mod stack;
mod stmt;
mod try_catch;

use semflow_core::{CaptureId, Span, SymbolId, TypeHash};
use semflow_operations::{Operation, OperationFlags, OperationHeader, OperationNode};
use tracing::{debug, trace};

use crate::error::{FlowGraphError, Result};
use crate::graph::{BasicBlockKind, ControlFlowBranchSemantics, ControlFlowConditionKind};
use crate::options::FlowGraphOptions;
use crate::region::ControlFlowRegionKind;

use labels::LabelTable;
use stack::{EvalFrame, Operand};

/// Index into the builder's block arena.
pub(crate) type BlockIdx = usize;
/// Index into the builder's region arena.
pub(crate) type RegionIdx = usize;

pub(crate) const ROOT_REGION: RegionIdx = 0;

// ============================================================================
// Builder output
// ============================================================================

/// A branch whose destination is still a builder index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingBranch {
    pub destination: Option<BlockIdx>,
    pub semantics: ControlFlowBranchSemantics,
}

impl PendingBranch {
    pub fn regular(destination: BlockIdx) -> Self {
        Self {
            destination: Some(destination),
            semantics: ControlFlowBranchSemantics::Regular,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BlockBuilder {
    pub kind: BasicBlockKind,
    pub operations: Vec<Operation>,
    pub branch_value: Option<Operation>,
    pub condition_kind: ControlFlowConditionKind,
    pub conditional: Option<PendingBranch>,
    pub fallthrough: Option<PendingBranch>,
    pub region: RegionIdx,
    pub placed: bool,
}

impl BlockBuilder {
    fn new(kind: BasicBlockKind) -> Self {
        Self {
            kind,
            operations: Vec::new(),
            branch_value: None,
            condition_kind: ControlFlowConditionKind::None,
            conditional: None,
            fallthrough: None,
            region: ROOT_REGION,
            placed: false,
        }
    }

    /// No statements and no conditional branch.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.branch_value.is_none() && self.conditional.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RegionBuilder {
    pub kind: ControlFlowRegionKind,
    pub enclosing: Option<RegionIdx>,
    pub exception_type: Option<TypeHash>,
    pub locals: Vec<SymbolId>,
    pub captures: Vec<CaptureId>,
    pub nested: Vec<RegionIdx>,
    /// Set once any block lands in this region or a nested one.
    pub has_blocks: bool,
}

impl RegionBuilder {
    fn new(kind: ControlFlowRegionKind, enclosing: Option<RegionIdx>) -> Self {
        Self {
            kind,
            enclosing,
            exception_type: None,
            locals: Vec::new(),
            captures: Vec::new(),
            nested: Vec::new(),
            has_blocks: false,
        }
    }
}

/// Blocks in layout order and the region tree, before finalization.
#[derive(Debug)]
pub(crate) struct BuiltGraph {
    pub blocks: Vec<BlockBuilder>,
    pub layout: Vec<BlockIdx>,
    pub regions: Vec<RegionBuilder>,
    pub capture_count: u32,
}

/// Lower `body` into unpacked blocks.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn build_blocks(body: &Operation, options: &FlowGraphOptions) -> Result<BuiltGraph> {
    let mut builder = FlowBuilder::new(options);
    let entry = builder.new_block_of_kind(BasicBlockKind::Entry);
    builder.append_block(entry);
    builder.current_block = None;

    builder.visit_statement(body.clone())?;
    builder.check_labels()?;

    if builder.current_region != ROOT_REGION {
        return Err(FlowGraphError::RegionMismatch {
            region: (builder.current_region as u32).into(),
            detail: "left open at the end of the body",
        });
    }
    if !builder.eval_stack.is_empty() || !builder.frames.is_empty() {
        return Err(FlowGraphError::UnbalancedStack { span: body.span() });
    }

    let exit = builder.exit;
    builder.append_block(exit);

    debug!(
        blocks = builder.layout.len(),
        regions = builder.regions.len(),
        captures = builder.next_capture,
        "lowered body to blocks"
    );

    Ok(BuiltGraph {
        blocks: builder.blocks,
        layout: builder.layout,
        regions: builder.regions,
        capture_count: builder.next_capture,
    })
}

// ============================================================================
// Builder state
// ============================================================================

pub(crate) struct FlowBuilder<'o> {
    options: &'o FlowGraphOptions,
    blocks: Vec<BlockBuilder>,
    layout: Vec<BlockIdx>,
    regions: Vec<RegionBuilder>,
    current_region: RegionIdx,
    current_block: Option<BlockIdx>,
    /// Allocated up front so `return` can target it; appended last.
    exit: BlockIdx,
    eval_stack: Vec<Operand>,
    frames: Vec<EvalFrame>,
    labels: LabelTable,
    next_capture: u32,
    /// Receivers of the conditional accesses being lowered, innermost last.
    conditional_access: Vec<(CaptureId, OperationHeader)>,
    /// Objects under construction by an initializer, innermost last.
    implicit_receivers: Vec<(CaptureId, OperationHeader)>,
    depth: usize,
}

impl<'o> FlowBuilder<'o> {
    fn new(options: &'o FlowGraphOptions) -> Self {
        let mut builder = Self {
            options,
            blocks: Vec::new(),
            layout: Vec::new(),
            regions: vec![RegionBuilder::new(ControlFlowRegionKind::Root, None)],
            current_region: ROOT_REGION,
            current_block: None,
            exit: 0,
            eval_stack: Vec::new(),
            frames: Vec::new(),
            labels: LabelTable::default(),
            next_capture: 0,
            conditional_access: Vec::new(),
            implicit_receivers: Vec::new(),
            depth: 0,
        };
        builder.exit = builder.new_block_of_kind(BasicBlockKind::Exit);
        builder
    }

    // ------------------------------------------------------------------------
    // Nesting
    // ------------------------------------------------------------------------

    fn enter_nesting(&mut self, span: Span) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(FlowGraphError::NestingTooDeep {
                limit: self.options.max_depth,
                span,
            });
        }
        Ok(())
    }

    fn leave_nesting(&mut self) {
        self.depth -= 1;
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    fn new_block_of_kind(&mut self, kind: BasicBlockKind) -> BlockIdx {
        self.blocks.push(BlockBuilder::new(kind));
        self.blocks.len() - 1
    }

    fn new_block(&mut self) -> BlockIdx {
        self.new_block_of_kind(BasicBlockKind::Block)
    }

    /// Place `block` after the last appended block, in the current region.
    /// The previous block falls through to it unless it already branches
    /// somewhere unconditionally.
    fn append_block(&mut self, block: BlockIdx) {
        if let Some(&previous) = self.layout.last() {
            let previous = &mut self.blocks[previous];
            if previous.fallthrough.is_none() && previous.kind != BasicBlockKind::Exit {
                previous.fallthrough = Some(PendingBranch::regular(block));
            }
        }
        let region = self.current_region;
        let appended = &mut self.blocks[block];
        appended.region = region;
        appended.placed = true;
        self.layout.push(block);
        self.mark_region_used(region);
        self.current_block = Some(block);
    }

    fn mark_region_used(&mut self, region: RegionIdx) {
        let mut current = Some(region);
        while let Some(idx) = current {
            if self.regions[idx].has_blocks {
                break;
            }
            self.regions[idx].has_blocks = true;
            current = self.regions[idx].enclosing;
        }
    }

    /// The block statements go to, starting one if the last was closed.
    fn current_block(&mut self) -> BlockIdx {
        match self.current_block {
            Some(block) => block,
            None => {
                let block = self.new_block();
                self.append_block(block);
                block
            }
        }
    }

    fn add_statement(&mut self, operation: Operation) {
        let block = self.current_block();
        self.blocks[block].operations.push(operation);
    }

    fn unconditional_branch(&mut self, destination: BlockIdx) {
        self.close_block(Some(destination), ControlFlowBranchSemantics::Regular, None);
    }

    /// End the current block with a fallthrough of the given semantics.
    fn close_block(
        &mut self,
        destination: Option<BlockIdx>,
        semantics: ControlFlowBranchSemantics,
        value: Option<Operation>,
    ) {
        let block = self.current_block();
        let block = &mut self.blocks[block];
        block.branch_value = value;
        block.fallthrough = Some(PendingBranch {
            destination,
            semantics,
        });
        self.current_block = None;
    }

    fn conditional_branch(&mut self, condition: Operation, jump_if_true: bool, destination: BlockIdx) {
        let block = self.current_block();
        let block = &mut self.blocks[block];
        block.branch_value = Some(condition);
        block.condition_kind = if jump_if_true {
            ControlFlowConditionKind::WhenTrue
        } else {
            ControlFlowConditionKind::WhenFalse
        };
        block.conditional = Some(PendingBranch::regular(destination));
        self.current_block = None;
    }

    // ------------------------------------------------------------------------
    // Regions
    // ------------------------------------------------------------------------

    fn enter_region(&mut self, kind: ControlFlowRegionKind, locals: Vec<SymbolId>) -> RegionIdx {
        let parent = self.current_region;
        let mut region = RegionBuilder::new(kind, Some(parent));
        region.locals = locals;
        self.regions.push(region);
        let idx = self.regions.len() - 1;
        self.regions[parent].nested.push(idx);
        self.current_region = idx;
        self.current_block = None;
        trace!(region = idx, %kind, "enter region");
        idx
    }

    fn enter_handler_region(&mut self, kind: ControlFlowRegionKind, exception_type: TypeHash) -> RegionIdx {
        let region = self.enter_region(kind, Vec::new());
        self.regions[region].exception_type = Some(exception_type);
        region
    }

    /// Close the current region. An empty region gets one empty block so
    /// it still has a range.
    fn leave_region(&mut self) {
        let region = self.current_region;
        if !self.regions[region].has_blocks {
            let block = self.new_block();
            self.append_block(block);
        }
        self.current_region = self.regions[region].enclosing.unwrap_or(ROOT_REGION);
        self.current_block = None;
        trace!(region, "leave region");
    }

    // ------------------------------------------------------------------------
    // Captures
    // ------------------------------------------------------------------------

    /// Allocate the next capture id and declare it in `region`.
    fn new_capture(&mut self, region: RegionIdx) -> CaptureId {
        let id = CaptureId::new(self.next_capture);
        self.next_capture += 1;
        self.regions[region].captures.push(id);
        id
    }

    /// Emit `id = value` as a statement.
    fn capture(&mut self, id: CaptureId, value: Operation) {
        let span = value.span();
        let capture = Operation::new(
            OperationNode::FlowCapture {
                id,
                value: Box::new(value),
            },
            None,
            span,
        )
        .implicit();
        self.add_statement(capture);
    }
}

/// A read of capture `id` standing in for the operation described by
/// `replaced`. Invalid when the replaced operation was.
pub(crate) fn capture_reference(id: CaptureId, replaced: &OperationHeader) -> Operation {
    Operation::new(OperationNode::FlowCaptureReference { id }, replaced.ty, replaced.span)
        .implicit()
        .with_invalid(replaced.flags.contains(OperationFlags::INVALID))
}

/// Stand-in left behind while a child is moved out of its parent.
pub(crate) fn placeholder() -> Operation {
    Operation::new(OperationNode::Empty, None, Span::default())
}

fn unexpected(operation: &Operation) -> FlowGraphError {
    FlowGraphError::UnexpectedOperation {
        kind: operation.kind(),
        span: operation.span(),
    }
}

#[cfg(test)]
mod tests {
    use semflow_core::{BinaryOperatorKind, BlockId, LabelId, RegionId, primitives};
    use semflow_operations::OperationKind;

    use super::*;
    use crate::graph::{ControlFlowBranch, ControlFlowGraph};
    use crate::test_support::*;
    use crate::{FlowGraphOptions, GraphDumper};

    fn block_id(n: u32) -> BlockId {
        BlockId::new(n)
    }

    fn next_of(graph: &ControlFlowGraph, block: u32) -> &ControlFlowBranch {
        graph.blocks()[block as usize]
            .fallthrough_successor()
            .expect("block has a fallthrough")
    }

    fn jump_of(graph: &ControlFlowGraph, block: u32) -> &ControlFlowBranch {
        graph.blocks()[block as usize]
            .conditional_successor()
            .expect("block has a conditional branch")
    }

    fn kinds(graph: &ControlFlowGraph, block: u32) -> Vec<OperationKind> {
        graph.blocks()[block as usize].operations().iter().map(|op| op.kind()).collect()
    }

    fn build_err(body: &Operation, options: FlowGraphOptions) -> FlowGraphError {
        ControlFlowGraph::build(body, &options).expect_err("construction fails")
    }

    #[test]
    fn empty_body_links_entry_to_exit() {
        let graph = build(&block(vec![], vec![]));

        assert_eq!(graph.blocks().len(), 2);
        assert_eq!(next_of(&graph, 0).destination(), Some(block_id(1)));
        assert_eq!(graph.exit().predecessors(), &[block_id(0)]);
        assert!(graph.exit().is_reachable());
        assert_eq!(graph.regions().len(), 1);
        assert_eq!(graph.capture_count(), 0);
    }

    #[test]
    fn declaration_becomes_implicit_assignment_in_locals_region() {
        let f = Fixture::new();
        let body = block(vec![declare(f.i, int(1))], vec![f.i]);
        let graph = build(&body);

        let expected = "\
Block[B0] - Entry
    Statements (0)
    Next (Regular) Block[B1]
        Entering: {R1}

.locals {R1}
{
    Locals: [int i]
    Block[B1] - Block
        Predecessors: [B0]
        Statements (1)
            SimpleAssignment (Type: int, IsImplicit)
              Left: LocalReference (Type: int, IsImplicit) Local: i (IsDeclaration: True)
              Right: Literal (Type: int, Constant: 1)

        Next (Regular) Block[B2]
            Leaving: {R1}
}

Block[B2] - Exit
    Predecessors: [B1]
    Statements (0)
";
        assert_eq!(GraphDumper::new(&f.symbols).dump(&graph), expected);
    }

    #[test]
    fn conditional_value_merges_through_one_capture() {
        // i = b ? y : await y;
        let f = Fixture::new();
        let value = conditional(f.b(), f.y(), await_(f.y()));
        let body = block(vec![expr_stmt(assign(f.i(), value))], vec![]);
        let graph = build(&body);

        assert_eq!(graph.blocks().len(), 6);
        assert_eq!(graph.capture_count(), 2);

        // The assignment target is evaluated before the branch.
        assert_eq!(kinds(&graph, 1), vec![OperationKind::FlowCapture]);
        let b1 = &graph.blocks()[1];
        assert_eq!(b1.condition_kind(), ControlFlowConditionKind::WhenFalse);
        assert_eq!(b1.branch_value().map(|v| v.kind()), Some(OperationKind::ParameterReference));
        assert_eq!(jump_of(&graph, 1).destination(), Some(block_id(3)));
        assert_eq!(next_of(&graph, 1).destination(), Some(block_id(2)));

        assert_eq!(next_of(&graph, 2).destination(), Some(block_id(4)));
        let OperationNode::FlowCapture { id, value } = graph.blocks()[3].operations()[0].node() else {
            panic!("expected a capture in the false arm");
        };
        assert_eq!(*id, CaptureId::new(1));
        assert_eq!(value.kind(), OperationKind::Await);

        let merge = &graph.blocks()[4];
        assert_eq!(merge.predecessors(), &[block_id(2), block_id(3)]);
        assert_eq!(kinds(&graph, 4), vec![OperationKind::ExpressionStatement]);

        let region = &graph.regions()[1];
        assert_eq!(region.kind(), ControlFlowRegionKind::LocalLifetime);
        assert_eq!(region.capture_ids(), &[CaptureId::new(0), CaptureId::new(1)]);
        assert_eq!((region.first_block(), region.last_block()), (block_id(1), block_id(4)));
    }

    #[test]
    fn coalesce_tests_null_in_nested_region() {
        // i = x ?? y;
        let f = Fixture::new();
        let body = block(vec![expr_stmt(assign(f.i(), coalesce(f.x(), f.y())))], vec![]);
        let graph = build(&body);

        assert_eq!(graph.blocks().len(), 7);
        assert_eq!(graph.capture_count(), 3);

        let outer = &graph.regions()[1];
        let inner = &graph.regions()[2];
        assert_eq!(outer.capture_ids(), &[CaptureId::new(0), CaptureId::new(2)]);
        assert_eq!(inner.capture_ids(), &[CaptureId::new(1)]);
        assert_eq!(inner.enclosing(), Some(RegionId::new(1)));
        assert_eq!((inner.first_block(), inner.last_block()), (block_id(2), block_id(3)));

        let test = &graph.blocks()[2];
        assert_eq!(test.condition_kind(), ControlFlowConditionKind::WhenTrue);
        assert_eq!(test.branch_value().map(|v| v.kind()), Some(OperationKind::IsNull));
        let when_null = jump_of(&graph, 2);
        assert_eq!(when_null.destination(), Some(block_id(4)));
        assert_eq!(when_null.leaving_regions(), &[RegionId::new(2)]);
        assert_eq!(next_of(&graph, 1).entering_regions(), &[RegionId::new(2)]);

        assert_eq!(next_of(&graph, 3).destination(), Some(block_id(5)));
        assert_eq!(graph.blocks()[5].predecessors(), &[block_id(3), block_id(4)]);
    }

    #[test]
    fn while_true_loops_on_itself() {
        let f = Fixture::new();
        let body = block(
            vec![while_loop(boolean(true), block(vec![expr_stmt(f.call(f.y()))], vec![]), (1, 2))],
            vec![],
        );
        let graph = build(&body);

        assert_eq!(graph.blocks().len(), 3);
        let loop_block = &graph.blocks()[1];
        assert_eq!(loop_block.condition_kind(), ControlFlowConditionKind::None);
        assert_eq!(next_of(&graph, 1).destination(), Some(block_id(1)));
        assert_eq!(loop_block.predecessors(), &[block_id(0), block_id(1)]);
        assert!(!graph.exit().is_reachable());
        assert!(graph.exit().predecessors().is_empty());
    }

    #[test]
    fn short_circuit_condition_jumps_twice() {
        // if (b && y == 1) Use(y);
        let f = Fixture::new();
        let condition = binary(
            BinaryOperatorKind::ConditionalAnd,
            f.b(),
            binary(BinaryOperatorKind::Equals, f.y(), int(1), primitives::BOOL),
            primitives::BOOL,
        );
        let body = block(vec![if_stmt(condition, expr_stmt(f.call(f.y())), None)], vec![]);
        let graph = build(&body);

        assert_eq!(graph.blocks().len(), 5);
        assert_eq!(graph.capture_count(), 0);
        assert_eq!(jump_of(&graph, 1).destination(), Some(block_id(4)));
        assert_eq!(jump_of(&graph, 2).destination(), Some(block_id(4)));
        assert_eq!(graph.blocks()[2].branch_value().map(|v| v.kind()), Some(OperationKind::Binary));
        assert_eq!(kinds(&graph, 3), vec![OperationKind::ExpressionStatement]);
        assert_eq!(graph.exit().predecessors(), &[block_id(1), block_id(2), block_id(3)]);
    }

    #[test]
    fn constant_false_condition_skips_the_branch() {
        let f = Fixture::new();
        let body = block(
            vec![if_stmt(boolean(false), expr_stmt(f.call(f.y())), None)],
            vec![],
        );
        let graph = build(&body);

        assert_eq!(graph.blocks().len(), 3);
        assert_eq!(next_of(&graph, 0).destination(), Some(block_id(2)));
        assert!(!graph.blocks()[1].is_reachable());
        assert_eq!(graph.exit().predecessors(), &[block_id(0), block_id(1)]);
    }

    #[test]
    fn return_carries_its_value() {
        let f = Fixture::new();
        let body = block(vec![ret(Some(conditional(f.b(), int(1), int(2))))], vec![]);
        let graph = build(&body);

        assert_eq!(graph.blocks().len(), 6);
        let branch = next_of(&graph, 4);
        assert_eq!(branch.semantics(), ControlFlowBranchSemantics::Return);
        assert_eq!(branch.destination(), Some(block_id(5)));
        assert_eq!(branch.leaving_regions(), &[RegionId::new(1)]);
        assert_eq!(
            graph.blocks()[4].branch_value().map(|v| v.kind()),
            Some(OperationKind::FlowCaptureReference)
        );
        assert_eq!(graph.exit().predecessors(), &[block_id(4)]);
    }

    #[test]
    fn throw_leaves_without_destination() {
        let f = Fixture::new();
        let body = block(vec![throw(Some(local(f.e, primitives::EXCEPTION)))], vec![]);
        let graph = build(&body);

        let branch = next_of(&graph, 1);
        assert_eq!(branch.semantics(), ControlFlowBranchSemantics::Throw);
        assert_eq!(branch.destination(), None);
        assert!(graph.blocks()[1].branch_value().is_some());
        assert!(!graph.exit().is_reachable());
    }

    #[test]
    fn switch_tests_captured_value_then_runs_sections() {
        // switch (y) { case 1: Use(1); break; default: Use(2); break; }
        let f = Fixture::new();
        let body = block(
            vec![switch(
                f.y(),
                vec![
                    case(vec![case_value(1, int(1))], vec![expr_stmt(f.call(int(1))), brk(9)]),
                    case(vec![default_clause(2)], vec![expr_stmt(f.call(int(2))), brk(9)]),
                ],
                9,
            )],
            vec![],
        );
        let graph = build(&body);

        assert_eq!(graph.blocks().len(), 5);
        assert_eq!(kinds(&graph, 1), vec![OperationKind::FlowCapture]);
        let test = graph.blocks()[1].branch_value().expect("switch test");
        assert!(matches!(
            test.node(),
            OperationNode::Binary {
                op: BinaryOperatorKind::Equals,
                ..
            }
        ));
        assert_eq!(test.result_type(), Some(primitives::BOOL));
        assert!(test.is_implicit());
        assert_eq!(jump_of(&graph, 1).destination(), Some(block_id(3)));
        assert_eq!(next_of(&graph, 1).destination(), Some(block_id(2)));
        assert_eq!(graph.exit().predecessors(), &[block_id(2), block_id(3)]);

        let region = &graph.regions()[1];
        assert_eq!(region.capture_ids(), &[CaptureId::new(0)]);
        assert_eq!((region.first_block(), region.last_block()), (block_id(1), block_id(1)));
    }

    #[test]
    fn void_conditional_access_emits_bare_invocation() {
        // x?.Use(<instance>);
        let f = Fixture::new();
        let access = conditional_access(f.x(), f.call(access_instance(primitives::OBJECT)));
        let graph = build(&block(vec![expr_stmt(access)], vec![]));

        assert_eq!(graph.blocks().len(), 4);
        assert_eq!(graph.blocks()[1].condition_kind(), ControlFlowConditionKind::WhenTrue);
        let when_null = jump_of(&graph, 1);
        assert_eq!(when_null.destination(), Some(block_id(3)));
        assert_eq!(when_null.leaving_regions(), &[RegionId::new(1)]);
        assert_eq!(kinds(&graph, 2), vec![OperationKind::Invocation]);
        assert_eq!(graph.regions()[1].capture_ids(), &[CaptureId::new(0)]);
    }

    #[test]
    fn invalid_statement_is_kept_as_is() {
        let f = Fixture::new();
        let graph = build(&block(vec![invalid(vec![f.y()])], vec![]));

        let op = &graph.blocks()[1].operations()[0];
        assert_eq!(op.kind(), OperationKind::Invalid);
        assert!(op.is_invalid());
    }

    #[test]
    fn backward_goto_targets_label_block() {
        let f = Fixture::new();
        let body = block(vec![labeled(1, Some(expr_stmt(f.call(f.y())))), goto(1)], vec![]);
        let graph = build(&body);

        assert_eq!(next_of(&graph, 1).destination(), Some(block_id(1)));
        assert!(!graph.exit().is_reachable());
    }

    #[test]
    fn undefined_label_is_rejected() {
        let body = block(vec![goto(7)], vec![]);
        let err = build_err(&body, FlowGraphOptions::default());
        assert!(matches!(err, FlowGraphError::UndefinedLabel { label } if label == LabelId::new(7)));
        assert!(!err.is_internal());
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let body = block(vec![labeled(3, None), labeled(3, None)], vec![]);
        let err = build_err(&body, FlowGraphOptions::default());
        assert!(matches!(err, FlowGraphError::DuplicateLabel { label, .. } if label == LabelId::new(3)));
    }

    #[test]
    fn nesting_beyond_limit_is_rejected() {
        let body = block(vec![block(vec![block(vec![block(vec![empty()], vec![])], vec![])], vec![])], vec![]);
        let err = build_err(&body, FlowGraphOptions::default().with_max_depth(3));
        assert!(matches!(err, FlowGraphError::NestingTooDeep { limit: 3, .. }));
    }

    /// `i = y + (y + (... + y));`
    fn right_nested_sum(f: &Fixture, depth: usize) -> Operation {
        let mut sum = f.y();
        for _ in 0..depth {
            sum = binary(BinaryOperatorKind::Add, f.y(), sum, primitives::INT32);
        }
        block(vec![expr_stmt(assign(f.i(), sum))], vec![])
    }

    #[test]
    fn right_nested_operands_build_within_the_default_limit() {
        let f = Fixture::new();
        let graph = build(&right_nested_sum(&f, 400));
        assert_eq!(graph.blocks().len(), 3);
        assert_eq!(graph.blocks()[1].operations().len(), 1);
    }

    #[test]
    fn right_nested_operands_past_the_limit_are_rejected() {
        let f = Fixture::new();
        let err = build_err(&right_nested_sum(&f, 2000), FlowGraphOptions::default());
        assert!(matches!(err, FlowGraphError::NestingTooDeep { limit: 512, .. }));
        assert!(!err.is_internal());
    }

    #[test]
    fn nested_conditionals_build_within_the_default_limit() {
        // i = b ? (b ? (... : 1) : 1) : 1;
        let f = Fixture::new();
        let mut value = f.y();
        for _ in 0..300 {
            value = conditional(f.b(), value, int(1));
        }
        let graph = build(&block(vec![expr_stmt(assign(f.i(), value))], vec![]));
        assert!(graph.capture_count() >= 300);
    }

    #[test]
    fn flow_only_operations_are_rejected_as_input() {
        let f = Fixture::new();
        let is_null = Operation::new(
            OperationNode::IsNull {
                operand: Box::new(f.x()),
            },
            Some(primitives::BOOL),
            at(4),
        );
        let err = build_err(&block(vec![expr_stmt(is_null)], vec![]), FlowGraphOptions::default());
        assert!(matches!(
            err,
            FlowGraphError::UnexpectedOperation {
                kind: OperationKind::IsNull,
                ..
            }
        ));
    }
}
