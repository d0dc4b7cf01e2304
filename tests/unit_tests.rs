//! End-to-end tests: bound bodies lowered through both stages.
//!
//! Each test binds a small method body with the fixture's symbols, runs
//! [`semflow::lower_method`] with graph validation on, and checks the
//! shape of the operation tree and flow graph that come out.


use bumpalo::Bump;
use petgraph::algo::is_cyclic_directed;
use semflow::prelude::*;
use semflow_core::{BinaryOperatorKind, ConversionKind, SymbolError, UnaryOperatorKind};
use test_harness::*;

fn add_invocations<'g>(graph: &'g ControlFlowGraph, add: SymbolId) -> Vec<(BlockId, usize, &'g Operation)> {
    let mut found = Vec::new();
    for block in graph.blocks() {
        for (index, statement) in block.operations().iter().enumerate() {
            for op in statement.descendants() {
                if let OperationNode::Invocation { method, .. } = op.node()
                    && *method == add
                {
                    found.push((block.ordinal(), index, op));
                }
            }
        }
    }
    found
}

// =============================================================================
// Conditional values
// =============================================================================

#[test]
fn test_conditional_awaits_share_one_capture() {
    // i = b ? await Fetch(2) : await Fetch(3);
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let value = f.conditional(
        f.param(fx.b),
        f.await_(f.call(None, fx.fetch, vec![f.int(2)]), primitives::INT32),
        f.await_(f.call(None, fx.fetch, vec![f.int(3)]), primitives::INT32),
    );
    let body = f.block(vec![], vec![f.expr_stmt(f.assign(f.local(fx.i), value))]);

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);
    assert_eq!(count_kind(graph, OperationKind::Conditional), 0);
    assert_eq!(count_kind(graph, OperationKind::Await), 2);

    let awaits: Vec<_> = capture_sites(graph)
        .into_iter()
        .filter(|site| site.value.kind() == OperationKind::Await)
        .collect();
    assert_eq!(awaits.len(), 2);
    assert_eq!(awaits[0].id, awaits[1].id);
    assert_ne!(awaits[0].block, awaits[1].block);
    let merged = awaits[0].id;

    let (assignment_block, assignment) = graph
        .blocks()
        .iter()
        .flat_map(|b| b.operations().iter().map(move |op| (b.ordinal(), op)))
        .find(|(_, op)| op.descendants().any(|d| d.kind() == OperationKind::SimpleAssignment))
        .expect("assignment statement");
    assert!(captures_read(assignment).contains(&merged));
    assert!(assignment_block > awaits[0].block && assignment_block > awaits[1].block);

    let merge = graph.block(assignment_block).expect("merge block");
    assert_eq!(merge.predecessors(), &[awaits[0].block, awaits[1].block]);
}

#[test]
fn test_conditional_address_of_keeps_explicit_cast() {
    // ptr = b ? (delegate*<void>)&M1 : &M2;
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let when_true = f.cast(
        f.address_of(f.method_group(None, "M1", Some(fx.m1)), fx.fn_ptr),
        fx.fn_ptr,
        ConversionKind::Identity,
    );
    let when_false = f.address_of(f.method_group(None, "M2", Some(fx.m2)), fx.fn_ptr);
    let value = f.conditional(f.param(fx.b), when_true, when_false);
    let body = f.block(vec![], vec![f.expr_stmt(f.assign(f.local(fx.ptr), value))]);

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);

    let branches: Vec<_> = capture_sites(graph)
        .into_iter()
        .filter(|site| matches!(site.value.kind(), OperationKind::Conversion | OperationKind::AddressOf))
        .collect();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].id, branches[1].id);

    let cast = branches[0].value;
    assert_eq!(cast.kind(), OperationKind::Conversion);
    assert!(!cast.is_implicit());
    assert_eq!(cast.result_type(), Some(fx.fn_ptr));
    assert_eq!(cast.children()[0].kind(), OperationKind::AddressOf);
    assert_eq!(cast.children()[0].children()[0].kind(), OperationKind::MethodReference);

    let bare = branches[1].value;
    assert_eq!(bare.kind(), OperationKind::AddressOf);
    assert_eq!(bare.children()[0].kind(), OperationKind::MethodReference);
}

#[test]
fn test_collection_initializer_adds_run_against_captured_object() {
    // Bag bag = new Bag { 1, b ? 2 : 3 };
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let initializer = f.collection_initializer(vec![
        (Some(fx.bag_add), vec![f.int(1)]),
        (Some(fx.bag_add), vec![f.conditional(f.param(fx.b), f.int(2), f.int(3))]),
    ]);
    let creation = f.new_object(Some(fx.bag_ctor), vec![], Some(initializer), fx.bag_type);
    let body = f.block(vec![fx.bag], vec![f.declare(fx.bag, Some(creation))]);

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);
    assert_eq!(literals_in_order(graph), vec![1, 2, 3]);

    let sites = capture_sites(graph);
    let creations: Vec<_> = sites
        .iter()
        .filter(|site| site.value.kind() == OperationKind::ObjectCreation)
        .collect();
    assert_eq!(creations.len(), 1);
    let object = creations[0].id;
    assert!(matches!(
        creations[0].value.node(),
        OperationNode::ObjectCreation { initializer: None, .. }
    ));

    let adds = add_invocations(graph, fx.bag_add);
    assert_eq!(adds.len(), 2);
    assert_ne!((adds[0].0, adds[0].1), (adds[1].0, adds[1].1));
    for (_, _, add) in &adds {
        let OperationNode::Invocation {
            instance: Some(instance), ..
        } = add.node()
        else {
            panic!("Add has no receiver");
        };
        assert!(matches!(instance.node(), OperationNode::FlowCaptureReference { id } if *id == object));
    }

    // The conditional argument has its own capture, written once per arm
    // and declared by a region nested in the object's.
    let argument: Vec<_> = sites
        .iter()
        .filter(|site| site.value.kind() == OperationKind::Literal)
        .collect();
    assert_eq!(argument.len(), 2);
    assert_eq!(argument[0].id, argument[1].id);
    assert_ne!(argument[0].id, object);
    assert!(captures_read(adds[1].2).contains(&argument[0].id));

    let declaring = |id: CaptureId| {
        graph
            .regions()
            .iter()
            .find(|r| r.capture_ids().contains(&id))
            .map(ControlFlowRegion::id)
            .expect("capture is declared")
    };
    let object_region = declaring(object);
    let argument_region = declaring(argument[0].id);
    assert_ne!(object_region, argument_region);
    assert!(graph.region_path(argument_region).contains(&object_region));

    let declared = graph
        .regions()
        .iter()
        .find(|r| r.locals().contains(&fx.bag))
        .expect("bag is declared");
    assert_eq!(declared.kind(), ControlFlowRegionKind::LocalLifetime);
}

// =============================================================================
// Invalid code
// =============================================================================

#[test]
fn test_address_of_unresolved_method_is_invalid() {
    // ptr = &M9;  (no such method)
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let address = f.address_of(f.method_group(None, "M9", None), primitives::ERROR_POINTER);
    let body = f.block(vec![], vec![f.expr_stmt(f.assign(f.local(fx.ptr), address))]);

    let lowered = fx.lower(&body);
    assert_invalid_propagates(&lowered.operation);
    assert_graph_properties(&lowered.graph);

    let address = lowered
        .graph
        .operations_in_order()
        .flat_map(Operation::descendants)
        .find(|op| op.kind() == OperationKind::AddressOf)
        .expect("address-of survives lowering");
    assert!(address.is_invalid());
    assert_eq!(address.result_type(), Some(primitives::ERROR_POINTER));
    let inner = address.children()[0];
    assert_eq!(inner.kind(), OperationKind::Invalid);
    assert!(inner.children().is_empty());

    let dump = lowered.dump_graph(&fx.symbols);
    assert!(dump.contains("AddressOf (Type: ?*, IsInvalid)"), "{dump}");
}

#[test]
fn test_invalid_branch_marks_only_its_capture() {
    // i = b ? Use(<bad x>) : 0;
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let broken = f.call(None, fx.use_, vec![f.bad(vec![f.param(fx.x)], None)]);
    let value = f.conditional(f.param(fx.b), broken, f.int(0));
    let body = f.block(vec![], vec![f.expr_stmt(f.assign(f.local(fx.i), value))]);

    let lowered = fx.lower(&body);
    assert!(lowered.operation.is_invalid());
    assert_invalid_propagates(&lowered.operation);
    assert_graph_properties(&lowered.graph);

    let arms: Vec<_> = capture_sites(&lowered.graph)
        .into_iter()
        .filter(|site| matches!(site.value.kind(), OperationKind::Invocation | OperationKind::Literal))
        .collect();
    assert_eq!(arms.len(), 2);
    assert!(arms[0].value.is_invalid());
    assert!(!arms[1].value.is_invalid());

    let assignment = lowered
        .graph
        .operations_in_order()
        .find(|op| op.descendants().any(|d| d.kind() == OperationKind::SimpleAssignment))
        .expect("assignment statement");
    assert!(assignment.is_invalid());
}

#[test]
fn test_missing_expression_still_lowers() {
    // Use(<missing>);
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(vec![], vec![f.expr_stmt(f.unresolved_call(None, "Nope", vec![f.missing()]))]);

    let lowered = fx.lower(&body);
    assert!(lowered.operation.is_invalid());
    assert_graph_properties(&lowered.graph);
    assert_eq!(lowered.graph.blocks().len(), 3);
}

// =============================================================================
// Loops and branches
// =============================================================================

#[test]
fn test_while_true_loops_on_itself() {
    // while (true) { ; }
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(
        vec![],
        vec![f.while_(
            f.bool_(true),
            f.block(vec![], vec![f.empty()]),
            LabelId::new(0),
            LabelId::new(1),
        )],
    );

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);
    assert_eq!(graph.blocks().len(), 3);

    let looping = &graph.blocks()[1];
    assert!(looping.operations().is_empty());
    let next = looping.fallthrough_successor().expect("loop branch");
    assert_eq!(next.destination(), Some(block_id(1)));
    assert_eq!(next.semantics(), ControlFlowBranchSemantics::Regular);

    assert_eq!(graph.exit().kind(), BasicBlockKind::Exit);
    assert!(!graph.exit().is_reachable());
    assert!(graph.exit().predecessors().is_empty());
    assert!(is_cyclic_directed(&graph.to_digraph()));
}

#[test]
fn test_for_loop_jumps_back_to_its_condition() {
    // for (i = 0; i < y; i++) Use(i);
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(
        vec![],
        vec![f.for_(
            vec![],
            vec![f.expr_stmt(f.assign(f.local(fx.i), f.int(0)))],
            Some(f.binary(BinaryOperatorKind::LessThan, f.local(fx.i), f.param(fx.y))),
            vec![f.expr_stmt(f.increment(f.local(fx.i), false, true))],
            f.expr_stmt(f.call(None, fx.use_, vec![f.local(fx.i)])),
            LabelId::new(0),
            LabelId::new(1),
        )],
    );

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);
    assert!(graph.exit().is_reachable());
    assert!(is_cyclic_directed(&graph.to_digraph()));

    let condition = graph
        .blocks()
        .iter()
        .find(|b| b.condition_kind() != ControlFlowConditionKind::None)
        .expect("condition block");
    assert_eq!(condition.condition_kind(), ControlFlowConditionKind::WhenFalse);
    let back_edges = condition
        .predecessors()
        .iter()
        .filter(|p| **p > condition.ordinal())
        .count();
    assert_eq!(back_edges, 1);
}

#[test]
fn test_constant_false_branch_is_unreachable() {
    // if (false) Use(y);
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(
        vec![],
        vec![f.if_(f.bool_(false), f.expr_stmt(f.call(None, fx.use_, vec![f.param(fx.y)])), None)],
    );

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);
    let call_block = graph
        .blocks()
        .iter()
        .find(|b| b.operations().iter().any(|op| op.descendants().any(|d| d.kind() == OperationKind::Invocation)))
        .expect("call block is kept");
    assert!(!call_block.is_reachable());
    assert!(graph.exit().is_reachable());
}

#[test]
fn test_switch_sections_follow_all_tests() {
    // switch (y) { case 1: Use(1); break; default: Use(2); break; }
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let exit = LabelId::new(0);
    let one = f.section(
        vec![f.case_value(f.int(1), LabelId::new(1))],
        vec![f.expr_stmt(f.call(None, fx.use_, vec![f.int(1)])), f.break_(Some(exit))],
    );
    let other = f.section(
        vec![f.default_case(LabelId::new(2))],
        vec![f.expr_stmt(f.call(None, fx.use_, vec![f.int(2)])), f.break_(Some(exit))],
    );
    let body = f.block(vec![], vec![f.switch(f.param(fx.y), vec![one, other], exit)]);

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);

    let value = capture_sites(graph)
        .into_iter()
        .find(|site| site.value.kind() == OperationKind::ParameterReference)
        .expect("switch value is captured");
    let test = graph
        .blocks()
        .iter()
        .find_map(|b| b.branch_value())
        .expect("case test");
    assert_eq!(test.kind(), OperationKind::Binary);
    assert!(captures_read(test).contains(&value.id));
    assert_eq!(graph.exit().predecessors().len(), 2);
}

#[test]
fn test_side_effects_keep_source_order() {
    // i = Use(1) + (b ? Use(2) : Use(3)) + Use(4);
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let call = |n| f.call(None, fx.use_, vec![f.int(n)]);
    let middle = f.conditional(f.param(fx.b), call(2), call(3));
    let sum = f.binary(
        BinaryOperatorKind::Add,
        f.binary(BinaryOperatorKind::Add, call(1), middle),
        call(4),
    );
    let body = f.block(vec![], vec![f.expr_stmt(f.assign(f.local(fx.i), sum))]);

    let lowered = fx.lower(&body);
    assert_graph_properties(&lowered.graph);
    assert_eq!(literals_in_order(&lowered.graph), vec![1, 2, 3, 4]);
    assert_eq!(count_kind(&lowered.graph, OperationKind::Invocation), 4);
}

#[test]
fn test_logical_not_of_and_branches_on_both_operands() {
    // if (!(b && y == 1)) Use(y);
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let both = f.binary(
        BinaryOperatorKind::ConditionalAnd,
        f.param(fx.b),
        f.binary(BinaryOperatorKind::Equals, f.param(fx.y), f.int(1)),
    );
    let body = f.block(
        vec![],
        vec![f.if_(
            f.unary(UnaryOperatorKind::Not, both),
            f.expr_stmt(f.call(None, fx.use_, vec![f.param(fx.y)])),
            None,
        )],
    );

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);
    let jumps = graph
        .blocks()
        .iter()
        .filter(|b| b.condition_kind() != ControlFlowConditionKind::None)
        .count();
    assert_eq!(jumps, 2);
    assert_eq!(count_kind(graph, OperationKind::Binary), 1);
}

// =============================================================================
// Exception handling
// =============================================================================

#[test]
fn test_filtered_catch_and_finally_regions() {
    // try { Use(y); } catch (System.Exception) when (b) { Use(1); } finally { Use(2); }
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let call = |n| f.expr_stmt(f.call(None, fx.use_, vec![n]));
    let handler = f.catch(
        Some(primitives::EXCEPTION),
        None,
        Some(f.param(fx.b)),
        f.block(vec![], vec![call(f.int(1))]),
    );
    let body = f.block(
        vec![],
        vec![f.try_(
            f.block(vec![], vec![call(f.param(fx.y))]),
            vec![handler],
            Some(f.block(vec![], vec![call(f.int(2))])),
        )],
    );

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);

    let kinds: Vec<_> = graph.regions().iter().map(ControlFlowRegion::kind).collect();
    for kind in [
        ControlFlowRegionKind::TryAndFinally,
        ControlFlowRegionKind::TryAndCatch,
        ControlFlowRegionKind::FilterAndHandler,
        ControlFlowRegionKind::Filter,
        ControlFlowRegionKind::Catch,
        ControlFlowRegionKind::Finally,
    ] {
        assert!(kinds.contains(&kind), "missing {kind:?} in {kinds:?}");
    }

    let catch = graph
        .regions()
        .iter()
        .find(|r| r.kind() == ControlFlowRegionKind::FilterAndHandler)
        .expect("filtered catch");
    assert_eq!(catch.exception_type(), Some(primitives::EXCEPTION));

    // The filter test keeps its condition next to the rejecting branch.
    let filter = graph
        .regions()
        .iter()
        .find(|r| r.kind() == ControlFlowRegionKind::Filter)
        .expect("filter region");
    let test = &graph.blocks()[filter.last_block().as_usize()];
    assert_eq!(test.condition_kind(), ControlFlowConditionKind::WhenTrue);
    assert!(test.branch_value().is_some());
    let reject = test.fallthrough_successor().expect("filter rejects");
    assert_eq!(reject.semantics(), ControlFlowBranchSemantics::StructuredExceptionHandling);
    assert_eq!(reject.destination(), None);

    let leaves_try = graph
        .blocks()
        .iter()
        .flat_map(BasicBlock::successors)
        .any(|branch| !branch.finally_regions().is_empty());
    assert!(leaves_try);

    let dump = lowered.dump_graph(&fx.symbols);
    assert!(dump.contains(".finally"), "{dump}");
    assert!(dump.contains(".filter"), "{dump}");
}

#[test]
fn test_throw_ends_its_block() {
    // if (b) throw x; Use(y);
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(
        vec![],
        vec![
            f.if_(f.param(fx.b), f.throw(Some(f.param(fx.x))), None),
            f.expr_stmt(f.call(None, fx.use_, vec![f.param(fx.y)])),
        ],
    );

    let lowered = fx.lower(&body);
    let graph = &lowered.graph;
    assert_graph_properties(graph);
    let thrower = graph
        .blocks()
        .iter()
        .find(|b| {
            b.fallthrough_successor()
                .is_some_and(|s| s.semantics() == ControlFlowBranchSemantics::Throw)
        })
        .expect("throwing block");
    assert_eq!(thrower.fallthrough_successor().and_then(ControlFlowBranch::destination), None);
    assert_eq!(thrower.branch_value().map(Operation::kind), Some(OperationKind::ParameterReference));
}

// =============================================================================
// Errors and options
// =============================================================================

#[test]
fn test_deep_right_nested_sum_lowers() {
    // i = y + (y + (... + y));
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let mut sum = f.param(fx.y);
    for _ in 0..200 {
        sum = f.binary(BinaryOperatorKind::Add, f.param(fx.y), sum);
    }
    let body = f.block(vec![fx.i], vec![f.expr_stmt(f.assign(f.local(fx.i), sum))]);

    match fx.try_lower(&body, &validating()) {
        Ok(lowered) => {
            assert_eq!(count_kind(&lowered.graph, OperationKind::Binary), 200);
            assert_graph_properties(&lowered.graph);
        }
        Err(err) => assert!(
            matches!(err, semflow::Error::FlowGraph(FlowGraphError::NestingTooDeep { .. })),
            "unexpected error: {err}"
        ),
    }
}

#[test]
fn test_goto_undefined_label_fails() {
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(vec![], vec![f.goto(Some(LabelId::new(7)))]);

    let err = fx.try_lower(&body, &validating()).unwrap_err();
    assert_eq!(
        err,
        semflow::Error::FlowGraph(FlowGraphError::UndefinedLabel { label: LabelId::new(7) })
    );
    assert!(!err.is_internal());
}

#[test]
fn test_lower_method_requires_a_method() {
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(vec![], vec![]);

    let err = semflow::lower_method(&fx.symbols, fx.i, &body, &validating()).unwrap_err();
    assert!(matches!(err, semflow::Error::Symbol(SymbolError::WrongSymbolKind { .. })));
}

#[test]
fn test_unpacked_graph_keeps_pass_through_blocks() {
    // if (b) { } else { Use(1); } Use(y);
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(
        vec![],
        vec![
            f.if_(
                f.param(fx.b),
                f.block(vec![], vec![]),
                Some(f.block(vec![], vec![f.expr_stmt(f.call(None, fx.use_, vec![f.int(1)]))])),
            ),
            f.expr_stmt(f.call(None, fx.use_, vec![f.param(fx.y)])),
        ],
    );

    let packed = fx.lower(&body);
    let unpacked = fx
        .try_lower(
            &body,
            &PipelineOptions::default().with_flow(FlowGraphOptions::default().with_packing(false).with_validation(true)),
        )
        .expect("unpacked graph builds");

    // The empty `then` branch is a block of its own only when packing is off.
    let pass_through = |graph: &ControlFlowGraph| {
        let last = graph.blocks().len() - 1;
        graph.blocks()[1..last]
            .iter()
            .filter(|b| b.operations().is_empty() && b.conditional_successor().is_none())
            .count()
    };
    assert_eq!(pass_through(&packed.graph), 0);
    assert_eq!(pass_through(&unpacked.graph), 1);
    assert_eq!(unpacked.graph.blocks().len(), packed.graph.blocks().len() + 1);

    // Packing redirects the condition's fallthrough straight to the join.
    let condition = &packed.graph.blocks()[1];
    let join = condition.fallthrough_successor().and_then(|b| b.destination());
    let join = join.and_then(|id| packed.graph.block(id)).expect("fallthrough target");
    assert_eq!(literals_in_order(&packed.graph), vec![1]);
    assert_eq!(join.operations().len(), 1);
    assert!(join.predecessors().contains(&condition.ordinal()));

    assert_graph_properties(&packed.graph);
    assert_graph_properties(&unpacked.graph);
    assert_eq!(packed.operation, unpacked.operation);
}

#[test]
fn test_dumps_are_stable() {
    let fx = Fixture::new();
    let arena = Bump::new();
    let f = fx.factory(&arena);
    let body = f.block(vec![fx.i], vec![f.declare(fx.i, Some(f.int(1)))]);

    let lowered = fx.lower(&body);
    let first = lowered.dump_graph(&fx.symbols);
    assert_eq!(first, fx.lower(&body).dump_graph(&fx.symbols));
    assert!(first.starts_with("Block[B0] - Entry"), "{first}");
    assert!(first.contains("Locals: [int i]"), "{first}");
    assert!(lowered.dump_operation(&fx.symbols).starts_with("Block"));
}

#[test]
fn test_outputs_can_cross_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SymbolTable>();
    assert_send_sync::<Operation>();
    assert_send_sync::<ControlFlowGraph>();
    assert_send_sync::<LoweredBody>();
    assert_send_sync::<semflow::Error>();
}
