//! Value-producing operations.
//!
//! [`FlowBuilder::visit_expr`] returns the lowered operation; anything it
//! had to emit along the way (captures, branches) is already in the
//! blocks. Operations without control flow are rebuilt with their
//! lowered children, pushing each child onto the evaluation stack so a
//! branching sibling can spill it.

use semflow_core::{BinaryOperatorKind, CaptureId, ConstantValue, Span, primitives};
use semflow_operations::{InstanceReferenceKind, Operation, OperationHeader, OperationNode};

use super::{BlockIdx, FlowBuilder, RegionIdx, capture_reference, placeholder, unexpected};
use crate::error::{FlowGraphError, Result};

/// Pending work while lowering an operand tree.
enum ExprWork {
    /// Lower this operation, `level` below the tree's root.
    Visit { op: Operation, level: usize },
    /// Every child is lowered and on the evaluation stack above `base`.
    Rebuild {
        node: OperationNode,
        header: OperationHeader,
        base: usize,
    },
}

/// What `lower_special` made of an operation.
enum Lowered {
    Done(Operation),
    /// No control flow of its own; lower the children in order.
    Plain(OperationNode, OperationHeader),
}

impl FlowBuilder<'_> {
    /// Operand trees without control flow (operator chains, call
    /// arguments, member accesses) are walked with an explicit work list;
    /// only branching operations recurse.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn visit_expr(&mut self, op: Operation) -> Result<Operation> {
        let span = op.span();
        self.lower_tree(vec![ExprWork::Visit { op, level: 1 }], span)
    }

    /// Rebuild `node` with each child lowered in evaluation order.
    fn visit_children(&mut self, mut node: OperationNode, header: OperationHeader) -> Result<Operation> {
        let span = header.span;
        let children = take_children(&mut node);
        let mut work = vec![ExprWork::Rebuild {
            node,
            header,
            base: self.eval_stack.len(),
        }];
        work.extend(children.into_iter().rev().map(|op| ExprWork::Visit { op, level: 1 }));
        self.lower_tree(work, span)
    }

    fn lower_tree(&mut self, mut work: Vec<ExprWork>, span: Span) -> Result<Operation> {
        let outer = self.depth;
        let base = self.eval_stack.len();
        let lowered = self.run_expr_work(&mut work, outer);
        self.depth = outer;
        lowered?;

        let mut operands = self.take_operands(base);
        match (operands.pop(), operands.is_empty()) {
            (Some(op), true) => Ok(op),
            _ => Err(FlowGraphError::UnbalancedStack { span }),
        }
    }

    fn run_expr_work(&mut self, work: &mut Vec<ExprWork>, outer: usize) -> Result<()> {
        while let Some(item) = work.pop() {
            match item {
                ExprWork::Visit { op, level } => {
                    self.depth = outer + level - 1;
                    self.enter_nesting(op.span())?;
                    match self.lower_special(op)? {
                        Lowered::Done(lowered) => self.push_operand(lowered),
                        Lowered::Plain(mut node, header) => {
                            let children = take_children(&mut node);
                            work.push(ExprWork::Rebuild {
                                node,
                                header,
                                base: self.eval_stack.len(),
                            });
                            work.extend(
                                children
                                    .into_iter()
                                    .rev()
                                    .map(|op| ExprWork::Visit { op, level: level + 1 }),
                            );
                        }
                    }
                }
                ExprWork::Rebuild { mut node, header, base } => {
                    let mut operands = self.take_operands(base).into_iter();
                    for slot in node.children_mut() {
                        match operands.next() {
                            Some(operand) => *slot = operand,
                            None => return Err(FlowGraphError::UnbalancedStack { span: header.span }),
                        }
                    }
                    self.push_operand(Operation::from_parts(node, header));
                }
            }
        }
        Ok(())
    }

    /// Lower `op` if it needs more than its children lowered in order.
    fn lower_special(&mut self, op: Operation) -> Result<Lowered> {
        let kind = op.kind();
        if kind.is_flow_only() || kind.is_statement() {
            return Err(unexpected(&op));
        }
        let (node, header) = op.into_parts();
        let lowered = match node {
            OperationNode::Conditional {
                condition,
                when_true,
                when_false: Some(when_false),
                ..
            } => self.visit_conditional(*condition, *when_true, *when_false, header),
            OperationNode::Conditional { .. } => Err(FlowGraphError::UnexpectedOperation {
                kind,
                span: header.span,
            }),
            OperationNode::Coalesce { value, when_null } => self.visit_coalesce(*value, *when_null, header),
            OperationNode::ConditionalAccess {
                operation,
                when_not_null,
            } => {
                let lowered = self.visit_conditional_access(*operation, *when_not_null, &header, true)?;
                lowered.ok_or(FlowGraphError::UnbalancedStack { span: header.span })
            }
            OperationNode::ConditionalAccessInstance => match self.conditional_access.last() {
                Some(&(id, _)) => Ok(capture_reference(id, &header)),
                None => Err(FlowGraphError::UnexpectedOperation {
                    kind,
                    span: header.span,
                }),
            },
            OperationNode::InstanceReference {
                kind: InstanceReferenceKind::ImplicitReceiver,
            } if !self.implicit_receivers.is_empty() => {
                let (id, _) = self.implicit_receivers[self.implicit_receivers.len() - 1];
                Ok(capture_reference(id, &header))
            }
            OperationNode::Binary {
                op,
                left,
                right,
                method: None,
            } if op.is_short_circuit() && header.constant.is_none() => {
                self.visit_logical_value(op, *left, *right, header)
            }
            node @ OperationNode::Binary { .. } => return Ok(Lowered::Plain(node, header)),
            OperationNode::IsPattern { value, pattern } if has_combinators(&pattern) => {
                self.visit_pattern_value(*value, *pattern, header)
            }
            OperationNode::AnonymousFunction { symbol, body } => Ok(Operation::from_parts(
                OperationNode::AnonymousFunction { symbol, body },
                header,
            )),
            node if has_initializer(&node) => self.visit_initialized_creation(node, header),
            node => return Ok(Lowered::Plain(node, header)),
        };
        lowered.map(Lowered::Done)
    }

    /// Lower an operation whose value is discarded. Returns `None` when
    /// nothing is left to evaluate as a statement.
    pub(super) fn visit_void_expr(&mut self, op: Operation) -> Result<Option<Operation>> {
        if !matches!(op.node(), OperationNode::ConditionalAccess { .. }) {
            return self.visit_expr(op).map(Some);
        }
        self.enter_nesting(op.span())?;
        let (node, header) = op.into_parts();
        let lowered = match node {
            OperationNode::ConditionalAccess {
                operation,
                when_not_null,
            } => self.visit_conditional_access(*operation, *when_not_null, &header, false),
            node => self.visit_children(node, header).map(Some),
        };
        self.leave_nesting();
        lowered
    }

    // ------------------------------------------------------------------------
    // Branching expressions
    // ------------------------------------------------------------------------

    fn visit_conditional(
        &mut self,
        condition: Operation,
        when_true: Operation,
        when_false: Operation,
        header: OperationHeader,
    ) -> Result<Operation> {
        self.spill_eval_stack()?;
        let result_region = self.ensure_frame_region()?;
        let when_false_block = self.new_block();
        let after = self.new_block();

        self.push_frame();
        self.visit_condition_jump(condition, false, when_false_block)?;
        self.pop_frame(header.span)?;

        let result = self.capture_arm(when_true, result_region, None, Some(after))?;
        self.append_block(when_false_block);
        self.capture_arm(when_false, result_region, Some(result), None)?;
        self.append_block(after);
        Ok(capture_reference(result, &header))
    }

    /// Lower one arm of a branching expression in its own frame and
    /// capture its value into `id` (allocated in `result_region` when
    /// `None`). Jumps to `exit` before the arm's region closes.
    fn capture_arm(
        &mut self,
        arm: Operation,
        result_region: RegionIdx,
        id: Option<CaptureId>,
        exit: Option<BlockIdx>,
    ) -> Result<CaptureId> {
        let span = arm.span();
        self.push_frame();
        let value = self.visit_expr(arm)?;
        let id = match id {
            Some(id) => id,
            None => self.new_capture(result_region),
        };
        self.capture(id, value);
        if let Some(exit) = exit {
            self.unconditional_branch(exit);
        }
        self.pop_frame(span)?;
        Ok(id)
    }

    fn visit_coalesce(
        &mut self,
        value: Operation,
        when_null: Operation,
        header: OperationHeader,
    ) -> Result<Operation> {
        self.spill_eval_stack()?;
        let result_region = self.ensure_frame_region()?;
        let when_null_block = self.new_block();
        let after = self.new_block();

        self.push_frame();
        let test_region = self.ensure_frame_region()?;
        let value = self.visit_expr(value)?;
        let value_header = value.header();
        let test = self.new_capture(test_region);
        self.capture(test, value);
        self.conditional_branch(is_null_test(test, &value_header), true, when_null_block);
        let result = self.new_capture(result_region);
        self.capture(result, capture_reference(test, &value_header));
        self.unconditional_branch(after);
        self.pop_frame(header.span)?;

        self.append_block(when_null_block);
        self.capture_arm(when_null, result_region, Some(result), None)?;
        self.append_block(after);
        Ok(capture_reference(result, &header))
    }

    /// `operation?.when_not_null`. With `needs_result` unset the value is
    /// evaluated for its effects only and `None` is returned.
    fn visit_conditional_access(
        &mut self,
        operation: Operation,
        when_not_null: Operation,
        header: &OperationHeader,
        needs_result: bool,
    ) -> Result<Option<Operation>> {
        self.spill_eval_stack()?;
        let result_region = if needs_result {
            Some(self.ensure_frame_region()?)
        } else {
            None
        };
        let after = self.new_block();
        let when_null_block = if needs_result { self.new_block() } else { after };

        self.push_frame();
        let test_region = self.ensure_frame_region()?;
        let receiver = self.visit_expr(operation)?;
        let receiver_header = receiver.header();
        let test = self.new_capture(test_region);
        self.capture(test, receiver);
        self.conditional_branch(is_null_test(test, &receiver_header), true, when_null_block);

        self.conditional_access.push((test, receiver_header));
        let value = if needs_result {
            self.visit_expr(when_not_null).map(Some)
        } else {
            self.visit_void_expr(when_not_null)
        };
        self.conditional_access.pop();
        let value = value?;

        let result = match (result_region, value) {
            (Some(region), Some(value)) => {
                let id = self.new_capture(region);
                self.capture(id, value);
                Some(id)
            }
            (_, value) => {
                if let Some(value) = value {
                    self.add_statement(value);
                }
                None
            }
        };
        self.unconditional_branch(after);
        self.pop_frame(header.span)?;

        if let Some(id) = result {
            self.append_block(when_null_block);
            let default = Operation::new(OperationNode::DefaultValue, header.ty, header.span).implicit();
            self.capture(id, default);
        }
        self.append_block(after);
        Ok(result.map(|id| capture_reference(id, header)))
    }

    /// `a && b` or `a || b` whose value is used.
    fn visit_logical_value(
        &mut self,
        op: BinaryOperatorKind,
        left: Operation,
        right: Operation,
        header: OperationHeader,
    ) -> Result<Operation> {
        self.spill_eval_stack()?;
        let result_region = self.ensure_frame_region()?;
        let short_circuit = self.new_block();
        let after = self.new_block();
        let is_and = op == BinaryOperatorKind::ConditionalAnd;

        self.push_frame();
        self.visit_condition_jump(left, !is_and, short_circuit)?;
        self.pop_frame(header.span)?;

        let result = self.capture_arm(right, result_region, None, Some(after))?;
        self.append_block(short_circuit);
        self.capture(result, bool_literal(!is_and, &header));
        self.append_block(after);
        Ok(capture_reference(result, &header))
    }

    /// `value is p1 and p2` (or `or`, `not`) whose value is used.
    fn visit_pattern_value(
        &mut self,
        value: Operation,
        pattern: Operation,
        header: OperationHeader,
    ) -> Result<Operation> {
        self.spill_eval_stack()?;
        let result_region = self.ensure_frame_region()?;
        let input = self.capture_pattern_input(value, result_region)?;
        let when_false = self.new_block();
        let after = self.new_block();

        self.pattern_jump(&input, pattern, false, when_false)?;
        let result = self.new_capture(result_region);
        self.capture(result, bool_literal(true, &header));
        self.unconditional_branch(after);
        self.append_block(when_false);
        self.capture(result, bool_literal(false, &header));
        self.append_block(after);
        Ok(capture_reference(result, &header))
    }

    /// Evaluate a pattern's input once; the returned reference stands in
    /// for it in every test.
    pub(super) fn capture_pattern_input(&mut self, value: Operation, region: RegionIdx) -> Result<Operation> {
        let value = self.visit_expr(value)?;
        let value_header = value.header();
        let id = self.new_capture(region);
        self.capture(id, value);
        Ok(capture_reference(id, &value_header))
    }

    // ------------------------------------------------------------------------
    // Object and collection initializers
    // ------------------------------------------------------------------------

    /// `new T(args) { a = 1, b = 2 }`: capture the new object, then run
    /// each initializer as its own statement against that capture.
    fn visit_initialized_creation(&mut self, mut node: OperationNode, header: OperationHeader) -> Result<Operation> {
        let initializer = match &mut node {
            OperationNode::ObjectCreation { initializer, .. }
            | OperationNode::DynamicObjectCreation { initializer, .. }
            | OperationNode::TypeParameterObjectCreation { initializer } => initializer.take(),
            _ => None,
        };
        let creation = self.visit_children(node, header)?;
        let Some(initializer) = initializer else {
            return Ok(creation);
        };
        let (initializer_node, initializer_header) = initializer.into_parts();
        let OperationNode::ObjectOrCollectionInitializer { initializers } = initializer_node else {
            return Err(unexpected(&Operation::from_parts(initializer_node, initializer_header)));
        };

        self.spill_eval_stack()?;
        let region = self.ensure_frame_region()?;
        let creation_header = creation.header();
        let id = self.new_capture(region);
        self.capture(id, creation);

        for element in initializers {
            let span = element.span();
            self.push_frame();
            self.implicit_receivers.push((id, creation_header.clone()));
            let lowered = self.visit_expr(element);
            self.implicit_receivers.pop();
            self.add_statement(lowered?);
            self.pop_frame(span)?;
        }
        Ok(capture_reference(id, &creation_header))
    }
}

/// Move the children out of `node`, leaving placeholders.
fn take_children(node: &mut OperationNode) -> Vec<Operation> {
    node.children_mut()
        .into_iter()
        .map(|slot| std::mem::replace(slot, placeholder()))
        .collect()
}

fn has_initializer(node: &OperationNode) -> bool {
    matches!(
        node,
        OperationNode::ObjectCreation {
            initializer: Some(_),
            ..
        } | OperationNode::DynamicObjectCreation {
            initializer: Some(_),
            ..
        } | OperationNode::TypeParameterObjectCreation { initializer: Some(_) }
    )
}

/// Whether a pattern needs branching to test: it combines sub-patterns
/// with `and`/`or`, possibly under a `not`.
pub(super) fn has_combinators(pattern: &Operation) -> bool {
    match pattern.node() {
        OperationNode::BinaryPattern { .. } => true,
        OperationNode::NegatedPattern { pattern } => has_combinators(pattern),
        _ => false,
    }
}

pub(super) fn is_null_test(id: CaptureId, tested: &OperationHeader) -> Operation {
    Operation::new(
        OperationNode::IsNull {
            operand: Box::new(capture_reference(id, tested)),
        },
        Some(primitives::BOOL),
        tested.span,
    )
    .implicit()
}

fn bool_literal(value: bool, like: &OperationHeader) -> Operation {
    Operation::new(OperationNode::Literal, Some(like.ty.unwrap_or(primitives::BOOL)), like.span)
        .implicit()
        .with_constant(Some(ConstantValue::Bool(value)))
}
