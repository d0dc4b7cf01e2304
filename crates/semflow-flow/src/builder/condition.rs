//! Conditional jumps.
//!
//! A condition is lowered straight into branches rather than into a
//! boolean value: `!` flips the polarity, `&&` and `||` become chains of
//! jumps, and constant conditions either jump unconditionally or fall
//! through.

use semflow_core::{BinaryOperatorKind, UnaryOperatorKind, primitives};
use semflow_operations::{Operation, OperationNode, PatternCombinator};

use super::expr::has_combinators;
use super::{BlockIdx, FlowBuilder};
use crate::error::Result;

impl FlowBuilder<'_> {
    /// Jump to `destination` when `condition` evaluates to `jump_if_true`;
    /// otherwise continue in a new block.
    pub(super) fn visit_condition_jump(
        &mut self,
        condition: Operation,
        jump_if_true: bool,
        destination: BlockIdx,
    ) -> Result<()> {
        self.enter_nesting(condition.span())?;
        let result = self.visit_condition_jump_inner(condition, jump_if_true, destination);
        self.leave_nesting();
        result
    }

    fn visit_condition_jump_inner(
        &mut self,
        condition: Operation,
        jump_if_true: bool,
        destination: BlockIdx,
    ) -> Result<()> {
        if !condition.is_invalid()
            && let Some(value) = condition.constant_value().and_then(|c| c.as_bool())
        {
            if value == jump_if_true {
                self.spill_eval_stack()?;
                self.unconditional_branch(destination);
            }
            return Ok(());
        }

        let (node, header) = condition.into_parts();
        match node {
            OperationNode::Unary {
                op: UnaryOperatorKind::Not,
                operand,
                method: None,
            } => self.visit_condition_jump(*operand, !jump_if_true, destination),
            OperationNode::Binary {
                op,
                left,
                right,
                method: None,
            } if op.is_short_circuit() => {
                let is_and = op == BinaryOperatorKind::ConditionalAnd;
                self.short_circuit_jump(
                    is_and,
                    jump_if_true,
                    destination,
                    |builder, jump, target| builder.visit_condition_jump(*left, jump, target),
                    |builder, jump, target| builder.visit_condition_jump(*right, jump, target),
                )
            }
            OperationNode::IsPattern { value, pattern } if has_combinators(&pattern) => {
                self.spill_eval_stack()?;
                let region = self.ensure_frame_region()?;
                let input = self.capture_pattern_input(*value, region)?;
                self.pattern_jump(&input, *pattern, jump_if_true, destination)
            }
            node => {
                let condition = self.visit_expr(Operation::from_parts(node, header))?;
                self.spill_eval_stack()?;
                self.conditional_branch(condition, jump_if_true, destination);
                Ok(())
            }
        }
    }

    /// Jump for `left && right` (`is_and`) or `left || right`. When the
    /// jump needs both operands to agree, the first one skips past the
    /// second on the opposite outcome.
    fn short_circuit_jump(
        &mut self,
        is_and: bool,
        jump_if_true: bool,
        destination: BlockIdx,
        left: impl FnOnce(&mut Self, bool, BlockIdx) -> Result<()>,
        right: impl FnOnce(&mut Self, bool, BlockIdx) -> Result<()>,
    ) -> Result<()> {
        if is_and == jump_if_true {
            let skip = self.new_block();
            left(self, !jump_if_true, skip)?;
            right(self, jump_if_true, destination)?;
            self.append_block(skip);
        } else {
            left(self, jump_if_true, destination)?;
            right(self, jump_if_true, destination)?;
        }
        Ok(())
    }

    /// Jump when `input` matches (`jump_if_true`) or fails to match
    /// `pattern`. `input` is a capture reference, cloned into each test.
    pub(super) fn pattern_jump(
        &mut self,
        input: &Operation,
        pattern: Operation,
        jump_if_true: bool,
        destination: BlockIdx,
    ) -> Result<()> {
        self.enter_nesting(pattern.span())?;
        let result = self.pattern_jump_inner(input, pattern, jump_if_true, destination);
        self.leave_nesting();
        result
    }

    fn pattern_jump_inner(
        &mut self,
        input: &Operation,
        pattern: Operation,
        jump_if_true: bool,
        destination: BlockIdx,
    ) -> Result<()> {
        let (node, header) = pattern.into_parts();
        match node {
            OperationNode::BinaryPattern { op, left, right } => {
                let is_and = op == PatternCombinator::And;
                self.short_circuit_jump(
                    is_and,
                    jump_if_true,
                    destination,
                    |builder, jump, target| builder.pattern_jump(input, *left, jump, target),
                    |builder, jump, target| builder.pattern_jump(input, *right, jump, target),
                )
            }
            OperationNode::NegatedPattern { pattern } if has_combinators(&pattern) => {
                self.pattern_jump(input, *pattern, !jump_if_true, destination)
            }
            node => {
                let span = header.span;
                let pattern = self.visit_expr(Operation::from_parts(node, header))?;
                let test = Operation::new(
                    OperationNode::IsPattern {
                        value: Box::new(input.clone()),
                        pattern: Box::new(pattern),
                    },
                    Some(primitives::BOOL),
                    span,
                )
                .implicit();
                self.conditional_branch(test, jump_if_true, destination);
                Ok(())
            }
        }
    }
}
