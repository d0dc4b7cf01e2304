//! Statements.

use semflow_core::{BinaryOperatorKind, LabelId, Span, SymbolId, primitives};
use semflow_operations::{CaseClauseKind, LoopKind, Operation, OperationFlags, OperationHeader, OperationNode};

use super::expr::has_combinators;
use super::{BlockIdx, FlowBuilder, capture_reference, unexpected};
use crate::error::Result;
use crate::graph::ControlFlowBranchSemantics;
use crate::region::ControlFlowRegionKind;

/// One `case` section of a switch, with its labels resolved to a block.
struct SwitchSection {
    block: BlockIdx,
    /// Label blocks created by a forward `goto case` before the section
    /// was seen; placed just ahead of `block`.
    extra_blocks: Vec<BlockIdx>,
    clauses: Vec<Operation>,
    body: Vec<Operation>,
    locals: Vec<SymbolId>,
}

impl FlowBuilder<'_> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn visit_statement(&mut self, op: Operation) -> Result<()> {
        self.enter_nesting(op.span())?;
        let result = self.visit_statement_inner(op);
        self.leave_nesting();
        result
    }

    fn visit_statement_inner(&mut self, op: Operation) -> Result<()> {
        let kind = op.kind();
        if kind.is_flow_only() {
            return Err(unexpected(&op));
        }
        let (node, header) = op.into_parts();
        match node {
            OperationNode::Block { operations, locals } => self.visit_block(operations, locals),
            OperationNode::ExpressionStatement { operation } => self.visit_expression_statement(*operation, header),
            OperationNode::VariableDeclarationGroup { declarations } => {
                declarations.into_iter().try_for_each(|d| self.visit_statement(d))
            }
            OperationNode::VariableDeclaration { declarators } => {
                declarators.into_iter().try_for_each(|d| self.visit_declarator(d))
            }
            OperationNode::Return { value } => self.visit_return(value.map(|v| *v), header.span),
            OperationNode::Branch { target, .. } => {
                let block = self.label_block(target);
                self.unconditional_branch(block);
                Ok(())
            }
            OperationNode::Labeled { label, operation } => {
                self.place_label(label, header.span)?;
                match operation {
                    Some(operation) => self.visit_statement(*operation),
                    None => Ok(()),
                }
            }
            OperationNode::Conditional {
                condition,
                when_true,
                when_false,
                ..
            } if header.ty.is_none() => self.visit_if(*condition, *when_true, when_false.map(|w| *w)),
            OperationNode::Loop {
                kind,
                before,
                condition,
                body,
                at_loop_bottom,
                locals,
                continue_label,
                exit_label,
            } => self.visit_loop(
                kind,
                before,
                condition.map(|c| *c),
                *body,
                at_loop_bottom,
                locals,
                (continue_label, exit_label),
                header.span,
            ),
            OperationNode::Switch {
                value,
                cases,
                locals,
                exit_label,
            } => self.visit_switch(*value, cases, locals, exit_label, header.span),
            OperationNode::Throw { exception } => self.visit_throw(exception.map(|e| *e), header.span),
            OperationNode::Try {
                body,
                catches,
                finally,
            } => self.visit_try(*body, catches, finally.map(|f| *f)),
            OperationNode::Empty => Ok(()),
            OperationNode::Invalid { children } if children.iter().any(|c| c.kind().is_statement()) => {
                children.into_iter().try_for_each(|child| {
                    if child.kind().is_statement() {
                        self.visit_statement(child)
                    } else {
                        self.visit_expression_as_statement(child)
                    }
                })
            }
            OperationNode::SwitchCase { .. }
            | OperationNode::CaseClause { .. }
            | OperationNode::CatchClause { .. }
            | OperationNode::VariableDeclarator { .. }
            | OperationNode::VariableInitializer { .. } => Err(unexpected(&Operation::from_parts(node, header))),
            node => self.visit_expression_as_statement(Operation::from_parts(node, header)),
        }
    }

    fn visit_block(&mut self, operations: Vec<Operation>, locals: Vec<SymbolId>) -> Result<()> {
        let has_locals = !locals.is_empty();
        if has_locals {
            self.enter_region(ControlFlowRegionKind::LocalLifetime, locals);
        }
        for operation in operations {
            self.visit_statement(operation)?;
        }
        if has_locals {
            self.leave_region();
        }
        Ok(())
    }

    fn visit_expression_statement(&mut self, operation: Operation, header: OperationHeader) -> Result<()> {
        self.push_frame();
        if let Some(lowered) = self.visit_void_expr(operation)? {
            let statement = Operation::from_parts(
                OperationNode::ExpressionStatement {
                    operation: Box::new(lowered),
                },
                header.clone(),
            );
            self.add_statement(statement);
        }
        self.pop_frame(header.span)
    }

    /// An expression standing where a statement is expected, added bare.
    fn visit_expression_as_statement(&mut self, operation: Operation) -> Result<()> {
        let span = operation.span();
        self.push_frame();
        if let Some(lowered) = self.visit_void_expr(operation)? {
            self.add_statement(lowered);
        }
        self.pop_frame(span)
    }

    /// `T x = value` becomes the assignment `x = value`.
    fn visit_declarator(&mut self, declarator: Operation) -> Result<()> {
        let (node, header) = declarator.into_parts();
        let OperationNode::VariableDeclarator { local, initializer } = node else {
            return Err(unexpected(&Operation::from_parts(node, header)));
        };
        let Some(initializer) = initializer else {
            return Ok(());
        };
        let value = match initializer.into_parts() {
            (OperationNode::VariableInitializer { value }, _) => *value,
            (node, header) => return Err(unexpected(&Operation::from_parts(node, header))),
        };

        self.push_frame();
        let value = self.visit_expr(value)?;
        let ty = value.result_type();
        let target = Operation::new(
            OperationNode::LocalReference {
                local,
                is_declaration: true,
            },
            ty,
            header.span,
        )
        .implicit();
        let assignment = Operation::new(
            OperationNode::SimpleAssignment {
                target: Box::new(target),
                value: Box::new(value),
                is_ref: false,
            },
            ty,
            header.span,
        )
        .implicit()
        .with_invalid(header.flags.contains(OperationFlags::INVALID));
        self.add_statement(assignment);
        self.pop_frame(header.span)
    }

    fn visit_return(&mut self, value: Option<Operation>, span: Span) -> Result<()> {
        let exit = self.exit;
        match value {
            Some(value) => {
                self.push_frame();
                let value = self.visit_expr(value)?;
                self.close_block(Some(exit), ControlFlowBranchSemantics::Return, Some(value));
                self.pop_frame(span)
            }
            None => {
                self.close_block(Some(exit), ControlFlowBranchSemantics::Regular, None);
                Ok(())
            }
        }
    }

    fn visit_throw(&mut self, exception: Option<Operation>, span: Span) -> Result<()> {
        match exception {
            Some(exception) => {
                self.push_frame();
                let exception = self.visit_expr(exception)?;
                self.close_block(None, ControlFlowBranchSemantics::Throw, Some(exception));
                self.pop_frame(span)
            }
            None => {
                self.close_block(None, ControlFlowBranchSemantics::Rethrow, None);
                Ok(())
            }
        }
    }

    /// Lower `condition` into a jump in a frame of its own.
    fn visit_jump_statement(
        &mut self,
        condition: Operation,
        jump_if_true: bool,
        destination: BlockIdx,
    ) -> Result<()> {
        let span = condition.span();
        self.push_frame();
        self.visit_condition_jump(condition, jump_if_true, destination)?;
        self.pop_frame(span)
    }

    fn visit_if(&mut self, condition: Operation, when_true: Operation, when_false: Option<Operation>) -> Result<()> {
        let else_block = self.new_block();
        self.visit_jump_statement(condition, false, else_block)?;
        self.visit_statement(when_true)?;
        match when_false {
            Some(when_false) => {
                let after = self.new_block();
                self.unconditional_branch(after);
                self.append_block(else_block);
                self.visit_statement(when_false)?;
                self.append_block(after);
            }
            None => self.append_block(else_block),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Loops
    // ------------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn visit_loop(
        &mut self,
        kind: LoopKind,
        before: Vec<Operation>,
        condition: Option<Operation>,
        body: Operation,
        at_loop_bottom: Vec<Operation>,
        locals: Vec<SymbolId>,
        (continue_label, exit_label): (LabelId, LabelId),
        span: Span,
    ) -> Result<()> {
        let has_locals = !locals.is_empty();
        if has_locals {
            self.enter_region(ControlFlowRegionKind::LocalLifetime, locals);
        }
        let exit_block = self.label_block(exit_label);

        match kind {
            LoopKind::While => {
                let continue_block = self.label_block(continue_label);
                self.place_label(continue_label, span)?;
                if let Some(condition) = condition {
                    self.visit_jump_statement(condition, false, exit_block)?;
                }
                self.visit_statement(body)?;
                self.unconditional_branch(continue_block);
            }
            LoopKind::DoWhile => {
                let top = self.new_block();
                self.append_block(top);
                self.visit_statement(body)?;
                self.place_label(continue_label, span)?;
                match condition {
                    Some(condition) => self.visit_jump_statement(condition, true, top)?,
                    None => self.unconditional_branch(top),
                }
            }
            LoopKind::For => {
                for statement in before {
                    self.visit_statement(statement)?;
                }
                let top = self.new_block();
                self.append_block(top);
                if let Some(condition) = condition {
                    self.visit_jump_statement(condition, false, exit_block)?;
                }
                self.visit_statement(body)?;
                self.place_label(continue_label, span)?;
                for statement in at_loop_bottom {
                    self.visit_statement(statement)?;
                }
                self.unconditional_branch(top);
            }
        }

        if has_locals {
            self.leave_region();
        }
        self.place_label(exit_label, span)
    }

    // ------------------------------------------------------------------------
    // Switch
    // ------------------------------------------------------------------------

    /// The value is captured once and tested clause by clause, default
    /// last; the section bodies follow the tests in source order.
    fn visit_switch(
        &mut self,
        value: Operation,
        cases: Vec<Operation>,
        locals: Vec<SymbolId>,
        exit_label: LabelId,
        span: Span,
    ) -> Result<()> {
        let has_locals = !locals.is_empty();
        if has_locals {
            self.enter_region(ControlFlowRegionKind::LocalLifetime, locals);
        }
        let exit_block = self.label_block(exit_label);
        let mut sections = cases
            .into_iter()
            .map(|case| self.switch_section(case))
            .collect::<Result<Vec<_>>>()?;

        self.push_frame();
        let value = self.visit_expr(value)?;
        let region = self.ensure_frame_region()?;
        let value_header = value.header();
        let id = self.new_capture(region);
        self.capture(id, value);
        let input = capture_reference(id, &value_header);

        let mut default = None;
        for section in &mut sections {
            for clause in std::mem::take(&mut section.clauses) {
                let (node, header) = clause.into_parts();
                let OperationNode::CaseClause { clause, .. } = node else {
                    return Err(unexpected(&Operation::from_parts(node, header)));
                };
                let test = match clause {
                    CaseClauseKind::Default => {
                        default = Some(section.block);
                        continue;
                    }
                    CaseClauseKind::SingleValue(case_value) => {
                        let case_value = self.visit_expr(*case_value)?;
                        Operation::new(
                            OperationNode::Binary {
                                op: BinaryOperatorKind::Equals,
                                left: Box::new(input.clone()),
                                right: Box::new(case_value),
                                method: None,
                            },
                            Some(primitives::BOOL),
                            header.span,
                        )
                        .implicit()
                    }
                    CaseClauseKind::Pattern { pattern, guard } => {
                        let next = self.new_block();
                        if has_combinators(&pattern) {
                            self.pattern_jump(&input, *pattern, false, next)?;
                        } else {
                            let pattern = self.visit_expr(*pattern)?;
                            let test = Operation::new(
                                OperationNode::IsPattern {
                                    value: Box::new(input.clone()),
                                    pattern: Box::new(pattern),
                                },
                                Some(primitives::BOOL),
                                header.span,
                            )
                            .implicit();
                            self.conditional_branch(test, false, next);
                        }
                        if let Some(guard) = guard {
                            self.visit_condition_jump(*guard, false, next)?;
                        }
                        self.unconditional_branch(section.block);
                        self.append_block(next);
                        continue;
                    }
                };
                let next = self.new_block();
                self.conditional_branch(test, false, next);
                self.unconditional_branch(section.block);
                self.append_block(next);
            }
        }
        self.unconditional_branch(default.unwrap_or(exit_block));
        self.pop_frame(span)?;

        for section in sections {
            let has_section_locals = !section.locals.is_empty();
            if has_section_locals {
                self.enter_region(ControlFlowRegionKind::LocalLifetime, section.locals);
            }
            for block in section.extra_blocks {
                self.append_block(block);
            }
            self.append_block(section.block);
            for statement in section.body {
                self.visit_statement(statement)?;
            }
            if has_section_locals {
                self.leave_region();
            }
        }

        if has_locals {
            self.leave_region();
        }
        self.place_label(exit_label, span)
    }

    /// Resolve a section's clause labels to one body block.
    fn switch_section(&mut self, case: Operation) -> Result<SwitchSection> {
        let (node, header) = case.into_parts();
        let OperationNode::SwitchCase { clauses, body, locals } = node else {
            return Err(unexpected(&Operation::from_parts(node, header)));
        };
        let labels: Vec<LabelId> = clauses
            .iter()
            .filter_map(|clause| match clause.node() {
                OperationNode::CaseClause { label, .. } => Some(*label),
                _ => None,
            })
            .collect();

        let block = match labels.iter().find(|&&label| self.is_label_bound(label)) {
            Some(&label) => self.label_block(label),
            None => self.new_block(),
        };
        let mut extra_blocks = Vec::new();
        for label in labels {
            if !self.is_label_bound(label) {
                self.alias_label(label, block);
                continue;
            }
            let bound = self.label_block(label);
            if bound != block && !extra_blocks.contains(&bound) {
                extra_blocks.push(bound);
            }
        }
        Ok(SwitchSection {
            block,
            extra_blocks,
            clauses,
            body,
            locals,
        })
    }
}
