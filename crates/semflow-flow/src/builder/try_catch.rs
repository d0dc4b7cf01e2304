//! Exception handling regions.
//!
//! ```text
//! TryAndFinally
//! ├── Try
//! │   └── TryAndCatch
//! │       ├── Try          body
//! │       ├── Catch        handler without filter
//! │       └── FilterAndHandler
//! │           ├── Filter   declaration + filter test
//! │           └── Catch    handler
//! └── Finally
//! ```
//!
//! Handlers and `finally` are entered by the exception machinery, so
//! their first blocks have no predecessors. A filter that rejects the
//! exception, and the end of a `finally`, leave through a
//! `StructuredExceptionHandling` branch with no destination.

use semflow_core::TypeHash;
use semflow_operations::{Operation, OperationNode};

use super::{BlockIdx, FlowBuilder, PendingBranch, unexpected};
use crate::error::Result;
use crate::graph::ControlFlowBranchSemantics;
use crate::region::ControlFlowRegionKind;

impl FlowBuilder<'_> {
    pub(super) fn visit_try(&mut self, body: Operation, catches: Vec<Operation>, finally: Option<Operation>) -> Result<()> {
        let after = self.new_block();
        if finally.is_some() {
            self.enter_region(ControlFlowRegionKind::TryAndFinally, Vec::new());
            self.enter_region(ControlFlowRegionKind::Try, Vec::new());
        }
        let has_catches = !catches.is_empty();
        if has_catches {
            self.enter_region(ControlFlowRegionKind::TryAndCatch, Vec::new());
            self.enter_region(ControlFlowRegionKind::Try, Vec::new());
        }

        self.visit_statement(body)?;
        self.unconditional_branch(after);

        if has_catches {
            self.leave_region();
            for catch in catches {
                self.visit_catch(catch, after)?;
            }
            self.leave_region();
        }
        if let Some(finally) = finally {
            self.leave_region();
            self.enter_region(ControlFlowRegionKind::Finally, Vec::new());
            self.visit_statement(finally)?;
            self.close_block(None, ControlFlowBranchSemantics::StructuredExceptionHandling, None);
            self.leave_region();
            self.leave_region();
        }

        self.append_block(after);
        Ok(())
    }

    fn visit_catch(&mut self, clause: Operation, after: BlockIdx) -> Result<()> {
        let (node, header) = clause.into_parts();
        let OperationNode::CatchClause {
            exception_type,
            locals,
            declaration,
            filter,
            handler,
        } = node
        else {
            return Err(unexpected(&Operation::from_parts(node, header)));
        };

        match filter {
            None => {
                let region = self.enter_handler_region(ControlFlowRegionKind::Catch, exception_type);
                self.regions[region].locals = locals;
                self.assign_caught_exception(declaration.map(|d| *d), exception_type)?;
                self.visit_statement(*handler)?;
                self.unconditional_branch(after);
                self.leave_region();
            }
            Some(filter) => {
                let region = self.enter_handler_region(ControlFlowRegionKind::FilterAndHandler, exception_type);
                self.regions[region].locals = locals;
                self.enter_region(ControlFlowRegionKind::Filter, Vec::new());
                self.assign_caught_exception(declaration.map(|d| *d), exception_type)?;
                let handler_block = self.new_block();
                let span = filter.span();
                self.push_frame();
                self.visit_condition_jump(*filter, true, handler_block)?;
                self.reject_filter();
                self.pop_frame(span)?;
                self.leave_region();

                self.enter_region(ControlFlowRegionKind::Catch, Vec::new());
                self.append_block(handler_block);
                self.visit_statement(*handler)?;
                self.unconditional_branch(after);
                self.leave_region();
                self.leave_region();
            }
        }
        Ok(())
    }

    /// End the filter: the block holding the filter's jump falls through
    /// to the exception machinery. Its condition stays in place.
    fn reject_filter(&mut self) {
        if self.current_block.is_none()
            && let Some(&last) = self.layout.last()
            && self.blocks[last].fallthrough.is_none()
            && self.blocks[last].region == self.current_region
        {
            self.current_block = Some(last);
        }
        let block = self.current_block();
        self.blocks[block].fallthrough = Some(PendingBranch {
            destination: None,
            semantics: ControlFlowBranchSemantics::StructuredExceptionHandling,
        });
        self.current_block = None;
    }

    /// `catch (T e)`: store the caught exception into `e`.
    fn assign_caught_exception(&mut self, declaration: Option<Operation>, exception_type: TypeHash) -> Result<()> {
        let Some(declaration) = declaration else {
            return Ok(());
        };
        let OperationNode::VariableDeclarator { local, .. } = declaration.node() else {
            return Err(unexpected(&declaration));
        };
        let span = declaration.span();
        let target = Operation::new(
            OperationNode::LocalReference {
                local: *local,
                is_declaration: true,
            },
            Some(exception_type),
            span,
        )
        .implicit();
        let caught = Operation::new(OperationNode::CaughtException, Some(exception_type), span).implicit();
        let assignment = Operation::new(
            OperationNode::SimpleAssignment {
                target: Box::new(target),
                value: Box::new(caught),
                is_ref: false,
            },
            None,
            span,
        )
        .implicit();
        self.add_statement(assignment);
        Ok(())
    }
}
