//! Statements.

use semflow_bound::{BoundNode, BoundStmt, CatchBlock, Declarator, StmtKind, SwitchLabelKind, SwitchStmt};
use semflow_core::{Span, primitives};
use tracing::trace;

use super::OperationBuilder;
use super::patterns::lower_pattern;
use crate::node::{BranchKind, CaseClauseKind, LoopKind, OperationNode};
use crate::operation::Operation;

pub fn lower_statement(builder: &OperationBuilder<'_>, stmt: &BoundStmt<'_>) -> Operation {
    let span = stmt.span;
    let node = match &stmt.kind {
        StmtKind::Block(block) => OperationNode::Block {
            operations: block.statements.iter().map(|s| builder.build_stmt(s)).collect(),
            locals: block.locals.to_vec(),
        },
        StmtKind::Expression(expr) => OperationNode::ExpressionStatement {
            operation: Box::new(builder.build_expr(expr)),
        },
        StmtKind::LocalDeclaration(declarators) => return lower_declaration(builder, declarators, span),
        StmtKind::Return(value) => OperationNode::Return {
            value: builder.build_opt(*value),
        },
        StmtKind::Break(label) => return branch(BranchKind::Break, *label, span),
        StmtKind::Continue(label) => return branch(BranchKind::Continue, *label, span),
        StmtKind::Goto(label) => return branch(BranchKind::GoTo, *label, span),
        StmtKind::Labeled(labeled) => OperationNode::Labeled {
            label: labeled.label,
            operation: labeled.statement.as_ref().map(|s| Box::new(builder.build_stmt(s))),
        },
        StmtKind::If(if_stmt) => OperationNode::Conditional {
            condition: Box::new(builder.build_expr(&if_stmt.condition)),
            when_true: Box::new(builder.build_stmt(&if_stmt.consequence)),
            when_false: if_stmt.alternative.as_ref().map(|s| Box::new(builder.build_stmt(s))),
            is_ref: false,
        },
        StmtKind::While(w) | StmtKind::DoWhile(w) => OperationNode::Loop {
            kind: if matches!(stmt.kind, StmtKind::While(_)) {
                LoopKind::While
            } else {
                LoopKind::DoWhile
            },
            before: Vec::new(),
            condition: Some(Box::new(builder.build_expr(&w.condition))),
            body: Box::new(builder.build_stmt(&w.body)),
            at_loop_bottom: Vec::new(),
            locals: w.locals.to_vec(),
            continue_label: w.continue_label,
            exit_label: w.break_label,
        },
        StmtKind::For(f) => OperationNode::Loop {
            kind: LoopKind::For,
            before: f.initializers.iter().map(|s| builder.build_stmt(s)).collect(),
            condition: f.condition.as_ref().map(|c| Box::new(builder.build_expr(c))),
            body: Box::new(builder.build_stmt(&f.body)),
            at_loop_bottom: f.increments.iter().map(|s| builder.build_stmt(s)).collect(),
            locals: f.locals.to_vec(),
            continue_label: f.continue_label,
            exit_label: f.break_label,
        },
        StmtKind::Switch(switch) => lower_switch(builder, switch),
        StmtKind::Throw(value) => OperationNode::Throw {
            exception: builder.build_opt(*value),
        },
        StmtKind::Try(try_stmt) => OperationNode::Try {
            body: Box::new(builder.build_stmt(&try_stmt.body)),
            catches: try_stmt.catches.iter().map(|c| lower_catch(builder, c)).collect(),
            finally: try_stmt.finally.as_ref().map(|s| Box::new(builder.build_stmt(s))),
        },
        StmtKind::Empty => OperationNode::Empty,
        StmtKind::Bad(children) => {
            let children = children
                .iter()
                .map(|child| match child {
                    BoundNode::Expr(expr) => builder.build_expr(expr),
                    BoundNode::Stmt(stmt) => builder.build_stmt(stmt),
                })
                .collect();
            return Operation::new(OperationNode::Invalid { children }, None, span).invalid();
        }
    };
    Operation::new(node, None, span)
}

/// A jump whose label failed to resolve has nowhere to go.
fn branch(kind: BranchKind, label: Option<semflow_core::LabelId>, span: Span) -> Operation {
    match label {
        Some(target) => Operation::new(OperationNode::Branch { kind, target }, None, span),
        None => {
            trace!(?kind, %span, "unresolved jump target");
            Operation::new(OperationNode::Invalid { children: Vec::new() }, None, span).invalid()
        }
    }
}

/// `T a = 1, b;` becomes a group holding one declaration with a
/// declarator per variable.
fn lower_declaration(builder: &OperationBuilder<'_>, declarators: &[Declarator<'_>], span: Span) -> Operation {
    let declarators = declarators
        .iter()
        .map(|d| {
            let initializer = d.initializer.as_ref().map(|init| {
                let value = builder.build_expr(init);
                Box::new(Operation::new(
                    OperationNode::VariableInitializer { value: Box::new(value) },
                    None,
                    init.span,
                ))
            });
            Operation::new(
                OperationNode::VariableDeclarator {
                    local: d.local,
                    initializer,
                },
                None,
                d.span,
            )
        })
        .collect();
    let declaration = Operation::new(OperationNode::VariableDeclaration { declarators }, None, span);
    Operation::new(
        OperationNode::VariableDeclarationGroup {
            declarations: vec![declaration],
        },
        None,
        span,
    )
}

fn lower_switch(builder: &OperationBuilder<'_>, switch: &SwitchStmt<'_>) -> OperationNode {
    let value = builder.build_expr(&switch.expression);
    let cases = switch
        .sections
        .iter()
        .map(|section| {
            let clauses: Vec<Operation> = section
                .labels
                .iter()
                .map(|label| {
                    let clause = match &label.kind {
                        SwitchLabelKind::Value(v) => CaseClauseKind::SingleValue(Box::new(builder.build_expr(v))),
                        SwitchLabelKind::Pattern { pattern, guard } => CaseClauseKind::Pattern {
                            pattern: Box::new(lower_pattern(builder, pattern)),
                            guard: guard.as_ref().map(|g| Box::new(builder.build_expr(g))),
                        },
                        SwitchLabelKind::Default => CaseClauseKind::Default,
                    };
                    Operation::new(
                        OperationNode::CaseClause {
                            label: label.label,
                            clause,
                        },
                        None,
                        label.span,
                    )
                })
                .collect();
            let body: Vec<Operation> = section.statements.iter().map(|s| builder.build_stmt(s)).collect();
            let span = clauses
                .iter()
                .chain(body.iter())
                .map(Operation::span)
                .reduce(Span::cover)
                .unwrap_or_default();
            Operation::new(
                OperationNode::SwitchCase {
                    clauses,
                    body,
                    locals: section.locals.to_vec(),
                },
                None,
                span,
            )
        })
        .collect();
    OperationNode::Switch {
        value: Box::new(value),
        cases,
        locals: switch.locals.to_vec(),
        exit_label: switch.break_label,
    }
}

fn lower_catch(builder: &OperationBuilder<'_>, catch: &CatchBlock<'_>) -> Operation {
    let declaration = catch.local.map(|local| {
        Box::new(Operation::new(
            OperationNode::VariableDeclarator {
                local,
                initializer: None,
            },
            None,
            catch.span,
        ))
    });
    Operation::new(
        OperationNode::CatchClause {
            exception_type: catch.exception_type.unwrap_or(primitives::EXCEPTION),
            locals: catch.local.into_iter().collect(),
            declaration,
            filter: catch.filter.as_ref().map(|f| Box::new(builder.build_expr(f))),
            handler: Box::new(builder.build_stmt(&catch.body)),
        },
        None,
        catch.span,
    )
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use semflow_bound::BoundFactory;
    use semflow_core::{LabelId, SymbolTable, primitives};

    use crate::{BranchKind, LoweringOptions, OperationBuilder, OperationKind, OperationNode};

    #[test]
    fn declaration_shape() {
        let mut symbols = SymbolTable::with_primitives();
        let a = symbols.add_local("a", primitives::INT32);
        let b = symbols.add_local("b", primitives::INT32);
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let stmt = f.declare_many(vec![(a, Some(f.int(1))), (b, Some(f.missing()))]);
        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_stmt(&stmt);

        assert_eq!(op.kind(), OperationKind::VariableDeclarationGroup);
        let declaration = op.children()[0];
        assert_eq!(declaration.kind(), OperationKind::VariableDeclaration);
        let declarators = declaration.children();
        assert_eq!(declarators.len(), 2);
        assert!(!declarators[0].is_invalid());

        let missing = declarators[1].children()[0].children()[0];
        assert_eq!(missing.kind(), OperationKind::Invalid);
        assert!(missing.children().is_empty());
        assert!(op.is_invalid());
    }

    #[test]
    fn unresolved_break_is_invalid() {
        let symbols = SymbolTable::with_primitives();
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);
        let builder = OperationBuilder::new(&symbols, LoweringOptions::default());

        let op = builder.build_stmt(&f.break_(None));
        assert_eq!(op.kind(), OperationKind::Invalid);
        assert!(op.is_invalid());

        let op = builder.build_stmt(&f.goto(Some(LabelId::new(3))));
        assert!(matches!(
            op.node(),
            OperationNode::Branch {
                kind: BranchKind::GoTo,
                ..
            }
        ));
    }

    #[test]
    fn untyped_catch_defaults_to_exception() {
        let mut symbols = SymbolTable::with_primitives();
        let e = symbols.add_local("e", primitives::EXCEPTION);
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let stmt = f.try_(
            f.block(vec![], vec![]),
            vec![f.catch(None, Some(e), None, f.block(vec![], vec![]))],
            None,
        );
        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_stmt(&stmt);
        let catch = op.children()[1];
        let OperationNode::CatchClause {
            exception_type,
            locals,
            declaration,
            ..
        } = catch.node()
        else {
            panic!("expected catch clause");
        };
        assert_eq!(*exception_type, primitives::EXCEPTION);
        assert_eq!(locals, &vec![e]);
        assert!(declaration.is_some());
    }

    #[test]
    fn bad_statement_keeps_children() {
        let mut symbols = SymbolTable::with_primitives();
        let x = symbols.add_local("x", primitives::INT32);
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let stmt = f.bad_stmt(vec![f.node(f.local(x)), f.stmt_node(f.empty())]);
        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_stmt(&stmt);
        assert_eq!(op.kind(), OperationKind::Invalid);
        assert_eq!(op.children().len(), 2);
    }

    #[test]
    fn non_block_body_is_wrapped() {
        let symbols = SymbolTable::with_primitives();
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_body(&f.ret(None));
        assert_eq!(op.kind(), OperationKind::Block);
        assert!(op.is_implicit());
        assert_eq!(op.children()[0].kind(), OperationKind::Return);
    }
}
