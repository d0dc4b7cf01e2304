//! Operators, assignments, conditionals and `await`.

use semflow_bound::{
    AssignmentExpr, BoundExpr, CoalesceExpr, CompoundAssignmentExpr, ConditionalAccessExpr, ConditionalExpr, ExprKind,
    IncrementExpr, UnaryExpr,
};

use super::OperationBuilder;
use super::constant::{fold_binary, fold_unary};
use crate::node::OperationNode;
use crate::operation::Operation;

pub fn lower_conditional(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, cond: &ConditionalExpr<'_>) -> Operation {
    let node = OperationNode::Conditional {
        condition: Box::new(builder.build_expr(&cond.condition)),
        when_true: Box::new(builder.build_expr(&cond.when_true)),
        when_false: Some(Box::new(builder.build_expr(&cond.when_false))),
        is_ref: cond.is_ref,
    };
    builder.finish(expr, node)
}

pub fn lower_coalesce(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, coalesce: &CoalesceExpr<'_>) -> Operation {
    let node = OperationNode::Coalesce {
        value: Box::new(builder.build_expr(&coalesce.value)),
        when_null: Box::new(builder.build_expr(&coalesce.when_null)),
    };
    builder.finish(expr, node)
}

pub fn lower_conditional_access(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    access: &ConditionalAccessExpr<'_>,
) -> Operation {
    let node = OperationNode::ConditionalAccess {
        operation: Box::new(builder.build_expr(&access.receiver)),
        when_not_null: Box::new(builder.build_expr(&access.access)),
    };
    builder.finish(expr, node)
}

/// Binary operators. Left-nested chains (`a + b + c + ...`) are walked
/// iteratively so long chains do not grow the native stack.
pub fn lower_binary(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>) -> Operation {
    let mut spine = Vec::new();
    let mut cursor = expr;
    while let ExprKind::Binary(binary) = &cursor.kind {
        spine.push(cursor);
        cursor = &binary.left;
    }

    let mut left = builder.build_expr(cursor);
    for node in spine.into_iter().rev() {
        let ExprKind::Binary(binary) = &node.kind else {
            continue;
        };
        let right = builder.build_expr(&binary.right);
        let folded = match (left.constant_value(), right.constant_value(), binary.method) {
            (Some(l), Some(r), None) => fold_binary(builder.symbols(), binary.op, l, r, node.ty),
            _ => None,
        };
        left = builder.finish_folded(
            node,
            OperationNode::Binary {
                op: binary.op,
                left: Box::new(left),
                right: Box::new(right),
                method: binary.method,
            },
            || folded,
        );
    }
    left
}

pub fn lower_unary(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, unary: &UnaryExpr<'_>) -> Operation {
    let operand = builder.build_expr(&unary.operand);
    let folded = match (operand.constant_value(), unary.method) {
        (Some(value), None) => fold_unary(builder.symbols(), unary.op, value, expr.ty),
        _ => None,
    };
    builder.finish_folded(
        expr,
        OperationNode::Unary {
            op: unary.op,
            operand: Box::new(operand),
            method: unary.method,
        },
        || folded,
    )
}

pub fn lower_assignment(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, assign: &AssignmentExpr<'_>) -> Operation {
    let node = OperationNode::SimpleAssignment {
        target: Box::new(builder.build_expr(&assign.target)),
        value: Box::new(builder.build_expr(&assign.value)),
        is_ref: assign.is_ref,
    };
    builder.finish(expr, node)
}

pub fn lower_compound_assignment(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    assign: &CompoundAssignmentExpr<'_>,
) -> Operation {
    let node = OperationNode::CompoundAssignment {
        op: assign.op,
        target: Box::new(builder.build_expr(&assign.target)),
        value: Box::new(builder.build_expr(&assign.value)),
        method: assign.method,
    };
    builder.finish(expr, node)
}

pub fn lower_increment(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, inc: &IncrementExpr<'_>) -> Operation {
    let node = OperationNode::IncrementOrDecrement {
        is_decrement: inc.is_decrement,
        is_postfix: inc.is_postfix,
        target: Box::new(builder.build_expr(&inc.target)),
        method: inc.method,
    };
    builder.finish(expr, node)
}

pub fn lower_await(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, operand: &BoundExpr<'_>) -> Operation {
    let node = OperationNode::Await {
        operation: Box::new(builder.build_expr(operand)),
    };
    builder.finish(expr, node)
}
