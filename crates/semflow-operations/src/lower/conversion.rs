//! Conversions, delegate creation, address-of and lambdas.
//!
//! A method group converted to a delegate becomes a `DelegateCreation`
//! around a `MethodReference`, with no `Conversion` node in between. Taking
//! the address of a method group yields an `AddressOf` around the same
//! `MethodReference`; a cast to a function pointer type is an ordinary
//! explicit `Conversion` on top of it.

use semflow_bound::{BoundExpr, ConversionExpr, ExprKind, LambdaBody, LambdaExpr};
use semflow_core::{ConversionKind, Symbol, TypeKind, primitives};
use tracing::trace;

use super::OperationBuilder;
use super::constant::fold_conversion;
use super::references::method_reference;
use crate::node::OperationNode;
use crate::operation::Operation;

pub fn lower_conversion(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, conv: &ConversionExpr<'_>) -> Operation {
    let conversion = conv.conversion;

    match &conv.operand.kind {
        ExprKind::MethodGroup(group) if conversion.kind == ConversionKind::MethodGroup => {
            let target = match method_reference(builder, &conv.operand, group) {
                Some(reference) => reference,
                None => builder.invalid_over(&conv.operand, group.receiver.as_ref()),
            };
            return delegate_creation(builder, expr, target, conversion.is_implicit, conversion.exists);
        }
        ExprKind::Lambda(_) if is_delegate(builder, expr) => {
            let target = builder.build_expr(&conv.operand);
            return delegate_creation(builder, expr, target, conversion.is_implicit, conversion.exists);
        }
        _ => {}
    }

    let operand = builder.build_expr(&conv.operand);
    let foldable = matches!(conversion.kind, ConversionKind::Identity | ConversionKind::Numeric) && conversion.exists;
    let folded = match (operand.constant_value(), expr.ty) {
        (Some(value), Some(target)) if foldable => fold_conversion(builder.symbols(), value, target),
        (Some(value), _) if conversion.kind == ConversionKind::NullLiteral => Some(value.clone()),
        _ => None,
    };
    if !conversion.exists {
        trace!(span = %expr.span, "conversion does not exist");
    }
    builder
        .finish_folded(
            expr,
            OperationNode::Conversion {
                operand: Box::new(operand),
                conversion,
                is_checked: conv.is_checked,
                is_try_cast: conv.is_try_cast,
            },
            || folded,
        )
        .with_implicit(conversion.is_implicit)
        .with_invalid(!conversion.exists)
}

fn is_delegate(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>) -> bool {
    expr.ty.and_then(|ty| builder.symbols().type_kind(ty)) == Some(TypeKind::Delegate)
}

fn delegate_creation(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    target: Operation,
    is_implicit: bool,
    exists: bool,
) -> Operation {
    builder
        .finish(expr, OperationNode::DelegateCreation { target: Box::new(target) })
        .with_implicit(is_implicit)
        .with_invalid(!exists)
}

/// `&x`, or `&M` for a method group. An unresolved group produces an
/// invalid `AddressOf` typed as pointer-to-error around an empty `Invalid`.
pub fn lower_address_of(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, operand: &BoundExpr<'_>) -> Operation {
    let ExprKind::MethodGroup(group) = &operand.kind else {
        let reference = builder.build_expr(operand);
        return builder.finish(expr, OperationNode::AddressOf { reference: Box::new(reference) });
    };

    match method_reference(builder, operand, group) {
        Some(reference) => builder.finish(expr, OperationNode::AddressOf { reference: Box::new(reference) }),
        None => {
            trace!(name = group.name, span = %expr.span, "address of unresolved method group");
            let empty = Operation::new(OperationNode::Invalid { children: Vec::new() }, None, operand.span).invalid();
            Operation::new(
                OperationNode::AddressOf {
                    reference: Box::new(empty),
                },
                Some(primitives::ERROR_POINTER),
                expr.span,
            )
            .with_implicit(expr.compiler_generated)
            .invalid()
        }
    }
}

/// Lambdas keep their body as an operation block. An expression body is
/// wrapped in an implicit block ending in an implicit `return`.
pub fn lower_lambda(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, lambda: &LambdaExpr<'_>) -> Operation {
    let body = match &lambda.body {
        LambdaBody::Block(stmt) => builder.build_body(stmt),
        LambdaBody::Expression(value) => {
            let returns_void = match builder.symbols().get(lambda.symbol) {
                Some(Symbol::Method(m)) => m.return_type == primitives::VOID,
                _ => false,
            };
            let value_op = builder.build_expr(value);
            let statements = if returns_void {
                vec![
                    Operation::new(
                        OperationNode::ExpressionStatement {
                            operation: Box::new(value_op),
                        },
                        None,
                        value.span,
                    )
                    .implicit(),
                    Operation::new(OperationNode::Return { value: None }, None, value.span)
                        .implicit()
                        .with_invalid(expr.has_errors),
                ]
            } else {
                vec![
                    Operation::new(
                        OperationNode::Return {
                            value: Some(Box::new(value_op)),
                        },
                        None,
                        value.span,
                    )
                    .implicit()
                    .with_invalid(expr.has_errors),
                ]
            };
            Operation::new(
                OperationNode::Block {
                    operations: statements,
                    locals: Vec::new(),
                },
                None,
                value.span,
            )
            .implicit()
        }
    };

    Operation::new(
        OperationNode::AnonymousFunction {
            symbol: lambda.symbol,
            body: Box::new(body),
        },
        None,
        expr.span,
    )
    .with_implicit(expr.compiler_generated)
    .with_invalid(expr.has_errors)
}
