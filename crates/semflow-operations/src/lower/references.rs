//! Member references: fields, properties, events, method groups and
//! late-bound member lookups.

use semflow_bound::{BoundExpr, DynamicMemberAccessExpr, MemberAccess, MethodGroup, PropertyAccess};
use semflow_core::{Symbol, SymbolId};

use super::OperationBuilder;
use super::invocation::lower_arguments;
use crate::node::OperationNode;
use crate::operation::Operation;

/// Lower a member receiver. An instance member written without one gets
/// an implicit `this` typed as the member's container.
pub(super) fn lower_receiver(
    builder: &OperationBuilder<'_>,
    receiver: Option<&BoundExpr<'_>>,
    member: SymbolId,
    owner: &BoundExpr<'_>,
) -> Option<Box<Operation>> {
    if let Some(receiver) = receiver {
        return Some(Box::new(builder.build_expr(receiver)));
    }
    if !builder.options().implicit_receivers {
        return None;
    }
    let symbol = builder.symbols().get(member)?;
    symbol
        .requires_instance()
        .then(|| Box::new(builder.implicit_this(symbol.container(), owner.span)))
}

pub fn lower_field(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, access: &MemberAccess<'_>) -> Operation {
    let instance = lower_receiver(builder, access.receiver.as_ref(), access.member, expr);
    builder.finish(
        expr,
        OperationNode::FieldReference {
            field: access.member,
            instance,
        },
    )
}

pub fn lower_event(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, access: &MemberAccess<'_>) -> Operation {
    let instance = lower_receiver(builder, access.receiver.as_ref(), access.member, expr);
    builder.finish(
        expr,
        OperationNode::EventReference {
            event: access.member,
            instance,
        },
    )
}

/// Properties and indexers; indexer arguments are matched like call arguments.
pub fn lower_property(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, access: &PropertyAccess<'_>) -> Operation {
    let instance = lower_receiver(builder, access.receiver.as_ref(), access.property, expr);
    let parameters = match builder.symbols().get(access.property) {
        Some(Symbol::Property(p)) => p.parameters.as_slice(),
        _ => &[],
    };
    let arguments = lower_arguments(builder, parameters, access.arguments, expr.span);
    builder.finish(
        expr,
        OperationNode::PropertyReference {
            property: access.property,
            instance,
            arguments,
        },
    )
}

/// A method group outside a conversion or address-of.
pub fn lower_method_group(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, group: &MethodGroup<'_>) -> Operation {
    match method_reference(builder, expr, group) {
        Some(op) => op,
        None => builder.invalid_over(expr, group.receiver.as_ref()),
    }
}

/// `MethodReference` for a resolved group, `None` when lookup failed.
pub(super) fn method_reference(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    group: &MethodGroup<'_>,
) -> Option<Operation> {
    let method = group.method?;
    let is_virtual = builder.symbols().method(method).map(|m| m.is_virtual).unwrap_or(false);
    let instance = lower_receiver(builder, group.receiver.as_ref(), method, expr);
    Some(builder.finish(
        expr,
        OperationNode::MethodReference {
            method,
            instance,
            is_virtual,
        },
    ))
}

pub fn lower_dynamic_member(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    access: &DynamicMemberAccessExpr<'_>,
) -> Operation {
    builder.finish(
        expr,
        OperationNode::DynamicMemberReference {
            instance: builder.build_opt(access.receiver.as_ref()),
            member_name: access.name.to_string(),
            type_arguments: access.type_arguments.to_vec(),
            containing_type: access.containing_type,
        },
    )
}
