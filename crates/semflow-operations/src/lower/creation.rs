//! Object creation and object/collection initializers.

use semflow_bound::{BoundExpr, DynamicObjectCreationExpr, Initializer, InitializerKind, ObjectCreationExpr};
use semflow_core::{Span, TypeHash};
use tracing::trace;

use super::OperationBuilder;
use super::invocation::{lower_arguments, lower_dynamic_arguments};
use crate::node::{InstanceReferenceKind, OperationNode};
use crate::operation::Operation;

pub fn lower_object_creation(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    creation: &ObjectCreationExpr<'_>,
) -> Operation {
    let initializer = lower_initializer(builder, creation.initializer, expr.ty);

    let Some(constructor) = creation.constructor else {
        trace!(span = %expr.span, "unresolved constructor");
        let mut children: Vec<Operation> = creation
            .arguments
            .iter()
            .filter(|a| !a.value.is_missing())
            .map(|a| builder.build_expr(&a.value))
            .collect();
        children.extend(initializer.map(|i| *i));
        return builder.finish(expr, OperationNode::Invalid { children }).invalid();
    };

    let parameters = builder
        .symbols()
        .method(constructor)
        .map(|m| m.parameters.as_slice())
        .unwrap_or_default();
    let arguments = lower_arguments(builder, parameters, creation.arguments, expr.span);
    builder.finish(
        expr,
        OperationNode::ObjectCreation {
            constructor,
            arguments,
            initializer,
        },
    )
}

/// `new T()` where `T` is a type parameter.
pub fn lower_type_parameter_creation(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    initializer: Option<&Initializer<'_>>,
) -> Operation {
    let initializer = lower_initializer(builder, initializer, expr.ty);
    builder.finish(expr, OperationNode::TypeParameterObjectCreation { initializer })
}

pub fn lower_dynamic_creation(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    creation: &DynamicObjectCreationExpr<'_>,
) -> Operation {
    let (arguments, argument_names, argument_ref_kinds) = lower_dynamic_arguments(builder, creation.arguments);
    let initializer = lower_initializer(builder, creation.initializer, expr.ty);
    builder.finish(
        expr,
        OperationNode::DynamicObjectCreation {
            arguments,
            argument_names,
            argument_ref_kinds,
            initializer,
        },
    )
}

fn lower_initializer(
    builder: &OperationBuilder<'_>,
    initializer: Option<&Initializer<'_>>,
    created: Option<TypeHash>,
) -> Option<Box<Operation>> {
    let initializer = initializer?;
    let initializers = match &initializer.kind {
        InitializerKind::Object(members) => members.iter().map(|m| builder.build_expr(m)).collect(),
        InitializerKind::Collection(elements) => elements
            .iter()
            .map(|element| {
                let receiver = implicit_receiver(created, element.span);
                let Some(add) = element.add_method else {
                    let children = element
                        .arguments
                        .iter()
                        .filter(|a| !a.value.is_missing())
                        .map(|a| builder.build_expr(&a.value))
                        .collect();
                    return Operation::new(OperationNode::Invalid { children }, None, element.span)
                        .implicit()
                        .invalid();
                };
                let (parameters, return_type, is_virtual) = match builder.symbols().method(add) {
                    Ok(m) => (m.parameters.as_slice(), Some(m.return_type), m.is_virtual),
                    Err(_) => (&[][..], None, false),
                };
                let arguments = lower_arguments(builder, parameters, element.arguments, element.span);
                Operation::new(
                    OperationNode::Invocation {
                        method: add,
                        instance: Some(Box::new(receiver)),
                        arguments,
                        is_virtual,
                    },
                    return_type,
                    element.span,
                )
                .implicit()
            })
            .collect(),
    };
    Some(Box::new(Operation::new(
        OperationNode::ObjectOrCollectionInitializer { initializers },
        created,
        initializer.span,
    )))
}

/// The object under construction, as seen from its initializer.
fn implicit_receiver(created: Option<TypeHash>, span: Span) -> Operation {
    Operation::new(
        OperationNode::InstanceReference {
            kind: InstanceReferenceKind::ImplicitReceiver,
        },
        created,
        span,
    )
    .implicit()
}
