//! Calls, arguments and late-bound invocations.

use rustc_hash::FxHashSet;
use semflow_bound::{BoundArgument, BoundExpr, CallExpr, DynamicInvocationExpr};
use semflow_core::{RefKind, Span, SymbolId};
use tracing::trace;

use super::OperationBuilder;
use super::references::lower_receiver;
use crate::node::{ArgumentKind, OperationNode};
use crate::operation::Operation;

/// Lower call arguments in source order, then append implicit arguments
/// for optional parameters nobody supplied.
pub(super) fn lower_arguments(
    builder: &OperationBuilder<'_>,
    parameters: &[SymbolId],
    arguments: &[BoundArgument<'_>],
    call_span: Span,
) -> Vec<Operation> {
    let mut supplied = FxHashSet::default();
    let mut lowered = Vec::with_capacity(parameters.len().max(arguments.len()));

    for (position, arg) in arguments.iter().enumerate() {
        let parameter = arg
            .parameter
            .or_else(|| if arg.name.is_none() { parameters.get(position).copied() } else { None });
        if let Some(p) = parameter {
            supplied.insert(p);
        }
        let value = builder.build_expr(&arg.value);
        lowered.push(
            Operation::new(
                OperationNode::Argument {
                    kind: ArgumentKind::Explicit,
                    parameter,
                    value: Box::new(value),
                    conversion: arg.conversion,
                },
                None,
                arg.value.span,
            )
            .with_invalid(!arg.conversion.exists),
        );
    }

    if builder.options().materialize_default_arguments {
        for &parameter in parameters {
            if supplied.contains(&parameter) {
                continue;
            }
            let Ok(symbol) = builder.symbols().parameter(parameter) else {
                continue;
            };
            let Some(default) = symbol.default_value.clone() else {
                continue;
            };
            let value = Operation::new(OperationNode::Literal, Some(symbol.ty), call_span)
                .with_constant(Some(default))
                .implicit();
            lowered.push(
                Operation::new(
                    OperationNode::Argument {
                        kind: ArgumentKind::DefaultValue,
                        parameter: Some(parameter),
                        value: Box::new(value),
                        conversion: semflow_core::Conversion::identity(),
                    },
                    None,
                    call_span,
                )
                .implicit(),
            );
        }
    }
    lowered
}

/// Late-bound arguments: values only, with names and ref-kinds as
/// parallel arrays that stay empty unless some argument has one.
pub(super) fn lower_dynamic_arguments(
    builder: &OperationBuilder<'_>,
    arguments: &[BoundArgument<'_>],
) -> (Vec<Operation>, Vec<Option<String>>, Vec<RefKind>) {
    let values = arguments.iter().map(|a| builder.build_expr(&a.value)).collect();
    let names = if arguments.iter().any(|a| a.name.is_some()) {
        arguments.iter().map(|a| a.name.map(str::to_string)).collect()
    } else {
        Vec::new()
    };
    let ref_kinds = if arguments.iter().any(|a| a.ref_kind != RefKind::None) {
        arguments.iter().map(|a| a.ref_kind).collect()
    } else {
        Vec::new()
    };
    (values, names, ref_kinds)
}

pub fn lower_call(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, call: &CallExpr<'_>) -> Operation {
    let receiver_is_dynamic = call
        .receiver
        .as_ref()
        .and_then(|r| r.ty)
        .is_some_and(|ty| builder.symbols().is_dynamic(ty));
    if receiver_is_dynamic {
        return lower_dynamic_call(builder, expr, call);
    }

    let Some(method) = call.method else {
        trace!(name = call.name, span = %expr.span, "unresolved call");
        let parts = call.receiver.iter().chain(call.arguments.iter().map(|a| &a.value));
        return builder.invalid_over(expr, parts);
    };

    let instance = lower_receiver(builder, call.receiver.as_ref(), method, expr);
    let (parameters, is_virtual) = match builder.symbols().method(method) {
        Ok(m) => (m.parameters.as_slice(), m.is_virtual),
        Err(_) => (&[][..], false),
    };
    let arguments = lower_arguments(builder, parameters, call.arguments, expr.span);
    builder.finish(
        expr,
        OperationNode::Invocation {
            method,
            instance,
            arguments,
            is_virtual,
        },
    )
}

/// `d.M(args)` on a `dynamic` receiver: the member lookup and the call
/// are both deferred.
fn lower_dynamic_call(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, call: &CallExpr<'_>) -> Operation {
    let receiver = call.receiver.as_ref().map(|r| Box::new(builder.build_expr(r)));
    let member_span = call.receiver.as_ref().map_or(expr.span, |r| r.span.cover(expr.span));
    let member = Operation::new(
        OperationNode::DynamicMemberReference {
            instance: receiver,
            member_name: call.name.to_string(),
            type_arguments: call.type_arguments.to_vec(),
            containing_type: None,
        },
        expr.ty,
        member_span,
    );
    let (arguments, argument_names, argument_ref_kinds) = lower_dynamic_arguments(builder, call.arguments);
    builder.finish(
        expr,
        OperationNode::DynamicInvocation {
            operation: Box::new(member),
            arguments,
            argument_names,
            argument_ref_kinds,
        },
    )
}

pub fn lower_dynamic_invocation(
    builder: &OperationBuilder<'_>,
    expr: &BoundExpr<'_>,
    call: &DynamicInvocationExpr<'_>,
) -> Operation {
    let target = builder.build_expr(&call.target);
    let (arguments, argument_names, argument_ref_kinds) = lower_dynamic_arguments(builder, call.arguments);
    builder.finish(
        expr,
        OperationNode::DynamicInvocation {
            operation: Box::new(target),
            arguments,
            argument_names,
            argument_ref_kinds,
        },
    )
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use semflow_bound::BoundFactory;
    use semflow_core::{ConstantValue, MethodSymbol, RefKind, SymbolTable, TypeEntry, TypeKind, primitives};

    use crate::{ArgumentKind, LoweringOptions, OperationBuilder, OperationKind, OperationNode};

    fn with_optional_method() -> (SymbolTable, semflow_core::SymbolId) {
        let mut symbols = SymbolTable::with_primitives();
        let m = symbols.add_method(MethodSymbol::new("M", primitives::VOID, None));
        symbols.add_parameter(m, "a", primitives::INT32, RefKind::None, None).unwrap();
        symbols
            .add_parameter(m, "b", primitives::INT32, RefKind::None, Some(ConstantValue::Int(5)))
            .unwrap();
        (symbols, m)
    }

    #[test]
    fn omitted_optional_argument_is_materialized() {
        let (symbols, m) = with_optional_method();
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_expr(&f.call(None, m, vec![f.int(1)]));

        let OperationNode::Invocation { arguments, .. } = op.node() else {
            panic!("expected invocation, got {op:?}");
        };
        assert_eq!(arguments.len(), 2);
        let OperationNode::Argument { kind, value, .. } = arguments[1].node() else {
            panic!("expected argument");
        };
        assert_eq!(*kind, ArgumentKind::DefaultValue);
        assert!(arguments[1].is_implicit());
        assert!(value.is_implicit());
        assert_eq!(value.constant_value(), Some(&ConstantValue::Int(5)));
        assert_eq!(value.result_type(), Some(primitives::INT32));
    }

    #[test]
    fn default_arguments_can_be_disabled() {
        let (symbols, m) = with_optional_method();
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let options = LoweringOptions::default().with_default_arguments(false);
        let op = OperationBuilder::new(&symbols, options).build_expr(&f.call(None, m, vec![f.int(1)]));
        assert_eq!(op.children().len(), 1);
    }

    #[test]
    fn unresolved_call_keeps_receiver_then_arguments() {
        let mut symbols = SymbolTable::with_primitives();
        let w = symbols.add_local("w", primitives::OBJECT);
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let call = f.unresolved_call(Some(f.local(w)), "Frob", vec![f.int(1), f.missing(), f.int(2)]);
        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_expr(&call);

        assert_eq!(op.kind(), OperationKind::Invalid);
        assert!(op.is_invalid());
        let kinds: Vec<_> = op.children().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![OperationKind::LocalReference, OperationKind::Literal, OperationKind::Literal]
        );
    }

    #[test]
    fn call_on_dynamic_receiver_is_late_bound() {
        let mut symbols = SymbolTable::with_primitives();
        let d = symbols.add_local("d", primitives::DYNAMIC);
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let call = f.call_with(
            Some(f.local(d)),
            "Go",
            None,
            vec![f.named_arg("x", f.int(1)), f.arg(f.int(2))],
            primitives::DYNAMIC,
        );
        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_expr(&call);

        let OperationNode::DynamicInvocation {
            operation,
            arguments,
            argument_names,
            argument_ref_kinds,
        } = op.node()
        else {
            panic!("expected dynamic invocation, got {op:?}");
        };
        assert_eq!(operation.kind(), OperationKind::DynamicMemberReference);
        assert_eq!(arguments.len(), 2);
        assert_eq!(argument_names, &vec![Some("x".to_string()), None]);
        assert!(argument_ref_kinds.is_empty());
        assert!(!op.is_invalid());
    }

    #[test]
    fn virtual_instance_call() {
        let mut symbols = SymbolTable::with_primitives();
        let widget = symbols.register_type(TypeEntry::new("Widget", TypeKind::Class)).unwrap();
        let m = symbols.add_method(MethodSymbol::new("Draw", primitives::VOID, Some(widget)).virtual_());
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_expr(&f.call(None, m, vec![]));
        let OperationNode::Invocation {
            instance: Some(this),
            is_virtual,
            ..
        } = op.node()
        else {
            panic!("expected invocation with receiver");
        };
        assert!(*is_virtual);
        assert!(this.is_implicit());
    }
}
