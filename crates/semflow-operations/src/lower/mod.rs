//! Bound tree to operation tree lowering.
//!
//! The [`OperationBuilder`] produces exactly one [`Operation`] per bound
//! node. It never fails: anything type checking could not bind comes out
//! as an invalid operation that keeps whatever sub-operations did bind.
//!
//! ```ignore
//! let builder = OperationBuilder::new(&symbols, LoweringOptions::default());
//! let body = builder.build_body(&bound_body);
//! ```
//!
//! Each construct family lives in its own submodule as free functions
//! taking the builder, in the same shape for every family.

mod constant;
mod conversion;
mod creation;
mod invocation;
mod operators;
mod patterns;
mod references;
mod statements;

use semflow_bound::{BoundExpr, BoundStmt, ExprKind, StmtKind};
use semflow_core::{ConstantValue, Span, SymbolTable, TypeHash};
use tracing::debug;

use crate::node::{InstanceReferenceKind, OperationNode};
use crate::operation::Operation;
use crate::options::LoweringOptions;

/// Lowers bound nodes to operations.
pub struct OperationBuilder<'s> {
    symbols: &'s SymbolTable,
    options: LoweringOptions,
}

impl<'s> OperationBuilder<'s> {
    pub fn new(symbols: &'s SymbolTable, options: LoweringOptions) -> Self {
        Self { symbols, options }
    }

    pub fn symbols(&self) -> &'s SymbolTable {
        self.symbols
    }

    pub fn options(&self) -> &LoweringOptions {
        &self.options
    }

    /// Lower a method body. A non-block body is wrapped in an implicit block.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build_body(&self, body: &BoundStmt<'_>) -> Operation {
        debug!(span = %body.span, "lowering body");
        match body.kind {
            StmtKind::Block(_) => self.build_stmt(body),
            _ => {
                let inner = self.build_stmt(body);
                Operation::new(
                    OperationNode::Block {
                        operations: vec![inner],
                        locals: Vec::new(),
                    },
                    None,
                    body.span,
                )
                .implicit()
            }
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build_stmt(&self, stmt: &BoundStmt<'_>) -> Operation {
        statements::lower_statement(self, stmt).with_invalid(stmt.has_errors)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build_expr(&self, expr: &BoundExpr<'_>) -> Operation {
        match &expr.kind {
            ExprKind::Literal => self.finish(expr, OperationNode::Literal),
            ExprKind::Local(local) => self.finish(
                expr,
                OperationNode::LocalReference {
                    local: local.local,
                    is_declaration: local.is_declaration,
                },
            ),
            ExprKind::Parameter(parameter) => {
                self.finish(expr, OperationNode::ParameterReference { parameter: *parameter })
            }
            ExprKind::This => self.finish(
                expr,
                OperationNode::InstanceReference {
                    kind: InstanceReferenceKind::ContainingTypeInstance,
                },
            ),
            ExprKind::ImplicitReceiver => self
                .finish(
                    expr,
                    OperationNode::InstanceReference {
                        kind: InstanceReferenceKind::ImplicitReceiver,
                    },
                )
                .implicit(),
            ExprKind::ConditionalReceiver => self.finish(expr, OperationNode::ConditionalAccessInstance).implicit(),

            ExprKind::Field(access) => references::lower_field(self, expr, access),
            ExprKind::Event(access) => references::lower_event(self, expr, access),
            ExprKind::Property(access) => references::lower_property(self, expr, access),
            ExprKind::MethodGroup(group) => references::lower_method_group(self, expr, group),
            ExprKind::DynamicMemberAccess(access) => references::lower_dynamic_member(self, expr, access),

            ExprKind::Call(call) => invocation::lower_call(self, expr, call),
            ExprKind::DynamicInvocation(call) => invocation::lower_dynamic_invocation(self, expr, call),

            ExprKind::ObjectCreation(creation) => creation::lower_object_creation(self, expr, creation),
            ExprKind::NewTypeParameter(initializer) => creation::lower_type_parameter_creation(self, expr, *initializer),
            ExprKind::DynamicObjectCreation(creation) => creation::lower_dynamic_creation(self, expr, creation),

            ExprKind::Conditional(cond) => operators::lower_conditional(self, expr, cond),
            ExprKind::NullCoalescing(coalesce) => operators::lower_coalesce(self, expr, coalesce),
            ExprKind::ConditionalAccess(access) => operators::lower_conditional_access(self, expr, access),
            ExprKind::Binary(_) => operators::lower_binary(self, expr),
            ExprKind::Unary(unary) => operators::lower_unary(self, expr, unary),
            ExprKind::Assignment(assign) => operators::lower_assignment(self, expr, assign),
            ExprKind::CompoundAssignment(assign) => operators::lower_compound_assignment(self, expr, assign),
            ExprKind::IncrementOrDecrement(inc) => operators::lower_increment(self, expr, inc),
            ExprKind::Await(operand) => operators::lower_await(self, expr, operand),

            ExprKind::Conversion(conv) => conversion::lower_conversion(self, expr, conv),
            ExprKind::AddressOf(operand) => conversion::lower_address_of(self, expr, operand),
            ExprKind::Lambda(lambda) => conversion::lower_lambda(self, expr, lambda),

            ExprKind::SizeOf(ty) => constant::lower_size_of(self, expr, *ty),
            ExprKind::NameOf(name_of) => constant::lower_name_of(self, expr, name_of),
            ExprKind::Default => constant::lower_default(self, expr),

            ExprKind::IsType(is_type) => patterns::lower_is_type(self, expr, is_type),
            ExprKind::IsPattern(is_pattern) => patterns::lower_is_pattern(self, expr, is_pattern),

            ExprKind::Bad(children) => {
                let children = children.iter().filter(|c| !c.is_missing()).map(|c| self.build_expr(c)).collect();
                self.finish(expr, OperationNode::Invalid { children }).invalid()
            }
            ExprKind::Missing => self.finish(expr, OperationNode::Invalid { children: Vec::new() }).invalid(),
        }
    }

    // ------------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------------

    /// Attach the bound node's header: type, span, binder constant,
    /// implicitness and error flag.
    pub(crate) fn finish(&self, expr: &BoundExpr<'_>, node: OperationNode) -> Operation {
        Operation::new(node, expr.ty, expr.span)
            .with_constant(expr.constant.clone())
            .with_implicit(expr.compiler_generated)
            .with_invalid(expr.has_errors)
    }

    /// Like [`finish`](Self::finish), but a missing binder constant may be
    /// replaced by a folded one.
    pub(crate) fn finish_folded(
        &self,
        expr: &BoundExpr<'_>,
        node: OperationNode,
        folded: impl FnOnce() -> Option<ConstantValue>,
    ) -> Operation {
        let op = self.finish(expr, node);
        if op.constant_value().is_some() || !self.options.fold_constants || op.is_invalid() {
            return op;
        }
        let constant = folded();
        op.with_constant(constant)
    }

    /// Lower an optional operand, dropping missing syntax.
    pub(crate) fn build_opt(&self, expr: Option<&BoundExpr<'_>>) -> Option<Box<Operation>> {
        expr.map(|e| Box::new(self.build_expr(e)))
    }

    /// An invalid operation over the bindable parts, dropping missing syntax.
    pub(crate) fn invalid_over<'e, 'b: 'e>(
        &self,
        expr: &BoundExpr<'_>,
        parts: impl IntoIterator<Item = &'e BoundExpr<'b>>,
    ) -> Operation {
        let children = parts.into_iter().filter(|p| !p.is_missing()).map(|p| self.build_expr(p)).collect();
        self.finish(expr, OperationNode::Invalid { children }).invalid()
    }

    /// An implicit `this` of the given type.
    pub(crate) fn implicit_this(&self, ty: Option<TypeHash>, span: Span) -> Operation {
        Operation::new(
            OperationNode::InstanceReference {
                kind: InstanceReferenceKind::ContainingTypeInstance,
            },
            ty,
            span,
        )
        .implicit()
    }
}

