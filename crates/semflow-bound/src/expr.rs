//! Bound expression nodes.
//!
//! A [`BoundExpr`] is a syntax node after type checking: it carries its
//! span, resolved type, optional constant, and an error flag, and its
//! [`ExprKind`] payload holds resolved symbols and conversions. Children
//! are arena references (`&'b`), so a whole body lives in one [`bumpalo`]
//! arena and is dropped at once.

use semflow_core::{
    BinaryOperatorKind, ConstantValue, Conversion, RefKind, Span, SymbolId, TypeHash, UnaryOperatorKind,
};

use crate::pattern::BoundPattern;
use crate::stmt::BoundStmt;

/// A type-checked expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundExpr<'b> {
    pub kind: ExprKind<'b>,
    pub span: Span,
    /// Resolved type; `None` for method groups and unbindable syntax.
    pub ty: Option<TypeHash>,
    pub constant: Option<ConstantValue>,
    /// Type checking reported an error on this node.
    pub has_errors: bool,
    /// Synthesized by the binder rather than written in source.
    pub compiler_generated: bool,
}

impl<'b> BoundExpr<'b> {
    pub fn new(kind: ExprKind<'b>, ty: Option<TypeHash>, span: Span) -> Self {
        Self {
            kind,
            span,
            ty,
            constant: None,
            has_errors: false,
            compiler_generated: false,
        }
    }

    pub fn with_constant(mut self, constant: ConstantValue) -> Self {
        self.constant = Some(constant);
        self
    }

    pub fn with_errors(mut self) -> Self {
        self.has_errors = true;
        self
    }

    pub fn generated(mut self) -> Self {
        self.compiler_generated = true;
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Missing syntax has nothing that could be bound.
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, ExprKind::Missing)
    }
}

/// Expression payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind<'b> {
    /// Literal; the value is the node's constant.
    Literal,
    Local(LocalExpr),
    Parameter(SymbolId),
    /// `this`; `compiler_generated` when the binder inserted it.
    This,
    /// Receiver of member initializers inside `new T { ... }`.
    ImplicitReceiver,
    Field(&'b MemberAccess<'b>),
    Property(&'b PropertyAccess<'b>),
    Event(&'b MemberAccess<'b>),
    MethodGroup(&'b MethodGroup<'b>),
    Call(&'b CallExpr<'b>),
    DynamicInvocation(&'b DynamicInvocationExpr<'b>),
    DynamicMemberAccess(&'b DynamicMemberAccessExpr<'b>),
    ObjectCreation(&'b ObjectCreationExpr<'b>),
    /// `new T()` where `T` is a type parameter.
    NewTypeParameter(Option<&'b Initializer<'b>>),
    DynamicObjectCreation(&'b DynamicObjectCreationExpr<'b>),
    Conditional(&'b ConditionalExpr<'b>),
    NullCoalescing(&'b CoalesceExpr<'b>),
    ConditionalAccess(&'b ConditionalAccessExpr<'b>),
    /// Placeholder for the receiver inside a conditional access.
    ConditionalReceiver,
    Binary(&'b BinaryExpr<'b>),
    Unary(&'b UnaryExpr<'b>),
    Assignment(&'b AssignmentExpr<'b>),
    CompoundAssignment(&'b CompoundAssignmentExpr<'b>),
    IncrementOrDecrement(&'b IncrementExpr<'b>),
    Conversion(&'b ConversionExpr<'b>),
    AddressOf(&'b BoundExpr<'b>),
    SizeOf(TypeHash),
    NameOf(&'b NameOfExpr<'b>),
    /// `default` / `default(T)`.
    Default,
    IsType(&'b IsTypeExpr<'b>),
    IsPattern(&'b IsPatternExpr<'b>),
    Await(&'b BoundExpr<'b>),
    Lambda(&'b LambdaExpr<'b>),
    /// Binding failed; the children are whatever could still be bound.
    Bad(&'b [BoundExpr<'b>]),
    /// Syntax with nothing bindable in it (e.g. a missing initializer).
    Missing,
}

/// Reference to a local variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalExpr {
    pub local: SymbolId,
    /// The reference is the declaration site (`out var x`, `int x = ...`).
    pub is_declaration: bool,
}

/// Field or event access.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess<'b> {
    pub receiver: Option<BoundExpr<'b>>,
    pub member: SymbolId,
}

/// Property or indexer access.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccess<'b> {
    pub receiver: Option<BoundExpr<'b>>,
    pub property: SymbolId,
    pub arguments: &'b [BoundArgument<'b>],
}

/// A method group, possibly resolved to a single method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodGroup<'b> {
    pub receiver: Option<BoundExpr<'b>>,
    pub name: &'b str,
    /// `None` when lookup found nothing usable.
    pub method: Option<SymbolId>,
    pub type_arguments: &'b [TypeHash],
}

/// A call argument as written.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgument<'b> {
    pub value: BoundExpr<'b>,
    pub name: Option<&'b str>,
    pub ref_kind: RefKind,
    /// Parameter matched by overload resolution.
    pub parameter: Option<SymbolId>,
    /// Conversion from the argument to the parameter type.
    pub conversion: Conversion,
}

impl<'b> BoundArgument<'b> {
    pub fn positional(value: BoundExpr<'b>) -> Self {
        Self {
            value,
            name: None,
            ref_kind: RefKind::None,
            parameter: None,
            conversion: Conversion::identity(),
        }
    }
}

/// A method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr<'b> {
    pub receiver: Option<BoundExpr<'b>>,
    pub name: &'b str,
    /// `None` when overload resolution failed.
    pub method: Option<SymbolId>,
    pub arguments: &'b [BoundArgument<'b>],
    pub type_arguments: &'b [TypeHash],
}

/// An invocation whose target is only known at run time.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicInvocationExpr<'b> {
    pub target: BoundExpr<'b>,
    pub arguments: &'b [BoundArgument<'b>],
}

/// A member lookup deferred to run time.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMemberAccessExpr<'b> {
    pub receiver: Option<BoundExpr<'b>>,
    pub name: &'b str,
    pub type_arguments: &'b [TypeHash],
    pub containing_type: Option<TypeHash>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCreationExpr<'b> {
    /// `None` when no constructor could be chosen.
    pub constructor: Option<SymbolId>,
    pub arguments: &'b [BoundArgument<'b>],
    pub initializer: Option<&'b Initializer<'b>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicObjectCreationExpr<'b> {
    pub arguments: &'b [BoundArgument<'b>],
    pub initializer: Option<&'b Initializer<'b>>,
}

/// An object or collection initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Initializer<'b> {
    pub kind: InitializerKind<'b>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitializerKind<'b> {
    /// Member assignments whose targets hang off [`ExprKind::ImplicitReceiver`].
    Object(&'b [BoundExpr<'b>]),
    Collection(&'b [CollectionElement<'b>]),
}

/// One `Add` call of a collection initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionElement<'b> {
    /// `None` when no suitable `Add` was found.
    pub add_method: Option<SymbolId>,
    pub arguments: &'b [BoundArgument<'b>],
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr<'b> {
    pub condition: BoundExpr<'b>,
    pub when_true: BoundExpr<'b>,
    pub when_false: BoundExpr<'b>,
    pub is_ref: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoalesceExpr<'b> {
    pub value: BoundExpr<'b>,
    pub when_null: BoundExpr<'b>,
}

/// `receiver?.access`; `access` reads the receiver through
/// [`ExprKind::ConditionalReceiver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalAccessExpr<'b> {
    pub receiver: BoundExpr<'b>,
    pub access: BoundExpr<'b>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr<'b> {
    pub op: BinaryOperatorKind,
    pub left: BoundExpr<'b>,
    pub right: BoundExpr<'b>,
    /// User-defined operator, if one was chosen.
    pub method: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr<'b> {
    pub op: UnaryOperatorKind,
    pub operand: BoundExpr<'b>,
    pub method: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr<'b> {
    pub target: BoundExpr<'b>,
    pub value: BoundExpr<'b>,
    pub is_ref: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAssignmentExpr<'b> {
    pub op: BinaryOperatorKind,
    pub target: BoundExpr<'b>,
    pub value: BoundExpr<'b>,
    pub method: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncrementExpr<'b> {
    pub target: BoundExpr<'b>,
    pub is_decrement: bool,
    pub is_postfix: bool,
    pub method: Option<SymbolId>,
}

/// A conversion to the node's type.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionExpr<'b> {
    pub operand: BoundExpr<'b>,
    pub conversion: Conversion,
    pub is_checked: bool,
    /// `as` conversions yield null instead of throwing.
    pub is_try_cast: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameOfExpr<'b> {
    /// The argument as bound (never evaluated).
    pub argument: BoundExpr<'b>,
    /// The symbol named, when binding resolved it.
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsTypeExpr<'b> {
    pub operand: BoundExpr<'b>,
    pub target_type: TypeHash,
    pub is_negated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsPatternExpr<'b> {
    pub operand: BoundExpr<'b>,
    pub pattern: BoundPattern<'b>,
}

/// A lambda or anonymous method.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr<'b> {
    pub symbol: SymbolId,
    pub body: LambdaBody<'b>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody<'b> {
    Expression(BoundExpr<'b>),
    Block(BoundStmt<'b>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use semflow_core::primitives;

    #[test]
    fn builder_methods_set_header() {
        let span = Span::new(2, 4, 1);
        let e = BoundExpr::new(ExprKind::Literal, Some(primitives::INT32), Span::default())
            .with_constant(ConstantValue::Int(1))
            .at(span)
            .generated();

        assert_eq!(e.span, span);
        assert_eq!(e.constant, Some(ConstantValue::Int(1)));
        assert!(e.compiler_generated);
        assert!(!e.has_errors);
    }

    #[test]
    fn missing_is_detected() {
        let e = BoundExpr::new(ExprKind::Missing, None, Span::default());
        assert!(e.is_missing());
        let e = BoundExpr::new(ExprKind::Default, Some(primitives::INT32), Span::default());
        assert!(!e.is_missing());
    }
}
