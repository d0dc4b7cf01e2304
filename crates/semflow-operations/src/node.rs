//! Variant payloads of [`Operation`].
//!
//! Operands are owned children (`Box<Operation>` / `Vec<Operation>`);
//! symbols are [`SymbolId`] handles and types are [`TypeHash`] identities,
//! both resolved through the symbol table.

use semflow_core::{
    BinaryOperatorKind, CaptureId, Conversion, LabelId, RefKind, SymbolId, TypeHash, UnaryOperatorKind,
};

use crate::kind::OperationKind;
use crate::operation::Operation;

/// What an [`OperationNode::InstanceReference`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceReferenceKind {
    /// `this`, written or implied.
    ContainingTypeInstance,
    /// The object being initialized inside `new T { ... }`.
    ImplicitReceiver,
    /// The value a pattern is matched against.
    PatternInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    /// Written at the call site.
    Explicit,
    /// Materialized from the parameter's default value.
    DefaultValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Break,
    Continue,
    GoTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// Condition tested before each iteration.
    While,
    /// Condition tested after each iteration.
    DoWhile,
    For,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternCombinator {
    And,
    Or,
}

/// The test a switch case clause performs.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseClauseKind {
    SingleValue(Box<Operation>),
    Pattern {
        pattern: Box<Operation>,
        guard: Option<Box<Operation>>,
    },
    Default,
}

/// Payload of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationNode {
    // === Expressions ===
    /// Value is the operation's constant.
    Literal,
    LocalReference {
        local: SymbolId,
        is_declaration: bool,
    },
    ParameterReference {
        parameter: SymbolId,
    },
    InstanceReference {
        kind: InstanceReferenceKind,
    },
    FieldReference {
        field: SymbolId,
        instance: Option<Box<Operation>>,
    },
    PropertyReference {
        property: SymbolId,
        instance: Option<Box<Operation>>,
        arguments: Vec<Operation>,
    },
    EventReference {
        event: SymbolId,
        instance: Option<Box<Operation>>,
    },
    MethodReference {
        method: SymbolId,
        instance: Option<Box<Operation>>,
        is_virtual: bool,
    },
    Invocation {
        method: SymbolId,
        instance: Option<Box<Operation>>,
        arguments: Vec<Operation>,
        is_virtual: bool,
    },
    Argument {
        kind: ArgumentKind,
        parameter: Option<SymbolId>,
        value: Box<Operation>,
        conversion: Conversion,
    },
    /// Late-bound call; names and ref-kinds are parallel to `arguments`
    /// and empty when no argument has one.
    DynamicInvocation {
        operation: Box<Operation>,
        arguments: Vec<Operation>,
        argument_names: Vec<Option<String>>,
        argument_ref_kinds: Vec<RefKind>,
    },
    DynamicMemberReference {
        instance: Option<Box<Operation>>,
        member_name: String,
        type_arguments: Vec<TypeHash>,
        containing_type: Option<TypeHash>,
    },
    DynamicObjectCreation {
        arguments: Vec<Operation>,
        argument_names: Vec<Option<String>>,
        argument_ref_kinds: Vec<RefKind>,
        initializer: Option<Box<Operation>>,
    },
    ObjectCreation {
        constructor: SymbolId,
        arguments: Vec<Operation>,
        initializer: Option<Box<Operation>>,
    },
    TypeParameterObjectCreation {
        initializer: Option<Box<Operation>>,
    },
    ObjectOrCollectionInitializer {
        initializers: Vec<Operation>,
    },
    AddressOf {
        reference: Box<Operation>,
    },
    SizeOf {
        type_operand: TypeHash,
    },
    /// Folded to a string constant; the argument is not kept.
    NameOf,
    IsType {
        value: Box<Operation>,
        type_operand: TypeHash,
        is_negated: bool,
    },
    IsPattern {
        value: Box<Operation>,
        pattern: Box<Operation>,
    },
    IncrementOrDecrement {
        is_decrement: bool,
        is_postfix: bool,
        target: Box<Operation>,
        method: Option<SymbolId>,
    },
    Await {
        operation: Box<Operation>,
    },
    DefaultValue,
    /// Conditional expression, or an `if` statement when untyped.
    Conditional {
        condition: Box<Operation>,
        when_true: Box<Operation>,
        when_false: Option<Box<Operation>>,
        is_ref: bool,
    },
    Coalesce {
        value: Box<Operation>,
        when_null: Box<Operation>,
    },
    ConditionalAccess {
        operation: Box<Operation>,
        when_not_null: Box<Operation>,
    },
    ConditionalAccessInstance,
    Conversion {
        operand: Box<Operation>,
        conversion: Conversion,
        is_checked: bool,
        is_try_cast: bool,
    },
    DelegateCreation {
        target: Box<Operation>,
    },
    AnonymousFunction {
        symbol: SymbolId,
        body: Box<Operation>,
    },
    Unary {
        op: UnaryOperatorKind,
        operand: Box<Operation>,
        method: Option<SymbolId>,
    },
    Binary {
        op: BinaryOperatorKind,
        left: Box<Operation>,
        right: Box<Operation>,
        method: Option<SymbolId>,
    },
    SimpleAssignment {
        target: Box<Operation>,
        value: Box<Operation>,
        is_ref: bool,
    },
    CompoundAssignment {
        op: BinaryOperatorKind,
        target: Box<Operation>,
        value: Box<Operation>,
        method: Option<SymbolId>,
    },
    /// The exception object inside a catch handler.
    CaughtException,

    // === Patterns ===
    ConstantPattern {
        value: Box<Operation>,
    },
    TypePattern {
        matched_type: TypeHash,
    },
    DeclarationPattern {
        matched_type: TypeHash,
        declared: Option<SymbolId>,
    },
    RelationalPattern {
        op: BinaryOperatorKind,
        value: Box<Operation>,
    },
    NegatedPattern {
        pattern: Box<Operation>,
    },
    BinaryPattern {
        op: PatternCombinator,
        left: Box<Operation>,
        right: Box<Operation>,
    },
    DiscardPattern,

    // === Statements ===
    Block {
        operations: Vec<Operation>,
        locals: Vec<SymbolId>,
    },
    ExpressionStatement {
        operation: Box<Operation>,
    },
    VariableDeclarationGroup {
        declarations: Vec<Operation>,
    },
    VariableDeclaration {
        declarators: Vec<Operation>,
    },
    VariableDeclarator {
        local: SymbolId,
        initializer: Option<Box<Operation>>,
    },
    VariableInitializer {
        value: Box<Operation>,
    },
    Return {
        value: Option<Box<Operation>>,
    },
    Branch {
        kind: BranchKind,
        target: LabelId,
    },
    Labeled {
        label: LabelId,
        operation: Option<Box<Operation>>,
    },
    Loop {
        kind: LoopKind,
        /// `for` initializers.
        before: Vec<Operation>,
        condition: Option<Box<Operation>>,
        body: Box<Operation>,
        /// `for` increments.
        at_loop_bottom: Vec<Operation>,
        locals: Vec<SymbolId>,
        continue_label: LabelId,
        exit_label: LabelId,
    },
    Switch {
        value: Box<Operation>,
        cases: Vec<Operation>,
        locals: Vec<SymbolId>,
        exit_label: LabelId,
    },
    SwitchCase {
        clauses: Vec<Operation>,
        body: Vec<Operation>,
        locals: Vec<SymbolId>,
    },
    CaseClause {
        label: LabelId,
        clause: CaseClauseKind,
    },
    /// `throw e`, or a rethrow when `exception` is `None`.
    Throw {
        exception: Option<Box<Operation>>,
    },
    Try {
        body: Box<Operation>,
        catches: Vec<Operation>,
        finally: Option<Box<Operation>>,
    },
    CatchClause {
        exception_type: TypeHash,
        locals: Vec<SymbolId>,
        declaration: Option<Box<Operation>>,
        filter: Option<Box<Operation>>,
        handler: Box<Operation>,
    },
    Empty,

    // === Errors and flow ===
    /// Something that failed to bind, with the parts that did.
    Invalid {
        children: Vec<Operation>,
    },
    FlowCapture {
        id: CaptureId,
        value: Box<Operation>,
    },
    FlowCaptureReference {
        id: CaptureId,
    },
    IsNull {
        operand: Box<Operation>,
    },
}

type Labeled<'a> = Vec<(&'static str, &'a Operation)>;

fn push<'a>(out: &mut Labeled<'a>, label: &'static str, op: &'a Operation) {
    out.push((label, op));
}

fn push_opt<'a>(out: &mut Labeled<'a>, label: &'static str, op: &'a Option<Box<Operation>>) {
    if let Some(op) = op {
        push(out, label, op);
    }
}

fn push_all<'a>(out: &mut Labeled<'a>, label: &'static str, ops: &'a [Operation]) {
    out.extend(ops.iter().map(|op| (label, op)));
}

impl OperationNode {
    pub fn kind(&self) -> OperationKind {
        use OperationNode as N;
        match self {
            N::Literal => OperationKind::Literal,
            N::LocalReference { .. } => OperationKind::LocalReference,
            N::ParameterReference { .. } => OperationKind::ParameterReference,
            N::InstanceReference { .. } => OperationKind::InstanceReference,
            N::FieldReference { .. } => OperationKind::FieldReference,
            N::PropertyReference { .. } => OperationKind::PropertyReference,
            N::EventReference { .. } => OperationKind::EventReference,
            N::MethodReference { .. } => OperationKind::MethodReference,
            N::Invocation { .. } => OperationKind::Invocation,
            N::Argument { .. } => OperationKind::Argument,
            N::DynamicInvocation { .. } => OperationKind::DynamicInvocation,
            N::DynamicMemberReference { .. } => OperationKind::DynamicMemberReference,
            N::DynamicObjectCreation { .. } => OperationKind::DynamicObjectCreation,
            N::ObjectCreation { .. } => OperationKind::ObjectCreation,
            N::TypeParameterObjectCreation { .. } => OperationKind::TypeParameterObjectCreation,
            N::ObjectOrCollectionInitializer { .. } => OperationKind::ObjectOrCollectionInitializer,
            N::AddressOf { .. } => OperationKind::AddressOf,
            N::SizeOf { .. } => OperationKind::SizeOf,
            N::NameOf => OperationKind::NameOf,
            N::IsType { .. } => OperationKind::IsType,
            N::IsPattern { .. } => OperationKind::IsPattern,
            N::IncrementOrDecrement { .. } => OperationKind::IncrementOrDecrement,
            N::Await { .. } => OperationKind::Await,
            N::DefaultValue => OperationKind::DefaultValue,
            N::Conditional { .. } => OperationKind::Conditional,
            N::Coalesce { .. } => OperationKind::Coalesce,
            N::ConditionalAccess { .. } => OperationKind::ConditionalAccess,
            N::ConditionalAccessInstance => OperationKind::ConditionalAccessInstance,
            N::Conversion { .. } => OperationKind::Conversion,
            N::DelegateCreation { .. } => OperationKind::DelegateCreation,
            N::AnonymousFunction { .. } => OperationKind::AnonymousFunction,
            N::Unary { .. } => OperationKind::Unary,
            N::Binary { .. } => OperationKind::Binary,
            N::SimpleAssignment { .. } => OperationKind::SimpleAssignment,
            N::CompoundAssignment { .. } => OperationKind::CompoundAssignment,
            N::CaughtException => OperationKind::CaughtException,
            N::ConstantPattern { .. } => OperationKind::ConstantPattern,
            N::TypePattern { .. } => OperationKind::TypePattern,
            N::DeclarationPattern { .. } => OperationKind::DeclarationPattern,
            N::RelationalPattern { .. } => OperationKind::RelationalPattern,
            N::NegatedPattern { .. } => OperationKind::NegatedPattern,
            N::BinaryPattern { .. } => OperationKind::BinaryPattern,
            N::DiscardPattern => OperationKind::DiscardPattern,
            N::Block { .. } => OperationKind::Block,
            N::ExpressionStatement { .. } => OperationKind::ExpressionStatement,
            N::VariableDeclarationGroup { .. } => OperationKind::VariableDeclarationGroup,
            N::VariableDeclaration { .. } => OperationKind::VariableDeclaration,
            N::VariableDeclarator { .. } => OperationKind::VariableDeclarator,
            N::VariableInitializer { .. } => OperationKind::VariableInitializer,
            N::Return { .. } => OperationKind::Return,
            N::Branch { .. } => OperationKind::Branch,
            N::Labeled { .. } => OperationKind::Labeled,
            N::Loop { .. } => OperationKind::Loop,
            N::Switch { .. } => OperationKind::Switch,
            N::SwitchCase { .. } => OperationKind::SwitchCase,
            N::CaseClause { .. } => OperationKind::CaseClause,
            N::Throw { .. } => OperationKind::Throw,
            N::Try { .. } => OperationKind::Try,
            N::CatchClause { .. } => OperationKind::CatchClause,
            N::Empty => OperationKind::Empty,
            N::Invalid { .. } => OperationKind::Invalid,
            N::FlowCapture { .. } => OperationKind::FlowCapture,
            N::FlowCaptureReference { .. } => OperationKind::FlowCaptureReference,
            N::IsNull { .. } => OperationKind::IsNull,
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Operation> {
        self.labeled_children().into_iter().map(|(_, op)| op).collect()
    }

    /// Mutable access to the direct children, in the same order as
    /// [`OperationNode::children`].
    pub fn children_mut(&mut self) -> Vec<&mut Operation> {
        use OperationNode as N;
        let mut out: Vec<&mut Operation> = Vec::new();
        match self {
            N::Literal
            | N::LocalReference { .. }
            | N::ParameterReference { .. }
            | N::InstanceReference { .. }
            | N::SizeOf { .. }
            | N::NameOf
            | N::DefaultValue
            | N::ConditionalAccessInstance
            | N::CaughtException
            | N::TypePattern { .. }
            | N::DeclarationPattern { .. }
            | N::DiscardPattern
            | N::Branch { .. }
            | N::Empty
            | N::FlowCaptureReference { .. } => {}

            N::FieldReference { instance, .. }
            | N::EventReference { instance, .. }
            | N::MethodReference { instance, .. }
            | N::DynamicMemberReference { instance, .. } => out.extend(instance.as_deref_mut()),
            N::PropertyReference { instance, arguments, .. } | N::Invocation { instance, arguments, .. } => {
                out.extend(instance.as_deref_mut());
                out.extend(arguments.iter_mut());
            }
            N::Argument { value, .. } => out.push(value),
            N::DynamicInvocation { operation, arguments, .. } => {
                out.push(operation);
                out.extend(arguments.iter_mut());
            }
            N::DynamicObjectCreation { arguments, initializer, .. } | N::ObjectCreation { arguments, initializer, .. } => {
                out.extend(arguments.iter_mut());
                out.extend(initializer.as_deref_mut());
            }
            N::TypeParameterObjectCreation { initializer } => out.extend(initializer.as_deref_mut()),
            N::ObjectOrCollectionInitializer { initializers } => out.extend(initializers.iter_mut()),
            N::AddressOf { reference } => out.push(reference),
            N::IsType { value, .. } => out.push(value),
            N::IsPattern { value, pattern } => {
                out.push(value);
                out.push(pattern);
            }
            N::IncrementOrDecrement { target, .. } => out.push(target),
            N::Await { operation } => out.push(operation),
            N::Conditional {
                condition,
                when_true,
                when_false,
                ..
            } => {
                out.push(condition);
                out.push(when_true);
                out.extend(when_false.as_deref_mut());
            }
            N::Coalesce { value, when_null } => {
                out.push(value);
                out.push(when_null);
            }
            N::ConditionalAccess { operation, when_not_null } => {
                out.push(operation);
                out.push(when_not_null);
            }
            N::Conversion { operand, .. } | N::Unary { operand, .. } | N::IsNull { operand } => out.push(operand),
            N::DelegateCreation { target } => out.push(target),
            N::AnonymousFunction { body, .. } => out.push(body),
            N::Binary { left, right, .. } | N::BinaryPattern { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            N::SimpleAssignment { target, value, .. } | N::CompoundAssignment { target, value, .. } => {
                out.push(target);
                out.push(value);
            }
            N::ConstantPattern { value } | N::RelationalPattern { value, .. } => out.push(value),
            N::NegatedPattern { pattern } => out.push(pattern),
            N::Block { operations, .. } => out.extend(operations.iter_mut()),
            N::ExpressionStatement { operation } => out.push(operation),
            N::VariableDeclarationGroup { declarations } => out.extend(declarations.iter_mut()),
            N::VariableDeclaration { declarators } => out.extend(declarators.iter_mut()),
            N::VariableDeclarator { initializer, .. } => out.extend(initializer.as_deref_mut()),
            N::VariableInitializer { value } => out.push(value),
            N::Return { value } => out.extend(value.as_deref_mut()),
            N::Labeled { operation, .. } => out.extend(operation.as_deref_mut()),
            N::Loop {
                kind,
                before,
                condition,
                body,
                at_loop_bottom,
                ..
            } => {
                out.extend(before.iter_mut());
                if *kind == LoopKind::DoWhile {
                    out.push(body);
                    out.extend(condition.as_deref_mut());
                } else {
                    out.extend(condition.as_deref_mut());
                    out.push(body);
                    out.extend(at_loop_bottom.iter_mut());
                }
            }
            N::Switch { value, cases, .. } => {
                out.push(value);
                out.extend(cases.iter_mut());
            }
            N::SwitchCase { clauses, body, .. } => {
                out.extend(clauses.iter_mut());
                out.extend(body.iter_mut());
            }
            N::CaseClause { clause, .. } => match clause {
                CaseClauseKind::SingleValue(value) => out.push(value),
                CaseClauseKind::Pattern { pattern, guard } => {
                    out.push(pattern);
                    out.extend(guard.as_deref_mut());
                }
                CaseClauseKind::Default => {}
            },
            N::Throw { exception } => out.extend(exception.as_deref_mut()),
            N::Try { body, catches, finally } => {
                out.push(body);
                out.extend(catches.iter_mut());
                out.extend(finally.as_deref_mut());
            }
            N::CatchClause {
                declaration,
                filter,
                handler,
                ..
            } => {
                out.extend(declaration.as_deref_mut());
                out.extend(filter.as_deref_mut());
                out.push(handler);
            }
            N::Invalid { children } => out.extend(children.iter_mut()),
            N::FlowCapture { value, .. } => out.push(value),
        }
        out
    }

    /// Direct children in evaluation order, each with the role it plays
    /// in this node (`Instance`, `Left`, `WhenTrue`, ...).
    pub fn labeled_children(&self) -> Vec<(&'static str, &Operation)> {
        use OperationNode as N;
        let mut out: Labeled<'_> = Vec::new();
        match self {
            N::Literal
            | N::LocalReference { .. }
            | N::ParameterReference { .. }
            | N::InstanceReference { .. }
            | N::SizeOf { .. }
            | N::NameOf
            | N::DefaultValue
            | N::ConditionalAccessInstance
            | N::CaughtException
            | N::TypePattern { .. }
            | N::DeclarationPattern { .. }
            | N::DiscardPattern
            | N::Branch { .. }
            | N::Empty
            | N::FlowCaptureReference { .. } => {}

            N::FieldReference { instance, .. }
            | N::EventReference { instance, .. }
            | N::MethodReference { instance, .. }
            | N::DynamicMemberReference { instance, .. } => push_opt(&mut out, "Instance", instance),
            N::PropertyReference { instance, arguments, .. } | N::Invocation { instance, arguments, .. } => {
                push_opt(&mut out, "Instance", instance);
                push_all(&mut out, "Arguments", arguments);
            }
            N::Argument { value, .. } => push(&mut out, "Value", value),
            N::DynamicInvocation { operation, arguments, .. } => {
                push(&mut out, "Operation", operation);
                push_all(&mut out, "Arguments", arguments);
            }
            N::DynamicObjectCreation { arguments, initializer, .. } | N::ObjectCreation { arguments, initializer, .. } => {
                push_all(&mut out, "Arguments", arguments);
                push_opt(&mut out, "Initializer", initializer);
            }
            N::TypeParameterObjectCreation { initializer } => push_opt(&mut out, "Initializer", initializer),
            N::ObjectOrCollectionInitializer { initializers } => push_all(&mut out, "Initializers", initializers),
            N::AddressOf { reference } => push(&mut out, "Reference", reference),
            N::IsType { value, .. } => push(&mut out, "ValueOperand", value),
            N::IsPattern { value, pattern } => {
                push(&mut out, "Value", value);
                push(&mut out, "Pattern", pattern);
            }
            N::IncrementOrDecrement { target, .. } => push(&mut out, "Target", target),
            N::Await { operation } => push(&mut out, "Expression", operation),
            N::Conditional {
                condition,
                when_true,
                when_false,
                ..
            } => {
                push(&mut out, "Condition", condition);
                push(&mut out, "WhenTrue", when_true);
                push_opt(&mut out, "WhenFalse", when_false);
            }
            N::Coalesce { value, when_null } => {
                push(&mut out, "Expression", value);
                push(&mut out, "WhenNull", when_null);
            }
            N::ConditionalAccess { operation, when_not_null } => {
                push(&mut out, "Operation", operation);
                push(&mut out, "WhenNotNull", when_not_null);
            }
            N::Conversion { operand, .. } => push(&mut out, "Operand", operand),
            N::DelegateCreation { target } => push(&mut out, "Target", target),
            N::AnonymousFunction { body, .. } => push(&mut out, "Body", body),
            N::Unary { operand, .. } => push(&mut out, "Operand", operand),
            N::Binary { left, right, .. } | N::BinaryPattern { left, right, .. } => {
                push(&mut out, "Left", left);
                push(&mut out, "Right", right);
            }
            N::SimpleAssignment { target, value, .. } | N::CompoundAssignment { target, value, .. } => {
                push(&mut out, "Left", target);
                push(&mut out, "Right", value);
            }
            N::ConstantPattern { value } | N::RelationalPattern { value, .. } => push(&mut out, "Value", value),
            N::NegatedPattern { pattern } => push(&mut out, "Pattern", pattern),
            N::Block { operations, .. } => push_all(&mut out, "", operations),
            N::ExpressionStatement { operation } => push(&mut out, "Expression", operation),
            N::VariableDeclarationGroup { declarations } => push_all(&mut out, "Declarations", declarations),
            N::VariableDeclaration { declarators } => push_all(&mut out, "Declarators", declarators),
            N::VariableDeclarator { initializer, .. } => push_opt(&mut out, "Initializer", initializer),
            N::VariableInitializer { value } => push(&mut out, "Value", value),
            N::Return { value } => push_opt(&mut out, "ReturnedValue", value),
            N::Labeled { operation, .. } => push_opt(&mut out, "Statement", operation),
            N::Loop {
                kind,
                before,
                condition,
                body,
                at_loop_bottom,
                ..
            } => {
                push_all(&mut out, "Before", before);
                if *kind == LoopKind::DoWhile {
                    push(&mut out, "Body", body);
                    push_opt(&mut out, "Condition", condition);
                } else {
                    push_opt(&mut out, "Condition", condition);
                    push(&mut out, "Body", body);
                    push_all(&mut out, "AtLoopBottom", at_loop_bottom);
                }
            }
            N::Switch { value, cases, .. } => {
                push(&mut out, "Value", value);
                push_all(&mut out, "Cases", cases);
            }
            N::SwitchCase { clauses, body, .. } => {
                push_all(&mut out, "Clauses", clauses);
                push_all(&mut out, "Body", body);
            }
            N::CaseClause { clause, .. } => match clause {
                CaseClauseKind::SingleValue(value) => push(&mut out, "Value", value),
                CaseClauseKind::Pattern { pattern, guard } => {
                    push(&mut out, "Pattern", pattern);
                    push_opt(&mut out, "Guard", guard);
                }
                CaseClauseKind::Default => {}
            },
            N::Throw { exception } => push_opt(&mut out, "Exception", exception),
            N::Try { body, catches, finally } => {
                push(&mut out, "Body", body);
                push_all(&mut out, "Catch clauses", catches);
                push_opt(&mut out, "Finally", finally);
            }
            N::CatchClause {
                declaration,
                filter,
                handler,
                ..
            } => {
                push_opt(&mut out, "ExceptionDeclarationOrExpression", declaration);
                push_opt(&mut out, "Filter", filter);
                push(&mut out, "Handler", handler);
            }
            N::Invalid { children } => push_all(&mut out, "Children", children),
            N::FlowCapture { value, .. } => push(&mut out, "Value", value),
            N::IsNull { operand } => push(&mut out, "Operand", operand),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semflow_core::{ConstantValue, Span, primitives};

    fn lit(v: i64) -> Operation {
        Operation::new(OperationNode::Literal, Some(primitives::INT32), Span::default())
            .with_constant(Some(ConstantValue::Int(v)))
    }

    #[test]
    fn do_while_children_put_body_first() {
        let node = OperationNode::Loop {
            kind: LoopKind::DoWhile,
            before: vec![],
            condition: Some(Box::new(lit(1))),
            body: Box::new(lit(2)),
            at_loop_bottom: vec![],
            locals: vec![],
            continue_label: LabelId::new(0),
            exit_label: LabelId::new(1),
        };
        let labels: Vec<_> = node.labeled_children().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Body", "Condition"]);
    }

    #[test]
    fn children_mut_matches_children_order() {
        let mut node = OperationNode::Conditional {
            condition: Box::new(lit(1)),
            when_true: Box::new(lit(2)),
            when_false: Some(Box::new(lit(3))),
            is_ref: false,
        };
        let before: Vec<_> = node.children().iter().map(|c| c.constant_value().cloned()).collect();
        for child in node.children_mut() {
            *child = child.clone().implicit();
        }
        let after: Vec<_> = node.children().iter().map(|c| c.constant_value().cloned()).collect();
        assert_eq!(before, after);
        assert!(node.children().iter().all(|c| c.is_implicit()));
    }
}
