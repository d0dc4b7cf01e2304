//! The operation kind tag.

use std::fmt;

/// Discriminant of an [`Operation`](crate::Operation), for consumers that
/// want to filter or count nodes without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    // === Expressions ===
    Literal,
    LocalReference,
    ParameterReference,
    InstanceReference,
    FieldReference,
    PropertyReference,
    EventReference,
    MethodReference,
    Invocation,
    Argument,
    DynamicInvocation,
    DynamicMemberReference,
    DynamicObjectCreation,
    ObjectCreation,
    TypeParameterObjectCreation,
    ObjectOrCollectionInitializer,
    AddressOf,
    SizeOf,
    NameOf,
    IsType,
    IsPattern,
    IncrementOrDecrement,
    Await,
    DefaultValue,
    Conditional,
    Coalesce,
    ConditionalAccess,
    ConditionalAccessInstance,
    Conversion,
    DelegateCreation,
    AnonymousFunction,
    Unary,
    Binary,
    SimpleAssignment,
    CompoundAssignment,
    CaughtException,

    // === Patterns ===
    ConstantPattern,
    TypePattern,
    DeclarationPattern,
    RelationalPattern,
    NegatedPattern,
    BinaryPattern,
    DiscardPattern,

    // === Statements ===
    Block,
    ExpressionStatement,
    VariableDeclarationGroup,
    VariableDeclaration,
    VariableDeclarator,
    VariableInitializer,
    Return,
    Branch,
    Labeled,
    Loop,
    Switch,
    SwitchCase,
    CaseClause,
    Throw,
    Try,
    CatchClause,
    Empty,

    // === Errors and flow ===
    Invalid,
    FlowCapture,
    FlowCaptureReference,
    IsNull,
}

impl OperationKind {
    /// Kinds that only the flow graph builder produces.
    pub fn is_flow_only(self) -> bool {
        matches!(self, Self::FlowCapture | Self::FlowCaptureReference | Self::IsNull)
    }

    /// Kinds that only appear in statement position.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::ExpressionStatement
                | Self::VariableDeclarationGroup
                | Self::VariableDeclaration
                | Self::Return
                | Self::Branch
                | Self::Labeled
                | Self::Loop
                | Self::Switch
                | Self::Throw
                | Self::Try
                | Self::Empty
        )
    }

    pub fn is_pattern(self) -> bool {
        matches!(
            self,
            Self::ConstantPattern
                | Self::TypePattern
                | Self::DeclarationPattern
                | Self::RelationalPattern
                | Self::NegatedPattern
                | Self::BinaryPattern
                | Self::DiscardPattern
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Variant names are the display names.
        fmt::Debug::fmt(self, f)
    }
}
