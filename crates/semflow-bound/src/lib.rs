//! The bound tree: syntax after type checking.
//!
//! This is the interface the engine consumes. Type checking (outside this
//! workspace) resolves every symbol, type, conversion and constant and
//! flags nodes it could not bind; the operation builder turns the result
//! into an [`Operation`](https://docs.rs/semflow-operations) tree.
//!
//! - [`expr`]: [`BoundExpr`] and its payloads
//! - [`stmt`]: [`BoundStmt`] and its payloads
//! - [`pattern`]: [`BoundPattern`]
//! - [`factory`]: [`BoundFactory`] for building trees in an arena

pub mod expr;
pub mod factory;
pub mod pattern;
pub mod stmt;

pub use expr::{
    AssignmentExpr, BinaryExpr, BoundArgument, BoundExpr, CallExpr, CoalesceExpr, CollectionElement,
    CompoundAssignmentExpr, ConditionalAccessExpr, ConditionalExpr, ConversionExpr, DynamicInvocationExpr,
    DynamicMemberAccessExpr, DynamicObjectCreationExpr, ExprKind, IncrementExpr, Initializer, InitializerKind,
    IsPatternExpr, IsTypeExpr, LambdaBody, LambdaExpr, LocalExpr, MemberAccess, MethodGroup, NameOfExpr,
    ObjectCreationExpr, PropertyAccess, UnaryExpr,
};
pub use factory::BoundFactory;
pub use pattern::{BoundPattern, PatternKind};
pub use stmt::{
    BlockStmt, BoundNode, BoundStmt, CatchBlock, Declarator, ForStmt, IfStmt, LabeledStmt, StmtKind,
    SwitchLabel, SwitchLabelKind, SwitchSection, SwitchStmt, TryStmt, WhileStmt,
};
