//! Bound patterns for `is` expressions and switch case labels.

use semflow_core::{BinaryOperatorKind, Span, SymbolId, TypeHash};

use crate::expr::BoundExpr;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundPattern<'b> {
    pub kind: PatternKind<'b>,
    pub span: Span,
    /// Type of the value being matched.
    pub input_type: TypeHash,
    pub has_errors: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind<'b> {
    /// `is 42`, `is null`
    Constant(&'b BoundExpr<'b>),
    /// `is string`
    Type(TypeHash),
    /// `is string s`; `local` is `None` for a discard designation.
    Declaration { ty: TypeHash, local: Option<SymbolId> },
    /// `is > 3`
    Relational { op: BinaryOperatorKind, value: &'b BoundExpr<'b> },
    /// `is not P`
    Not(&'b BoundPattern<'b>),
    /// `is P and Q`
    And(&'b BoundPattern<'b>, &'b BoundPattern<'b>),
    /// `is P or Q`
    Or(&'b BoundPattern<'b>, &'b BoundPattern<'b>),
    /// `is _`
    Discard,
}

impl<'b> BoundPattern<'b> {
    /// Whether the pattern has an `and`/`or` anywhere inside it.
    pub fn has_combinators(&self) -> bool {
        match &self.kind {
            PatternKind::And(..) | PatternKind::Or(..) => true,
            PatternKind::Not(inner) => inner.has_combinators(),
            _ => false,
        }
    }
}
