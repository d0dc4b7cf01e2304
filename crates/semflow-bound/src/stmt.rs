//! Bound statement nodes.
//!
//! Jump targets are [`LabelId`]s assigned by the binder: every loop and
//! switch names its break (and continue) label, and `break`/`continue`/
//! `goto` carry the label they resolved to, or `None` when resolution
//! failed.

use semflow_core::{LabelId, Span, SymbolId, TypeHash};

use crate::expr::BoundExpr;
use crate::pattern::BoundPattern;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundStmt<'b> {
    pub kind: StmtKind<'b>,
    pub span: Span,
    pub has_errors: bool,
}

impl<'b> BoundStmt<'b> {
    pub fn new(kind: StmtKind<'b>, span: Span) -> Self {
        Self {
            kind,
            span,
            has_errors: false,
        }
    }

    pub fn with_errors(mut self) -> Self {
        self.has_errors = true;
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind<'b> {
    Block(&'b BlockStmt<'b>),
    Expression(&'b BoundExpr<'b>),
    LocalDeclaration(&'b [Declarator<'b>]),
    Return(Option<&'b BoundExpr<'b>>),
    Break(Option<LabelId>),
    Continue(Option<LabelId>),
    Goto(Option<LabelId>),
    Labeled(&'b LabeledStmt<'b>),
    If(&'b IfStmt<'b>),
    While(&'b WhileStmt<'b>),
    DoWhile(&'b WhileStmt<'b>),
    For(&'b ForStmt<'b>),
    Switch(&'b SwitchStmt<'b>),
    /// `throw e;`, or a rethrow when the operand is absent.
    Throw(Option<&'b BoundExpr<'b>>),
    Try(&'b TryStmt<'b>),
    Empty,
    /// A statement that failed to bind, with its bindable pieces.
    Bad(&'b [BoundNode<'b>]),
}

/// Either kind of node, for the children of a bad statement.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundNode<'b> {
    Expr(&'b BoundExpr<'b>),
    Stmt(&'b BoundStmt<'b>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt<'b> {
    /// Locals whose scope is this block.
    pub locals: &'b [SymbolId],
    pub statements: &'b [BoundStmt<'b>],
}

/// `T x = init` inside a local declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator<'b> {
    pub local: SymbolId,
    pub initializer: Option<BoundExpr<'b>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt<'b> {
    pub label: LabelId,
    pub statement: Option<BoundStmt<'b>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt<'b> {
    pub condition: BoundExpr<'b>,
    pub consequence: BoundStmt<'b>,
    pub alternative: Option<BoundStmt<'b>>,
}

/// `while` and `do ... while`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt<'b> {
    pub condition: BoundExpr<'b>,
    pub body: BoundStmt<'b>,
    pub locals: &'b [SymbolId],
    pub break_label: LabelId,
    pub continue_label: LabelId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt<'b> {
    pub locals: &'b [SymbolId],
    pub initializers: &'b [BoundStmt<'b>],
    pub condition: Option<BoundExpr<'b>>,
    pub increments: &'b [BoundStmt<'b>],
    pub body: BoundStmt<'b>,
    pub break_label: LabelId,
    pub continue_label: LabelId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt<'b> {
    pub expression: BoundExpr<'b>,
    pub locals: &'b [SymbolId],
    pub sections: &'b [SwitchSection<'b>],
    pub break_label: LabelId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchSection<'b> {
    pub labels: &'b [SwitchLabel<'b>],
    pub locals: &'b [SymbolId],
    pub statements: &'b [BoundStmt<'b>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchLabel<'b> {
    pub kind: SwitchLabelKind<'b>,
    /// Target of `goto case` / `goto default`.
    pub label: LabelId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwitchLabelKind<'b> {
    /// `case 1:`
    Value(BoundExpr<'b>),
    /// `case int x when x > 0:`
    Pattern { pattern: BoundPattern<'b>, guard: Option<BoundExpr<'b>> },
    /// `default:`
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt<'b> {
    pub body: BoundStmt<'b>,
    pub catches: &'b [CatchBlock<'b>],
    pub finally: Option<BoundStmt<'b>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchBlock<'b> {
    /// Caught type; `None` for a bare `catch`.
    pub exception_type: Option<TypeHash>,
    pub local: Option<SymbolId>,
    pub filter: Option<BoundExpr<'b>>,
    pub body: BoundStmt<'b>,
    pub span: Span,
}
