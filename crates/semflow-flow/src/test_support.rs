//! Operation construction helpers for flow graph tests.

use semflow_core::{
    BinaryOperatorKind, ConstantValue, Conversion, LabelId, MethodSymbol, RefKind, Span, SymbolId, SymbolTable,
    TypeHash, primitives,
};
use semflow_operations::{ArgumentKind, BranchKind, CaseClauseKind, LoopKind, Operation, OperationNode};

use crate::{ControlFlowGraph, FlowGraphOptions};

/// Symbols for a method `M(bool b, object x, int y)` with locals `int i`
/// and `System.Exception e`, and a callee `int Use(int value)`.
pub(crate) struct Fixture {
    pub symbols: SymbolTable,
    pub callee: SymbolId,
    pub b: SymbolId,
    pub x: SymbolId,
    pub y: SymbolId,
    pub i: SymbolId,
    pub e: SymbolId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::with_primitives();
        let method = symbols.add_method(MethodSymbol::new("M", primitives::VOID, None));
        let callee = symbols.add_method(MethodSymbol::new("Use", primitives::INT32, None));
        let b = add_parameter(&mut symbols, method, "b", primitives::BOOL);
        let x = add_parameter(&mut symbols, method, "x", primitives::OBJECT);
        let y = add_parameter(&mut symbols, method, "y", primitives::INT32);
        add_parameter(&mut symbols, callee, "value", primitives::INT32);
        let i = symbols.add_local("i", primitives::INT32);
        let e = symbols.add_local("e", primitives::EXCEPTION);
        Self {
            symbols,
            callee,
            b,
            x,
            y,
            i,
            e,
        }
    }

    pub fn b(&self) -> Operation {
        param(self.b, primitives::BOOL)
    }

    pub fn x(&self) -> Operation {
        param(self.x, primitives::OBJECT)
    }

    pub fn y(&self) -> Operation {
        param(self.y, primitives::INT32)
    }

    pub fn i(&self) -> Operation {
        local(self.i, primitives::INT32)
    }

    /// `Use(value)`
    pub fn call(&self, value: Operation) -> Operation {
        let span = value.span();
        let argument = Operation::new(
            OperationNode::Argument {
                kind: ArgumentKind::Explicit,
                parameter: None,
                value: Box::new(value),
                conversion: Conversion::identity(),
            },
            None,
            span,
        );
        Operation::new(
            OperationNode::Invocation {
                method: self.callee,
                instance: None,
                arguments: vec![argument],
                is_virtual: false,
            },
            Some(primitives::INT32),
            span,
        )
    }
}

fn add_parameter(symbols: &mut SymbolTable, owner: SymbolId, name: &str, ty: TypeHash) -> SymbolId {
    symbols
        .add_parameter(owner, name, ty, RefKind::None, None)
        .expect("owner is a method")
}

pub(crate) fn at(line: u32) -> Span {
    Span::new(line, 1, 1)
}

pub(crate) fn build(body: &Operation) -> ControlFlowGraph {
    ControlFlowGraph::build(body, &FlowGraphOptions::default().with_validation(true)).expect("graph builds")
}

// ============================================================================
// Expressions
// ============================================================================

pub(crate) fn int(value: i64) -> Operation {
    Operation::new(OperationNode::Literal, Some(primitives::INT32), at(1)).with_constant(Some(ConstantValue::Int(value)))
}

pub(crate) fn boolean(value: bool) -> Operation {
    Operation::new(OperationNode::Literal, Some(primitives::BOOL), at(1))
        .with_constant(Some(ConstantValue::Bool(value)))
}

pub(crate) fn local(local: SymbolId, ty: TypeHash) -> Operation {
    Operation::new(
        OperationNode::LocalReference {
            local,
            is_declaration: false,
        },
        Some(ty),
        at(1),
    )
}

pub(crate) fn param(parameter: SymbolId, ty: TypeHash) -> Operation {
    Operation::new(OperationNode::ParameterReference { parameter }, Some(ty), at(1))
}

pub(crate) fn binary(op: BinaryOperatorKind, left: Operation, right: Operation, ty: TypeHash) -> Operation {
    Operation::new(
        OperationNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            method: None,
        },
        Some(ty),
        at(1),
    )
}

pub(crate) fn assign(target: Operation, value: Operation) -> Operation {
    let ty = target.result_type();
    Operation::new(
        OperationNode::SimpleAssignment {
            target: Box::new(target),
            value: Box::new(value),
            is_ref: false,
        },
        ty,
        at(1),
    )
}

pub(crate) fn conditional(condition: Operation, when_true: Operation, when_false: Operation) -> Operation {
    let ty = when_true.result_type();
    Operation::new(
        OperationNode::Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Some(Box::new(when_false)),
            is_ref: false,
        },
        ty,
        at(1),
    )
}

pub(crate) fn coalesce(value: Operation, when_null: Operation) -> Operation {
    let ty = when_null.result_type();
    Operation::new(
        OperationNode::Coalesce {
            value: Box::new(value),
            when_null: Box::new(when_null),
        },
        ty,
        at(1),
    )
}

pub(crate) fn await_(operation: Operation) -> Operation {
    let ty = operation.result_type();
    Operation::new(
        OperationNode::Await {
            operation: Box::new(operation),
        },
        ty,
        at(1),
    )
}

pub(crate) fn invalid(children: Vec<Operation>) -> Operation {
    Operation::new(OperationNode::Invalid { children }, None, at(1)).invalid()
}

// ============================================================================
// Statements
// ============================================================================

pub(crate) fn expr_stmt(operation: Operation) -> Operation {
    let span = operation.span();
    Operation::new(
        OperationNode::ExpressionStatement {
            operation: Box::new(operation),
        },
        None,
        span,
    )
}

pub(crate) fn block(operations: Vec<Operation>, locals: Vec<SymbolId>) -> Operation {
    Operation::new(OperationNode::Block { operations, locals }, None, at(1))
}

pub(crate) fn declare(local: SymbolId, value: Operation) -> Operation {
    let initializer = Operation::new(
        OperationNode::VariableInitializer {
            value: Box::new(value),
        },
        None,
        at(1),
    );
    let declarator = Operation::new(
        OperationNode::VariableDeclarator {
            local,
            initializer: Some(Box::new(initializer)),
        },
        None,
        at(1),
    );
    let declaration = Operation::new(
        OperationNode::VariableDeclaration {
            declarators: vec![declarator],
        },
        None,
        at(1),
    );
    Operation::new(
        OperationNode::VariableDeclarationGroup {
            declarations: vec![declaration],
        },
        None,
        at(1),
    )
}

pub(crate) fn ret(value: Option<Operation>) -> Operation {
    Operation::new(OperationNode::Return { value: value.map(Box::new) }, None, at(1))
}

pub(crate) fn if_stmt(condition: Operation, when_true: Operation, when_false: Option<Operation>) -> Operation {
    Operation::new(
        OperationNode::Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: when_false.map(Box::new),
            is_ref: false,
        },
        None,
        at(1),
    )
}

pub(crate) fn while_loop(condition: Operation, body: Operation, labels: (u32, u32)) -> Operation {
    Operation::new(
        OperationNode::Loop {
            kind: LoopKind::While,
            before: Vec::new(),
            condition: Some(Box::new(condition)),
            body: Box::new(body),
            at_loop_bottom: Vec::new(),
            locals: Vec::new(),
            continue_label: LabelId::new(labels.0),
            exit_label: LabelId::new(labels.1),
        },
        None,
        at(1),
    )
}

pub(crate) fn goto(target: u32) -> Operation {
    Operation::new(
        OperationNode::Branch {
            kind: BranchKind::GoTo,
            target: LabelId::new(target),
        },
        None,
        at(1),
    )
}

pub(crate) fn labeled(label: u32, operation: Option<Operation>) -> Operation {
    Operation::new(
        OperationNode::Labeled {
            label: LabelId::new(label),
            operation: operation.map(Box::new),
        },
        None,
        at(1),
    )
}

pub(crate) fn throw(exception: Option<Operation>) -> Operation {
    Operation::new(
        OperationNode::Throw {
            exception: exception.map(Box::new),
        },
        None,
        at(1),
    )
}

pub(crate) fn catch(local: Option<SymbolId>, filter: Option<Operation>, handler: Operation) -> Operation {
    let declaration = local.map(|local| {
        Box::new(Operation::new(
            OperationNode::VariableDeclarator {
                local,
                initializer: None,
            },
            None,
            at(1),
        ))
    });
    Operation::new(
        OperationNode::CatchClause {
            exception_type: primitives::EXCEPTION,
            locals: local.into_iter().collect(),
            declaration,
            filter: filter.map(Box::new),
            handler: Box::new(handler),
        },
        None,
        at(1),
    )
}

pub(crate) fn try_stmt(body: Operation, catches: Vec<Operation>, finally: Option<Operation>) -> Operation {
    Operation::new(
        OperationNode::Try {
            body: Box::new(body),
            catches,
            finally: finally.map(Box::new),
        },
        None,
        at(1),
    )
}

pub(crate) fn empty() -> Operation {
    Operation::new(OperationNode::Empty, None, at(1))
}

pub(crate) fn conditional_access(operation: Operation, when_not_null: Operation) -> Operation {
    let ty = when_not_null.result_type();
    Operation::new(
        OperationNode::ConditionalAccess {
            operation: Box::new(operation),
            when_not_null: Box::new(when_not_null),
        },
        ty,
        at(1),
    )
}

pub(crate) fn access_instance(ty: TypeHash) -> Operation {
    Operation::new(OperationNode::ConditionalAccessInstance, Some(ty), at(1)).implicit()
}

pub(crate) fn brk(target: u32) -> Operation {
    Operation::new(
        OperationNode::Branch {
            kind: BranchKind::Break,
            target: LabelId::new(target),
        },
        None,
        at(1),
    )
}

pub(crate) fn switch(value: Operation, cases: Vec<Operation>, exit_label: u32) -> Operation {
    Operation::new(
        OperationNode::Switch {
            value: Box::new(value),
            cases,
            locals: Vec::new(),
            exit_label: LabelId::new(exit_label),
        },
        None,
        at(1),
    )
}

pub(crate) fn case(clauses: Vec<Operation>, body: Vec<Operation>) -> Operation {
    Operation::new(
        OperationNode::SwitchCase {
            clauses,
            body,
            locals: Vec::new(),
        },
        None,
        at(1),
    )
}

pub(crate) fn case_value(label: u32, value: Operation) -> Operation {
    Operation::new(
        OperationNode::CaseClause {
            label: LabelId::new(label),
            clause: CaseClauseKind::SingleValue(Box::new(value)),
        },
        None,
        at(1),
    )
}

pub(crate) fn default_clause(label: u32) -> Operation {
    Operation::new(
        OperationNode::CaseClause {
            label: LabelId::new(label),
            clause: CaseClauseKind::Default,
        },
        None,
        at(1),
    )
}
