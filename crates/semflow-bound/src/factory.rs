//! Convenience constructors for bound trees.
//!
//! Hosts adapting their own type checker, and the tests of every crate in
//! the workspace, build bound trees through [`BoundFactory`]. It allocates
//! children in the arena, fills in result types from the symbol table, and
//! hands out distinct spans so dumps stay readable.
//!
//! ```
//! use bumpalo::Bump;
//! use semflow_bound::BoundFactory;
//! use semflow_core::{SymbolTable, primitives};
//!
//! let mut symbols = SymbolTable::with_primitives();
//! let b = symbols.add_local("b", primitives::BOOL);
//! let arena = Bump::new();
//! let f = BoundFactory::new(&arena, &symbols);
//! let e = f.conditional(f.local(b), f.int(1), f.int(2));
//! assert_eq!(e.ty, Some(primitives::INT32));
//! ```

use std::cell::Cell;

use bumpalo::Bump;
use semflow_core::{
    BinaryOperatorKind, ConstantValue, Conversion, ConversionKind, LabelId, RefKind, Span, Symbol, SymbolId,
    SymbolTable, TypeHash, UnaryOperatorKind, primitives,
};

use crate::expr::*;
use crate::pattern::{BoundPattern, PatternKind};
use crate::stmt::*;

/// Arena-backed builder for bound nodes.
pub struct BoundFactory<'b, 's> {
    arena: &'b Bump,
    symbols: &'s SymbolTable,
    column: Cell<u32>,
}

impl<'b, 's> BoundFactory<'b, 's> {
    pub fn new(arena: &'b Bump, symbols: &'s SymbolTable) -> Self {
        Self {
            arena,
            symbols,
            column: Cell::new(0),
        }
    }

    pub fn arena(&self) -> &'b Bump {
        self.arena
    }

    fn span(&self) -> Span {
        let col = self.column.get() + 1;
        self.column.set(col);
        Span::new(1, col, 1)
    }

    fn expr(&self, kind: ExprKind<'b>, ty: Option<TypeHash>) -> BoundExpr<'b> {
        BoundExpr::new(kind, ty, self.span())
    }

    fn stmt(&self, kind: StmtKind<'b>) -> BoundStmt<'b> {
        BoundStmt::new(kind, self.span())
    }

    fn symbol_type(&self, id: SymbolId) -> Option<TypeHash> {
        self.symbols.get(id).map(Symbol::ty)
    }

    fn slice<T>(&self, items: Vec<T>) -> &'b [T] {
        self.arena.alloc_slice_fill_iter(items)
    }

    /// Copy a string into the arena.
    pub fn str(&self, s: &str) -> &'b str {
        self.arena.alloc_str(s)
    }

    // ========================================================================
    // Literals and references
    // ========================================================================

    pub fn literal(&self, value: ConstantValue, ty: Option<TypeHash>) -> BoundExpr<'b> {
        self.expr(ExprKind::Literal, ty).with_constant(value)
    }

    pub fn int(&self, value: i32) -> BoundExpr<'b> {
        self.literal(ConstantValue::from(value), Some(primitives::INT32))
    }

    pub fn bool_(&self, value: bool) -> BoundExpr<'b> {
        self.literal(ConstantValue::Bool(value), Some(primitives::BOOL))
    }

    pub fn string(&self, value: &str) -> BoundExpr<'b> {
        self.literal(ConstantValue::from(value), Some(primitives::STRING))
    }

    pub fn null(&self) -> BoundExpr<'b> {
        self.literal(ConstantValue::Null, None)
    }

    pub fn local(&self, local: SymbolId) -> BoundExpr<'b> {
        let kind = ExprKind::Local(LocalExpr {
            local,
            is_declaration: false,
        });
        self.expr(kind, self.symbol_type(local))
    }

    /// Reference at the declaration site (`out var x`).
    pub fn declare_local(&self, local: SymbolId) -> BoundExpr<'b> {
        let kind = ExprKind::Local(LocalExpr {
            local,
            is_declaration: true,
        });
        self.expr(kind, self.symbol_type(local))
    }

    pub fn param(&self, parameter: SymbolId) -> BoundExpr<'b> {
        self.expr(ExprKind::Parameter(parameter), self.symbol_type(parameter))
    }

    pub fn this(&self, ty: TypeHash) -> BoundExpr<'b> {
        self.expr(ExprKind::This, Some(ty))
    }

    pub fn implicit_receiver(&self, ty: TypeHash) -> BoundExpr<'b> {
        self.expr(ExprKind::ImplicitReceiver, Some(ty)).generated()
    }

    pub fn field(&self, receiver: Option<BoundExpr<'b>>, field: SymbolId) -> BoundExpr<'b> {
        let access = self.arena.alloc(MemberAccess {
            receiver,
            member: field,
        });
        self.expr(ExprKind::Field(access), self.symbol_type(field))
    }

    pub fn event(&self, receiver: Option<BoundExpr<'b>>, event: SymbolId) -> BoundExpr<'b> {
        let access = self.arena.alloc(MemberAccess {
            receiver,
            member: event,
        });
        self.expr(ExprKind::Event(access), self.symbol_type(event))
    }

    pub fn property(&self, receiver: Option<BoundExpr<'b>>, property: SymbolId, args: Vec<BoundExpr<'b>>) -> BoundExpr<'b> {
        let parameters = match self.symbols.get(property) {
            Some(Symbol::Property(p)) => p.parameters.clone(),
            _ => Vec::new(),
        };
        let arguments = self.match_arguments(args, &parameters);
        let access = self.arena.alloc(PropertyAccess {
            receiver,
            property,
            arguments,
        });
        self.expr(ExprKind::Property(access), self.symbol_type(property))
    }

    pub fn method_group(&self, receiver: Option<BoundExpr<'b>>, name: &str, method: Option<SymbolId>) -> BoundExpr<'b> {
        let group = self.arena.alloc(MethodGroup {
            receiver,
            name: self.str(name),
            method,
            type_arguments: &[],
        });
        self.expr(ExprKind::MethodGroup(group), None)
    }

    // ========================================================================
    // Invocations
    // ========================================================================

    pub fn arg(&self, value: BoundExpr<'b>) -> BoundArgument<'b> {
        BoundArgument::positional(value)
    }

    pub fn named_arg(&self, name: &str, value: BoundExpr<'b>) -> BoundArgument<'b> {
        BoundArgument {
            name: Some(self.str(name)),
            ..BoundArgument::positional(value)
        }
    }

    pub fn ref_arg(&self, ref_kind: RefKind, value: BoundExpr<'b>) -> BoundArgument<'b> {
        BoundArgument {
            ref_kind,
            ..BoundArgument::positional(value)
        }
    }

    fn match_arguments(&self, args: Vec<BoundExpr<'b>>, parameters: &[SymbolId]) -> &'b [BoundArgument<'b>] {
        let matched = args
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let parameter = parameters.get(i).copied();
                let ref_kind = parameter
                    .and_then(|p| self.symbols.parameter(p).ok())
                    .map(|p| p.ref_kind)
                    .unwrap_or_default();
                BoundArgument {
                    parameter,
                    ref_kind,
                    ..BoundArgument::positional(value)
                }
            })
            .collect();
        self.slice(matched)
    }

    /// A resolved call; arguments are matched to parameters by position.
    pub fn call(&self, receiver: Option<BoundExpr<'b>>, method: SymbolId, args: Vec<BoundExpr<'b>>) -> BoundExpr<'b> {
        let (name, parameters) = match self.symbols.method(method) {
            Ok(m) => (m.name.as_str(), m.parameters.clone()),
            Err(_) => ("?", Vec::new()),
        };
        let call = self.arena.alloc(CallExpr {
            receiver,
            name: self.str(name),
            method: Some(method),
            arguments: self.match_arguments(args, &parameters),
            type_arguments: &[],
        });
        self.expr(ExprKind::Call(call), self.symbol_type(method))
    }

    /// A call overload resolution could not resolve.
    pub fn unresolved_call(&self, receiver: Option<BoundExpr<'b>>, name: &str, args: Vec<BoundExpr<'b>>) -> BoundExpr<'b> {
        let arguments = args.into_iter().map(BoundArgument::positional).collect();
        let call = self.arena.alloc(CallExpr {
            receiver,
            name: self.str(name),
            method: None,
            arguments: self.slice(arguments),
            type_arguments: &[],
        });
        self.expr(ExprKind::Call(call), Some(primitives::ERROR)).with_errors()
    }

    /// A call with explicitly prepared arguments (named, ref, ...).
    pub fn call_with(&self, receiver: Option<BoundExpr<'b>>, name: &str, method: Option<SymbolId>, args: Vec<BoundArgument<'b>>, ty: TypeHash) -> BoundExpr<'b> {
        let call = self.arena.alloc(CallExpr {
            receiver,
            name: self.str(name),
            method,
            arguments: self.slice(args),
            type_arguments: &[],
        });
        self.expr(ExprKind::Call(call), Some(ty))
    }

    pub fn dynamic_call(&self, target: BoundExpr<'b>, args: Vec<BoundArgument<'b>>) -> BoundExpr<'b> {
        let call = self.arena.alloc(DynamicInvocationExpr {
            target,
            arguments: self.slice(args),
        });
        self.expr(ExprKind::DynamicInvocation(call), Some(primitives::DYNAMIC))
    }

    pub fn dynamic_member(&self, receiver: Option<BoundExpr<'b>>, name: &str) -> BoundExpr<'b> {
        let access = self.arena.alloc(DynamicMemberAccessExpr {
            receiver,
            name: self.str(name),
            type_arguments: &[],
            containing_type: None,
        });
        self.expr(ExprKind::DynamicMemberAccess(access), Some(primitives::DYNAMIC))
    }

    // ========================================================================
    // Object creation
    // ========================================================================

    pub fn new_object(&self, constructor: Option<SymbolId>, args: Vec<BoundExpr<'b>>, initializer: Option<&'b Initializer<'b>>, ty: TypeHash) -> BoundExpr<'b> {
        let parameters = constructor
            .and_then(|c| self.symbols.method(c).ok())
            .map(|m| m.parameters.clone())
            .unwrap_or_default();
        let creation = self.arena.alloc(ObjectCreationExpr {
            constructor,
            arguments: self.match_arguments(args, &parameters),
            initializer,
        });
        let e = self.expr(ExprKind::ObjectCreation(creation), Some(ty));
        if constructor.is_none() { e.with_errors() } else { e }
    }

    pub fn new_type_parameter(&self, ty: TypeHash, initializer: Option<&'b Initializer<'b>>) -> BoundExpr<'b> {
        self.expr(ExprKind::NewTypeParameter(initializer), Some(ty))
    }

    pub fn dynamic_new(&self, args: Vec<BoundArgument<'b>>, initializer: Option<&'b Initializer<'b>>, ty: TypeHash) -> BoundExpr<'b> {
        let creation = self.arena.alloc(DynamicObjectCreationExpr {
            arguments: self.slice(args),
            initializer,
        });
        self.expr(ExprKind::DynamicObjectCreation(creation), Some(ty))
    }

    pub fn object_initializer(&self, members: Vec<BoundExpr<'b>>) -> &'b Initializer<'b> {
        self.arena.alloc(Initializer {
            kind: InitializerKind::Object(self.slice(members)),
            span: self.span(),
        })
    }

    /// Collection initializer; each element is an `Add` method (if one was
    /// found) and its arguments.
    pub fn collection_initializer(&self, elements: Vec<(Option<SymbolId>, Vec<BoundExpr<'b>>)>) -> &'b Initializer<'b> {
        let elements = elements
            .into_iter()
            .map(|(add_method, args)| {
                let parameters = add_method
                    .and_then(|m| self.symbols.method(m).ok())
                    .map(|m| m.parameters.clone())
                    .unwrap_or_default();
                CollectionElement {
                    add_method,
                    arguments: self.match_arguments(args, &parameters),
                    span: self.span(),
                }
            })
            .collect();
        self.arena.alloc(Initializer {
            kind: InitializerKind::Collection(self.slice(elements)),
            span: self.span(),
        })
    }

    // ========================================================================
    // Operators
    // ========================================================================

    pub fn conditional(&self, condition: BoundExpr<'b>, when_true: BoundExpr<'b>, when_false: BoundExpr<'b>) -> BoundExpr<'b> {
        let ty = when_true.ty.or(when_false.ty);
        let node = self.arena.alloc(ConditionalExpr {
            condition,
            when_true,
            when_false,
            is_ref: false,
        });
        self.expr(ExprKind::Conditional(node), ty)
    }

    pub fn coalesce(&self, value: BoundExpr<'b>, when_null: BoundExpr<'b>) -> BoundExpr<'b> {
        let ty = when_null.ty.or(value.ty);
        let node = self.arena.alloc(CoalesceExpr { value, when_null });
        self.expr(ExprKind::NullCoalescing(node), ty)
    }

    pub fn conditional_access(&self, receiver: BoundExpr<'b>, access: BoundExpr<'b>) -> BoundExpr<'b> {
        let ty = access.ty;
        let node = self.arena.alloc(ConditionalAccessExpr { receiver, access });
        self.expr(ExprKind::ConditionalAccess(node), ty)
    }

    pub fn conditional_receiver(&self, ty: TypeHash) -> BoundExpr<'b> {
        self.expr(ExprKind::ConditionalReceiver, Some(ty))
    }

    pub fn binary(&self, op: BinaryOperatorKind, left: BoundExpr<'b>, right: BoundExpr<'b>) -> BoundExpr<'b> {
        let ty = if op.is_comparison() || op.is_short_circuit() {
            Some(primitives::BOOL)
        } else {
            left.ty
        };
        let node = self.arena.alloc(BinaryExpr {
            op,
            left,
            right,
            method: None,
        });
        self.expr(ExprKind::Binary(node), ty)
    }

    pub fn unary(&self, op: UnaryOperatorKind, operand: BoundExpr<'b>) -> BoundExpr<'b> {
        let ty = operand.ty;
        let node = self.arena.alloc(UnaryExpr {
            op,
            operand,
            method: None,
        });
        self.expr(ExprKind::Unary(node), ty)
    }

    pub fn assign(&self, target: BoundExpr<'b>, value: BoundExpr<'b>) -> BoundExpr<'b> {
        let ty = target.ty;
        let node = self.arena.alloc(AssignmentExpr {
            target,
            value,
            is_ref: false,
        });
        self.expr(ExprKind::Assignment(node), ty)
    }

    pub fn compound_assign(&self, op: BinaryOperatorKind, target: BoundExpr<'b>, value: BoundExpr<'b>) -> BoundExpr<'b> {
        let ty = target.ty;
        let node = self.arena.alloc(CompoundAssignmentExpr {
            op,
            target,
            value,
            method: None,
        });
        self.expr(ExprKind::CompoundAssignment(node), ty)
    }

    pub fn increment(&self, target: BoundExpr<'b>, is_decrement: bool, is_postfix: bool) -> BoundExpr<'b> {
        let ty = target.ty;
        let node = self.arena.alloc(IncrementExpr {
            target,
            is_decrement,
            is_postfix,
            method: None,
        });
        self.expr(ExprKind::IncrementOrDecrement(node), ty)
    }

    /// A conversion to `ty`, explicit or implicit as `conversion` says.
    pub fn convert(&self, operand: BoundExpr<'b>, ty: TypeHash, conversion: Conversion) -> BoundExpr<'b> {
        let node = self.arena.alloc(ConversionExpr {
            operand,
            conversion,
            is_checked: false,
            is_try_cast: false,
        });
        let e = self.expr(ExprKind::Conversion(node), Some(ty));
        if conversion.exists { e } else { e.with_errors() }
    }

    pub fn implicit(&self, operand: BoundExpr<'b>, ty: TypeHash, kind: ConversionKind) -> BoundExpr<'b> {
        self.convert(operand, ty, Conversion::new(kind, true))
    }

    pub fn cast(&self, operand: BoundExpr<'b>, ty: TypeHash, kind: ConversionKind) -> BoundExpr<'b> {
        self.convert(operand, ty, Conversion::new(kind, false))
    }

    pub fn address_of(&self, operand: BoundExpr<'b>, ty: TypeHash) -> BoundExpr<'b> {
        let operand = self.arena.alloc(operand);
        self.expr(ExprKind::AddressOf(operand), Some(ty))
    }

    pub fn size_of(&self, ty: TypeHash) -> BoundExpr<'b> {
        self.expr(ExprKind::SizeOf(ty), Some(primitives::INT32))
    }

    pub fn name_of(&self, argument: BoundExpr<'b>, symbol: Option<SymbolId>) -> BoundExpr<'b> {
        let node = self.arena.alloc(NameOfExpr { argument, symbol });
        self.expr(ExprKind::NameOf(node), Some(primitives::STRING))
    }

    pub fn default_of(&self, ty: TypeHash) -> BoundExpr<'b> {
        self.expr(ExprKind::Default, Some(ty))
    }

    pub fn is_type(&self, operand: BoundExpr<'b>, target_type: TypeHash) -> BoundExpr<'b> {
        let node = self.arena.alloc(IsTypeExpr {
            operand,
            target_type,
            is_negated: false,
        });
        self.expr(ExprKind::IsType(node), Some(primitives::BOOL))
    }

    pub fn is_pattern(&self, operand: BoundExpr<'b>, pattern: BoundPattern<'b>) -> BoundExpr<'b> {
        let node = self.arena.alloc(IsPatternExpr { operand, pattern });
        self.expr(ExprKind::IsPattern(node), Some(primitives::BOOL))
    }

    pub fn await_(&self, operand: BoundExpr<'b>, ty: TypeHash) -> BoundExpr<'b> {
        let operand = self.arena.alloc(operand);
        self.expr(ExprKind::Await(operand), Some(ty))
    }

    pub fn lambda(&self, symbol: SymbolId, body: LambdaBody<'b>, delegate_type: TypeHash) -> BoundExpr<'b> {
        let node = self.arena.alloc(LambdaExpr { symbol, body });
        self.expr(ExprKind::Lambda(node), Some(delegate_type))
    }

    /// An expression that failed to bind, keeping its bindable children.
    pub fn bad(&self, children: Vec<BoundExpr<'b>>, ty: Option<TypeHash>) -> BoundExpr<'b> {
        self.expr(ExprKind::Bad(self.slice(children)), ty).with_errors()
    }

    pub fn missing(&self) -> BoundExpr<'b> {
        self.expr(ExprKind::Missing, None).with_errors()
    }

    // ========================================================================
    // Patterns
    // ========================================================================

    fn pattern(&self, kind: PatternKind<'b>, input_type: TypeHash) -> BoundPattern<'b> {
        BoundPattern {
            kind,
            span: self.span(),
            input_type,
            has_errors: false,
        }
    }

    pub fn constant_pattern(&self, value: BoundExpr<'b>, input_type: TypeHash) -> BoundPattern<'b> {
        self.pattern(PatternKind::Constant(self.arena.alloc(value)), input_type)
    }

    pub fn type_pattern(&self, ty: TypeHash, input_type: TypeHash) -> BoundPattern<'b> {
        self.pattern(PatternKind::Type(ty), input_type)
    }

    pub fn declaration_pattern(&self, ty: TypeHash, local: Option<SymbolId>, input_type: TypeHash) -> BoundPattern<'b> {
        self.pattern(PatternKind::Declaration { ty, local }, input_type)
    }

    pub fn relational_pattern(&self, op: BinaryOperatorKind, value: BoundExpr<'b>, input_type: TypeHash) -> BoundPattern<'b> {
        let value = self.arena.alloc(value);
        self.pattern(PatternKind::Relational { op, value }, input_type)
    }

    pub fn not_pattern(&self, inner: BoundPattern<'b>) -> BoundPattern<'b> {
        let input = inner.input_type;
        self.pattern(PatternKind::Not(self.arena.alloc(inner)), input)
    }

    pub fn and_pattern(&self, left: BoundPattern<'b>, right: BoundPattern<'b>) -> BoundPattern<'b> {
        let input = left.input_type;
        self.pattern(PatternKind::And(self.arena.alloc(left), self.arena.alloc(right)), input)
    }

    pub fn or_pattern(&self, left: BoundPattern<'b>, right: BoundPattern<'b>) -> BoundPattern<'b> {
        let input = left.input_type;
        self.pattern(PatternKind::Or(self.arena.alloc(left), self.arena.alloc(right)), input)
    }

    pub fn discard_pattern(&self, input_type: TypeHash) -> BoundPattern<'b> {
        self.pattern(PatternKind::Discard, input_type)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn block(&self, locals: Vec<SymbolId>, statements: Vec<BoundStmt<'b>>) -> BoundStmt<'b> {
        let block = self.arena.alloc(BlockStmt {
            locals: self.slice(locals),
            statements: self.slice(statements),
        });
        self.stmt(StmtKind::Block(block))
    }

    pub fn expr_stmt(&self, expr: BoundExpr<'b>) -> BoundStmt<'b> {
        self.stmt(StmtKind::Expression(self.arena.alloc(expr)))
    }

    pub fn declare(&self, local: SymbolId, initializer: Option<BoundExpr<'b>>) -> BoundStmt<'b> {
        self.declare_many(vec![(local, initializer)])
    }

    pub fn declare_many(&self, declarators: Vec<(SymbolId, Option<BoundExpr<'b>>)>) -> BoundStmt<'b> {
        let declarators = declarators
            .into_iter()
            .map(|(local, initializer)| Declarator {
                local,
                initializer,
                span: self.span(),
            })
            .collect();
        self.stmt(StmtKind::LocalDeclaration(self.slice(declarators)))
    }

    pub fn ret(&self, value: Option<BoundExpr<'b>>) -> BoundStmt<'b> {
        let value = value.map(|v| &*self.arena.alloc(v));
        self.stmt(StmtKind::Return(value))
    }

    pub fn break_(&self, label: Option<LabelId>) -> BoundStmt<'b> {
        self.stmt(StmtKind::Break(label))
    }

    pub fn continue_(&self, label: Option<LabelId>) -> BoundStmt<'b> {
        self.stmt(StmtKind::Continue(label))
    }

    pub fn goto(&self, label: Option<LabelId>) -> BoundStmt<'b> {
        self.stmt(StmtKind::Goto(label))
    }

    pub fn labeled(&self, label: LabelId, statement: Option<BoundStmt<'b>>) -> BoundStmt<'b> {
        let node = self.arena.alloc(LabeledStmt { label, statement });
        self.stmt(StmtKind::Labeled(node))
    }

    pub fn if_(&self, condition: BoundExpr<'b>, consequence: BoundStmt<'b>, alternative: Option<BoundStmt<'b>>) -> BoundStmt<'b> {
        let node = self.arena.alloc(IfStmt {
            condition,
            consequence,
            alternative,
        });
        self.stmt(StmtKind::If(node))
    }

    pub fn while_(&self, condition: BoundExpr<'b>, body: BoundStmt<'b>, break_label: LabelId, continue_label: LabelId) -> BoundStmt<'b> {
        let node = self.arena.alloc(WhileStmt {
            condition,
            body,
            locals: &[],
            break_label,
            continue_label,
        });
        self.stmt(StmtKind::While(node))
    }

    pub fn do_while(&self, body: BoundStmt<'b>, condition: BoundExpr<'b>, break_label: LabelId, continue_label: LabelId) -> BoundStmt<'b> {
        let node = self.arena.alloc(WhileStmt {
            condition,
            body,
            locals: &[],
            break_label,
            continue_label,
        });
        self.stmt(StmtKind::DoWhile(node))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn for_(
        &self,
        locals: Vec<SymbolId>,
        initializers: Vec<BoundStmt<'b>>,
        condition: Option<BoundExpr<'b>>,
        increments: Vec<BoundStmt<'b>>,
        body: BoundStmt<'b>,
        break_label: LabelId,
        continue_label: LabelId,
    ) -> BoundStmt<'b> {
        let node = self.arena.alloc(ForStmt {
            locals: self.slice(locals),
            initializers: self.slice(initializers),
            condition,
            increments: self.slice(increments),
            body,
            break_label,
            continue_label,
        });
        self.stmt(StmtKind::For(node))
    }

    pub fn switch(&self, expression: BoundExpr<'b>, sections: Vec<SwitchSection<'b>>, break_label: LabelId) -> BoundStmt<'b> {
        let node = self.arena.alloc(SwitchStmt {
            expression,
            locals: &[],
            sections: self.slice(sections),
            break_label,
        });
        self.stmt(StmtKind::Switch(node))
    }

    pub fn section(&self, labels: Vec<SwitchLabel<'b>>, statements: Vec<BoundStmt<'b>>) -> SwitchSection<'b> {
        SwitchSection {
            labels: self.slice(labels),
            locals: &[],
            statements: self.slice(statements),
        }
    }

    pub fn case_value(&self, value: BoundExpr<'b>, label: LabelId) -> SwitchLabel<'b> {
        SwitchLabel {
            kind: SwitchLabelKind::Value(value),
            label,
            span: self.span(),
        }
    }

    pub fn case_pattern(&self, pattern: BoundPattern<'b>, guard: Option<BoundExpr<'b>>, label: LabelId) -> SwitchLabel<'b> {
        SwitchLabel {
            kind: SwitchLabelKind::Pattern { pattern, guard },
            label,
            span: self.span(),
        }
    }

    pub fn default_case(&self, label: LabelId) -> SwitchLabel<'b> {
        SwitchLabel {
            kind: SwitchLabelKind::Default,
            label,
            span: self.span(),
        }
    }

    pub fn throw(&self, value: Option<BoundExpr<'b>>) -> BoundStmt<'b> {
        let value = value.map(|v| &*self.arena.alloc(v));
        self.stmt(StmtKind::Throw(value))
    }

    pub fn try_(&self, body: BoundStmt<'b>, catches: Vec<CatchBlock<'b>>, finally: Option<BoundStmt<'b>>) -> BoundStmt<'b> {
        let node = self.arena.alloc(TryStmt {
            body,
            catches: self.slice(catches),
            finally,
        });
        self.stmt(StmtKind::Try(node))
    }

    pub fn catch(&self, exception_type: Option<TypeHash>, local: Option<SymbolId>, filter: Option<BoundExpr<'b>>, body: BoundStmt<'b>) -> CatchBlock<'b> {
        CatchBlock {
            exception_type,
            local,
            filter,
            body,
            span: self.span(),
        }
    }

    pub fn empty(&self) -> BoundStmt<'b> {
        self.stmt(StmtKind::Empty)
    }

    pub fn bad_stmt(&self, children: Vec<BoundNode<'b>>) -> BoundStmt<'b> {
        self.stmt(StmtKind::Bad(self.slice(children))).with_errors()
    }

    pub fn node(&self, expr: BoundExpr<'b>) -> BoundNode<'b> {
        BoundNode::Expr(self.arena.alloc(expr))
    }

    pub fn stmt_node(&self, stmt: BoundStmt<'b>) -> BoundNode<'b> {
        BoundNode::Stmt(self.arena.alloc(stmt))
    }
}
