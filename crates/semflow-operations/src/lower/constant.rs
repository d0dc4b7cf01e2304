//! Constant folding plus `sizeof`, `nameof` and `default`.
//!
//! Folding only ever adds a constant the binder did not supply; it never
//! changes the shape of the tree. Integer arithmetic runs in `i128` and is
//! dropped (left unfolded) when the result does not fit the result type.

use semflow_bound::{BoundExpr, ExprKind, NameOfExpr};
use semflow_core::{
    BinaryOperatorKind, ConstantValue, NumericKind, SymbolTable, TypeHash, TypeKind, UnaryOperatorKind, primitives,
};

use super::OperationBuilder;
use crate::node::OperationNode;
use crate::operation::Operation;

pub fn lower_size_of(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, ty: TypeHash) -> Operation {
    builder.finish_folded(expr, OperationNode::SizeOf { type_operand: ty }, || {
        let entry = builder.symbols().type_entry(ty)?;
        if entry.kind != TypeKind::Primitive {
            return None;
        }
        entry.size.map(|size| ConstantValue::Int(i64::from(size)))
    })
}

/// `nameof(x)` is a leaf carrying the simple name; the argument is never
/// evaluated and is not kept.
pub fn lower_name_of(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, name_of: &NameOfExpr<'_>) -> Operation {
    let op = builder.finish(expr, OperationNode::NameOf);
    if op.constant_value().is_some() {
        return op;
    }
    let name = match name_of.symbol {
        Some(symbol) => Some(builder.symbols().name(symbol).to_string()),
        None => simple_name(builder.symbols(), &name_of.argument),
    };
    match name {
        Some(name) => op.with_constant(Some(ConstantValue::String(name))),
        None => op.invalid(),
    }
}

fn simple_name(symbols: &SymbolTable, argument: &BoundExpr<'_>) -> Option<String> {
    let name = match &argument.kind {
        ExprKind::Local(local) => symbols.name(local.local),
        ExprKind::Parameter(parameter) => symbols.name(*parameter),
        ExprKind::Field(access) | ExprKind::Event(access) => symbols.name(access.member),
        ExprKind::Property(access) => symbols.name(access.property),
        ExprKind::MethodGroup(group) => group.name,
        ExprKind::DynamicMemberAccess(access) => access.name,
        _ => return None,
    };
    Some(name.to_string())
}

/// `default` / `default(T)`: zero of the type for primitives, null for
/// reference types, no constant for structs.
pub fn lower_default(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>) -> Operation {
    let op = builder.finish(expr, OperationNode::DefaultValue);
    if op.constant_value().is_some() {
        return op;
    }
    let constant = expr.ty.and_then(|ty| default_constant(builder.symbols(), ty));
    op.with_constant(constant)
}

fn default_constant(symbols: &SymbolTable, ty: TypeHash) -> Option<ConstantValue> {
    if ty == primitives::BOOL {
        return Some(ConstantValue::Bool(false));
    }
    let entry = symbols.type_entry(ty)?;
    if entry.is_reference_type || entry.kind == TypeKind::Pointer {
        return Some(ConstantValue::Null);
    }
    match entry.numeric? {
        NumericKind::Signed(_) => Some(ConstantValue::Int(0)),
        NumericKind::Unsigned(_) => Some(ConstantValue::UInt(0)),
        NumericKind::Float(_) => Some(ConstantValue::float(0.0)),
        NumericKind::Char => Some(ConstantValue::Char('\0')),
    }
}

// ============================================================================
// Folding
// ============================================================================

fn numeric_kind(symbols: &SymbolTable, ty: Option<TypeHash>) -> Option<NumericKind> {
    symbols.type_entry(ty?)?.numeric
}

/// Pack an integer into the constant shape of `kind`, rejecting overflow.
fn integer_constant(kind: NumericKind, value: i128) -> Option<ConstantValue> {
    let (min, max) = kind.integer_bounds()?;
    if value < min || value > max {
        return None;
    }
    match kind {
        NumericKind::Signed(_) => i64::try_from(value).ok().map(ConstantValue::Int),
        NumericKind::Unsigned(_) => u64::try_from(value).ok().map(ConstantValue::UInt),
        NumericKind::Char => u32::try_from(value).ok().and_then(char::from_u32).map(ConstantValue::Char),
        NumericKind::Float(_) => None,
    }
}

fn float_constant(kind: NumericKind, value: f64) -> ConstantValue {
    match kind {
        NumericKind::Float(32) => ConstantValue::float(f64::from(value as f32)),
        _ => ConstantValue::float(value),
    }
}

pub(crate) fn fold_binary(
    symbols: &SymbolTable,
    op: BinaryOperatorKind,
    left: &ConstantValue,
    right: &ConstantValue,
    result_type: Option<TypeHash>,
) -> Option<ConstantValue> {
    use BinaryOperatorKind as B;

    if let (Some(l), Some(r)) = (left.as_bool(), right.as_bool()) {
        let value = match op {
            B::And | B::ConditionalAnd => l && r,
            B::Or | B::ConditionalOr => l || r,
            B::ExclusiveOr | B::NotEquals => l != r,
            B::Equals => l == r,
            _ => return None,
        };
        return Some(ConstantValue::Bool(value));
    }

    if let (ConstantValue::String(_) | ConstantValue::Null, ConstantValue::String(_) | ConstantValue::Null) = (left, right)
        && (!left.is_null() || !right.is_null())
    {
        let l = left.as_str().unwrap_or("");
        let r = right.as_str().unwrap_or("");
        return match op {
            B::Add => Some(ConstantValue::String(format!("{l}{r}"))),
            B::Equals => Some(ConstantValue::Bool(left == right)),
            B::NotEquals => Some(ConstantValue::Bool(left != right)),
            _ => None,
        };
    }

    if let (Some(l), Some(r)) = (left.as_integer(), right.as_integer()) {
        if op.is_comparison() {
            return Some(ConstantValue::Bool(compare(op, l.cmp(&r))));
        }
        let kind = numeric_kind(symbols, result_type)?;
        if let NumericKind::Float(_) = kind {
            return fold_float(op, l as f64, r as f64, kind);
        }
        let bits = match kind {
            NumericKind::Signed(b) | NumericKind::Unsigned(b) => u32::from(b),
            _ => 16,
        };
        let value = match op {
            B::Add => l.checked_add(r)?,
            B::Subtract => l.checked_sub(r)?,
            B::Multiply => l.checked_mul(r)?,
            B::Divide => l.checked_div(r)?,
            B::Remainder => l.checked_rem(r)?,
            B::And => l & r,
            B::Or => l | r,
            B::ExclusiveOr => l ^ r,
            B::LeftShift => {
                let shifted = l.checked_shl((r as u32) & (bits - 1))?;
                wrap(kind, shifted)
            }
            B::RightShift => l >> ((r as u32) & (bits - 1)),
            _ => return None,
        };
        return integer_constant(kind, value);
    }

    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        if op.is_comparison() {
            let ordering = l.partial_cmp(&r);
            return Some(ConstantValue::Bool(match ordering {
                Some(ordering) => compare(op, ordering),
                None => op == B::NotEquals,
            }));
        }
        let kind = numeric_kind(symbols, result_type)?;
        return fold_float(op, l, r, kind);
    }
    None
}

fn fold_float(op: BinaryOperatorKind, l: f64, r: f64, kind: NumericKind) -> Option<ConstantValue> {
    use BinaryOperatorKind as B;
    let value = match op {
        B::Add => l + r,
        B::Subtract => l - r,
        B::Multiply => l * r,
        B::Divide => l / r,
        B::Remainder => l % r,
        _ => return None,
    };
    Some(float_constant(kind, value))
}

/// Truncate a shifted value to the width of `kind`, reinterpreting the
/// top bit for signed kinds.
fn wrap(kind: NumericKind, value: i128) -> i128 {
    match kind {
        NumericKind::Signed(bits) => {
            let shift = 128 - u32::from(bits);
            (value << shift) >> shift
        }
        NumericKind::Unsigned(bits) => value & ((1i128 << bits) - 1),
        _ => value,
    }
}

fn compare(op: BinaryOperatorKind, ordering: std::cmp::Ordering) -> bool {
    use BinaryOperatorKind as B;
    use std::cmp::Ordering::*;
    match op {
        B::Equals => ordering == Equal,
        B::NotEquals => ordering != Equal,
        B::LessThan => ordering == Less,
        B::LessThanOrEqual => ordering != Greater,
        B::GreaterThan => ordering == Greater,
        B::GreaterThanOrEqual => ordering != Less,
        _ => false,
    }
}

pub(crate) fn fold_unary(
    symbols: &SymbolTable,
    op: UnaryOperatorKind,
    value: &ConstantValue,
    result_type: Option<TypeHash>,
) -> Option<ConstantValue> {
    if let (UnaryOperatorKind::Not, Some(b)) = (op, value.as_bool()) {
        return Some(ConstantValue::Bool(!b));
    }
    let kind = numeric_kind(symbols, result_type)?;
    if let Some(v) = value.as_integer() {
        let folded = match op {
            UnaryOperatorKind::Plus => v,
            UnaryOperatorKind::Minus => v.checked_neg()?,
            UnaryOperatorKind::BitwiseNegation => wrap(kind, !v),
            UnaryOperatorKind::Not => return None,
        };
        return integer_constant(kind, folded);
    }
    let v = value.as_f64()?;
    match op {
        UnaryOperatorKind::Plus => Some(float_constant(kind, v)),
        UnaryOperatorKind::Minus => Some(float_constant(kind, -v)),
        _ => None,
    }
}

/// Convert a constant to a numeric target type. Out-of-range integer
/// conversions are not folded.
pub(crate) fn fold_conversion(symbols: &SymbolTable, value: &ConstantValue, target: TypeHash) -> Option<ConstantValue> {
    if target == primitives::BOOL {
        return value.as_bool().map(ConstantValue::Bool);
    }
    if target == primitives::STRING {
        return matches!(value, ConstantValue::String(_) | ConstantValue::Null).then(|| value.clone());
    }
    let kind = numeric_kind(symbols, Some(target))?;
    match kind {
        NumericKind::Float(_) => value.as_f64().map(|v| float_constant(kind, v)),
        _ => {
            let integer = match value {
                ConstantValue::Float(f) if f.0.is_finite() => f.0.trunc() as i128,
                other => other.as_integer()?,
            };
            integer_constant(kind, integer)
        }
    }
}
