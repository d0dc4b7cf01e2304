//! `is` tests and patterns.

use semflow_bound::{BoundExpr, BoundPattern, IsPatternExpr, IsTypeExpr, PatternKind};

use super::OperationBuilder;
use crate::node::{OperationNode, PatternCombinator};
use crate::operation::Operation;

pub fn lower_is_type(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, is_type: &IsTypeExpr<'_>) -> Operation {
    let node = OperationNode::IsType {
        value: Box::new(builder.build_expr(&is_type.operand)),
        type_operand: is_type.target_type,
        is_negated: is_type.is_negated,
    };
    builder.finish(expr, node)
}

pub fn lower_is_pattern(builder: &OperationBuilder<'_>, expr: &BoundExpr<'_>, is_pattern: &IsPatternExpr<'_>) -> Operation {
    let node = OperationNode::IsPattern {
        value: Box::new(builder.build_expr(&is_pattern.operand)),
        pattern: Box::new(lower_pattern(builder, &is_pattern.pattern)),
    };
    builder.finish(expr, node)
}

/// Patterns are untyped operations; the matched input type lives on the
/// enclosing `IsPattern` value or switch value.
pub(super) fn lower_pattern(builder: &OperationBuilder<'_>, pattern: &BoundPattern<'_>) -> Operation {
    let node = match &pattern.kind {
        PatternKind::Constant(value) => OperationNode::ConstantPattern {
            value: Box::new(builder.build_expr(value)),
        },
        PatternKind::Type(ty) => OperationNode::TypePattern { matched_type: *ty },
        PatternKind::Declaration { ty, local } => OperationNode::DeclarationPattern {
            matched_type: *ty,
            declared: *local,
        },
        PatternKind::Relational { op, value } => OperationNode::RelationalPattern {
            op: *op,
            value: Box::new(builder.build_expr(value)),
        },
        PatternKind::Not(inner) => OperationNode::NegatedPattern {
            pattern: Box::new(lower_pattern(builder, inner)),
        },
        PatternKind::And(left, right) => OperationNode::BinaryPattern {
            op: PatternCombinator::And,
            left: Box::new(lower_pattern(builder, left)),
            right: Box::new(lower_pattern(builder, right)),
        },
        PatternKind::Or(left, right) => OperationNode::BinaryPattern {
            op: PatternCombinator::Or,
            left: Box::new(lower_pattern(builder, left)),
            right: Box::new(lower_pattern(builder, right)),
        },
        PatternKind::Discard => OperationNode::DiscardPattern,
    };
    Operation::new(node, None, pattern.span).with_invalid(pattern.has_errors)
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use semflow_bound::BoundFactory;
    use semflow_core::{BinaryOperatorKind, SymbolTable, primitives};

    use crate::{LoweringOptions, OperationBuilder, OperationKind, OperationNode, PatternCombinator};

    #[test]
    fn combinator_patterns_lower_structurally() {
        let mut symbols = SymbolTable::with_primitives();
        let x = symbols.add_local("x", primitives::INT32);
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let pattern = f.or_pattern(
            f.relational_pattern(BinaryOperatorKind::LessThan, f.int(0), primitives::INT32),
            f.not_pattern(f.constant_pattern(f.int(5), primitives::INT32)),
        );
        let op = OperationBuilder::new(&symbols, LoweringOptions::default()).build_expr(&f.is_pattern(f.local(x), pattern));

        assert_eq!(op.kind(), OperationKind::IsPattern);
        assert_eq!(op.result_type(), Some(primitives::BOOL));
        let pattern = op.children()[1];
        assert!(matches!(
            pattern.node(),
            OperationNode::BinaryPattern {
                op: PatternCombinator::Or,
                ..
            }
        ));
        let kinds: Vec<_> = pattern.children().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![OperationKind::RelationalPattern, OperationKind::NegatedPattern]);
    }

    #[test]
    fn is_type_keeps_operand() {
        let mut symbols = SymbolTable::with_primitives();
        let o = symbols.add_local("o", primitives::OBJECT);
        let arena = Bump::new();
        let f = BoundFactory::new(&arena, &symbols);

        let op = OperationBuilder::new(&symbols, LoweringOptions::default())
            .build_expr(&f.is_type(f.local(o), primitives::STRING));
        let OperationNode::IsType { type_operand, is_negated, .. } = op.node() else {
            panic!("expected is-type");
        };
        assert_eq!(*type_operand, primitives::STRING);
        assert!(!is_negated);
    }
}
