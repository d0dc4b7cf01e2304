//! Visitor pattern for traversing operation trees.
//!
//! [`OperationVisitor::visit_operation`] dispatches to a per-category hook;
//! every default hook calls [`walk_operation`], which visits the children
//! in evaluation order. Override a hook and skip the walk to prune.
//!
//! ```
//! use semflow_operations::{Operation, OperationVisitor, walk_operation};
//!
//! struct InvalidCounter(usize);
//!
//! impl OperationVisitor for InvalidCounter {
//!     fn visit_operation(&mut self, op: &Operation) {
//!         if op.is_invalid() {
//!             self.0 += 1;
//!         }
//!         walk_operation(self, op);
//!     }
//! }
//! ```

use crate::node::OperationNode;
use crate::operation::Operation;

/// Visitor over [`Operation`] trees.
pub trait OperationVisitor: Sized {
    /// Entry point for every node.
    fn visit_operation(&mut self, op: &Operation) {
        match op.node() {
            OperationNode::Invocation { .. } | OperationNode::DynamicInvocation { .. } => self.visit_invocation(op),
            OperationNode::AnonymousFunction { .. } => self.visit_anonymous_function(op),
            OperationNode::Invalid { .. } => self.visit_invalid(op),
            OperationNode::FlowCapture { .. } | OperationNode::FlowCaptureReference { .. } => {
                self.visit_flow_capture(op)
            }
            _ if op.kind().is_pattern() => self.visit_pattern(op),
            _ => walk_operation(self, op),
        }
    }

    /// Static and late-bound invocations.
    fn visit_invocation(&mut self, op: &Operation) {
        walk_operation(self, op);
    }

    /// Lambda bodies. Graph construction does not enter them.
    fn visit_anonymous_function(&mut self, op: &Operation) {
        walk_operation(self, op);
    }

    fn visit_invalid(&mut self, op: &Operation) {
        walk_operation(self, op);
    }

    fn visit_pattern(&mut self, op: &Operation) {
        walk_operation(self, op);
    }

    /// Captures and capture references.
    fn visit_flow_capture(&mut self, op: &Operation) {
        walk_operation(self, op);
    }
}

// === Walk Functions ===

/// Visit every child of `op`.
pub fn walk_operation<V: OperationVisitor>(visitor: &mut V, op: &Operation) {
    for child in op.children() {
        visitor.visit_operation(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semflow_core::{ConstantValue, Span, SymbolId, primitives};

    fn lit(v: i64) -> Operation {
        Operation::new(OperationNode::Literal, Some(primitives::INT32), Span::default())
            .with_constant(Some(ConstantValue::Int(v)))
    }

    struct LiteralCollector(Vec<i64>);

    impl OperationVisitor for LiteralCollector {
        fn visit_operation(&mut self, op: &Operation) {
            if let Some(ConstantValue::Int(v)) = op.constant_value() {
                self.0.push(*v);
            }
            walk_operation(self, op);
        }
    }

    #[test]
    fn walks_in_evaluation_order() {
        let block = Operation::new(
            OperationNode::Block {
                operations: vec![lit(1), lit(2), lit(3)],
                locals: vec![],
            },
            None,
            Span::default(),
        );
        let mut collector = LiteralCollector(Vec::new());
        collector.visit_operation(&block);
        assert_eq!(collector.0, vec![1, 2, 3]);
    }

    #[test]
    fn pruning_skips_lambda_bodies() {
        struct Counter {
            literals: usize,
        }

        impl OperationVisitor for Counter {
            fn visit_anonymous_function(&mut self, _op: &Operation) {}

            fn visit_operation(&mut self, op: &Operation) {
                if op.kind() == crate::OperationKind::Literal {
                    self.literals += 1;
                }
                match op.node() {
                    OperationNode::AnonymousFunction { .. } => self.visit_anonymous_function(op),
                    _ => walk_operation(self, op),
                }
            }
        }

        let lambda = Operation::new(
            OperationNode::AnonymousFunction {
                symbol: SymbolId::new(0),
                body: Box::new(lit(7)),
            },
            None,
            Span::default(),
        );
        let block = Operation::new(
            OperationNode::Block {
                operations: vec![lit(1), lambda],
                locals: vec![],
            },
            None,
            Span::default(),
        );

        let mut counter = Counter { literals: 0 };
        counter.visit_operation(&block);
        assert_eq!(counter.literals, 1);
    }
}
