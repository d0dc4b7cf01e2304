//! The [`Operation`] node and its shared header.

use bitflags::bitflags;
use semflow_core::{ConstantValue, Span, TypeHash};

use crate::kind::OperationKind;
use crate::node::OperationNode;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OperationFlags: u8 {
        /// Synthesized by a builder rather than written in source.
        const IMPLICIT = 0b01;
        /// The node or something below it failed to bind.
        const INVALID = 0b10;
    }
}

/// Everything an operation carries besides its payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationHeader {
    pub ty: Option<TypeHash>,
    pub constant: Option<ConstantValue>,
    pub flags: OperationFlags,
    pub span: Span,
}

/// One node of the operation tree.
///
/// Fields are private: an operation is immutable once built, apart from
/// the consuming `with_*` setters used while it is still being assembled.
/// [`Operation::new`] marks a node invalid whenever one of its children is,
/// so invalidity always reaches the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    node: OperationNode,
    ty: Option<TypeHash>,
    constant: Option<ConstantValue>,
    flags: OperationFlags,
    span: Span,
}

impl Operation {
    pub fn new(node: OperationNode, ty: Option<TypeHash>, span: Span) -> Self {
        let flags = if node.children().iter().any(|c| c.is_invalid()) {
            OperationFlags::INVALID
        } else {
            OperationFlags::empty()
        };
        Self {
            node,
            ty,
            constant: None,
            flags,
            span,
        }
    }

    /// Reassemble an operation from a header taken with [`Operation::into_parts`].
    /// Flags are kept and child invalidity is applied on top.
    pub fn from_parts(node: OperationNode, header: OperationHeader) -> Self {
        let mut op = Self::new(node, header.ty, header.span);
        op.flags |= header.flags;
        op.constant = header.constant;
        op
    }

    pub fn into_parts(self) -> (OperationNode, OperationHeader) {
        let header = OperationHeader {
            ty: self.ty,
            constant: self.constant,
            flags: self.flags,
            span: self.span,
        };
        (self.node, header)
    }

    pub fn header(&self) -> OperationHeader {
        OperationHeader {
            ty: self.ty,
            constant: self.constant.clone(),
            flags: self.flags,
            span: self.span,
        }
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    pub fn with_constant(mut self, constant: Option<ConstantValue>) -> Self {
        self.constant = constant;
        self
    }

    pub fn implicit(self) -> Self {
        self.with_implicit(true)
    }

    pub fn with_implicit(mut self, implicit: bool) -> Self {
        self.flags.set(OperationFlags::IMPLICIT, implicit);
        self
    }

    pub fn invalid(self) -> Self {
        self.with_invalid(true)
    }

    /// Mark invalid when `invalid` is set. Never clears the flag.
    pub fn with_invalid(mut self, invalid: bool) -> Self {
        if invalid {
            self.flags.insert(OperationFlags::INVALID);
        }
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn kind(&self) -> OperationKind {
        self.node.kind()
    }

    pub fn node(&self) -> &OperationNode {
        &self.node
    }

    pub fn result_type(&self) -> Option<TypeHash> {
        self.ty
    }

    pub fn constant_value(&self) -> Option<&ConstantValue> {
        self.constant.as_ref()
    }

    pub fn flags(&self) -> OperationFlags {
        self.flags
    }

    pub fn is_implicit(&self) -> bool {
        self.flags.contains(OperationFlags::IMPLICIT)
    }

    pub fn is_invalid(&self) -> bool {
        self.flags.contains(OperationFlags::INVALID)
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Direct operands in evaluation order.
    pub fn children(&self) -> Vec<&Operation> {
        self.node.children()
    }

    /// This operation and everything below it, pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator returned by [`Operation::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Operation>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Operation;

    fn next(&mut self) -> Option<Self::Item> {
        let op = self.stack.pop()?;
        self.stack.extend(op.children().into_iter().rev());
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semflow_core::{BinaryOperatorKind, primitives};

    fn lit(v: i64) -> Operation {
        Operation::new(OperationNode::Literal, Some(primitives::INT32), Span::default())
            .with_constant(Some(ConstantValue::Int(v)))
    }

    fn add(left: Operation, right: Operation) -> Operation {
        Operation::new(
            OperationNode::Binary {
                op: BinaryOperatorKind::Add,
                left: Box::new(left),
                right: Box::new(right),
                method: None,
            },
            Some(primitives::INT32),
            Span::default(),
        )
    }

    #[test]
    fn invalid_child_marks_parent() {
        let bad = Operation::new(OperationNode::Invalid { children: vec![] }, None, Span::default()).invalid();
        let sum = add(lit(1), bad);
        assert!(sum.is_invalid());

        let ok = add(lit(1), lit(2));
        assert!(!ok.is_invalid());
    }

    #[test]
    fn explicit_invalid_may_hold_valid_children() {
        let op = Operation::new(OperationNode::Invalid { children: vec![lit(1)] }, None, Span::default()).invalid();
        assert!(op.is_invalid());
        assert!(!op.children()[0].is_invalid());
    }

    #[test]
    fn with_invalid_never_clears() {
        let op = lit(1).invalid().with_invalid(false);
        assert!(op.is_invalid());
    }

    #[test]
    fn descendants_are_pre_order() {
        let tree = add(add(lit(1), lit(2)), lit(3));
        let constants: Vec<_> = tree
            .descendants()
            .map(|op| op.constant_value().and_then(ConstantValue::as_integer))
            .collect();
        assert_eq!(constants, vec![None, None, Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn parts_round_trip_keeps_flags() {
        let op = lit(4).implicit();
        let (node, header) = op.clone().into_parts();
        let rebuilt = Operation::from_parts(node, header);
        assert_eq!(rebuilt, op);
        assert!(rebuilt.is_implicit());
    }
}
