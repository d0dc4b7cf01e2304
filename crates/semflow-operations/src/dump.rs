//! Textual dump of operation trees.
//!
//! One node per line, children indented under the node with the role they
//! play as a prefix:
//!
//! ```text
//! SimpleAssignment (Type: int)
//!   Left: LocalReference (Type: int) Local: i
//!   Right: Literal (Type: int, Constant: 1)
//! ```
//!
//! Type and symbol names resolve through the [`SymbolTable`]. The flow
//! graph dumper reuses [`OperationDumper::write_operation`] for block
//! statements.

use std::fmt::Write;

use semflow_core::SymbolTable;

use crate::node::{CaseClauseKind, OperationNode};
use crate::operation::Operation;

pub struct OperationDumper<'s> {
    symbols: &'s SymbolTable,
}

impl<'s> OperationDumper<'s> {
    pub fn new(symbols: &'s SymbolTable) -> Self {
        Self { symbols }
    }

    /// Dump a whole tree.
    pub fn dump(&self, op: &Operation) -> String {
        let mut out = String::new();
        self.write_operation(&mut out, op, 0);
        out
    }

    /// Append `op` and its subtree to `out`, starting at `indent` levels.
    /// Walks with an explicit stack, so deep trees are fine.
    pub fn write_operation(&self, out: &mut String, op: &Operation, indent: usize) {
        let mut stack = vec![("", op, indent)];
        while let Some((label, op, depth)) = stack.pop() {
            for _ in 0..depth {
                out.push_str("  ");
            }
            if !label.is_empty() {
                out.push_str(label);
                out.push_str(": ");
            }
            self.write_header(out, op);
            out.push('\n');
            for (child_label, child) in op.node().labeled_children().into_iter().rev() {
                stack.push((child_label, child, depth + 1));
            }
        }
    }

    /// One-line form of a single node, without its children.
    pub fn header(&self, op: &Operation) -> String {
        let mut out = String::new();
        self.write_header(&mut out, op);
        out
    }

    fn write_header(&self, out: &mut String, op: &Operation) {
        let _ = write!(out, "{}", op.kind());

        let mut attrs = Vec::new();
        match op.result_type() {
            Some(ty) => attrs.push(format!("Type: {}", self.symbols.type_name(ty))),
            None => attrs.push("Type: null".to_string()),
        }
        if let Some(constant) = op.constant_value() {
            attrs.push(format!("Constant: {constant}"));
        }
        if op.is_implicit() {
            attrs.push("IsImplicit".to_string());
        }
        if op.is_invalid() {
            attrs.push("IsInvalid".to_string());
        }
        let _ = write!(out, " ({})", attrs.join(", "));

        let detail = self.detail(op.node());
        if !detail.is_empty() {
            out.push(' ');
            out.push_str(&detail);
        }
    }

    fn detail(&self, node: &OperationNode) -> String {
        let s = self.symbols;
        match node {
            OperationNode::LocalReference { local, is_declaration } => {
                let decl = if *is_declaration { " (IsDeclaration: True)" } else { "" };
                format!("Local: {}{decl}", s.name(*local))
            }
            OperationNode::ParameterReference { parameter } => format!("Parameter: {}", s.name(*parameter)),
            OperationNode::InstanceReference { kind } => format!("ReferenceKind: {kind:?}"),
            OperationNode::FieldReference { field, .. } => format!("Member: {}", s.display(*field)),
            OperationNode::PropertyReference { property, .. } => format!("Property: {}", s.display(*property)),
            OperationNode::EventReference { event, .. } => format!("Event: {}", s.display(*event)),
            OperationNode::MethodReference { method, is_virtual, .. }
            | OperationNode::Invocation { method, is_virtual, .. } => {
                format!("Method: {} (IsVirtual: {is_virtual})", s.display(*method))
            }
            OperationNode::Argument {
                kind, parameter, conversion, ..
            } => {
                let parameter = parameter.map(|p| s.name(p).to_string()).unwrap_or_else(|| "null".to_string());
                if conversion.is_identity() {
                    format!("({kind:?}) Parameter: {parameter}")
                } else {
                    format!("({kind:?}) Parameter: {parameter}, {conversion}")
                }
            }
            OperationNode::DynamicInvocation {
                argument_names,
                argument_ref_kinds,
                ..
            }
            | OperationNode::DynamicObjectCreation {
                argument_names,
                argument_ref_kinds,
                ..
            } => {
                let names = argument_names
                    .iter()
                    .map(|n| n.as_deref().unwrap_or("null"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let ref_kinds = argument_ref_kinds.iter().map(|r| r.keyword()).collect::<Vec<_>>().join(", ");
                format!("ArgumentNames({names}) ArgumentRefKinds({ref_kinds})")
            }
            OperationNode::DynamicMemberReference {
                member_name,
                containing_type,
                ..
            } => {
                let container = containing_type.map(|t| s.type_name(t)).unwrap_or_else(|| "null".to_string());
                format!("Member: {member_name}, ContainingType: {container}")
            }
            OperationNode::ObjectCreation { constructor, .. } => format!("Constructor: {}", s.display(*constructor)),
            OperationNode::SizeOf { type_operand } => format!("TypeOperand: {}", s.type_name(*type_operand)),
            OperationNode::IsType {
                type_operand,
                is_negated,
                ..
            } => format!("TypeOperand: {}, IsNegated: {is_negated}", s.type_name(*type_operand)),
            OperationNode::IncrementOrDecrement {
                is_decrement, is_postfix, ..
            } => {
                let kind = match (is_decrement, is_postfix) {
                    (false, false) => "Increment",
                    (false, true) => "PostfixIncrement",
                    (true, false) => "Decrement",
                    (true, true) => "PostfixDecrement",
                };
                format!("({kind})")
            }
            OperationNode::Conversion {
                conversion,
                is_checked,
                is_try_cast,
                ..
            } => format!("TryCast: {is_try_cast}, Checked: {is_checked}, {conversion}"),
            OperationNode::AnonymousFunction { symbol, .. } => format!("Symbol: {}", s.display(*symbol)),
            OperationNode::Unary { op, .. } => format!("Operator: {op}"),
            OperationNode::Binary { op, .. } | OperationNode::CompoundAssignment { op, .. } => {
                format!("Operator: {op}")
            }
            OperationNode::RelationalPattern { op, .. } => format!("Operator: {op}"),
            OperationNode::BinaryPattern { op, .. } => format!("Operator: {op:?}"),
            OperationNode::TypePattern { matched_type } => format!("MatchedType: {}", s.type_name(*matched_type)),
            OperationNode::DeclarationPattern { matched_type, declared } => {
                let declared = declared.map(|d| s.name(d).to_string()).unwrap_or_else(|| "null".to_string());
                format!("MatchedType: {}, DeclaredSymbol: {declared}", s.type_name(*matched_type))
            }
            OperationNode::Block { locals, .. } => {
                if locals.is_empty() {
                    String::new()
                } else {
                    let names = locals.iter().map(|l| s.display(*l)).collect::<Vec<_>>().join(", ");
                    format!("Locals: [{names}]")
                }
            }
            OperationNode::VariableDeclarator { local, .. } => format!("Symbol: {}", s.display(*local)),
            OperationNode::Branch { kind, target } => format!("BranchKind: {kind:?}, Label: {target}"),
            OperationNode::Labeled { label, .. } => format!("Label: {label}"),
            OperationNode::Loop {
                kind,
                continue_label,
                exit_label,
                ..
            } => format!("LoopKind: {kind:?}, Continue: {continue_label}, Exit: {exit_label}"),
            OperationNode::Switch { exit_label, .. } => format!("ExitLabel: {exit_label}"),
            OperationNode::CaseClause { label, clause } => {
                let kind = match clause {
                    CaseClauseKind::SingleValue(_) => "SingleValue",
                    CaseClauseKind::Pattern { .. } => "Pattern",
                    CaseClauseKind::Default => "Default",
                };
                format!("CaseKind: {kind}, Label: {label}")
            }
            OperationNode::CatchClause { exception_type, .. } => {
                format!("ExceptionType: {}", s.type_name(*exception_type))
            }
            OperationNode::Throw { exception: None } => "(Rethrow)".to_string(),
            OperationNode::FlowCapture { id, .. } => format!("Id: {id}"),
            OperationNode::FlowCaptureReference { id } => format!("Id: {id}"),
            _ => String::new(),
        }
    }
}
