//! Operation trees: a language-neutral view of method bodies.
//!
//! An [`Operation`] is an immutable node carrying a kind-specific
//! [`OperationNode`] payload plus a result type, an optional constant, an
//! implicit flag, an invalid flag and a source span. Trees are produced
//! from the bound tree by the [`OperationBuilder`] and consumed by
//! analyses through [`Operation::children`], [`Operation::descendants`] or
//! an [`OperationVisitor`].
//!
//! - [`operation`]: the node and its header
//! - [`node`]: payload variants and their supporting enums
//! - [`kind`]: the flat [`OperationKind`] tag
//! - [`lower`]: bound tree to operation tree
//! - [`visitor`]: traversal
//! - [`dump`]: textual rendering for tests and debugging

pub mod dump;
pub mod kind;
pub mod lower;
pub mod node;
pub mod operation;
pub mod options;
pub mod visitor;

pub use dump::OperationDumper;
pub use kind::OperationKind;
pub use lower::OperationBuilder;
pub use node::{
    ArgumentKind, BranchKind, CaseClauseKind, InstanceReferenceKind, LoopKind, OperationNode, PatternCombinator,
};
pub use operation::{Descendants, Operation, OperationFlags, OperationHeader};
pub use options::LoweringOptions;
pub use visitor::{OperationVisitor, walk_operation};
