//! Error types shared across the workspace.
//!
//! Binding problems in user code are *not* errors here: they travel as the
//! invalid flag on bound nodes and operations. The enums in this module
//! describe misuse of the engine's own data structures.

use thiserror::Error;

use crate::{SymbolId, TypeHash};

// ============================================================================
// Symbol Table Errors
// ============================================================================

/// Errors raised while populating or querying a [`SymbolTable`](crate::SymbolTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// A type with the same name (and therefore hash) already exists.
    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    /// A type hash that was never registered.
    #[error("unknown type {hash}")]
    UnknownType { hash: TypeHash },

    /// A handle that does not belong to this table.
    #[error("unknown symbol {id}")]
    UnknownSymbol { id: SymbolId },

    /// A handle of the wrong kind for the requested operation.
    #[error("symbol {id} is a {found}, expected a {expected}")]
    WrongSymbolKind {
        id: SymbolId,
        expected: &'static str,
        found: &'static str,
    },
}

impl SymbolError {
    /// The symbol involved, if any.
    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            SymbolError::UnknownSymbol { id } | SymbolError::WrongSymbolKind { id, .. } => Some(*id),
            SymbolError::DuplicateType { .. } | SymbolError::UnknownType { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = SymbolError::WrongSymbolKind {
            id: SymbolId::new(3),
            expected: "method",
            found: "field",
        };
        assert_eq!(err.to_string(), "symbol sym3 is a field, expected a method");
        assert_eq!(err.symbol(), Some(SymbolId::new(3)));

        let err = SymbolError::DuplicateType { name: "Widget".into() };
        assert_eq!(err.to_string(), "type 'Widget' is already registered");
        assert_eq!(err.symbol(), None);
    }
}
