//! Top-level error type.

use semflow_core::SymbolError;
use semflow_flow::FlowGraphError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every error the pipeline can report.
///
/// Binding problems in the source are not among them: they are carried by
/// the invalid flag on the operations and blocks produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    FlowGraph(#[from] FlowGraphError),
}

impl Error {
    /// Whether the error points at a defect in the engine rather than at
    /// the body or symbols it was given.
    pub fn is_internal(&self) -> bool {
        match self {
            Error::Symbol(_) => false,
            Error::FlowGraph(err) => err.is_internal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use semflow_core::{BlockId, LabelId, SymbolId};

    use super::*;

    #[test]
    fn wraps_stage_errors_transparently() {
        let err: Error = FlowGraphError::UndefinedLabel { label: LabelId::new(4) }.into();
        assert_eq!(err.to_string(), FlowGraphError::UndefinedLabel { label: LabelId::new(4) }.to_string());
        assert!(!err.is_internal());

        let err: Error = FlowGraphError::PredecessorMismatch { block: BlockId::new(2) }.into();
        assert!(err.is_internal());

        let err: Error = SymbolError::UnknownSymbol { id: SymbolId::new(9) }.into();
        assert!(matches!(err, Error::Symbol(_)));
        assert!(!err.is_internal());
    }
}
