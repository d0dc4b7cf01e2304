//! Flow graph construction errors.
//!
//! Binding problems never show up here; they travel as the invalid flag on
//! operations. A `FlowGraphError` means the builder met input it cannot
//! lower or produced a graph that fails its own consistency checks.
//!
//! ```text
//! FlowGraphError
//! ├── input problems      - UndefinedLabel, DuplicateLabel, UnexpectedOperation, NestingTooDeep
//! ├── consistency checks  - CaptureReadBeforeWrite, CaptureOutsideRegion, UndeclaredCapture,
//! │                         MalformedBlock, RegionMismatch, PredecessorMismatch, UnbalancedStack
//! └── environment         - WorkerUnavailable
//! ```

use semflow_core::{BlockId, CaptureId, LabelId, RegionId, Span};
use semflow_operations::OperationKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowGraphError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowGraphError {
    // ========================================================================
    // Input
    // ========================================================================
    /// A branch targets a label that no statement defines.
    #[error("label {label} is targeted but never defined")]
    UndefinedLabel { label: LabelId },

    /// Two labeled statements define the same label.
    #[error("label {label} is defined more than once at {span}")]
    DuplicateLabel { label: LabelId, span: Span },

    /// An operation that cannot appear where it was found.
    #[error("unexpected {kind} operation at {span}")]
    UnexpectedOperation { kind: OperationKind, span: Span },

    /// The body nests deeper than the configured limit.
    #[error("nesting exceeds the limit of {limit} at {span}")]
    NestingTooDeep { limit: usize, span: Span },

    // ========================================================================
    // Consistency
    // ========================================================================
    /// A capture is read on a path where it was not written.
    #[error("capture {capture} is read before it is written in {block}")]
    CaptureReadBeforeWrite { capture: CaptureId, block: BlockId },

    /// A capture is used in a block outside the region that declares it.
    #[error("capture {capture} is used in {block} outside its region {region}")]
    CaptureOutsideRegion {
        capture: CaptureId,
        block: BlockId,
        region: RegionId,
    },

    /// A capture that no region declares, or that several do.
    #[error("capture {capture} is not declared by exactly one region")]
    UndeclaredCapture { capture: CaptureId },

    /// A block whose statements or branches break the block invariants.
    #[error("malformed block {block}: {detail}")]
    MalformedBlock { block: BlockId, detail: &'static str },

    /// Region nesting, ranges or edge annotations disagree with the layout.
    #[error("region {region} is inconsistent: {detail}")]
    RegionMismatch { region: RegionId, detail: &'static str },

    /// Stored predecessors differ from the ones implied by the edges.
    #[error("predecessors of {block} do not match its incoming edges")]
    PredecessorMismatch { block: BlockId },

    /// Operands left over or missing while lowering an expression.
    #[error("evaluation stack is unbalanced at {span}")]
    UnbalancedStack { span: Span },

    // ========================================================================
    // Environment
    // ========================================================================
    /// The thread for building a deeply nested body could not be started.
    #[error("cannot start the graph builder thread: {detail}")]
    WorkerUnavailable { detail: String },
}

impl FlowGraphError {
    /// Source position, for errors raised on a specific operation.
    pub fn span(&self) -> Option<Span> {
        match self {
            FlowGraphError::DuplicateLabel { span, .. }
            | FlowGraphError::UnexpectedOperation { span, .. }
            | FlowGraphError::NestingTooDeep { span, .. }
            | FlowGraphError::UnbalancedStack { span } => Some(*span),
            _ => None,
        }
    }

    /// Whether the error points at a defect in the builder rather than at
    /// its input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            FlowGraphError::CaptureReadBeforeWrite { .. }
                | FlowGraphError::CaptureOutsideRegion { .. }
                | FlowGraphError::UndeclaredCapture { .. }
                | FlowGraphError::MalformedBlock { .. }
                | FlowGraphError::RegionMismatch { .. }
                | FlowGraphError::PredecessorMismatch { .. }
                | FlowGraphError::UnbalancedStack { .. }
        )
    }
}
