//! Regions: the lexical structure laid over the blocks.

use std::fmt;

use semflow_core::{BlockId, CaptureId, RegionId, SymbolId, TypeHash};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlFlowRegionKind {
    Root,
    /// Lifetime of locals and captures (`.locals`).
    LocalLifetime,
    Try,
    /// A catch handler without a filter, or the handler half of a
    /// filtered catch.
    Catch,
    Filter,
    /// A filtered catch: a `Filter` followed by its `Catch`.
    FilterAndHandler,
    Finally,
    /// A `Try` followed by its catch regions.
    TryAndCatch,
    /// A `Try` followed by its `Finally`.
    TryAndFinally,
}

impl ControlFlowRegionKind {
    /// Regions that only exist to group a `try` with its handlers.
    pub fn is_try_group(self) -> bool {
        matches!(self, Self::TryAndCatch | Self::TryAndFinally)
    }

    /// Regions entered by the exception machinery rather than by an edge.
    pub fn is_handler(self) -> bool {
        matches!(self, Self::Catch | Self::Filter | Self::FilterAndHandler | Self::Finally)
    }
}

impl fmt::Display for ControlFlowRegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlFlowRegion {
    pub(crate) id: RegionId,
    pub(crate) kind: ControlFlowRegionKind,
    pub(crate) enclosing: Option<RegionId>,
    pub(crate) exception_type: Option<TypeHash>,
    pub(crate) first_block: BlockId,
    pub(crate) last_block: BlockId,
    pub(crate) nested: Vec<RegionId>,
    pub(crate) locals: Vec<SymbolId>,
    pub(crate) capture_ids: Vec<CaptureId>,
}

impl ControlFlowRegion {
    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn kind(&self) -> ControlFlowRegionKind {
        self.kind
    }

    pub fn enclosing(&self) -> Option<RegionId> {
        self.enclosing
    }

    /// Caught type, for `Catch` and `FilterAndHandler` regions.
    pub fn exception_type(&self) -> Option<TypeHash> {
        self.exception_type
    }

    pub fn first_block(&self) -> BlockId {
        self.first_block
    }

    pub fn last_block(&self) -> BlockId {
        self.last_block
    }

    /// Whether `block` lies in this region's range.
    pub fn contains(&self, block: BlockId) -> bool {
        self.first_block <= block && block <= self.last_block
    }

    /// Direct children, in block order.
    pub fn nested(&self) -> &[RegionId] {
        &self.nested
    }

    /// Locals declared directly in this region.
    pub fn locals(&self) -> &[SymbolId] {
        &self.locals
    }

    /// Capture ids declared directly in this region, ascending.
    pub fn capture_ids(&self) -> &[CaptureId] {
        &self.capture_ids
    }
}
