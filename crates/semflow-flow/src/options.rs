//! Graph construction configuration.

/// Switches for [`ControlFlowGraph::build`](crate::ControlFlowGraph::build).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowGraphOptions {
    /// Run the consistency checks on the finished graph. On by default;
    /// turning it off saves a dataflow pass over every block but lets a
    /// builder defect through as a malformed graph instead of an error.
    pub validate: bool,
    /// Remove empty pass-through blocks and empty unreachable blocks.
    pub pack_blocks: bool,
    /// Deepest statement or expression nesting accepted. Bodies nesting
    /// more than a few dozen levels are built on a worker thread whose
    /// stack grows with this limit.
    pub max_depth: usize,
}

impl Default for FlowGraphOptions {
    fn default() -> Self {
        Self {
            validate: true,
            pack_blocks: true,
            max_depth: 512,
        }
    }
}

impl FlowGraphOptions {
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    pub fn with_packing(mut self, enabled: bool) -> Self {
        self.pack_blocks = enabled;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
