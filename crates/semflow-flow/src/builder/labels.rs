//! Branch targets.
//!
//! Each label owns one block, created the first time the label is either
//! targeted or defined. Defining the label places its block.

use rustc_hash::FxHashMap;
use semflow_core::{LabelId, Span};

use super::{BlockIdx, FlowBuilder};
use crate::error::{FlowGraphError, Result};

#[derive(Debug, Default)]
pub(super) struct LabelTable {
    blocks: FxHashMap<LabelId, BlockIdx>,
}

impl LabelTable {
    fn get(&self, label: LabelId) -> Option<BlockIdx> {
        self.blocks.get(&label).copied()
    }

    fn bind(&mut self, label: LabelId, block: BlockIdx) {
        self.blocks.insert(label, block);
    }

    /// All bindings, ordered by label.
    fn sorted(&self) -> Vec<(LabelId, BlockIdx)> {
        let mut bindings: Vec<_> = self.blocks.iter().map(|(&label, &block)| (label, block)).collect();
        bindings.sort_unstable_by_key(|&(label, _)| label.index());
        bindings
    }
}

impl FlowBuilder<'_> {
    /// The block `label` stands for, created on demand.
    pub(super) fn label_block(&mut self, label: LabelId) -> BlockIdx {
        match self.labels.get(label) {
            Some(block) => block,
            None => {
                let block = self.new_block();
                self.labels.bind(label, block);
                block
            }
        }
    }

    /// Whether `label` already has a block.
    pub(super) fn is_label_bound(&self, label: LabelId) -> bool {
        self.labels.get(label).is_some()
    }

    /// Make `label` another name for `block`.
    pub(super) fn alias_label(&mut self, label: LabelId, block: BlockIdx) {
        self.labels.bind(label, block);
    }

    /// Define `label` here.
    pub(super) fn place_label(&mut self, label: LabelId, span: Span) -> Result<()> {
        let block = self.label_block(label);
        self.place_label_block(label, block, span)
    }

    pub(super) fn place_label_block(&mut self, label: LabelId, block: BlockIdx, span: Span) -> Result<()> {
        if self.blocks[block].placed {
            return Err(FlowGraphError::DuplicateLabel { label, span });
        }
        self.append_block(block);
        Ok(())
    }

    /// Fail on the first label that was targeted but never defined.
    pub(super) fn check_labels(&self) -> Result<()> {
        match self.labels.sorted().into_iter().find(|&(_, block)| !self.blocks[block].placed) {
            Some((label, _)) => Err(FlowGraphError::UndefinedLabel { label }),
            None => Ok(()),
        }
    }
}
