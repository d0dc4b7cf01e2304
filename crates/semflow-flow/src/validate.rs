//! Consistency checks on a finished graph.
//!
//! Run after construction when [`FlowGraphOptions::validate`] is set, and
//! available on any graph through [`ControlFlowGraph::validate`]. A
//! failure here is a builder defect, never an input problem.
//!
//! [`FlowGraphOptions::validate`]: crate::FlowGraphOptions::validate

use rustc_hash::{FxHashMap, FxHashSet};
use semflow_core::{BlockId, CaptureId, RegionId};
use semflow_operations::{Operation, OperationNode};

use crate::error::{FlowGraphError, Result};
use crate::graph::{BasicBlock, BasicBlockKind, ControlFlowBranchSemantics, ControlFlowConditionKind, ControlFlowGraph};
use crate::region::ControlFlowRegionKind;

impl ControlFlowGraph {
    /// Check block shapes, predecessors, region structure and capture
    /// definitions.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn validate(&self) -> Result<()> {
        self.validate_blocks()?;
        self.validate_predecessors()?;
        self.validate_regions()?;
        self.validate_captures()
    }

    /// First blocks of regions entered by the exception machinery.
    fn handler_entries(&self) -> FxHashSet<BlockId> {
        self.regions
            .iter()
            .filter(|r| r.kind.is_handler())
            .map(|r| r.first_block)
            .collect()
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    fn validate_blocks(&self) -> Result<()> {
        let last = self.blocks.len().saturating_sub(1);
        let handler_entries = self.handler_entries();
        for (index, block) in self.blocks.iter().enumerate() {
            let malformed = |detail| FlowGraphError::MalformedBlock {
                block: block.ordinal,
                detail,
            };
            if block.ordinal.as_usize() != index {
                return Err(malformed("ordinal does not match its position"));
            }
            let expected = match index {
                0 => BasicBlockKind::Entry,
                i if i == last => BasicBlockKind::Exit,
                _ => BasicBlockKind::Block,
            };
            if block.kind != expected {
                return Err(malformed("entry must come first and exit last"));
            }

            match block.kind {
                BasicBlockKind::Entry if !block.operations.is_empty() || block.conditional_successor.is_some() => {
                    return Err(malformed("entry block holds statements"));
                }
                BasicBlockKind::Exit => {
                    if block.successors().next().is_some() || !block.operations.is_empty() {
                        return Err(malformed("exit block has statements or successors"));
                    }
                    continue;
                }
                _ => {}
            }

            let Some(fallthrough) = &block.fallthrough_successor else {
                return Err(malformed("missing fallthrough successor"));
            };
            let has_condition = block.condition_kind != ControlFlowConditionKind::None;
            if has_condition != block.conditional_successor.is_some() {
                return Err(malformed("condition kind disagrees with the conditional successor"));
            }
            let carries_value = matches!(
                fallthrough.semantics,
                ControlFlowBranchSemantics::Return | ControlFlowBranchSemantics::Throw
            );
            if has_condition && carries_value {
                return Err(malformed("conditional block cannot also return or throw"));
            }
            if (has_condition || carries_value) != block.branch_value.is_some() {
                return Err(malformed("branch value present without a use, or missing"));
            }
            if block.is_reachable
                && index != 0
                && block.predecessors.is_empty()
                && !handler_entries.contains(&block.ordinal)
            {
                return Err(malformed("reachable block without predecessors"));
            }
        }
        Ok(())
    }

    fn validate_predecessors(&self) -> Result<()> {
        let mut expected: Vec<FxHashSet<BlockId>> = vec![FxHashSet::default(); self.blocks.len()];
        for block in &self.blocks {
            for branch in block.successors() {
                if branch.source != block.ordinal {
                    return Err(FlowGraphError::MalformedBlock {
                        block: block.ordinal,
                        detail: "branch source is not its block",
                    });
                }
                if let Some(destination) = branch.destination {
                    match expected.get_mut(destination.as_usize()) {
                        Some(preds) => {
                            preds.insert(block.ordinal);
                        }
                        None => {
                            return Err(FlowGraphError::MalformedBlock {
                                block: block.ordinal,
                                detail: "branch target does not exist",
                            });
                        }
                    }
                }
            }
        }
        for (block, expected) in self.blocks.iter().zip(expected) {
            let actual: FxHashSet<BlockId> = block.predecessors.iter().copied().collect();
            if actual != expected || actual.len() != block.predecessors.len() {
                return Err(FlowGraphError::PredecessorMismatch { block: block.ordinal });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Regions
    // ------------------------------------------------------------------------

    fn validate_regions(&self) -> Result<()> {
        let root = self.root();
        let mismatch = |region: RegionId, detail| FlowGraphError::RegionMismatch { region, detail };
        if root.kind != ControlFlowRegionKind::Root
            || root.enclosing.is_some()
            || root.first_block.as_usize() != 0
            || root.last_block.as_usize() + 1 != self.blocks.len()
        {
            return Err(mismatch(root.id, "root must span every block"));
        }

        for (index, region) in self.regions.iter().enumerate() {
            if region.id.as_usize() != index || region.first_block > region.last_block {
                return Err(mismatch(region.id, "bad id or empty range"));
            }
            if index != 0 {
                let Some(parent) = region.enclosing.and_then(|p| self.region(p)) else {
                    return Err(mismatch(region.id, "missing enclosing region"));
                };
                if !parent.nested.contains(&region.id)
                    || region.first_block < parent.first_block
                    || region.last_block > parent.last_block
                {
                    return Err(mismatch(region.id, "not nested inside its enclosing region"));
                }
            }
            let mut previous_last: Option<BlockId> = None;
            for &child in &region.nested {
                let Some(child) = self.region(child) else {
                    return Err(mismatch(region.id, "unknown nested region"));
                };
                if child.enclosing != Some(region.id) {
                    return Err(mismatch(child.id, "enclosing region disagrees with its parent"));
                }
                if previous_last.is_some_and(|last| child.first_block <= last) {
                    return Err(mismatch(child.id, "overlaps a sibling"));
                }
                previous_last = Some(child.last_block);
            }
        }

        for block in &self.blocks {
            let Some(region) = self.region(block.enclosing_region) else {
                return Err(mismatch(block.enclosing_region, "block names an unknown region"));
            };
            let innermost = region.contains(block.ordinal)
                && region
                    .nested
                    .iter()
                    .filter_map(|&n| self.region(n))
                    .all(|n| !n.contains(block.ordinal));
            if !innermost {
                return Err(mismatch(region.id, "not the innermost region of its block"));
            }
        }

        self.validate_annotations()
    }

    fn validate_annotations(&self) -> Result<()> {
        for block in &self.blocks {
            let source = self.region_path(block.enclosing_region);
            for branch in block.successors() {
                let Some(destination) = branch.destination.and_then(|d| self.block(d)) else {
                    continue;
                };
                let target = self.region_path(destination.enclosing_region);
                let leaving: Vec<RegionId> = source.iter().copied().filter(|r| !target.contains(r)).collect();
                let entering: Vec<RegionId> = target.iter().rev().copied().filter(|r| !source.contains(r)).collect();
                if branch.leaving_regions != leaving {
                    return Err(FlowGraphError::RegionMismatch {
                        region: leaving.first().copied().unwrap_or(block.enclosing_region),
                        detail: "leaving regions do not match the edge",
                    });
                }
                if branch.entering_regions != entering {
                    return Err(FlowGraphError::RegionMismatch {
                        region: entering.first().copied().unwrap_or(destination.enclosing_region),
                        detail: "entering regions do not match the edge",
                    });
                }
                for finally in &branch.finally_regions {
                    let is_finally = self
                        .region(*finally)
                        .is_some_and(|r| r.kind == ControlFlowRegionKind::Finally);
                    if !is_finally {
                        return Err(FlowGraphError::RegionMismatch {
                            region: *finally,
                            detail: "finalizing region is not a finally",
                        });
                    }
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Captures
    // ------------------------------------------------------------------------

    fn validate_captures(&self) -> Result<()> {
        let mut declared: FxHashMap<CaptureId, RegionId> = FxHashMap::default();
        for region in &self.regions {
            for &id in &region.capture_ids {
                if declared.insert(id, region.id).is_some() || id.index() >= self.capture_count {
                    return Err(FlowGraphError::UndeclaredCapture { capture: id });
                }
            }
        }
        if let Some(missing) = (0..self.capture_count).map(CaptureId::new).find(|id| !declared.contains_key(id)) {
            return Err(FlowGraphError::UndeclaredCapture { capture: missing });
        }

        for block in &self.blocks {
            for op in block_operations(block).flat_map(Operation::descendants) {
                let Some(id) = capture_id(op) else { continue };
                let Some(&region) = declared.get(&id) else {
                    return Err(FlowGraphError::UndeclaredCapture { capture: id });
                };
                let in_range = self.region(region).is_some_and(|r| r.contains(block.ordinal));
                if !in_range {
                    return Err(FlowGraphError::CaptureOutsideRegion {
                        capture: id,
                        block: block.ordinal,
                        region,
                    });
                }
            }
        }

        self.validate_capture_definitions()
    }

    /// Every reference must be preceded by a write on every reachable path.
    fn validate_capture_definitions(&self) -> Result<()> {
        let handler_entries = self.handler_entries();
        // `None` is "not computed yet", the top of the lattice.
        let mut defined_out: Vec<Option<FxHashSet<CaptureId>>> = vec![None; self.blocks.len()];
        let mut changed = true;
        while changed {
            changed = false;
            for block in self.blocks.iter().filter(|b| b.is_reachable) {
                let mut defined = self.defined_on_entry(block, &defined_out, &handler_entries);
                for op in block_operations(block) {
                    define_captures(op, &mut defined);
                }
                let slot = &mut defined_out[block.ordinal.as_usize()];
                if slot.as_ref() != Some(&defined) {
                    *slot = Some(defined);
                    changed = true;
                }
            }
        }

        for block in self.blocks.iter().filter(|b| b.is_reachable) {
            let mut defined = self.defined_on_entry(block, &defined_out, &handler_entries);
            for op in block_operations(block) {
                if let Some(capture) = op
                    .descendants()
                    .filter(|d| matches!(d.node(), OperationNode::FlowCaptureReference { .. }))
                    .filter_map(capture_id)
                    .find(|id| !defined.contains(id))
                {
                    return Err(FlowGraphError::CaptureReadBeforeWrite {
                        capture,
                        block: block.ordinal,
                    });
                }
                define_captures(op, &mut defined);
            }
        }
        Ok(())
    }

    fn defined_on_entry(
        &self,
        block: &BasicBlock,
        defined_out: &[Option<FxHashSet<CaptureId>>],
        handler_entries: &FxHashSet<BlockId>,
    ) -> FxHashSet<CaptureId> {
        if block.ordinal.as_usize() == 0 || handler_entries.contains(&block.ordinal) {
            return FxHashSet::default();
        }
        let mut incoming = block
            .predecessors
            .iter()
            .filter(|p| self.blocks[p.as_usize()].is_reachable)
            .filter_map(|p| defined_out[p.as_usize()].as_ref());
        let Some(first) = incoming.next() else {
            return FxHashSet::default();
        };
        let mut defined = first.clone();
        for other in incoming {
            defined.retain(|id| other.contains(id));
        }
        defined
    }
}

fn block_operations(block: &BasicBlock) -> impl Iterator<Item = &Operation> {
    block.operations.iter().chain(block.branch_value.iter())
}

fn capture_id(op: &Operation) -> Option<CaptureId> {
    match op.node() {
        OperationNode::FlowCapture { id, .. } | OperationNode::FlowCaptureReference { id } => Some(*id),
        _ => None,
    }
}

fn define_captures(op: &Operation, defined: &mut FxHashSet<CaptureId>) {
    for d in op.descendants() {
        if let OperationNode::FlowCapture { id, .. } = d.node() {
            defined.insert(*id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    /// `i = b ? y : 1;`, blocks B0..B5 with the merge in B4.
    fn conditional_graph() -> ControlFlowGraph {
        let f = Fixture::new();
        let value = conditional(f.b(), f.y(), int(1));
        build(&block(vec![expr_stmt(assign(f.i(), value))], vec![]))
    }

    /// `i = x ?? y;`, with the null test in a nested region.
    fn coalesce_graph() -> ControlFlowGraph {
        let f = Fixture::new();
        build(&block(vec![expr_stmt(assign(f.i(), coalesce(f.x(), f.y())))], vec![]))
    }

    #[test]
    fn built_graphs_are_consistent() {
        conditional_graph().validate().expect("valid");
        coalesce_graph().validate().expect("valid");
    }

    #[test]
    fn capture_missing_on_one_path_is_read_before_write() {
        let mut graph = conditional_graph();
        graph.blocks[3].operations.clear();

        let err = graph.validate().expect_err("capture 1 is only written in B2");
        assert!(matches!(
            err,
            FlowGraphError::CaptureReadBeforeWrite { capture, block }
                if capture == CaptureId::new(1) && block == BlockId::new(4)
        ));
        assert!(err.is_internal());
    }

    #[test]
    fn capture_used_outside_its_region() {
        let mut graph = coalesce_graph();
        let moved = CaptureId::new(2);
        graph.regions[1].capture_ids.retain(|&id| id != moved);
        graph.regions[2].capture_ids.push(moved);

        let err = graph.validate().expect_err("capture 2 escapes R2");
        assert!(matches!(
            err,
            FlowGraphError::CaptureOutsideRegion { capture, block, region }
                if capture == moved && block == BlockId::new(4) && region == RegionId::new(2)
        ));
    }

    #[test]
    fn every_capture_needs_a_declaring_region() {
        let mut graph = conditional_graph();
        graph.regions[1].capture_ids.clear();

        let err = graph.validate().expect_err("no region declares the captures");
        assert!(matches!(err, FlowGraphError::UndeclaredCapture { capture } if capture == CaptureId::new(0)));
    }

    #[test]
    fn predecessors_must_match_edges() {
        let mut graph = conditional_graph();
        graph.blocks[4].predecessors.pop();

        let err = graph.validate().expect_err("B3 is missing from B4's predecessors");
        assert!(matches!(err, FlowGraphError::PredecessorMismatch { block } if block == BlockId::new(4)));
    }

    #[test]
    fn conditional_block_needs_its_condition() {
        let mut graph = conditional_graph();
        graph.blocks[1].branch_value = None;

        let err = graph.validate().expect_err("B1 branches on nothing");
        assert!(matches!(err, FlowGraphError::MalformedBlock { block, .. } if block == BlockId::new(1)));
    }

    #[test]
    fn edge_annotations_must_match_regions() {
        let mut graph = coalesce_graph();
        if let Some(branch) = graph.blocks[0].fallthrough_successor.as_mut() {
            branch.entering_regions.clear();
        }

        let err = graph.validate().expect_err("entry edge enters R1");
        assert!(matches!(err, FlowGraphError::RegionMismatch { region, .. } if region == RegionId::new(1)));
    }

    #[test]
    fn exit_block_takes_no_statements() {
        let mut graph = conditional_graph();
        let statement = graph.blocks[4].operations[0].clone();
        graph.blocks[5].operations.push(statement);

        let err = graph.validate().expect_err("exit holds a statement");
        assert!(matches!(err, FlowGraphError::MalformedBlock { block, .. } if block == BlockId::new(5)));
    }
}
