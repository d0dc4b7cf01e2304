//! Builder output to [`ControlFlowGraph`].
//!
//! 1. dissolve `.locals` regions that ended up declaring nothing
//! 2. pack: drop empty blocks that only jump on, redirecting their
//!    predecessors
//! 3. compute region ranges, dropping regions left without blocks and
//!    folding capture-only regions into an identical parent
//! 4. renumber blocks in layout order and regions in pre-order
//! 5. derive predecessors, reachability and the region annotations of
//!    every edge

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use semflow_core::{BlockId, RegionId};
use tracing::debug;

use crate::builder::{BlockIdx, BuiltGraph, PendingBranch, ROOT_REGION, RegionIdx};
use crate::graph::{BasicBlock, BasicBlockKind, ControlFlowBranch, ControlFlowBranchSemantics, ControlFlowGraph};
use crate::options::FlowGraphOptions;
use crate::region::{ControlFlowRegion, ControlFlowRegionKind};

#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn finalize(built: BuiltGraph, options: &FlowGraphOptions) -> ControlFlowGraph {
    let mut finalizer = Finalizer::new(built);
    finalizer.dissolve_empty_local_regions();
    if options.pack_blocks {
        finalizer.pack();
    }
    let ranges = finalizer.settle_regions();
    let graph = finalizer.into_graph(&ranges);
    debug!(
        blocks = graph.blocks.len(),
        regions = graph.regions.len(),
        captures = graph.capture_count,
        "finalized flow graph"
    );
    graph
}

/// First and last layout position of a region, nested regions included.
type Range = (usize, usize);

struct Finalizer {
    built: BuiltGraph,
    dropped: Vec<bool>,
}

impl Finalizer {
    fn new(built: BuiltGraph) -> Self {
        let dropped = vec![false; built.regions.len()];
        Self { built, dropped }
    }

    // ------------------------------------------------------------------------
    // Regions
    // ------------------------------------------------------------------------

    /// Move everything `region` holds into its parent and drop it.
    fn merge_into_parent(&mut self, region: RegionIdx) {
        let regions = &mut self.built.regions;
        let parent = regions[region].enclosing.unwrap_or(ROOT_REGION);

        let captures = std::mem::take(&mut regions[region].captures);
        regions[parent].captures.extend(captures);
        let locals = std::mem::take(&mut regions[region].locals);
        regions[parent].locals.extend(locals);

        let nested = std::mem::take(&mut regions[region].nested);
        for &child in &nested {
            regions[child].enclosing = Some(parent);
        }
        let siblings = &mut regions[parent].nested;
        match siblings.iter().position(|&r| r == region) {
            Some(pos) => {
                siblings.splice(pos..=pos, nested);
            }
            None => siblings.extend(nested),
        }

        for block in &mut self.built.blocks {
            if block.region == region {
                block.region = parent;
            }
        }
        self.dropped[region] = true;
    }

    fn dissolve_empty_local_regions(&mut self) {
        for region in (1..self.built.regions.len()).rev() {
            let r = &self.built.regions[region];
            if r.kind == ControlFlowRegionKind::LocalLifetime && r.locals.is_empty() && r.captures.is_empty() {
                self.merge_into_parent(region);
            }
        }
    }

    fn ranges(&self) -> Vec<Option<Range>> {
        let mut ranges = vec![None; self.built.regions.len()];
        for (pos, &block) in self.built.layout.iter().enumerate() {
            let mut current = Some(self.built.blocks[block].region);
            while let Some(region) = current {
                ranges[region] = Some(match ranges[region] {
                    Some((first, _)) => (first, pos),
                    None => (pos, pos),
                });
                current = self.built.regions[region].enclosing;
            }
        }
        ranges
    }

    /// Drop regions without blocks, then fold capture-only `.locals`
    /// regions into a `.locals` parent covering the same blocks.
    fn settle_regions(&mut self) -> Vec<Option<Range>> {
        let ranges = self.ranges();
        for region in (1..self.built.regions.len()).rev() {
            if !self.dropped[region] && ranges[region].is_none() {
                self.merge_into_parent(region);
            }
        }
        for region in (1..self.built.regions.len()).rev() {
            if self.dropped[region] {
                continue;
            }
            let r = &self.built.regions[region];
            let parent = r.enclosing.unwrap_or(ROOT_REGION);
            if r.kind == ControlFlowRegionKind::LocalLifetime
                && r.locals.is_empty()
                && self.built.regions[parent].kind == ControlFlowRegionKind::LocalLifetime
                && ranges[region] == ranges[parent]
            {
                self.merge_into_parent(region);
            }
        }
        ranges
    }

    // ------------------------------------------------------------------------
    // Packing
    // ------------------------------------------------------------------------

    /// Blocks that open a region other than `.locals`; removing them would
    /// move the region's entry point.
    fn region_entries(&self) -> FxHashSet<BlockIdx> {
        let ranges = self.ranges();
        self.built
            .regions
            .iter()
            .enumerate()
            .filter(|&(idx, r)| {
                !self.dropped[idx]
                    && !matches!(r.kind, ControlFlowRegionKind::Root | ControlFlowRegionKind::LocalLifetime)
            })
            .filter_map(|(idx, _)| ranges[idx].map(|(first, _)| self.built.layout[first]))
            .collect()
    }

    fn pass_through_target(&self, block: BlockIdx, entries: &FxHashSet<BlockIdx>) -> Option<BlockIdx> {
        let b = &self.built.blocks[block];
        if b.kind != BasicBlockKind::Block || !b.is_empty() || entries.contains(&block) {
            return None;
        }
        match b.fallthrough {
            Some(PendingBranch {
                destination: Some(destination),
                semantics: ControlFlowBranchSemantics::Regular,
            }) if destination != block => Some(destination),
            _ => None,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn pack(&mut self) {
        loop {
            let entries = self.region_entries();
            let mut forward: FxHashMap<BlockIdx, BlockIdx> = self
                .built
                .layout
                .iter()
                .filter_map(|&block| self.pass_through_target(block, &entries).map(|d| (block, d)))
                .collect();
            if forward.is_empty() {
                break;
            }

            // A ring of empty blocks jumping to each other keeps one member.
            let mut candidates: Vec<BlockIdx> = forward.keys().copied().collect();
            candidates.sort_unstable();
            for block in candidates {
                if forward.contains_key(&block) && resolve(&forward, block).is_none() {
                    forward.remove(&block);
                }
            }
            if forward.is_empty() {
                break;
            }

            for &block in &self.built.layout {
                if forward.contains_key(&block) {
                    continue;
                }
                let b = &mut self.built.blocks[block];
                for branch in b.conditional.iter_mut().chain(b.fallthrough.iter_mut()) {
                    if let Some(destination) = branch.destination
                        && let Some(target) = resolve(&forward, destination)
                    {
                        branch.destination = Some(target);
                    }
                }
            }
            self.built.layout.retain(|block| !forward.contains_key(block));
        }
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    fn into_graph(self, ranges: &[Option<Range>]) -> ControlFlowGraph {
        let Finalizer { built, dropped } = self;

        // Regions in pre-order.
        let mut region_ids: Vec<Option<RegionId>> = vec![None; built.regions.len()];
        let mut order = Vec::new();
        let mut stack = vec![ROOT_REGION];
        while let Some(region) = stack.pop() {
            region_ids[region] = Some(RegionId::new(order.len() as u32));
            order.push(region);
            let mut nested: Vec<RegionIdx> = built.regions[region]
                .nested
                .iter()
                .copied()
                .filter(|&r| !dropped[r])
                .collect();
            nested.sort_by_key(|&r| ranges[r].map_or(usize::MAX, |(first, _)| first));
            stack.extend(nested.into_iter().rev());
        }
        let region_id = |region: RegionIdx| region_ids[region].unwrap_or(RegionId::new(0));

        let ordinals: FxHashMap<BlockIdx, BlockId> = built
            .layout
            .iter()
            .enumerate()
            .map(|(pos, &block)| (block, BlockId::new(pos as u32)))
            .collect();
        let last = built.layout.len().saturating_sub(1);

        let regions: Vec<ControlFlowRegion> = order
            .iter()
            .map(|&region| {
                let r = &built.regions[region];
                let (first, last) = ranges[region].unwrap_or((0, last));
                let mut nested: Vec<RegionId> =
                    r.nested.iter().filter(|&&n| !dropped[n]).map(|&n| region_id(n)).collect();
                nested.sort_unstable();
                let mut capture_ids = r.captures.clone();
                capture_ids.sort_unstable();
                ControlFlowRegion {
                    id: region_id(region),
                    kind: r.kind,
                    enclosing: r.enclosing.map(region_id),
                    exception_type: r.exception_type,
                    first_block: BlockId::new(first as u32),
                    last_block: BlockId::new(last as u32),
                    nested,
                    locals: r.locals.clone(),
                    capture_ids,
                }
            })
            .collect();

        let mut blocks = Vec::with_capacity(built.layout.len());
        let mut blocks_arena = built.blocks;
        for (pos, &block) in built.layout.iter().enumerate() {
            let source = BlockId::new(pos as u32);
            let builder = &mut blocks_arena[block];
            let edge = |pending: PendingBranch, conditional: bool| {
                let destination = pending.destination.and_then(|d| ordinals.get(&d).copied());
                let semantics = match (pending.destination, destination) {
                    (Some(_), None) => ControlFlowBranchSemantics::Error,
                    _ => pending.semantics,
                };
                ControlFlowBranch {
                    source,
                    destination,
                    semantics,
                    is_conditional_successor: conditional,
                    entering_regions: Vec::new(),
                    leaving_regions: Vec::new(),
                    finally_regions: Vec::new(),
                }
            };
            blocks.push(BasicBlock {
                ordinal: source,
                kind: builder.kind,
                operations: std::mem::take(&mut builder.operations),
                branch_value: builder.branch_value.take(),
                condition_kind: builder.condition_kind,
                conditional_successor: builder.conditional.map(|p| edge(p, true)),
                fallthrough_successor: builder.fallthrough.map(|p| edge(p, false)),
                predecessors: Vec::new(),
                is_reachable: false,
                enclosing_region: region_id(builder.region),
            });
        }

        let mut graph = ControlFlowGraph {
            blocks,
            regions,
            capture_count: built.capture_count,
        };
        link_predecessors(&mut graph);
        mark_reachable(&mut graph);
        annotate_edges(&mut graph);
        graph
    }
}

/// Follow `forward` from `block` to a block that stays. `None` when the
/// chain loops.
fn resolve(forward: &FxHashMap<BlockIdx, BlockIdx>, block: BlockIdx) -> Option<BlockIdx> {
    let mut current = block;
    for _ in 0..=forward.len() {
        match forward.get(&current) {
            Some(&next) => current = next,
            None => return Some(current),
        }
    }
    None
}

fn link_predecessors(graph: &mut ControlFlowGraph) {
    let mut predecessors: Vec<Vec<BlockId>> = vec![Vec::new(); graph.blocks.len()];
    for block in &graph.blocks {
        for branch in block.successors() {
            if let Some(destination) = branch.destination {
                predecessors[destination.as_usize()].push(block.ordinal);
            }
        }
    }
    for (block, mut preds) in graph.blocks.iter_mut().zip(predecessors) {
        preds.sort_unstable();
        preds.dedup();
        block.predecessors = preds;
    }
}

/// Breadth-first from the entry. Handler and `finally` entries count as
/// reachable once any block of their `try` is.
pub(crate) fn mark_reachable(graph: &mut ControlFlowGraph) {
    let mut reachable = vec![false; graph.blocks.len()];
    let mut queue = VecDeque::from([0usize]);
    reachable[0] = true;

    loop {
        while let Some(block) = queue.pop_front() {
            for branch in graph.blocks[block].successors() {
                if let Some(destination) = branch.destination
                    && !reachable[destination.as_usize()]
                {
                    reachable[destination.as_usize()] = true;
                    queue.push_back(destination.as_usize());
                }
            }
        }

        for group in graph.regions.iter().filter(|r| r.kind.is_try_group()) {
            let Some((&try_region, handlers)) = group.nested.split_first() else {
                continue;
            };
            let Some(try_region) = graph.region(try_region) else {
                continue;
            };
            let try_reachable =
                (try_region.first_block.as_usize()..=try_region.last_block.as_usize()).any(|b| reachable[b]);
            if !try_reachable {
                continue;
            }
            for handler in handlers {
                if let Some(handler) = graph.region(*handler) {
                    let entry = handler.first_block.as_usize();
                    if !reachable[entry] {
                        reachable[entry] = true;
                        queue.push_back(entry);
                    }
                }
            }
        }
        if queue.is_empty() {
            break;
        }
    }

    for (block, reachable) in graph.blocks.iter_mut().zip(reachable) {
        block.is_reachable = reachable;
    }
}

/// Fill in the entering, leaving and `finally` regions of every edge.
fn annotate_edges(graph: &mut ControlFlowGraph) {
    let paths: Vec<Vec<RegionId>> = graph.blocks.iter().map(|b| graph.region_path(b.enclosing_region)).collect();
    let finally_of: FxHashMap<RegionId, RegionId> = graph
        .regions
        .iter()
        .filter(|r| r.kind == ControlFlowRegionKind::TryAndFinally)
        .filter_map(|group| {
            let try_region = group.nested.first()?;
            let finally = group
                .nested
                .iter()
                .find(|&&n| graph.region(n).is_some_and(|r| r.kind == ControlFlowRegionKind::Finally))?;
            Some((*try_region, *finally))
        })
        .collect();

    for block in &mut graph.blocks {
        let source = &paths[block.ordinal.as_usize()];
        for branch in block
            .conditional_successor
            .iter_mut()
            .chain(block.fallthrough_successor.iter_mut())
        {
            let Some(destination) = branch.destination else {
                continue;
            };
            let target = &paths[destination.as_usize()];
            branch.leaving_regions = source.iter().copied().filter(|r| !target.contains(r)).collect();
            branch.entering_regions = target.iter().rev().copied().filter(|r| !source.contains(r)).collect();
            branch.finally_regions = branch
                .leaving_regions
                .iter()
                .filter_map(|r| finally_of.get(r).copied())
                .collect();
        }
    }
}
