//! The evaluation stack.
//!
//! Operands already lowered but not yet consumed by their parent sit on
//! the stack. When a later sibling needs to branch, every pending operand
//! that could observe a side effect is spilled: captured into a fresh id
//! in its frame's region and replaced by a reference to that id. Frames
//! map to statements or arms; a frame's `.locals` region is only created
//! once something in it is captured.

use semflow_core::Span;
use semflow_operations::{Operation, OperationNode};
use tracing::trace;

use super::{FlowBuilder, RegionIdx, capture_reference, placeholder};
use crate::error::{FlowGraphError, Result};
use crate::region::ControlFlowRegionKind;

#[derive(Debug)]
pub(super) struct Operand {
    pub op: Operation,
    /// Already captured, or checked and found not to need it.
    pub spilled: bool,
}

#[derive(Debug)]
pub(super) struct EvalFrame {
    /// Stack height when the frame was pushed.
    pub base: usize,
    pub region: Option<RegionIdx>,
}

impl FlowBuilder<'_> {
    pub(super) fn push_frame(&mut self) {
        self.frames.push(EvalFrame {
            base: self.eval_stack.len(),
            region: None,
        });
    }

    /// Close the innermost frame and its region, if it made one.
    pub(super) fn pop_frame(&mut self, span: Span) -> Result<()> {
        let Some(frame) = self.frames.pop() else {
            return Err(FlowGraphError::UnbalancedStack { span });
        };
        if self.eval_stack.len() != frame.base {
            return Err(FlowGraphError::UnbalancedStack { span });
        }
        if let Some(region) = frame.region {
            if self.current_region != region {
                return Err(FlowGraphError::RegionMismatch {
                    region: (region as u32).into(),
                    detail: "frame region is not the innermost open region",
                });
            }
            self.leave_region();
        }
        Ok(())
    }

    pub(super) fn push_operand(&mut self, op: Operation) {
        self.eval_stack.push(Operand { op, spilled: false });
    }

    /// Pop every operand above `base`, bottom first.
    pub(super) fn take_operands(&mut self, base: usize) -> Vec<Operation> {
        self.eval_stack.split_off(base).into_iter().map(|operand| operand.op).collect()
    }

    /// The region of the innermost frame, created on first use. Without a
    /// frame, the current region.
    pub(super) fn ensure_frame_region(&mut self) -> Result<RegionIdx> {
        match self.frames.len() {
            0 => Ok(self.current_region),
            len => self.ensure_region_of_frame(len - 1),
        }
    }

    fn ensure_region_of_frame(&mut self, frame: usize) -> Result<RegionIdx> {
        if let Some(region) = self.frames[frame].region {
            return Ok(region);
        }
        if let Some(open) = self.frames[frame + 1..].iter().find_map(|f| f.region) {
            return Err(FlowGraphError::RegionMismatch {
                region: (open as u32).into(),
                detail: "inner frame region opened before its parent",
            });
        }
        let region = self.enter_region(ControlFlowRegionKind::LocalLifetime, Vec::new());
        self.frames[frame].region = Some(region);
        Ok(region)
    }

    /// Capture every pending operand that is not already safe to evaluate
    /// late. Called before emitting a branch inside an expression.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn spill_eval_stack(&mut self) -> Result<()> {
        for frame in 0..self.frames.len() {
            let start = self.frames[frame].base;
            let end = self.frames.get(frame + 1).map_or(self.eval_stack.len(), |next| next.base);
            for slot in start..end {
                if self.eval_stack[slot].spilled {
                    continue;
                }
                self.eval_stack[slot].spilled = true;
                if !needs_spill(&self.eval_stack[slot].op) {
                    continue;
                }
                let region = self.ensure_region_of_frame(frame)?;
                let op = std::mem::replace(&mut self.eval_stack[slot].op, placeholder());
                self.eval_stack[slot].op = self.spill_operand(op, region);
            }
        }
        Ok(())
    }

    fn spill_operand(&mut self, op: Operation, region: RegionIdx) -> Operation {
        let (node, header) = op.into_parts();
        match node {
            OperationNode::Argument {
                kind,
                parameter,
                value,
                conversion,
            } => {
                let value = if needs_spill(&value) {
                    self.spill_operand(*value, region)
                } else {
                    *value
                };
                Operation::from_parts(
                    OperationNode::Argument {
                        kind,
                        parameter,
                        value: Box::new(value),
                        conversion,
                    },
                    header,
                )
            }
            node => {
                let id = self.new_capture(region);
                trace!(capture = %id, region, "spill operand");
                self.capture(id, Operation::from_parts(node, header.clone()));
                capture_reference(id, &header)
            }
        }
    }
}

/// Whether an operand's value could change if evaluated after a branch.
pub(super) fn needs_spill(op: &Operation) -> bool {
    if op.constant_value().is_some() || op.kind().is_pattern() {
        return false;
    }
    match op.node() {
        OperationNode::InstanceReference { .. }
        | OperationNode::FlowCaptureReference { .. }
        | OperationNode::AnonymousFunction { .. }
        | OperationNode::DefaultValue
        | OperationNode::Empty => false,
        OperationNode::Argument { value, .. } => needs_spill(value),
        _ => true,
    }
}
