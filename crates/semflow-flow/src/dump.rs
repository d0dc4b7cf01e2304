//! Textual dump of a flow graph.
//!
//! ```text
//! Block[B0] - Entry
//!     Statements (0)
//!     Next (Regular) Block[B1]
//!         Entering: {R1}
//!
//! .locals {R1}
//! {
//!     Locals: [int i]
//!     Block[B1] - Block
//!         Predecessors: [B0]
//!         Statements (1)
//!             SimpleAssignment (Type: int, IsImplicit)
//!               Left: LocalReference (Type: int, IsImplicit) Local: i (IsDeclaration: True)
//!               Right: Literal (Type: int, Constant: 1)
//!
//!         Next (Regular) Block[B2]
//!             Leaving: {R1}
//! }
//!
//! Block[B2] - Exit
//!     Predecessors: [B1]
//!     Statements (0)
//! ```
//!
//! A `try` group and its `Try` child share one `.try` header; a filtered
//! catch prints as `.catch` holding `.filter` and `.handler`.

use std::fmt::Write;

use semflow_core::{RegionId, SymbolTable};
use semflow_operations::{Operation, OperationDumper};

use crate::graph::{BasicBlock, BasicBlockKind, ControlFlowBranch, ControlFlowConditionKind, ControlFlowGraph};
use crate::region::{ControlFlowRegion, ControlFlowRegionKind};

const INDENT: usize = 4;

pub struct GraphDumper<'s> {
    symbols: &'s SymbolTable,
    operations: OperationDumper<'s>,
}

impl<'s> GraphDumper<'s> {
    pub fn new(symbols: &'s SymbolTable) -> Self {
        Self {
            symbols,
            operations: OperationDumper::new(symbols),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn dump(&self, graph: &ControlFlowGraph) -> String {
        let mut writer = Writer::default();
        // Printed regions currently open, outermost first.
        let mut open: Vec<RegionId> = Vec::new();

        for block in graph.blocks() {
            let mut path = graph.region_path(block.enclosing_region());
            path.reverse();

            while let Some(&innermost) = open.last() {
                if path.contains(&innermost) {
                    break;
                }
                open.pop();
                if is_printed(graph, innermost) {
                    writer.close();
                }
            }
            for &region in &path {
                if open.contains(&region) {
                    continue;
                }
                open.push(region);
                self.open_region(&mut writer, graph, region);
            }

            self.write_block(&mut writer, block);
        }
        while let Some(region) = open.pop() {
            if is_printed(graph, region) {
                writer.close();
            }
        }
        writer.out
    }

    fn open_region(&self, writer: &mut Writer, graph: &ControlFlowGraph, id: RegionId) {
        let Some(region) = graph.region(id) else { return };
        let parent = region.enclosing().and_then(|p| graph.region(p));
        let header = match region.kind() {
            ControlFlowRegionKind::Root | ControlFlowRegionKind::TryAndCatch | ControlFlowRegionKind::TryAndFinally => {
                return;
            }
            ControlFlowRegionKind::LocalLifetime => format!(".locals {{{id}}}"),
            ControlFlowRegionKind::Try => match parent {
                Some(group) if group.kind().is_try_group() => format!(".try {{{}, {id}}}", group.id()),
                _ => format!(".try {{{id}}}"),
            },
            ControlFlowRegionKind::Catch
                if parent.is_some_and(|p| p.kind() == ControlFlowRegionKind::FilterAndHandler) =>
            {
                format!(".handler {{{id}}}")
            }
            ControlFlowRegionKind::Catch | ControlFlowRegionKind::FilterAndHandler => format!(
                ".catch {{{id}}} ({})",
                region
                    .exception_type()
                    .map_or_else(|| "null".to_string(), |ty| self.symbols.type_name(ty))
            ),
            ControlFlowRegionKind::Filter => format!(".filter {{{id}}}"),
            ControlFlowRegionKind::Finally => format!(".finally {{{id}}}"),
        };
        let separated = matches!(region.kind(), ControlFlowRegionKind::LocalLifetime | ControlFlowRegionKind::Try);
        writer.open(&header, separated);
        self.write_region_contents(writer, region);
    }

    fn write_region_contents(&self, writer: &mut Writer, region: &ControlFlowRegion) {
        if !region.locals().is_empty() {
            let mut line = String::from("Locals:");
            for &local in region.locals() {
                let _ = write!(line, " [{}]", self.symbols.display(local));
            }
            writer.line(0, &line);
        }
        if !region.capture_ids().is_empty() {
            let mut line = String::from("CaptureIds:");
            for id in region.capture_ids() {
                let _ = write!(line, " [{id}]");
            }
            writer.line(0, &line);
        }
    }

    fn write_block(&self, writer: &mut Writer, block: &BasicBlock) {
        if writer.last_line_is("}") {
            writer.blank();
        }
        let unreachable = if block.is_reachable() { "" } else { " [UnReachable]" };
        writer.line(0, &format!("Block[{}] - {}{unreachable}", block.ordinal(), block.kind()));

        if block.kind() != BasicBlockKind::Entry {
            if block.predecessors().is_empty() {
                writer.line(1, "Predecessors (0)");
            } else {
                let mut line = String::from("Predecessors:");
                for pred in block.predecessors() {
                    let _ = write!(line, " [{pred}]");
                }
                writer.line(1, &line);
            }
        }

        writer.line(1, &format!("Statements ({})", block.operations().len()));
        for op in block.operations() {
            self.write_operation(writer, op, 2);
            writer.blank();
        }

        if let Some(branch) = block.conditional_successor() {
            let polarity = match block.condition_kind() {
                ControlFlowConditionKind::WhenTrue => "True",
                _ => "False",
            };
            writer.line(
                1,
                &format!("Jump if {polarity} ({}) to Block[{}]", branch.semantics(), target(branch)),
            );
            if let Some(condition) = block.branch_value() {
                self.write_operation(writer, condition, 2);
            }
            self.write_annotations(writer, branch);
            writer.blank();
        }

        if let Some(branch) = block.fallthrough_successor() {
            writer.line(1, &format!("Next ({}) Block[{}]", branch.semantics(), target(branch)));
            if block.conditional_successor().is_none()
                && let Some(value) = block.branch_value()
            {
                self.write_operation(writer, value, 2);
            }
            self.write_annotations(writer, branch);
        }
    }

    fn write_annotations(&self, writer: &mut Writer, branch: &ControlFlowBranch) {
        for (label, regions) in [
            ("Finalizing", branch.finally_regions()),
            ("Leaving", branch.leaving_regions()),
            ("Entering", branch.entering_regions()),
        ] {
            if regions.is_empty() {
                continue;
            }
            let mut line = format!("{label}:");
            for region in regions {
                let _ = write!(line, " {{{region}}}");
            }
            writer.line(2, &line);
        }
    }

    fn write_operation(&self, writer: &mut Writer, op: &Operation, levels: usize) {
        let columns = (writer.depth + levels) * INDENT;
        self.operations.write_operation(&mut writer.out, op, columns / 2);
    }
}

fn target(branch: &ControlFlowBranch) -> String {
    branch
        .destination()
        .map_or_else(|| "null".to_string(), |destination| destination.to_string())
}

fn is_printed(graph: &ControlFlowGraph, region: RegionId) -> bool {
    graph.region(region).is_some_and(|r| {
        !matches!(
            r.kind(),
            ControlFlowRegionKind::Root | ControlFlowRegionKind::TryAndCatch | ControlFlowRegionKind::TryAndFinally
        )
    })
}

/// Line-oriented output with the current region depth.
#[derive(Default)]
struct Writer {
    out: String,
    depth: usize,
}

impl Writer {
    fn line(&mut self, extra: usize, text: &str) {
        for _ in 0..(self.depth + extra) * INDENT {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn last_line(&self) -> Option<&str> {
        self.out.strip_suffix('\n')?.rsplit('\n').next()
    }

    fn last_line_is(&self, text: &str) -> bool {
        self.last_line().is_some_and(|line| line.trim() == text)
    }

    /// Region header and opening brace. `separated` headers get a blank
    /// line before them unless they open right after another brace.
    fn open(&mut self, header: &str, separated: bool) {
        if separated && !self.out.is_empty() && !self.last_line_is("{") && !self.last_line_is("") {
            self.blank();
        }
        self.line(0, header);
        self.line(0, "{");
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line(0, "}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_separates_regions_from_preceding_lines() {
        let mut writer = Writer::default();
        writer.line(0, "Block[B0] - Entry");
        writer.open(".locals {R1}", true);
        writer.open(".try {R2, R3}", true);
        writer.line(0, "Block[B1] - Block");
        writer.close();
        writer.close();
        assert_eq!(
            writer.out,
            "Block[B0] - Entry\n\n.locals {R1}\n{\n    .try {R2, R3}\n    {\n        Block[B1] - Block\n    }\n}\n"
        );
        assert!(writer.last_line_is("}"));
    }

    #[test]
    fn handler_headers_are_not_separated() {
        let mut writer = Writer::default();
        writer.line(0, "}");
        writer.open(".catch {R5} (System.Exception)", false);
        assert!(writer.out.starts_with("}\n.catch {R5} (System.Exception)\n{\n"));
    }
}
