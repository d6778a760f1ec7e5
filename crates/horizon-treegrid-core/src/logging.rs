//! Logging and debugging facilities for Horizon TreeGrid.
//!
//! This module provides:
//! - Target names for filtering `tracing` output per engine
//! - Debug outlines of flattened trees
//!
//! # Tracing Integration
//!
//! The engines log through the `tracing` crate. Install a subscriber in your
//! application to see the output:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_treegrid::rows=debug")
//!     .init();
//! ```
//!
//! # Debug Outlines
//!
//! ```
//! use horizon_treegrid_core::logging::{format_outline, TreeStyle};
//!
//! let outline = format_outline(
//!     [(0, "root"), (1, "child"), (1, "other")],
//!     TreeStyle::Ascii,
//! );
//! assert_eq!(outline, "root\n+-- child\n`-- other\n");
//! ```

use std::fmt::Display;
use std::fmt::Write as FmtWrite;

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_treegrid_core::signal";
    /// Change queue target.
    pub const DISPATCH: &str = "horizon_treegrid_core::dispatch";
    /// Observable source collections.
    pub const SOURCE: &str = "horizon_treegrid::source";
    /// Row flattening engine.
    pub const ROWS: &str = "horizon_treegrid::rows";
    /// Tree selection engine.
    pub const SELECTION: &str = "horizon_treegrid::selection";
    /// Flat-row/tree selection coordinator.
    pub const COORDINATOR: &str = "horizon_treegrid::coordinator";
    /// Grid facade and configuration.
    pub const GRID: &str = "horizon_treegrid::grid";
}

/// Style options for outline visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash-prefixed representation.
    Compact,
}

impl TreeStyle {
    fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("  ", "- ", "- "),
        }
    }
}

/// Format a pre-order sequence of `(depth, label)` lines as an indented outline.
///
/// Depths are expected to grow by at most one between consecutive lines, as
/// they do for a flattened tree.
pub fn format_outline<I, L>(lines: I, style: TreeStyle) -> String
where
    I: IntoIterator<Item = (usize, L)>,
    L: Display,
{
    let lines: Vec<(usize, L)> = lines.into_iter().collect();
    let (branch, tee, corner) = style.glyphs();
    let mut output = String::new();

    for (i, (depth, label)) in lines.iter().enumerate() {
        if *depth > 0 {
            for ancestor in 1..*depth {
                if has_later_sibling(&lines, i, ancestor) {
                    output.push_str(branch);
                } else {
                    output.push_str(&" ".repeat(branch.chars().count()));
                }
            }
            if has_later_sibling(&lines, i, *depth) {
                output.push_str(tee);
            } else {
                output.push_str(corner);
            }
        }
        writeln!(output, "{}", label).expect("write to String");
    }
    output
}

/// Whether another line at `depth` follows line `index` before the enclosing
/// level at `depth - 1` closes.
fn has_later_sibling<L>(lines: &[(usize, L)], index: usize, depth: usize) -> bool {
    for (next_depth, _) in &lines[index + 1..] {
        if *next_depth < depth {
            return false;
        }
        if *next_depth == depth {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_ascii() {
        let outline = format_outline(
            [(0, "a"), (1, "a0"), (2, "a00"), (1, "a1"), (0, "b")],
            TreeStyle::Ascii,
        );
        assert_eq!(outline, "a\n+-- a0\n|   `-- a00\n`-- a1\nb\n");
    }

    #[test]
    fn test_outline_last_child_has_no_branch() {
        let outline = format_outline([(0, "a"), (1, "a0"), (2, "a00")], TreeStyle::Ascii);
        assert_eq!(outline, "a\n`-- a0\n    `-- a00\n");
    }

    #[test]
    fn test_outline_compact() {
        let outline = format_outline([(0, "x"), (1, "y")], TreeStyle::Compact);
        assert_eq!(outline, "x\n- y\n");
    }

    #[test]
    fn test_outline_empty() {
        let outline = format_outline(Vec::<(usize, String)>::new(), TreeStyle::default());
        assert!(outline.is_empty());
    }
}
