//! Flat, row-index-addressed selection.
//!
//! [`RowSelectionModel`] tracks which visible rows are selected, plus the
//! current row (keyboard focus) and the anchor used for range extension.
//! It knows nothing about the tree: the coordinator keeps it in step with
//! the path-addressed selection.
//!
//! Operations return a [`RowSelectionDelta`] instead of emitting signals so
//! the owner decides when to announce them.
//!
//! ```
//! use horizon_treegrid::model::{RowSelectionModel, SelectionFlags, SelectionMode};
//!
//! let mut selection = RowSelectionModel::new(SelectionMode::Extended);
//! selection.select(2, SelectionFlags::CLEAR_AND_SELECT.with_anchor());
//! let delta = selection.select_range(2, 4, SelectionFlags::SELECT);
//!
//! assert_eq!(delta.selected, vec![3, 4]);
//! assert_eq!(selection.selected_rows(), vec![2, 3, 4]);
//! ```

use serde::{Deserialize, Serialize};

use super::range::IndexRanges;

/// How pointer and keyboard interaction selects rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Nothing can be selected.
    NoSelection,
    /// At most one row is selected (default).
    #[default]
    Single,
    /// Each click toggles a row in or out of the selection.
    Multiple,
    /// Click selects one row, ctrl+click toggles, shift+click extends.
    Extended,
}

impl SelectionMode {
    /// Returns `true` if more than one row may be selected.
    pub fn is_multi(self) -> bool {
        matches!(self, SelectionMode::Multiple | SelectionMode::Extended)
    }
}

/// Flags controlling a selection operation.
///
/// These can be combined; `clear` is applied first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionFlags {
    /// Clear the existing selection first.
    pub clear: bool,
    /// Select the rows.
    pub select: bool,
    /// Deselect the rows.
    pub deselect: bool,
    /// Flip the selection state of the rows.
    pub toggle: bool,
    /// Make the row the anchor for range extension.
    pub anchor: bool,
}

impl SelectionFlags {
    /// No operation.
    pub const NONE: Self = Self::empty();

    /// Clear existing selection.
    pub const CLEAR: Self = Self {
        clear: true,
        ..Self::empty()
    };

    /// Select the row.
    pub const SELECT: Self = Self {
        select: true,
        ..Self::empty()
    };

    /// Deselect the row.
    pub const DESELECT: Self = Self {
        deselect: true,
        ..Self::empty()
    };

    /// Toggle the row.
    pub const TOGGLE: Self = Self {
        toggle: true,
        ..Self::empty()
    };

    /// Clear existing selection and select the row.
    pub const CLEAR_AND_SELECT: Self = Self {
        clear: true,
        select: true,
        ..Self::empty()
    };

    const fn empty() -> Self {
        Self {
            clear: false,
            select: false,
            deselect: false,
            toggle: false,
            anchor: false,
        }
    }

    /// These flags with `clear` set.
    pub fn with_clear(mut self) -> Self {
        self.clear = true;
        self
    }

    /// These flags with `anchor` set.
    pub fn with_anchor(mut self) -> Self {
        self.anchor = true;
        self
    }
}

/// Rows that became selected and rows that stopped being selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSelectionDelta {
    /// Newly selected rows, ascending.
    pub selected: Vec<usize>,
    /// Newly deselected rows, ascending.
    pub deselected: Vec<usize>,
}

impl RowSelectionDelta {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }

    /// Folds a later delta into this one. A row selected and then
    /// deselected cancels out.
    pub fn merge(&mut self, later: RowSelectionDelta) {
        for row in later.selected {
            if let Some(pos) = self.deselected.iter().position(|&r| r == row) {
                self.deselected.remove(pos);
            } else if !self.selected.contains(&row) {
                self.selected.push(row);
            }
        }
        for row in later.deselected {
            if let Some(pos) = self.selected.iter().position(|&r| r == row) {
                self.selected.remove(pos);
            } else if !self.deselected.contains(&row) {
                self.deselected.push(row);
            }
        }
        self.selected.sort_unstable();
        self.deselected.sort_unstable();
    }

    fn between(before: &IndexRanges, after: &IndexRanges) -> Self {
        Self {
            selected: after.indices().filter(|&r| !before.contains(r)).collect(),
            deselected: before.indices().filter(|&r| !after.contains(r)).collect(),
        }
    }
}

/// Selection state over a flat list of rows.
#[derive(Debug, Clone, Default)]
pub struct RowSelectionModel {
    mode: SelectionMode,
    selected: IndexRanges,
    anchor: Option<usize>,
    current: Option<usize>,
}

impl RowSelectionModel {
    /// Creates an empty selection in `mode`.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// The selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switches the mode, trimming the selection to what the new mode
    /// allows. `Single` keeps the current row if it is selected, otherwise
    /// the first selected row.
    pub fn set_mode(&mut self, mode: SelectionMode) -> RowSelectionDelta {
        self.mode = mode;
        let before = self.selected.clone();
        match mode {
            SelectionMode::NoSelection => self.selected.clear(),
            SelectionMode::Single if self.selected.count() > 1 => {
                let keep = self
                    .current
                    .filter(|&row| self.selected.contains(row))
                    .or_else(|| self.selected.first());
                self.selected.clear();
                if let Some(row) = keep {
                    self.selected.add(row);
                }
            }
            _ => {}
        }
        RowSelectionDelta::between(&before, &self.selected)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns `true` if `row` is selected.
    pub fn is_selected(&self, row: usize) -> bool {
        self.selected.contains(row)
    }

    /// Selected rows, ascending.
    pub fn selected_rows(&self) -> Vec<usize> {
        self.selected.indices().collect()
    }

    /// Number of selected rows.
    pub fn count(&self) -> usize {
        self.selected.count()
    }

    /// Returns `true` if any row is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// The anchor row for range extension.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Sets the anchor row.
    pub fn set_anchor(&mut self, row: Option<usize>) {
        self.anchor = row;
    }

    /// The current (focused) row.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Sets the current row without touching the selection.
    pub fn set_current(&mut self, row: Option<usize>) {
        self.current = row;
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Applies `flags` to `row` and makes it the current row.
    pub fn select(&mut self, row: usize, flags: SelectionFlags) -> RowSelectionDelta {
        if self.mode == SelectionMode::NoSelection {
            return RowSelectionDelta::default();
        }
        let before = self.selected.clone();

        if flags.clear {
            self.selected.clear();
        }
        if flags.toggle {
            if !self.selected.remove(row) {
                self.selected.add(row);
            }
        } else if flags.select {
            self.selected.add(row);
        } else if flags.deselect {
            self.selected.remove(row);
        }

        // Single mode keeps only the row just selected.
        if self.mode == SelectionMode::Single
            && self.selected.count() > 1
            && self.selected.contains(row)
        {
            self.selected.clear();
            self.selected.add(row);
        }

        self.current = Some(row);
        if flags.anchor {
            self.anchor = Some(row);
        }
        RowSelectionDelta::between(&before, &self.selected)
    }

    /// Selects `start..=end` (either order). In `Single` mode only `end` is
    /// selected.
    pub fn select_range(&mut self, start: usize, end: usize, flags: SelectionFlags) -> RowSelectionDelta {
        match self.mode {
            SelectionMode::NoSelection => return RowSelectionDelta::default(),
            SelectionMode::Single => return self.select(end, SelectionFlags::CLEAR_AND_SELECT),
            SelectionMode::Multiple | SelectionMode::Extended => {}
        }
        let before = self.selected.clone();
        if flags.clear {
            self.selected.clear();
        }
        self.selected.add_range(start.min(end), start.max(end));
        self.current = Some(end);
        if flags.anchor {
            self.anchor = Some(start);
        }
        RowSelectionDelta::between(&before, &self.selected)
    }

    /// Deselects every row.
    pub fn clear(&mut self) -> RowSelectionDelta {
        let before = std::mem::take(&mut self.selected);
        RowSelectionDelta::between(&before, &self.selected)
    }

    /// Replaces the selection with exactly `rows`, regardless of mode.
    pub fn set_selected<I>(&mut self, rows: I) -> RowSelectionDelta
    where
        I: IntoIterator<Item = usize>,
    {
        let mut next = IndexRanges::new();
        for row in rows {
            next.add(row);
        }
        let before = std::mem::replace(&mut self.selected, next);
        RowSelectionDelta::between(&before, &self.selected)
    }

    /// Sets the state of individual rows, regardless of mode, leaving the
    /// current row and the anchor alone.
    pub fn update_rows<I>(&mut self, marks: I) -> RowSelectionDelta
    where
        I: IntoIterator<Item = (usize, bool)>,
    {
        let mut delta = RowSelectionDelta::default();
        for (row, selected) in marks {
            if selected {
                if self.selected.add(row) {
                    delta.selected.push(row);
                }
            } else if self.selected.remove(row) {
                delta.deselected.push(row);
            }
        }
        delta.selected.sort_unstable();
        delta.deselected.sort_unstable();
        delta
    }

    // =========================================================================
    // Structural updates
    // =========================================================================

    /// Shifts state for `count` rows inserted at `index`.
    pub fn insert_rows(&mut self, index: usize, count: usize) {
        self.selected.insert_gap(index, count);
        let shift = |row: usize| if row >= index { row + count } else { row };
        self.anchor = self.anchor.map(shift);
        self.current = self.current.map(shift);
    }

    /// Drops state for `count` rows removed at `index`. Returns the removed
    /// rows that were selected, in pre-removal numbering.
    pub fn remove_rows(&mut self, index: usize, count: usize) -> Vec<usize> {
        let removed = self.selected.remove_span(index, count);
        let shift = |row: usize| {
            if row < index {
                Some(row)
            } else if row < index + count {
                None
            } else {
                Some(row - count)
            }
        };
        self.anchor = self.anchor.and_then(shift);
        self.current = self.current.and_then(shift);
        removed
    }

    /// Forgets everything: selection, anchor and current row.
    pub fn reset(&mut self) -> RowSelectionDelta {
        self.anchor = None;
        self.current = None;
        self.clear()
    }
}
