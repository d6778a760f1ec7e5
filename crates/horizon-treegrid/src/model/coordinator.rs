//! Keeps the flat row selection and the path selection in agreement.
//!
//! Interaction code (pointer clicks, keyboard navigation) works in flat row
//! indices through [`SelectionCoordinator`]. Every change is pushed into the
//! [`TreeSelectionModel`] as path selects and deselects, so it survives
//! collapsing. In the other direction, rows entering the flat sequence are
//! looked up in the tree selection, and tree changes made by other means are
//! mapped onto the rows showing the affected paths. Only a reset of the
//! whole sequence re-derives every row.
//!
//! After every settled operation a visible row is selected in the flat
//! model exactly when its path is selected in the tree model.
//!
//! ```
//! use horizon_treegrid::TreeGridOptions;
//! use horizon_treegrid::model::{
//!     HierarchicalRows, ObservableList, SelectionCoordinator, TreeSelectionModel, TreeSource,
//! };
//! use horizon_treegrid::path;
//!
//! #[derive(Clone)]
//! struct Item(&'static str, ObservableList<Item>);
//!
//! let roots = ObservableList::new(vec![Item("a", ObservableList::new(vec![
//!     Item("a1", ObservableList::empty()),
//! ]))]);
//! let source = TreeSource::new(roots, |item: &Item| Some(item.1.clone()));
//! let rows = HierarchicalRows::new(source.clone());
//! let tree = TreeSelectionModel::new(source);
//! let coordinator = SelectionCoordinator::new(rows.clone(), tree.clone(), &TreeGridOptions::default());
//!
//! rows.expand(&path![0]);
//! coordinator.select_row(1);
//! assert!(tree.is_selected(&path![0, 0]));
//!
//! rows.collapse(&path![0]);
//! assert!(coordinator.selected_rows().is_empty());
//! assert!(tree.is_selected(&path![0, 0]));
//! ```

use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_treegrid_core::logging::targets;
use horizon_treegrid_core::{ConnectionId, Signal};
use parking_lot::Mutex;

use super::path::Path;
use super::row_selection::{RowSelectionDelta, RowSelectionModel, SelectionFlags, SelectionMode};
use super::rows::{HierarchicalRows, Row, RowsChangeReason, RowsChanged};
use super::selection::{SelectionChangeCause, TreeSelectionChanged, TreeSelectionModel};
use super::source::{CollectionChange, NodeModel};
use crate::config::TreeGridOptions;

struct Connections {
    rows_changed: ConnectionId,
    settled: ConnectionId,
    tree_changed: ConnectionId,
}

struct CoordinatorShared<M: NodeModel> {
    rows: HierarchicalRows<M>,
    tree: TreeSelectionModel<M>,
    flat: Mutex<RowSelectionModel>,
    remember_on_collapse: AtomicBool,
    /// Set while the coordinator itself writes to the tree selection.
    pushing: AtomicBool,
    /// A tree change arrived while the rows were mid-update and could not be
    /// mapped to rows; re-derive once they settle.
    stale: AtomicBool,
    selection_changed: Signal<RowSelectionDelta>,
    connections: Connections,
}

/// Bridges flat row selection and path selection.
///
/// Cloning yields another handle to the same coordinator. The coordinator
/// stops listening to the engines when its last handle is dropped.
pub struct SelectionCoordinator<M: NodeModel> {
    shared: Arc<CoordinatorShared<M>>,
}

impl<M: NodeModel> Clone for SelectionCoordinator<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<M: NodeModel> SelectionCoordinator<M> {
    /// Couples `rows` and `tree`, which must flatten and select over the
    /// same tree source.
    pub fn new(rows: HierarchicalRows<M>, tree: TreeSelectionModel<M>, options: &TreeGridOptions) -> Self {
        let mode = options.selection_mode;
        tree.set_single_select(!mode.is_multi());
        if mode == SelectionMode::NoSelection {
            tree.clear();
        }

        let shared = Arc::new_cyclic(|weak: &Weak<CoordinatorShared<M>>| {
            let connections = Connections {
                rows_changed: {
                    let weak = weak.clone();
                    rows.rows_changed().connect(move |change| {
                        if let Some(shared) = weak.upgrade() {
                            shared.on_rows_changed(change);
                        }
                    })
                },
                settled: {
                    let weak = weak.clone();
                    rows.settled().connect(move |_| {
                        if let Some(shared) = weak.upgrade()
                            && shared.stale.swap(false, Ordering::AcqRel)
                        {
                            shared.resync();
                        }
                    })
                },
                tree_changed: {
                    let weak = weak.clone();
                    tree.selection_changed().connect(move |change| {
                        if let Some(shared) = weak.upgrade() {
                            shared.on_tree_changed(change);
                        }
                    })
                },
            };
            CoordinatorShared {
                rows,
                tree,
                flat: Mutex::new(RowSelectionModel::new(mode)),
                remember_on_collapse: AtomicBool::new(options.remember_selection_on_collapse),
                pushing: AtomicBool::new(false),
                stale: AtomicBool::new(false),
                selection_changed: Signal::new(),
                connections,
            }
        });
        shared.resync();
        Self { shared }
    }

    /// Emitted with every change of the flat selection.
    ///
    /// Rows leaving the flat sequence drop out of the selection without a
    /// notification.
    pub fn selection_changed(&self) -> &Signal<RowSelectionDelta> {
        &self.shared.selection_changed
    }

    /// The flattening engine.
    pub fn rows(&self) -> &HierarchicalRows<M> {
        &self.shared.rows
    }

    /// The path selection.
    pub fn tree(&self) -> &TreeSelectionModel<M> {
        &self.shared.tree
    }

    /// The selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.shared.flat.lock().mode()
    }

    /// Switches the selection mode. Leaving a multi-select mode keeps one
    /// visible selected row at most; `NoSelection` clears everything.
    pub fn set_mode(&self, mode: SelectionMode) {
        let shared = &self.shared;
        let delta = shared.flat.lock().set_mode(mode);
        let selected = shared.flat.lock().selected_rows();
        shared.guarded(|| {
            let _batch = shared.tree.batch_update();
            shared.tree.set_single_select(!mode.is_multi());
            if !mode.is_multi() {
                shared.tree.clear();
                for row in &selected {
                    if let Some(path) = shared.rows.path_at(*row) {
                        shared.tree.select(&path);
                    }
                }
            }
        });
        tracing::debug!(target: targets::COORDINATOR, ?mode, "selection mode changed");
        shared.announce(delta);
    }

    /// Returns `true` if rows hidden by a collapse stay selected.
    pub fn remembers_selection_on_collapse(&self) -> bool {
        self.shared.remember_on_collapse.load(Ordering::Acquire)
    }

    /// Sets whether rows hidden by a collapse stay selected.
    pub fn set_remember_selection_on_collapse(&self, remember: bool) {
        self.shared.remember_on_collapse.store(remember, Ordering::Release);
    }

    /// Click on `row`: selects it alone (adds it in `Multiple` mode) and
    /// makes it the anchor. Returns `false` if `row` does not exist.
    pub fn select_row(&self, row: usize) -> bool {
        let flags = match self.mode() {
            SelectionMode::Multiple => SelectionFlags::SELECT,
            _ => SelectionFlags::CLEAR_AND_SELECT,
        }
        .with_anchor();
        self.apply(row, |flat| flat.select(row, flags), flags.clear)
    }

    /// Deselects `row`. Returns `false` if `row` does not exist.
    pub fn deselect_row(&self, row: usize) -> bool {
        self.apply(row, |flat| flat.select(row, SelectionFlags::DESELECT), false)
    }

    /// Ctrl+click on `row`: flips it and makes it the anchor.
    pub fn toggle_row(&self, row: usize) -> bool {
        let flags = SelectionFlags::TOGGLE.with_anchor();
        self.apply(row, |flat| flat.select(row, flags), false)
    }

    /// Shift+click on `row`: selects the run from the anchor to `row`. In
    /// `Extended` mode the run replaces the selection; in `Multiple` mode it
    /// is added. Without an anchor only `row` is selected.
    pub fn extend_to_row(&self, row: usize) -> bool {
        let count = self.shared.rows.row_count();
        let anchor = self
            .shared
            .flat
            .lock()
            .anchor()
            .filter(|&anchor| anchor < count)
            .unwrap_or(row);
        let (flags, clears) = match self.mode() {
            SelectionMode::Extended => (SelectionFlags::CLEAR, true),
            SelectionMode::Multiple => (SelectionFlags::SELECT, false),
            SelectionMode::Single | SelectionMode::NoSelection => (SelectionFlags::NONE, true),
        };
        self.apply(row, |flat| flat.select_range(anchor, row, flags), clears)
    }

    /// Selects every visible row. Does nothing unless the mode allows
    /// multiple selection.
    pub fn select_all_rows(&self) {
        let count = self.shared.rows.row_count();
        if count == 0 || !self.mode().is_multi() {
            return;
        }
        self.apply(0, |flat| flat.select_range(0, count - 1, SelectionFlags::SELECT), false);
    }

    /// Deselects everything, including rows hidden by collapses.
    pub fn clear(&self) {
        let shared = &self.shared;
        let delta = shared.flat.lock().clear();
        shared.guarded(|| shared.tree.clear());
        shared.announce(delta);
    }

    /// Returns `true` if the visible `row` is selected.
    pub fn is_row_selected(&self, row: usize) -> bool {
        self.shared.flat.lock().is_selected(row)
    }

    /// Selected visible rows, ascending.
    pub fn selected_rows(&self) -> Vec<usize> {
        self.shared.flat.lock().selected_rows()
    }

    /// The anchor row for [`extend_to_row`](Self::extend_to_row).
    pub fn anchor_row(&self) -> Option<usize> {
        self.shared.flat.lock().anchor()
    }

    /// The current (focused) row.
    pub fn current_row(&self) -> Option<usize> {
        self.shared.flat.lock().current()
    }

    fn apply<F>(&self, row: usize, op: F, clears_tree: bool) -> bool
    where
        F: FnOnce(&mut RowSelectionModel) -> RowSelectionDelta,
    {
        let shared = &self.shared;
        if row >= shared.rows.row_count() {
            tracing::warn!(target: targets::COORDINATOR, row, "selection of missing row ignored");
            return false;
        }
        let delta = op(&mut shared.flat.lock());
        shared.push_to_tree(&delta, clears_tree);
        shared.announce(delta);
        true
    }
}

impl<M: NodeModel> CoordinatorShared<M> {
    fn guarded<R>(&self, f: impl FnOnce() -> R) -> R {
        let outer = self.pushing.swap(true, Ordering::AcqRel);
        let result = f();
        self.pushing.store(outer, Ordering::Release);
        result
    }

    fn announce(&self, delta: RowSelectionDelta) {
        if !delta.is_empty() {
            self.selection_changed.emit(delta);
        }
    }

    /// Mirrors a flat change into the tree selection as one batch.
    fn push_to_tree(&self, delta: &RowSelectionDelta, clears_tree: bool) {
        if delta.is_empty() && !clears_tree {
            return;
        }
        tracing::trace!(
            target: targets::COORDINATOR,
            selected = delta.selected.len(),
            deselected = delta.deselected.len(),
            "pushing row selection to tree"
        );
        self.guarded(|| {
            let _batch = self.tree.batch_update();
            if clears_tree {
                self.tree.clear();
                let selected = self.flat.lock().selected_rows();
                for row in selected {
                    if let Some(path) = self.rows.path_at(row) {
                        self.tree.select(&path);
                    }
                }
                return;
            }
            for &row in &delta.deselected {
                if let Some(path) = self.rows.path_at(row) {
                    self.tree.deselect(&path);
                }
            }
            for &row in &delta.selected {
                if let Some(path) = self.rows.path_at(row) {
                    self.tree.select(&path);
                }
            }
        });
    }

    /// Re-derives the flat selection from every visible row's path.
    fn resync(&self) {
        if self.pushing.load(Ordering::Acquire) || self.rows.is_processing() {
            return;
        }
        let selected: Vec<usize> = self
            .rows
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| self.tree.is_selected(&row.path))
            .map(|(index, _)| index)
            .collect();
        let delta = self.flat.lock().set_selected(selected);
        if !delta.is_empty() {
            tracing::trace!(
                target: targets::COORDINATOR,
                selected = delta.selected.len(),
                deselected = delta.deselected.len(),
                "row selection re-derived"
            );
        }
        self.announce(delta);
    }

    /// Tree selection state of each row in a block starting at `start`.
    fn marks(&self, start: usize, rows: &[Row<M>]) -> Vec<(usize, bool)> {
        rows.iter()
            .enumerate()
            .map(|(offset, row)| (start + offset, self.tree.is_selected(&row.path)))
            .collect()
    }

    fn on_rows_changed(&self, change: &RowsChanged<M>) {
        let mut collapsed_parent = None;
        let delta = match &change.change {
            CollectionChange::Add { index, items } => {
                let marks = self.marks(*index, items);
                let mut flat = self.flat.lock();
                flat.insert_rows(*index, items.len());
                flat.update_rows(marks)
            }
            CollectionChange::Remove { index, items } => {
                self.flat.lock().remove_rows(*index, items.len());
                if change.reason == RowsChangeReason::Collapsed {
                    collapsed_parent = items.first().map(|first| first.path.parent());
                }
                RowSelectionDelta::default()
            }
            CollectionChange::Replace {
                index,
                old_items,
                new_items,
            } => {
                let marks = self.marks(*index, new_items);
                let mut flat = self.flat.lock();
                if old_items.len() != new_items.len() {
                    flat.remove_rows(*index, old_items.len());
                    flat.insert_rows(*index, new_items.len());
                }
                flat.update_rows(marks)
            }
            CollectionChange::Move {
                old_index,
                new_index,
                items,
            } => {
                let marks = self.marks(*new_index, items);
                let mut flat = self.flat.lock();
                flat.remove_rows(*old_index, items.len());
                flat.insert_rows(*new_index, items.len());
                flat.update_rows(marks)
            }
            CollectionChange::Reset { new_items, .. } => {
                let marks = self.marks(0, new_items);
                let mut flat = self.flat.lock();
                flat.reset();
                flat.update_rows(marks)
            }
        };
        self.announce(delta);

        if let Some(parent) = collapsed_parent
            && !self.remember_on_collapse.load(Ordering::Acquire)
        {
            self.forget_below(&parent);
        }
    }

    /// Maps a tree change made outside the coordinator onto visible rows.
    fn on_tree_changed(&self, change: &TreeSelectionChanged<M>) {
        if self.pushing.load(Ordering::Acquire) {
            return;
        }
        // Items gone from a source leave the flat sequence with their own
        // splice.
        if change.cause == SelectionChangeCause::SourceChanged {
            return;
        }
        if self.rows.is_processing() {
            self.stale.store(true, Ordering::Release);
            return;
        }
        let marks: Vec<(usize, bool)> = change
            .deselected_paths
            .iter()
            .map(|path| (path, false))
            .chain(change.selected_paths.iter().map(|path| (path, true)))
            .filter_map(|(path, selected)| Some((self.rows.index_of_path(path)?, selected)))
            .collect();
        let delta = self.flat.lock().update_rows(marks);
        self.announce(delta);
    }

    fn forget_below(&self, parent: &Path) {
        let hidden = self.tree.selected_below(parent);
        if hidden.is_empty() {
            return;
        }
        tracing::debug!(target: targets::COORDINATOR, %parent, count = hidden.len(), "forgetting collapsed selection");
        self.guarded(|| {
            let _batch = self.tree.batch_update();
            for path in &hidden {
                self.tree.deselect(path);
            }
        });
    }
}

impl<M: NodeModel> Drop for CoordinatorShared<M> {
    fn drop(&mut self) {
        self.rows.rows_changed().disconnect(self.connections.rows_changed);
        self.rows.settled().disconnect(self.connections.settled);
        self.tree.selection_changed().disconnect(self.connections.tree_changed);
    }
}

static_assertions::assert_impl_all!(SelectionCoordinator<String>: Send, Sync);
