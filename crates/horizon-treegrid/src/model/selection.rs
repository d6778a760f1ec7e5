//! Path-addressed selection over an expandable tree.
//!
//! [`TreeSelectionModel`] records which tree nodes are selected by their
//! [`Path`], independent of which rows are currently visible. Selection
//! therefore survives collapsing and re-expanding a subtree.
//!
//! Selected paths are stored in a [`RangeSet`]. For every parent path that
//! holds (or lies above) a selection, the model keeps a selection node
//! subscribed to that level's source list, so that insertions, removals,
//! replacements, moves and resets shift or drop the stored paths in place.
//! Nodes whose subtree no longer holds any selection are released.
//!
//! # Batches
//!
//! Every operation runs inside a batch. Batches nest; when the outermost
//! batch ends, the model compares the selection before and after and emits
//! at most one [`TreeSelectionChanged`] describing the difference. Repeating
//! a select inside a batch therefore never produces duplicate entries.
//!
//! ```
//! use horizon_treegrid::model::{ObservableList, TreeSelectionModel, TreeSource};
//! use horizon_treegrid::path;
//!
//! let roots = ObservableList::new(vec!["a", "b", "c"]);
//! let selection = TreeSelectionModel::new(TreeSource::new(roots, |_: &&str| None));
//! selection.set_single_select(false);
//!
//! selection.selection_changed().connect(|change| {
//!     assert_eq!(change.selected_paths.len(), 2);
//! });
//!
//! {
//!     let _batch = selection.batch_update();
//!     selection.select(&path![0]);
//!     selection.select(&path![2]);
//! }
//! assert_eq!(selection.selected_paths(), vec![path![0], path![2]]);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use horizon_treegrid_core::logging::targets;
use horizon_treegrid_core::{ChangeQueue, ConnectionId, Signal, SlotPriority};
use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use super::path::Path;
use super::range::RangeSet;
use super::source::{CollectionChange, NodeModel, ObservableList, TreeSource};
use crate::error::{Result, TreeError};

new_key_type! {
    /// Arena handle of a selection node.
    struct NodeKey;
}

/// What triggered a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionChangeCause {
    /// A call on the selection model.
    Api,
    /// A source list removed, replaced or reset selected items.
    SourceChanged,
}

/// The difference between two selection states.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSelectionChanged<M> {
    /// Paths that became selected, in enumeration order.
    pub selected_paths: Vec<Path>,
    /// Models of `selected_paths`, where they still resolve.
    pub selected_items: Vec<Option<M>>,
    /// Paths that stopped being selected.
    pub deselected_paths: Vec<Path>,
    /// Models of `deselected_paths`. For items removed from their source
    /// this is the removed model.
    pub deselected_items: Vec<Option<M>>,
    /// What triggered the change.
    pub cause: SelectionChangeCause,
}

/// Sibling indices under `parent` shifted by `delta` from `start` onwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexesChanged {
    /// The parent whose children moved.
    pub parent: Path,
    /// First affected sibling index, in pre-change numbering.
    pub start: usize,
    /// Signed shift applied to later siblings.
    pub delta: isize,
}

struct SelectionNode<M> {
    path: Path,
    list: ObservableList<M>,
    subscription: ConnectionId,
}

struct BatchRecord<M> {
    before: RangeSet,
    lost_paths: Vec<Path>,
    lost_items: Vec<Option<M>>,
}

enum Notice<M> {
    Indexes(IndexesChanged),
    Reset(Path),
    Selection(TreeSelectionChanged<M>),
}

struct SourceEvent<M> {
    node: NodeKey,
    change: CollectionChange<M>,
}

struct SelectionShared<M: NodeModel> {
    state: Mutex<SelectionState<M>>,
    source_changes: ChangeQueue<SourceEvent<M>>,
    selection_changed: Signal<TreeSelectionChanged<M>>,
    indexes_changed: Signal<IndexesChanged>,
    source_reset: Signal<Path>,
}

/// Path-addressed selection that follows source mutations.
///
/// Cloning yields another handle to the same model.
pub struct TreeSelectionModel<M: NodeModel> {
    shared: Arc<SelectionShared<M>>,
}

impl<M: NodeModel> Clone for TreeSelectionModel<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Ends a batch when dropped. Created by [`TreeSelectionModel::batch_update`].
#[must_use = "the batch ends as soon as the guard is dropped"]
pub struct BatchGuard<'a, M: NodeModel> {
    model: &'a TreeSelectionModel<M>,
}

impl<M: NodeModel> Drop for BatchGuard<'_, M> {
    fn drop(&mut self) {
        if let Err(err) = self.model.end_batch() {
            tracing::error!(target: targets::SELECTION, error = %err, "batch guard ended an unopened batch");
        }
    }
}

impl<M: NodeModel> TreeSelectionModel<M> {
    /// Creates an empty selection over `source`, in single-select mode.
    pub fn new(source: TreeSource<M>) -> Self {
        let shared = Arc::new_cyclic(|weak: &Weak<SelectionShared<M>>| SelectionShared {
            state: Mutex::new(SelectionState {
                shared: weak.clone(),
                source,
                single_select: true,
                selected: RangeSet::new(),
                nodes: SlotMap::with_key(),
                node_by_path: BTreeMap::new(),
                selected_path: None,
                anchor: None,
                batch_depth: 0,
                batch: None,
                outbox: Vec::new(),
            }),
            source_changes: ChangeQueue::new(),
            selection_changed: Signal::new(),
            indexes_changed: Signal::new(),
            source_reset: Signal::new(),
        });
        Self { shared }
    }

    /// Emitted once per committed batch that changed the selection.
    pub fn selection_changed(&self) -> &Signal<TreeSelectionChanged<M>> {
        &self.shared.selection_changed
    }

    /// Emitted when stored paths shift because a source list changed.
    pub fn indexes_changed(&self) -> &Signal<IndexesChanged> {
        &self.shared.indexes_changed
    }

    /// Emitted with the parent path of a level whose source list was reset.
    pub fn source_reset(&self) -> &Signal<Path> {
        &self.shared.source_reset
    }

    /// Returns `true` while a source change is being applied.
    pub fn is_processing_source_change(&self) -> bool {
        self.shared.source_changes.is_processing()
    }

    /// Returns `true` in single-select mode.
    pub fn is_single_select(&self) -> bool {
        self.shared.state.lock().single_select
    }

    /// Switches between single- and multi-select mode.
    ///
    /// Entering single-select mode keeps only the current selected path.
    pub fn set_single_select(&self, single: bool) {
        self.run(|state| {
            state.single_select = single;
            if single && state.selected.count() > 1 {
                let keep = state.selected_path.clone();
                state.clear();
                if let Some(path) = keep {
                    state.select(&path);
                }
            }
        });
    }

    /// Selects `path`. In single-select mode the previous selection is
    /// cleared first.
    ///
    /// Paths that do not resolve to a live node are ignored. Returns `true`
    /// if the path was newly selected.
    pub fn select(&self, path: &Path) -> bool {
        self.run(|state| {
            if state.single_select {
                state.clear();
            }
            state.select(path)
        })
    }

    /// Deselects `path`. Returns `false` if it was not selected.
    pub fn deselect(&self, path: &Path) -> bool {
        self.run(|state| state.deselect(path))
    }

    /// Flips the selection state of `path`. Returns the new state.
    pub fn toggle(&self, path: &Path) -> bool {
        self.run(|state| {
            if state.selected.contains(path) {
                state.deselect(path);
                false
            } else {
                if state.single_select {
                    state.clear();
                }
                state.select(path)
            }
        })
    }

    /// Selects the siblings from `from` to `to` (inclusive, either order).
    ///
    /// Both paths must share a parent; otherwise nothing happens. The run is
    /// clipped to the live sibling count. In single-select mode only `to` is
    /// selected. Returns how many paths were newly selected.
    pub fn select_range(&self, from: &Path, to: &Path) -> usize {
        self.run(|state| {
            if state.single_select {
                state.clear();
                return usize::from(state.select(to));
            }
            state.select_range(from, to)
        })
    }

    /// Deselects everything.
    pub fn clear(&self) {
        self.run(|state| state.clear());
    }

    /// Returns `true` if `path` is selected.
    pub fn is_selected(&self, path: &Path) -> bool {
        self.shared.state.lock().selected.contains(path)
    }

    /// Number of selected paths.
    pub fn count(&self) -> usize {
        self.shared.state.lock().selected.count()
    }

    /// Returns `true` if anything is selected.
    pub fn has_selection(&self) -> bool {
        !self.shared.state.lock().selected.is_empty()
    }

    /// Selected paths in parent-key order, then ascending sibling index.
    pub fn selected_paths(&self) -> Vec<Path> {
        self.shared.state.lock().selected.paths()
    }

    /// Selected paths strictly below `path`.
    pub fn selected_below(&self, path: &Path) -> Vec<Path> {
        self.shared.state.lock().selected.descendants_of(path)
    }

    /// Models of the selected paths, in [`selected_paths`](Self::selected_paths)
    /// order.
    pub fn selected_items(&self) -> Vec<Option<M>> {
        let state = self.shared.state.lock();
        state
            .selected
            .iter()
            .map(|path| state.source.model_at(&path))
            .collect()
    }

    /// The most recently selected path that is still selected.
    pub fn selected_path(&self) -> Option<Path> {
        self.shared.state.lock().selected_path.clone()
    }

    /// Replaces the whole selection with `path`, or clears it for `None`.
    ///
    /// Setting the path that is already the only selection emits nothing.
    pub fn set_selected_path(&self, path: Option<&Path>) {
        self.run(|state| {
            state.clear();
            if let Some(path) = path {
                state.select(path);
            }
        });
    }

    /// The anchor used for range extension.
    pub fn anchor_path(&self) -> Option<Path> {
        self.shared.state.lock().anchor.clone()
    }

    /// Sets (or with `None` clears) the anchor. Anchors follow source shifts
    /// like selected paths.
    ///
    /// A path that does not resolve to a live node is ignored and the
    /// previous anchor kept. Returns `true` if the anchor was set.
    pub fn set_anchor_path(&self, path: Option<&Path>) -> bool {
        self.run(|state| match path {
            Some(path) if !state.resolves(path) => {
                tracing::warn!(target: targets::SELECTION, %path, "anchor at unresolved path ignored");
                false
            }
            Some(path) => {
                state.ensure_nodes(path);
                state.anchor = Some(path.clone());
                true
            }
            None => {
                state.anchor = None;
                true
            }
        })
    }

    /// Opens a batch. Batches nest; only the outermost `end_batch` commits.
    pub fn begin_batch(&self) {
        self.shared.state.lock().begin();
    }

    /// Closes a batch, emitting the coalesced change when it is the
    /// outermost one.
    pub fn end_batch(&self) -> Result<()> {
        let notices = {
            let mut state = self.shared.state.lock();
            if state.batch_depth == 0 {
                return Err(TreeError::UnbalancedBatch);
            }
            state.end(SelectionChangeCause::Api);
            std::mem::take(&mut state.outbox)
        };
        self.shared.deliver(notices);
        Ok(())
    }

    /// Opens a batch that ends when the returned guard is dropped.
    pub fn batch_update(&self) -> BatchGuard<'_, M> {
        self.begin_batch();
        BatchGuard { model: self }
    }

    fn run<R, F>(&self, op: F) -> R
    where
        F: FnOnce(&mut SelectionState<M>) -> R,
    {
        let (result, notices) = {
            let mut state = self.shared.state.lock();
            state.begin();
            let result = op(&mut *state);
            state.end(SelectionChangeCause::Api);
            (result, std::mem::take(&mut state.outbox))
        };
        self.shared.deliver(notices);
        result
    }
}

impl<M: NodeModel> SelectionShared<M> {
    fn deliver(&self, notices: Vec<Notice<M>>) {
        for notice in notices {
            match notice {
                Notice::Indexes(change) => self.indexes_changed.emit(change),
                Notice::Reset(parent) => self.source_reset.emit(parent),
                Notice::Selection(change) => self.selection_changed.emit(change),
            }
        }
    }

    fn on_source_change(&self, node: NodeKey, change: CollectionChange<M>) {
        self.source_changes.push(SourceEvent { node, change });
        self.source_changes.drain(|event| {
            let notices = {
                let mut state = self.state.lock();
                state.begin();
                state.apply_source_change(event.node, event.change);
                state.end(SelectionChangeCause::SourceChanged);
                std::mem::take(&mut state.outbox)
            };
            self.deliver(notices);
        });
    }
}

struct SelectionState<M: NodeModel> {
    shared: Weak<SelectionShared<M>>,
    source: TreeSource<M>,
    single_select: bool,
    selected: RangeSet,
    nodes: SlotMap<NodeKey, SelectionNode<M>>,
    node_by_path: BTreeMap<Path, NodeKey>,
    selected_path: Option<Path>,
    anchor: Option<Path>,
    batch_depth: usize,
    batch: Option<BatchRecord<M>>,
    outbox: Vec<Notice<M>>,
}

impl<M: NodeModel> SelectionState<M> {
    fn begin(&mut self) {
        if self.batch_depth == 0 {
            self.batch = Some(BatchRecord {
                before: self.selected.clone(),
                lost_paths: Vec::new(),
                lost_items: Vec::new(),
            });
        }
        self.batch_depth += 1;
    }

    fn end(&mut self, cause: SelectionChangeCause) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth > 0 {
            return;
        }
        if let Some(batch) = self.batch.take() {
            self.commit(batch, cause);
        }
        self.collect_garbage();
    }

    #[tracing::instrument(skip_all, target = "horizon_treegrid::selection", level = "trace")]
    fn commit(&mut self, batch: BatchRecord<M>, cause: SelectionChangeCause) {
        if !batch.lost_paths.is_empty() {
            tracing::debug!(target: targets::SELECTION, lost = batch.lost_paths.len(), "selected items removed from source");
            self.outbox.push(Notice::Selection(TreeSelectionChanged {
                selected_paths: Vec::new(),
                selected_items: Vec::new(),
                deselected_paths: batch.lost_paths,
                deselected_items: batch.lost_items,
                cause: SelectionChangeCause::SourceChanged,
            }));
        }

        let deselected_paths: Vec<Path> = batch
            .before
            .iter()
            .filter(|path| !self.selected.contains(path))
            .collect();
        let selected_paths: Vec<Path> = self
            .selected
            .iter()
            .filter(|path| !batch.before.contains(path))
            .collect();
        if deselected_paths.is_empty() && selected_paths.is_empty() {
            return;
        }

        tracing::debug!(
            target: targets::SELECTION,
            selected = selected_paths.len(),
            deselected = deselected_paths.len(),
            "selection committed"
        );
        let selected_items = selected_paths
            .iter()
            .map(|path| self.source.model_at(path))
            .collect();
        let deselected_items = deselected_paths
            .iter()
            .map(|path| self.source.model_at(path))
            .collect();
        self.outbox.push(Notice::Selection(TreeSelectionChanged {
            selected_paths,
            selected_items,
            deselected_paths,
            deselected_items,
            cause,
        }));
    }

    /// Returns `true` if `path` addresses a live node.
    fn resolves(&self, path: &Path) -> bool {
        let Some(leaf) = path.leaf() else {
            return false;
        };
        self.source
            .list_at(&path.parent())
            .is_some_and(|list| leaf < list.len())
    }

    fn select(&mut self, path: &Path) -> bool {
        if !self.resolves(path) {
            tracing::warn!(target: targets::SELECTION, %path, "select of unresolved path ignored");
            return false;
        }
        self.ensure_nodes(path);
        let added = self.selected.add(path);
        self.selected_path = Some(path.clone());
        added
    }

    fn select_range(&mut self, from: &Path, to: &Path) -> usize {
        let parent = from.parent();
        let (Some(a), Some(b)) = (from.leaf(), to.leaf()) else {
            return 0;
        };
        if to.parent() != parent {
            tracing::warn!(target: targets::SELECTION, %from, %to, "range across parents ignored");
            return 0;
        }
        let Some(len) = self.source.list_at(&parent).map(|list| list.len()) else {
            return 0;
        };
        let begin = a.min(b);
        let end = a.max(b).min(len.saturating_sub(1));
        if len == 0 || begin > end {
            return 0;
        }
        self.ensure_nodes(&parent.with_child(begin));
        let added = self.selected.add_range(&parent, begin, end);
        if to.leaf().is_some_and(|leaf| leaf <= end) {
            self.selected_path = Some(to.clone());
        }
        added
    }

    fn deselect(&mut self, path: &Path) -> bool {
        let removed = self.selected.remove(path);
        if removed && self.selected_path.as_ref() == Some(path) {
            self.selected_path = self.selected.first();
        }
        removed
    }

    fn clear(&mut self) {
        self.selected.clear();
        self.selected_path = None;
    }

    /// Makes sure a node watches every level on the way to `path`.
    fn ensure_nodes(&mut self, path: &Path) {
        let mut prefix = Path::root();
        for depth in 0..path.len() {
            if !self.node_by_path.contains_key(&prefix) {
                let Some(list) = self.source.list_at(&prefix) else {
                    return;
                };
                let weak = self.shared.clone();
                let node_path = prefix.clone();
                let key = self.nodes.insert_with_key(|key| SelectionNode {
                    path: node_path,
                    subscription: subscribe(weak, &list, key),
                    list,
                });
                self.node_by_path.insert(prefix.clone(), key);
            }
            if let Some(index) = path.get(depth) {
                prefix.push(index);
            }
        }
    }

    fn node_needed(&self, path: &Path) -> bool {
        let below = |candidate: &Option<Path>| {
            candidate
                .as_ref()
                .is_some_and(|candidate| path.is_ancestor_of(candidate))
        };
        self.selected.has_descendants(path)
            || self
                .batch
                .as_ref()
                .is_some_and(|batch| batch.before.has_descendants(path))
            || below(&self.selected_path)
            || below(&self.anchor)
    }

    fn collect_garbage(&mut self) {
        let doomed: Vec<(Path, NodeKey)> = self
            .node_by_path
            .iter()
            .filter(|(path, _)| !self.node_needed(path))
            .map(|(path, key)| (path.clone(), *key))
            .collect();
        for (path, key) in doomed {
            self.node_by_path.remove(&path);
            self.dispose_node(key);
        }
    }

    fn dispose_node(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.remove(key) {
            node.list.changed().disconnect(node.subscription);
        }
    }

    /// Re-keys (or drops, when `adjust` yields `None`) the nodes strictly
    /// below `parent`.
    fn rekey_nodes<F>(&mut self, parent: &Path, adjust: F)
    where
        F: Fn(&Path) -> Option<Path>,
    {
        let affected: Vec<(Path, NodeKey)> = self
            .node_by_path
            .range(parent.clone()..)
            .take_while(|(path, _)| path.starts_with(parent))
            .filter(|(path, _)| path.len() > parent.len())
            .map(|(path, key)| (path.clone(), *key))
            .collect();
        for (path, _) in &affected {
            self.node_by_path.remove(path);
        }
        for (path, key) in affected {
            match adjust(&path) {
                Some(new_path) => {
                    if let Some(node) = self.nodes.get_mut(key) {
                        node.path = new_path.clone();
                    }
                    self.node_by_path.insert(new_path, key);
                }
                None => self.dispose_node(key),
            }
        }
    }

    fn adjust_scalars<F>(&mut self, adjust: F)
    where
        F: Fn(&Path) -> Option<Path>,
    {
        self.anchor = self.anchor.as_ref().and_then(&adjust);
        if let Some(path) = self.selected_path.take() {
            self.selected_path = adjust(&path).or_else(|| self.selected.first());
        }
    }

    /// Records removed paths that were selected when the batch opened.
    fn record_lost(&mut self, parent: &Path, index: usize, items: &[M], lost: Vec<Path>) {
        let models: Vec<Option<M>> = lost
            .iter()
            .map(|path| {
                let offset = path.get(parent.len())?.checked_sub(index)?;
                let model = items.get(offset)?;
                self.source
                    .descend(model, &path.components()[parent.len() + 1..])
            })
            .collect();
        if let Some(batch) = self.batch.as_mut() {
            batch.lost_paths.extend(lost);
            batch.lost_items.extend(models);
        }
    }

    #[tracing::instrument(skip_all, target = "horizon_treegrid::selection", level = "trace")]
    fn apply_source_change(&mut self, node: NodeKey, change: CollectionChange<M>) {
        let Some(parent) = self.nodes.get(node).map(|node| node.path.clone()) else {
            tracing::trace!(target: targets::SELECTION, "change for a released node ignored");
            return;
        };
        tracing::trace!(target: targets::SELECTION, %parent, kind = ?change.kind(), "adjusting selection");

        match change {
            CollectionChange::Add { index, items } => self.shift_insert(&parent, index, items.len()),
            CollectionChange::Remove { index, items } => self.shift_remove(&parent, index, &items),
            CollectionChange::Replace {
                index, old_items, ..
            } => self.detach(&parent, index, &old_items),
            CollectionChange::Move {
                old_index,
                new_index,
                items,
            } => {
                self.shift_remove(&parent, old_index, &items);
                self.shift_insert(&parent, new_index, items.len());
            }
            CollectionChange::Reset { old_items, .. } => self.reset_below(&parent, &old_items),
        }
    }

    fn shift_insert(&mut self, parent: &Path, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        self.selected.insert_gap(parent, index, count);
        if let Some(batch) = self.batch.as_mut() {
            batch.before.insert_gap(parent, index, count);
        }
        self.rekey_nodes(parent, |path| Some(path.adjusted_for_insert(parent, index, count)));
        self.adjust_scalars(|path| Some(path.adjusted_for_insert(parent, index, count)));
        self.outbox.push(Notice::Indexes(IndexesChanged {
            parent: parent.clone(),
            start: index,
            delta: count as isize,
        }));
    }

    fn shift_remove(&mut self, parent: &Path, index: usize, items: &[M]) {
        let count = items.len();
        if count == 0 {
            return;
        }
        self.selected.remove_span(parent, index, count);
        let lost = match self.batch.as_mut() {
            Some(batch) => batch.before.remove_span(parent, index, count),
            None => Vec::new(),
        };
        self.record_lost(parent, index, items, lost);
        self.rekey_nodes(parent, |path| path.adjusted_for_remove(parent, index, count));
        self.adjust_scalars(|path| path.adjusted_for_remove(parent, index, count));
        self.outbox.push(Notice::Indexes(IndexesChanged {
            parent: parent.clone(),
            start: index,
            delta: -(count as isize),
        }));
    }

    fn detach(&mut self, parent: &Path, index: usize, items: &[M]) {
        let count = items.len();
        if count == 0 {
            return;
        }
        self.selected.detach(parent, index, count);
        let lost = match self.batch.as_mut() {
            Some(batch) => batch.before.detach(parent, index, count),
            None => Vec::new(),
        };
        self.record_lost(parent, index, items, lost);
        let keep = |path: &Path| (!path.is_within(parent, index, count)).then(|| path.clone());
        self.rekey_nodes(parent, keep);
        self.adjust_scalars(keep);
    }

    fn reset_below(&mut self, parent: &Path, old_items: &[M]) {
        self.selected.clear_below(parent);
        let lost = match self.batch.as_mut() {
            Some(batch) => batch.before.clear_below(parent),
            None => Vec::new(),
        };
        self.record_lost(parent, 0, old_items, lost);
        let keep = |path: &Path| (!parent.is_ancestor_of(path)).then(|| path.clone());
        self.rekey_nodes(parent, keep);
        self.adjust_scalars(keep);
        tracing::debug!(target: targets::SELECTION, %parent, "selection level reset");
        self.outbox.push(Notice::Reset(parent.clone()));
    }
}

impl<M: NodeModel> Drop for SelectionState<M> {
    fn drop(&mut self) {
        for (_, node) in self.nodes.iter() {
            node.list.changed().disconnect(node.subscription);
        }
    }
}

fn subscribe<M: NodeModel>(
    shared: Weak<SelectionShared<M>>,
    list: &ObservableList<M>,
    node: NodeKey,
) -> ConnectionId {
    // Ahead of the row engines, so stored paths have shifted before a
    // listener of the flat splice selects by row.
    list.changed().connect_with_priority(
        move |change| {
            if let Some(shared) = shared.upgrade() {
                shared.on_source_change(node, change.clone());
            }
        },
        SlotPriority::High,
    )
}

static_assertions::assert_impl_all!(TreeSelectionModel<String>: Send, Sync);
