//! Flattening of an expandable tree into one list of visible rows.
//!
//! [`HierarchicalRows`] keeps the pre-order sequence of every visible node:
//! top-level nodes plus the children of expanded nodes, recursively. Each
//! visible node is a [`Row`] with its model, its current [`Path`] and its
//! expansion state.
//!
//! The engine subscribes to every list it displays. Additions, removals,
//! replacements, moves and resets at any depth are translated into splices
//! of the flat sequence and re-announced on [`HierarchicalRows::rows_changed`]
//! as [`RowsChanged`] notifications using flat row indices.
//!
//! # Architecture
//!
//! Visible nodes live in a [`SlotMap`] arena keyed by `RowKey`. Every
//! expanded node owns a `Level` holding its children in display order
//! ([`SortableRows`]) and the subscription to its child list. Subscriptions
//! capture the arena key of their level, never a path, so a notification
//! reaches the right level no matter how the tree shifted in between.
//!
//! All work is funneled through a [`ChangeQueue`]: a listener that reacts to
//! a row notification by expanding a row or mutating a source list has its
//! request handled after the current one completes.
//!
//! # Example
//!
//! ```
//! use horizon_treegrid::model::{HierarchicalRows, ObservableList, TreeSource};
//! use horizon_treegrid::path;
//!
//! #[derive(Clone)]
//! struct Folder {
//!     name: &'static str,
//!     children: ObservableList<Folder>,
//! }
//!
//! let docs = Folder { name: "docs", children: ObservableList::new(vec![
//!     Folder { name: "a.txt", children: ObservableList::empty() },
//! ]) };
//! let roots = ObservableList::new(vec![docs]);
//! let source = TreeSource::new(roots, |f: &Folder| Some(f.children.clone()));
//!
//! let rows = HierarchicalRows::new(source);
//! assert_eq!(rows.row_count(), 1);
//!
//! rows.expand(&path![0]);
//! assert_eq!(rows.row_count(), 2);
//! assert_eq!(rows.row(1).map(|r| r.model.name), Some("a.txt"));
//! ```

use std::sync::{Arc, Weak};

use horizon_treegrid_core::logging::{TreeStyle, format_outline, targets};
use horizon_treegrid_core::{ChangeQueue, ConnectionId, Signal};
use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use super::path::Path;
use super::sorting::{Comparator, SortableRows};
use super::source::{CollectionChange, NodeModel, ObservableList, TreeSource};
use crate::config::TreeGridOptions;
use crate::error::{Result, TreeError};

new_key_type! {
    /// Arena handle of a visible row.
    struct RowKey;
}

/// A snapshot of one visible row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<M> {
    /// The displayed model.
    pub model: M,
    /// The row's address in the tree at the time of the snapshot.
    pub path: Path,
    /// Whether the row's children are visible.
    pub is_expanded: bool,
    /// Whether an expander should be drawn for the row.
    pub show_expander: bool,
}

impl<M> Row<M> {
    /// Nesting depth; top-level rows are at depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.path.depth()
    }
}

/// Why the flat sequence changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowsChangeReason {
    /// A row was expanded and its descendants became visible.
    Expanded,
    /// A row was collapsed and its descendants were hidden.
    Collapsed,
    /// A source list changed.
    SourceChanged,
    /// The comparator changed and every level was re-sorted.
    Resorted,
}

/// A change of the flat row sequence.
///
/// Indices in `change` are flat row indices. Consecutive notifications
/// describe consecutive splices: each one applies to the sequence as left by
/// the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsChanged<M> {
    /// The splice, in flat row coordinates.
    pub change: CollectionChange<Row<M>>,
    /// What caused it.
    pub reason: RowsChangeReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expander {
    /// Children have not been resolved yet.
    Unknown,
    Available,
    Unavailable,
}

struct RowNode<M> {
    model: M,
    path: Path,
    parent: Option<RowKey>,
    /// Present while the row is expanded.
    children: Option<Level<M>>,
    /// Number of visible rows below this one.
    descendants: usize,
    expander: Expander,
}

struct Level<M> {
    id: u64,
    list: ObservableList<M>,
    subscription: ConnectionId,
    rows: SortableRows<RowKey, M>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelOwner {
    Root,
    Row(RowKey),
}

impl LevelOwner {
    fn key(self) -> Option<RowKey> {
        match self {
            LevelOwner::Root => None,
            LevelOwner::Row(key) => Some(key),
        }
    }
}

enum RowsCommand<M> {
    Source {
        owner: LevelOwner,
        level: u64,
        change: CollectionChange<M>,
    },
    Expand(Path),
    Collapse(Path),
    ExpandAll,
    CollapseAll,
    SetComparator(Option<Comparator<M>>),
}

struct RowsShared<M: NodeModel> {
    state: Mutex<RowsState<M>>,
    commands: ChangeQueue<RowsCommand<M>>,
    rows_changed: Signal<RowsChanged<M>>,
    settled: Signal<()>,
}

/// The flat, incrementally maintained view of an expandable tree.
///
/// Cloning yields another handle to the same engine.
pub struct HierarchicalRows<M: NodeModel> {
    shared: Arc<RowsShared<M>>,
}

impl<M: NodeModel> Clone for HierarchicalRows<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<M: NodeModel> HierarchicalRows<M> {
    /// Flattens `source` with default options. Only top-level rows are
    /// visible initially, plus rows the source marks as initially expanded.
    pub fn new(source: TreeSource<M>) -> Self {
        Self::with_options(source, &TreeGridOptions::default())
    }

    /// Flattens `source` using `options`.
    pub fn with_options(source: TreeSource<M>, options: &TreeGridOptions) -> Self {
        let show_expander_default = options.show_expander_before_expand;
        let shared = Arc::new_cyclic(|weak: &Weak<RowsShared<M>>| RowsShared {
            state: Mutex::new(RowsState::new(weak.clone(), source, show_expander_default)),
            commands: ChangeQueue::new(),
            rows_changed: Signal::new(),
            settled: Signal::new(),
        });
        Self { shared }
    }

    /// Emitted for every splice of the flat sequence.
    pub fn rows_changed(&self) -> &Signal<RowsChanged<M>> {
        &self.shared.rows_changed
    }

    /// Emitted once all pending work has been handled.
    pub fn settled(&self) -> &Signal<()> {
        &self.shared.settled
    }

    /// Returns `true` while the engine is handling a change.
    pub fn is_processing(&self) -> bool {
        self.shared.commands.is_processing()
    }

    /// The tree being flattened.
    pub fn source(&self) -> TreeSource<M> {
        self.shared.state.lock().source.clone()
    }

    /// Number of visible rows.
    pub fn row_count(&self) -> usize {
        self.shared.state.lock().flat.len()
    }

    /// The row at flat index `index`.
    pub fn row(&self, index: usize) -> Option<Row<M>> {
        let state = self.shared.state.lock();
        let key = *state.flat.get(index)?;
        Some(state.snapshot(key))
    }

    /// Every visible row, in display order.
    pub fn rows(&self) -> Vec<Row<M>> {
        let state = self.shared.state.lock();
        state.flat.iter().map(|&key| state.snapshot(key)).collect()
    }

    /// The model at flat index `index`.
    pub fn model_at(&self, index: usize) -> Option<M> {
        let state = self.shared.state.lock();
        let key = *state.flat.get(index)?;
        Some(state.nodes[key].model.clone())
    }

    /// The tree path of the row at flat index `index`.
    pub fn path_at(&self, index: usize) -> Option<Path> {
        let state = self.shared.state.lock();
        let key = *state.flat.get(index)?;
        Some(state.nodes[key].path.clone())
    }

    /// The flat index of the visible row at `path`.
    ///
    /// This scans the flat sequence; hidden or stale paths yield `None`.
    pub fn index_of_path(&self, path: &Path) -> Option<usize> {
        let state = self.shared.state.lock();
        state
            .flat
            .iter()
            .position(|&key| state.nodes[key].path == *path)
    }

    /// Returns `true` if the row at `path` is visible and expanded.
    pub fn is_expanded(&self, path: &Path) -> bool {
        let state = self.shared.state.lock();
        state
            .find_row(path)
            .is_some_and(|key| state.nodes[key].children.is_some())
    }

    /// Expands the row at `path`.
    ///
    /// Stale paths and rows without children are ignored. Returns `true` if
    /// the row is expanded once the call returns; a request made while the
    /// engine is busy is handled later and reports `false`.
    pub fn expand(&self, path: &Path) -> bool {
        self.shared.submit(RowsCommand::Expand(path.clone()));
        self.is_expanded(path)
    }

    /// Collapses the row at `path`. Stale paths are ignored.
    pub fn collapse(&self, path: &Path) {
        self.shared.submit(RowsCommand::Collapse(path.clone()));
    }

    /// Expands the row at `path` if it is collapsed and collapses it otherwise.
    pub fn toggle(&self, path: &Path) {
        if self.is_expanded(path) {
            self.collapse(path);
        } else {
            self.expand(path);
        }
    }

    /// Expands every row that has children, at every depth.
    pub fn expand_all(&self) {
        self.shared.submit(RowsCommand::ExpandAll);
    }

    /// Collapses every top-level row.
    pub fn collapse_all(&self) {
        self.shared.submit(RowsCommand::CollapseAll);
    }

    /// Installs (or removes, with `None`) the comparator that orders siblings.
    ///
    /// Every expanded level is re-sorted and the flat sequence is reported
    /// as reset. Levels expanded later are sorted when they open.
    pub fn set_comparator(&self, comparator: Option<Comparator<M>>) {
        self.shared.submit(RowsCommand::SetComparator(comparator));
    }

    /// Returns `true` if a comparator is installed.
    pub fn is_sorted(&self) -> bool {
        self.shared.state.lock().comparator.is_some()
    }

    /// Renders the visible rows as an indented outline.
    pub fn format_outline<F>(&self, style: TreeStyle, label: F) -> String
    where
        F: Fn(&M) -> String,
    {
        let state = self.shared.state.lock();
        let lines: Vec<(usize, String)> = state
            .flat
            .iter()
            .map(|&key| {
                let node = &state.nodes[key];
                (node.path.depth(), label(&node.model))
            })
            .collect();
        drop(state);
        format_outline(lines, style)
    }
}

impl<M: NodeModel> RowsShared<M> {
    fn submit(&self, command: RowsCommand<M>) {
        self.commands.push(command);
        self.pump();
    }

    fn pump(&self) {
        let drained = self.commands.drain(|command| {
            let events = self.state.lock().apply(command);
            match events {
                Ok(events) => {
                    for event in events {
                        self.rows_changed.emit(event);
                    }
                }
                Err(err) => {
                    tracing::error!(target: targets::ROWS, error = %err, "flat rows diverged from source");
                    panic!("{}", err);
                }
            }
        });
        if drained {
            self.settled.emit(());
        }
    }
}

struct RowsState<M: NodeModel> {
    shared: Weak<RowsShared<M>>,
    source: TreeSource<M>,
    comparator: Option<Comparator<M>>,
    nodes: SlotMap<RowKey, RowNode<M>>,
    root: Level<M>,
    flat: Vec<RowKey>,
    show_expander_default: bool,
    next_level_id: u64,
}

impl<M: NodeModel> RowsState<M> {
    fn new(shared: Weak<RowsShared<M>>, source: TreeSource<M>, show_expander_default: bool) -> Self {
        let list = source.roots().clone();
        let subscription = subscribe(&shared, &list, LevelOwner::Root, 0);
        let mut state = Self {
            shared,
            source,
            comparator: None,
            nodes: SlotMap::with_key(),
            root: Level {
                id: 0,
                list: list.clone(),
                subscription,
                rows: SortableRows::default(),
            },
            flat: Vec::new(),
            show_expander_default,
            next_level_id: 1,
        };
        let entries = state.create_children(list.to_vec(), &Path::root(), None);
        state.root.rows = SortableRows::new(entries, None);
        state.flat = state.collect_level(LevelOwner::Root);
        tracing::debug!(target: targets::ROWS, rows = state.flat.len(), "rows initialized");
        state
    }

    #[tracing::instrument(skip_all, target = "horizon_treegrid::rows", level = "trace")]
    fn apply(&mut self, command: RowsCommand<M>) -> Result<Vec<RowsChanged<M>>> {
        match command {
            RowsCommand::Source {
                owner,
                level,
                change,
            } => self.apply_source(owner, level, change),
            RowsCommand::Expand(path) => {
                let Some(key) = self.find_row(&path) else {
                    tracing::warn!(target: targets::ROWS, %path, "expand of stale path ignored");
                    return Ok(Vec::new());
                };
                Ok(self.expand_key(key).into_iter().collect())
            }
            RowsCommand::Collapse(path) => {
                let Some(key) = self.find_row(&path) else {
                    tracing::warn!(target: targets::ROWS, %path, "collapse of stale path ignored");
                    return Ok(Vec::new());
                };
                Ok(self.collapse_key(key).into_iter().collect())
            }
            RowsCommand::ExpandAll => {
                let mut events = Vec::new();
                let mut index = 0;
                // Rows inserted by an expansion land after `index` and are
                // visited by the same loop.
                while index < self.flat.len() {
                    let key = self.flat[index];
                    if self.nodes[key].expander != Expander::Unavailable {
                        events.extend(self.expand_key(key));
                    }
                    index += 1;
                }
                Ok(events)
            }
            RowsCommand::CollapseAll => {
                let keys: Vec<RowKey> = self.root.rows.keys().collect();
                Ok(keys
                    .into_iter()
                    .filter_map(|key| self.collapse_key(key))
                    .collect())
            }
            RowsCommand::SetComparator(comparator) => Ok(self.set_comparator(comparator)),
        }
    }

    fn snapshot(&self, key: RowKey) -> Row<M> {
        let node = &self.nodes[key];
        let show_expander = match node.expander {
            Expander::Available => true,
            Expander::Unavailable => false,
            Expander::Unknown => self.show_expander_default,
        };
        Row {
            model: node.model.clone(),
            path: node.path.clone(),
            is_expanded: node.children.is_some(),
            show_expander,
        }
    }

    fn snapshots(&self, keys: &[RowKey]) -> Vec<Row<M>> {
        keys.iter().map(|&key| self.snapshot(key)).collect()
    }

    fn level(&self, owner: LevelOwner) -> Option<&Level<M>> {
        match owner {
            LevelOwner::Root => Some(&self.root),
            LevelOwner::Row(key) => self.nodes.get(key)?.children.as_ref(),
        }
    }

    fn level_mut(&mut self, owner: LevelOwner) -> Option<&mut Level<M>> {
        match owner {
            LevelOwner::Root => Some(&mut self.root),
            LevelOwner::Row(key) => self.nodes.get_mut(key)?.children.as_mut(),
        }
    }

    fn owner_path(&self, owner: LevelOwner) -> Path {
        match owner {
            LevelOwner::Root => Path::root(),
            LevelOwner::Row(key) => self.nodes[key].path.clone(),
        }
    }

    /// Resolves a path to a visible row by matching source indices level by
    /// level.
    fn find_row(&self, path: &Path) -> Option<RowKey> {
        let (&last, parents) = path.components().split_last()?;
        let mut level = &self.root;
        for &index in parents {
            let key = level.rows.key_at(level.rows.position_of_source(index)?)?;
            level = self.nodes[key].children.as_ref()?;
        }
        level.rows.key_at(level.rows.position_of_source(last)?)
    }

    fn flat_index_of(&self, key: RowKey) -> Option<usize> {
        self.flat.iter().position(|&k| k == key)
    }

    /// Flat index of the display position `position` within `owner`'s level.
    fn flat_offset(&self, owner: LevelOwner, position: usize) -> Option<usize> {
        let start = match owner {
            LevelOwner::Root => 0,
            LevelOwner::Row(key) => self.flat_index_of(key)? + 1,
        };
        let level = self.level(owner)?;
        let preceding: usize = level.rows.entries()[..position]
            .iter()
            .map(|entry| 1 + self.nodes[entry.key].descendants)
            .sum();
        Some(start + preceding)
    }

    fn adjust_descendants(&mut self, from: Option<RowKey>, delta: isize) {
        let mut current = from;
        while let Some(key) = current {
            let node = &mut self.nodes[key];
            node.descendants = node.descendants.saturating_add_signed(delta);
            current = node.parent;
        }
    }

    fn next_level_id(&mut self) -> u64 {
        let id = self.next_level_id;
        self.next_level_id += 1;
        id
    }

    fn create_node(&mut self, model: M, path: Path, parent: Option<RowKey>) -> RowKey {
        let expander = match self.source.has_children(&model) {
            Some(true) => Expander::Available,
            Some(false) => Expander::Unavailable,
            None => Expander::Unknown,
        };
        let auto_expand = self.source.is_initially_expanded(&model);
        let key = self.nodes.insert(RowNode {
            model,
            path,
            parent,
            children: None,
            descendants: 0,
            expander,
        });
        if auto_expand {
            self.open_level(key);
        }
        key
    }

    fn create_children(
        &mut self,
        models: Vec<M>,
        parent_path: &Path,
        parent: Option<RowKey>,
    ) -> Vec<(RowKey, M)> {
        models
            .into_iter()
            .enumerate()
            .map(|(index, model)| {
                let key = self.create_node(model.clone(), parent_path.with_child(index), parent);
                (key, model)
            })
            .collect()
    }

    /// Resolves the children of `key` and materializes them. Does not touch
    /// the flat sequence or the ancestors' descendant counts.
    fn open_level(&mut self, key: RowKey) -> bool {
        let (model, path) = {
            let node = &self.nodes[key];
            (node.model.clone(), node.path.clone())
        };
        let Some(list) = self.source.children_of(&model) else {
            self.nodes[key].expander = Expander::Unavailable;
            return false;
        };
        let models = list.to_vec();
        if models.is_empty() {
            self.nodes[key].expander = Expander::Unavailable;
            return false;
        }

        let id = self.next_level_id();
        let subscription = subscribe(&self.shared, &list, LevelOwner::Row(key), id);
        let entries = self.create_children(models, &path, Some(key));
        let descendants: usize = entries
            .iter()
            .map(|(child, _)| 1 + self.nodes[*child].descendants)
            .sum();
        let rows = SortableRows::new(entries, self.comparator.as_ref());

        let node = &mut self.nodes[key];
        node.children = Some(Level {
            id,
            list,
            subscription,
            rows,
        });
        node.descendants = descendants;
        node.expander = Expander::Available;
        true
    }

    /// Pre-order keys of `key` and its visible descendants.
    fn collect_visible(&self, key: RowKey, out: &mut Vec<RowKey>) {
        out.push(key);
        if let Some(level) = &self.nodes[key].children {
            for child in level.rows.keys() {
                self.collect_visible(child, out);
            }
        }
    }

    fn collect_level(&self, owner: LevelOwner) -> Vec<RowKey> {
        let mut out = Vec::new();
        if let Some(level) = self.level(owner) {
            for key in level.rows.keys() {
                self.collect_visible(key, &mut out);
            }
        }
        out
    }

    /// Removes `key` and everything below it from the arena, dropping the
    /// subscriptions of its open levels.
    fn dispose_subtree(&mut self, key: RowKey) {
        let Some(node) = self.nodes.remove(key) else {
            return;
        };
        if let Some(level) = node.children {
            self.dispose_level(level);
        }
    }

    fn dispose_level(&mut self, level: Level<M>) {
        level.list.changed().disconnect(level.subscription);
        for child in level.rows.keys() {
            self.dispose_subtree(child);
        }
    }

    fn rewrite_component(&mut self, key: RowKey, depth: usize, value: usize) {
        let node = &mut self.nodes[key];
        node.path = node.path.with_component(depth, value);
        let children: Vec<RowKey> = match &node.children {
            Some(level) => level.rows.keys().collect(),
            None => return,
        };
        for child in children {
            self.rewrite_component(child, depth, value);
        }
    }

    fn expand_key(&mut self, key: RowKey) -> Option<RowsChanged<M>> {
        if self.nodes[key].children.is_some() {
            return None;
        }
        if !self.open_level(key) {
            tracing::debug!(target: targets::ROWS, path = %self.nodes[key].path, "row has no children to expand");
            return None;
        }
        let at = self.flat_index_of(key)? + 1;
        let block = self.collect_level(LevelOwner::Row(key));
        self.flat.splice(at..at, block.iter().copied());
        let parent = self.nodes[key].parent;
        self.adjust_descendants(parent, block.len() as isize);

        tracing::debug!(target: targets::ROWS, path = %self.nodes[key].path, rows = block.len(), "row expanded");
        Some(RowsChanged {
            change: CollectionChange::Add {
                index: at,
                items: self.snapshots(&block),
            },
            reason: RowsChangeReason::Expanded,
        })
    }

    fn collapse_key(&mut self, key: RowKey) -> Option<RowsChanged<M>> {
        self.nodes[key].children.as_ref()?;
        let at = self.flat_index_of(key)? + 1;
        let count = self.nodes[key].descendants;
        let removed: Vec<RowKey> = self.flat.drain(at..at + count).collect();
        let items = self.snapshots(&removed);

        let node = &mut self.nodes[key];
        let level = node.children.take();
        node.descendants = 0;
        let parent = node.parent;
        if let Some(level) = level {
            self.dispose_level(level);
        }
        self.adjust_descendants(parent, -(count as isize));

        tracing::debug!(target: targets::ROWS, path = %self.nodes[key].path, rows = count, "row collapsed");
        Some(RowsChanged {
            change: CollectionChange::Remove { index: at, items },
            reason: RowsChangeReason::Collapsed,
        })
    }

    fn set_comparator(&mut self, comparator: Option<Comparator<M>>) -> Vec<RowsChanged<M>> {
        let old_items = self.snapshots(&self.flat);
        self.comparator = comparator;
        let comparator = self.comparator.clone();

        self.root.rows.resort(comparator.as_ref());
        let expanded: Vec<RowKey> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.children.is_some())
            .map(|(key, _)| key)
            .collect();
        for key in expanded {
            if let Some(level) = self.nodes[key].children.as_mut() {
                level.rows.resort(comparator.as_ref());
            }
        }

        self.flat = self.collect_level(LevelOwner::Root);
        tracing::debug!(target: targets::ROWS, sorted = comparator.is_some(), "rows re-sorted");
        vec![RowsChanged {
            change: CollectionChange::Reset {
                old_items,
                new_items: self.snapshots(&self.flat),
            },
            reason: RowsChangeReason::Resorted,
        }]
    }

    fn apply_source(
        &mut self,
        owner: LevelOwner,
        level_id: u64,
        change: CollectionChange<M>,
    ) -> Result<Vec<RowsChanged<M>>> {
        if self.level(owner).map(|level| level.id) != Some(level_id) {
            tracing::trace!(target: targets::ROWS, "change for a closed level ignored");
            return Ok(Vec::new());
        }
        tracing::trace!(target: targets::ROWS, kind = ?change.kind(), "translating source change");

        let mut events = Vec::new();
        match change {
            CollectionChange::Add { index, items } => {
                self.insert_children(owner, index, items, &mut events)?;
            }
            CollectionChange::Remove { index, items } => {
                self.remove_children(owner, index, items.len(), &mut events)?;
            }
            CollectionChange::Replace {
                index,
                old_items,
                new_items,
            } => {
                if !self.replace_single(owner, index, &old_items, &new_items, &mut events)? {
                    self.remove_children(owner, index, old_items.len(), &mut events)?;
                    self.insert_children(owner, index, new_items, &mut events)?;
                }
            }
            CollectionChange::Move {
                old_index,
                new_index,
                items,
            } => {
                self.remove_children(owner, old_index, items.len(), &mut events)?;
                self.insert_children(owner, new_index, items, &mut events)?;
            }
            CollectionChange::Reset { new_items, .. } => {
                self.reset_level(owner, new_items, &mut events);
            }
        }
        events.extend(self.close_if_empty(owner));
        Ok(events)
    }

    /// Collapses a row whose child list became empty, leaving it without an
    /// expander. Reports the row's own state change as a one-row replace.
    fn close_if_empty(&mut self, owner: LevelOwner) -> Option<RowsChanged<M>> {
        let LevelOwner::Row(key) = owner else {
            return None;
        };
        if !self.nodes.get(key)?.children.as_ref()?.rows.is_empty() {
            return None;
        }
        let at = self.flat_index_of(key)?;
        let old_row = self.snapshot(key);
        let node = &mut self.nodes[key];
        let level = node.children.take();
        node.expander = Expander::Unavailable;
        if let Some(level) = level {
            self.dispose_level(level);
        }

        tracing::debug!(target: targets::ROWS, path = %old_row.path, "row lost its last child");
        Some(RowsChanged {
            change: CollectionChange::Replace {
                index: at,
                old_items: vec![old_row],
                new_items: vec![self.snapshot(key)],
            },
            reason: RowsChangeReason::SourceChanged,
        })
    }

    fn insert_children(
        &mut self,
        owner: LevelOwner,
        index: usize,
        models: Vec<M>,
        events: &mut Vec<RowsChanged<M>>,
    ) -> Result<()> {
        let count = models.len();
        let len = self.level(owner).map_or(0, |level| level.rows.len());
        if index > len {
            return Err(TreeError::unsupported(format!(
                "insert at {} into a level of {} rows",
                index, len
            )));
        }
        if count == 0 {
            return Ok(());
        }

        let parent_path = self.owner_path(owner);
        let depth = parent_path.len();
        let comparator = self.comparator.clone();
        let shifted = match self.level_mut(owner) {
            Some(level) => level.rows.shift_sources(index, count as isize),
            None => Vec::new(),
        };
        for (key, source_index) in shifted {
            self.rewrite_component(key, depth, source_index);
        }

        let mut blocks: Vec<(usize, Vec<RowKey>)> = Vec::new();
        for (offset, model) in models.into_iter().enumerate() {
            let source_index = index + offset;
            let key = self.create_node(model.clone(), parent_path.with_child(source_index), owner.key());
            let position = match self.level_mut(owner) {
                Some(level) => level.rows.insert(source_index, key, model, comparator.as_ref()),
                None => continue,
            };
            let Some(at) = self.flat_offset(owner, position) else {
                continue;
            };
            let mut block = Vec::new();
            self.collect_visible(key, &mut block);
            self.flat.splice(at..at, block.iter().copied());
            self.adjust_descendants(owner.key(), block.len() as isize);

            let contiguous = blocks
                .last()
                .is_some_and(|(start, keys)| start + keys.len() == at);
            match blocks.last_mut() {
                Some((_, keys)) if contiguous => keys.extend(block),
                _ => blocks.push((at, block)),
            }
        }

        for (at, keys) in blocks {
            events.push(RowsChanged {
                change: CollectionChange::Add {
                    index: at,
                    items: self.snapshots(&keys),
                },
                reason: RowsChangeReason::SourceChanged,
            });
        }
        Ok(())
    }

    fn remove_children(
        &mut self,
        owner: LevelOwner,
        index: usize,
        count: usize,
        events: &mut Vec<RowsChanged<M>>,
    ) -> Result<()> {
        let len = self.level(owner).map_or(0, |level| level.rows.len());
        if index + count > len {
            return Err(TreeError::unsupported(format!(
                "remove of {}..{} from a level of {} rows",
                index,
                index + count,
                len
            )));
        }
        if count == 0 {
            return Ok(());
        }

        // Highest source index first, so earlier flat offsets stay valid.
        let mut pending: Option<(usize, Vec<Row<M>>)> = None;
        for source_index in (index..index + count).rev() {
            let Some(level) = self.level(owner) else {
                break;
            };
            let Some(position) = level.rows.position_of_source(source_index) else {
                return Err(TreeError::unsupported(format!(
                    "source index {} is not displayed",
                    source_index
                )));
            };
            let at = self
                .flat_offset(owner, position)
                .ok_or_else(|| TreeError::unsupported("level is not visible"))?;
            let key = match self.level_mut(owner) {
                Some(level) => level.rows.remove_at(position).key,
                None => break,
            };

            let size = 1 + self.nodes[key].descendants;
            let removed: Vec<RowKey> = self.flat.drain(at..at + size).collect();
            let mut items = self.snapshots(&removed);
            self.dispose_subtree(key);
            self.adjust_descendants(owner.key(), -(size as isize));

            pending = match pending.take() {
                Some((start, later)) if at + size == start => {
                    items.extend(later);
                    Some((at, items))
                }
                Some((start, later)) => {
                    events.push(remove_event(start, later));
                    Some((at, items))
                }
                None => Some((at, items)),
            };
        }
        if let Some((start, items)) = pending {
            events.push(remove_event(start, items));
        }

        let depth = self.owner_path(owner).len();
        let shifted = match self.level_mut(owner) {
            Some(level) => level.rows.shift_sources(index + count, -(count as isize)),
            None => Vec::new(),
        };
        for (key, source_index) in shifted {
            self.rewrite_component(key, depth, source_index);
        }
        Ok(())
    }

    /// Swaps the model of one collapsed row in an unsorted level in place.
    ///
    /// Returns `false` when the replacement has to be handled as a removal
    /// followed by an insertion.
    fn replace_single(
        &mut self,
        owner: LevelOwner,
        index: usize,
        old_items: &[M],
        new_items: &[M],
        events: &mut Vec<RowsChanged<M>>,
    ) -> Result<bool> {
        if old_items.len() != 1 || new_items.len() != 1 || self.comparator.is_some() {
            return Ok(false);
        }
        let Some(level) = self.level(owner) else {
            return Ok(false);
        };
        let Some(position) = level.rows.position_of_source(index) else {
            return Err(TreeError::unsupported(format!(
                "replace at {} in a level of {} rows",
                index,
                level.rows.len()
            )));
        };
        let Some(old_key) = level.rows.key_at(position) else {
            return Ok(false);
        };
        if self.nodes[old_key].children.is_some() || self.source.is_initially_expanded(&new_items[0]) {
            return Ok(false);
        }
        let Some(at) = self.flat_offset(owner, position) else {
            return Ok(false);
        };

        let old_row = self.snapshot(old_key);
        let path = self.nodes[old_key].path.clone();
        self.dispose_subtree(old_key);
        let new_key = self.create_node(new_items[0].clone(), path, owner.key());
        if let Some(level) = self.level_mut(owner) {
            level.rows.remove_at(position);
            level
                .rows
                .insert(index, new_key, new_items[0].clone(), None);
        }
        self.flat[at] = new_key;

        events.push(RowsChanged {
            change: CollectionChange::Replace {
                index: at,
                old_items: vec![old_row],
                new_items: vec![self.snapshot(new_key)],
            },
            reason: RowsChangeReason::SourceChanged,
        });
        Ok(true)
    }

    /// Rebuilds a level from scratch after its list was reset.
    fn reset_level(&mut self, owner: LevelOwner, models: Vec<M>, events: &mut Vec<RowsChanged<M>>) {
        let Some(start) = self.flat_offset(owner, 0) else {
            return;
        };
        let old_count = match owner {
            LevelOwner::Root => self.flat.len(),
            LevelOwner::Row(key) => self.nodes[key].descendants,
        };
        let removed: Vec<RowKey> = self.flat.drain(start..start + old_count).collect();
        let old_items = self.snapshots(&removed);
        let old_keys: Vec<RowKey> = match self.level_mut(owner) {
            Some(level) => level.rows.take_all().into_iter().map(|entry| entry.key).collect(),
            None => Vec::new(),
        };
        for key in old_keys {
            self.dispose_subtree(key);
        }
        self.adjust_descendants(owner.key(), -(old_count as isize));

        let parent_path = self.owner_path(owner);
        let entries = self.create_children(models, &parent_path, owner.key());
        let rows = SortableRows::new(entries, self.comparator.as_ref());
        if let Some(level) = self.level_mut(owner) {
            level.rows = rows;
        }
        let block = self.collect_level(owner);
        self.flat.splice(start..start, block.iter().copied());
        self.adjust_descendants(owner.key(), block.len() as isize);
        let new_items = self.snapshots(&block);

        tracing::debug!(target: targets::ROWS, parent = %parent_path, rows = block.len(), "level reset");
        match owner {
            LevelOwner::Root => events.push(RowsChanged {
                change: CollectionChange::Reset {
                    old_items,
                    new_items,
                },
                reason: RowsChangeReason::SourceChanged,
            }),
            LevelOwner::Row(_) => {
                if !old_items.is_empty() {
                    events.push(remove_event(start, old_items));
                }
                if !new_items.is_empty() {
                    events.push(RowsChanged {
                        change: CollectionChange::Add {
                            index: start,
                            items: new_items,
                        },
                        reason: RowsChangeReason::SourceChanged,
                    });
                }
            }
        }
    }
}

impl<M: NodeModel> Drop for RowsState<M> {
    fn drop(&mut self) {
        self.root.list.changed().disconnect(self.root.subscription);
        for (_, node) in self.nodes.iter() {
            if let Some(level) = &node.children {
                level.list.changed().disconnect(level.subscription);
            }
        }
    }
}

fn remove_event<M>(index: usize, items: Vec<Row<M>>) -> RowsChanged<M> {
    RowsChanged {
        change: CollectionChange::Remove { index, items },
        reason: RowsChangeReason::SourceChanged,
    }
}

/// Routes changes of `list` to the level identified by `owner` and `level`.
fn subscribe<M: NodeModel>(
    shared: &Weak<RowsShared<M>>,
    list: &ObservableList<M>,
    owner: LevelOwner,
    level: u64,
) -> ConnectionId {
    let weak = shared.clone();
    list.changed().connect(move |change| {
        if let Some(shared) = weak.upgrade() {
            shared.submit(RowsCommand::Source {
                owner,
                level,
                change: change.clone(),
            });
        }
    })
}

static_assertions::assert_impl_all!(HierarchicalRows<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_tree::{Node, children_at, grid, source_of};
    use crate::path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn names(rows: &HierarchicalRows<Node>) -> Vec<String> {
        rows.rows().into_iter().map(|row| row.model.name).collect()
    }

    fn recorder(rows: &HierarchicalRows<Node>) -> Arc<Mutex<Vec<RowsChanged<Node>>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        rows.rows_changed().connect(move |event| {
            events_clone.lock().push(event.clone());
        });
        events
    }

    #[test]
    fn test_initial_rows_are_top_level() {
        let roots = grid(3, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        assert_eq!(names(&rows), vec!["r0", "r1", "r2"]);
        assert_eq!(rows.path_at(2), Some(path![2]));
        assert!(rows.row(0).is_some_and(|row| row.show_expander && !row.is_expanded));
    }

    #[test]
    fn test_expand_inserts_children_after_parent() {
        let roots = grid(5, 5);
        let rows = HierarchicalRows::new(source_of(&roots));
        let events = recorder(&rows);

        assert!(rows.expand(&path![0]));
        assert_eq!(rows.row_count(), 10);
        assert_eq!(
            names(&rows)[1..6],
            ["r0.c0", "r0.c1", "r0.c2", "r0.c3", "r0.c4"]
        );
        assert_eq!(rows.path_at(3), Some(path![0, 2]));

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, RowsChangeReason::Expanded);
        assert!(matches!(&events[0].change, CollectionChange::Add { index: 1, items } if items.len() == 5));
    }

    #[test]
    fn test_collapse_removes_descendants() {
        let roots = grid(2, 3);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        rows.expand(&path![1]);
        let events = recorder(&rows);

        rows.collapse(&path![0]);
        assert_eq!(names(&rows), vec!["r0", "r1", "r1.c0", "r1.c1", "r1.c2"]);
        assert!(!rows.is_expanded(&path![0]));
        let events = events.lock();
        assert!(matches!(&events[0].change, CollectionChange::Remove { index: 1, items } if items.len() == 3));
        assert_eq!(events[0].reason, RowsChangeReason::Collapsed);
    }

    #[test]
    fn test_collapse_disconnects_child_list() {
        let roots = grid(1, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        let children = children_at(&roots, &[0]);
        rows.expand(&path![0]);
        assert_eq!(children.changed().connection_count(), 1);
        rows.collapse(&path![0]);
        assert_eq!(children.changed().connection_count(), 0);
    }

    #[test]
    fn test_expand_stale_path_is_noop() {
        let roots = grid(2, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        assert!(!rows.expand(&path![7]));
        assert!(!rows.expand(&path![0, 1]));
        rows.collapse(&path![3, 3]);
        assert_eq!(rows.row_count(), 2);
    }

    #[test]
    fn test_expand_without_children_hides_expander() {
        let roots = ObservableList::new(vec![Node::leaf("solo")]);
        let rows = HierarchicalRows::new(source_of(&roots));
        assert!(!rows.expand(&path![0]));
        let row = rows.row(0).unwrap();
        assert!(!row.is_expanded);
        assert!(!row.show_expander);
    }

    #[test]
    fn test_nested_insert_shifts_paths() {
        let roots = grid(2, 3);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        rows.expand(&path![1]);
        let events = recorder(&rows);

        children_at(&roots, &[0]).insert(1, Node::leaf("new"));
        assert_eq!(
            names(&rows),
            vec!["r0", "r0.c0", "new", "r0.c1", "r0.c2", "r1", "r1.c0", "r1.c1", "r1.c2"]
        );
        assert_eq!(rows.path_at(3), Some(path![0, 2]));
        assert_eq!(rows.path_at(4), Some(path![0, 3]));
        assert_eq!(rows.path_at(6), Some(path![1, 0]));

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0].change, CollectionChange::Add { index: 2, items } if items.len() == 1));
    }

    #[test]
    fn test_root_insert_skips_expanded_subtrees() {
        let roots = grid(2, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        rows.expand(&path![0, 1]);

        roots.insert(1, Node::leaf("mid"));
        assert_eq!(names(&rows), vec!["r0", "r0.c0", "r0.c1", "mid", "r1"]);
        assert_eq!(rows.path_at(4), Some(path![2]));
    }

    #[test]
    fn test_remove_reports_whole_subtree() {
        let roots = grid(3, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![1]);
        let events = recorder(&rows);

        roots.remove(1);
        assert_eq!(names(&rows), vec!["r0", "r2"]);
        assert_eq!(rows.path_at(1), Some(path![1]));
        let events = events.lock();
        assert_eq!(events.len(), 1);
        match &events[0].change {
            CollectionChange::Remove { index, items } => {
                assert_eq!(*index, 1);
                let paths: Vec<Path> = items.iter().map(|row| row.path.clone()).collect();
                assert_eq!(paths, vec![path![1], path![1, 0], path![1, 1]]);
            }
            other => panic!("unexpected change {:?}", other.kind()),
        }
    }

    #[test]
    fn test_remove_range_coalesces_into_one_event() {
        let roots = grid(5, 0);
        let rows = HierarchicalRows::new(source_of(&roots));
        let events = recorder(&rows);
        roots.remove_range(1, 3);
        assert_eq!(names(&rows), vec!["r0", "r4"]);
        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0].change, CollectionChange::Remove { index: 1, items } if items.len() == 3));
    }

    #[test]
    fn test_replace_single_row() {
        let roots = grid(3, 0);
        let rows = HierarchicalRows::new(source_of(&roots));
        let events = recorder(&rows);
        roots.replace(1, Node::leaf("swapped"));
        assert_eq!(names(&rows), vec!["r0", "swapped", "r2"]);
        assert!(matches!(events.lock()[0].change, CollectionChange::Replace { index: 1, .. }));
    }

    #[test]
    fn test_replace_expanded_row_collapses_it() {
        let roots = grid(2, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        roots.replace(0, Node::leaf("plain"));
        assert_eq!(names(&rows), vec!["plain", "r1"]);
    }

    #[test]
    fn test_move_is_remove_then_add() {
        let roots = grid(3, 1);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        let events = recorder(&rows);

        roots.move_item(0, 2);
        assert_eq!(names(&rows), vec!["r1", "r2", "r0"]);
        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].change, CollectionChange::Remove { index: 0, .. }));
        assert!(matches!(events[1].change, CollectionChange::Add { index: 2, .. }));
    }

    #[test]
    fn test_nested_reset_rebuilds_block() {
        let roots = grid(2, 3);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        rows.expand(&path![1]);
        let events = recorder(&rows);

        children_at(&roots, &[0]).set_items(vec![Node::leaf("x"), Node::leaf("y")]);
        assert_eq!(
            names(&rows),
            vec!["r0", "x", "y", "r1", "r1.c0", "r1.c1", "r1.c2"]
        );
        let kinds: Vec<_> = events.lock().iter().map(|e| e.change.kind()).collect();
        assert_eq!(kinds, vec![crate::model::ChangeKind::Remove, crate::model::ChangeKind::Add]);
    }

    #[test]
    fn test_emptied_level_closes_row() {
        let roots = grid(2, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        let children = children_at(&roots, &[0]);
        rows.expand(&path![0]);
        let events = recorder(&rows);

        children.clear();
        assert_eq!(names(&rows), vec!["r0", "r1"]);
        let row = rows.row(0).unwrap();
        assert!(!row.is_expanded);
        assert!(!row.show_expander);
        assert_eq!(children.changed().connection_count(), 0);

        let events = events.lock();
        let kinds: Vec<_> = events.iter().map(|e| e.change.kind()).collect();
        assert_eq!(kinds, vec![crate::model::ChangeKind::Remove, crate::model::ChangeKind::Replace]);
        assert!(matches!(&events[1].change, CollectionChange::Replace { index: 0, new_items, .. } if !new_items[0].is_expanded));
    }

    #[test]
    fn test_removing_last_child_closes_row() {
        let roots = grid(2, 1);
        let rows = HierarchicalRows::new(source_of(&roots));
        let children = children_at(&roots, &[1]);
        rows.expand(&path![1]);
        assert_eq!(rows.row_count(), 3);

        children.remove(0);
        assert_eq!(names(&rows), vec!["r0", "r1"]);
        assert!(!rows.is_expanded(&path![1]));
        assert!(!rows.row(1).unwrap().show_expander);

        children.push(Node::leaf("back"));
        assert_eq!(rows.row_count(), 2);
        assert!(rows.expand(&path![1]));
        assert_eq!(names(&rows), vec!["r0", "r1", "back"]);
    }

    #[test]
    fn test_root_reset_emits_reset() {
        let roots = grid(2, 1);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        let events = recorder(&rows);
        roots.set_items(vec![Node::leaf("only")]);
        assert_eq!(names(&rows), vec!["only"]);
        assert!(matches!(events.lock()[0].change, CollectionChange::Reset { .. }));
    }

    #[test]
    fn test_comparator_sorts_every_level() {
        let roots = ObservableList::new(vec![
            Node::with_children("b", vec![Node::leaf("b2"), Node::leaf("b1")]),
            Node::leaf("a"),
        ]);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        let events = recorder(&rows);

        rows.set_comparator(Some(Arc::new(|x: &Node, y: &Node| x.name.cmp(&y.name))));
        assert_eq!(names(&rows), vec!["a", "b", "b1", "b2"]);
        // Paths keep addressing source positions.
        assert_eq!(rows.path_at(2), Some(path![0, 1]));
        assert_eq!(events.lock()[0].reason, RowsChangeReason::Resorted);

        roots.push(Node::leaf("aa"));
        assert_eq!(names(&rows), vec!["a", "aa", "b", "b1", "b2"]);

        rows.set_comparator(None);
        assert_eq!(names(&rows), vec!["b", "b2", "b1", "a", "aa"]);
    }

    #[test]
    fn test_initially_expanded_predicate() {
        let roots = grid(2, 2);
        let source = source_of(&roots).with_initially_expanded(|node: &Node| node.name == "r1");
        let rows = HierarchicalRows::new(source);
        assert_eq!(names(&rows), vec!["r0", "r1", "r1.c0", "r1.c1"]);

        roots.push(Node::with_children("r1", vec![Node::leaf("again")]));
        assert_eq!(names(&rows)[4..], ["r1", "again"]);
    }

    #[test]
    fn test_expand_all_and_collapse_all() {
        let roots = ObservableList::new(vec![Node::with_children(
            "a",
            vec![Node::with_children("b", vec![Node::leaf("c")])],
        )]);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand_all();
        assert_eq!(names(&rows), vec!["a", "b", "c"]);
        rows.collapse_all();
        assert_eq!(names(&rows), vec!["a"]);
    }

    #[test]
    fn test_has_children_hint_controls_expander() {
        let roots = grid(2, 0);
        let source = source_of(&roots).with_has_children(|node: &Node| node.name == "r0");
        let rows = HierarchicalRows::new(source);
        assert!(rows.row(0).unwrap().show_expander);
        assert!(!rows.row(1).unwrap().show_expander);
    }

    #[test]
    fn test_expander_default_from_options() {
        let roots = grid(1, 0);
        let options = TreeGridOptions {
            show_expander_before_expand: false,
            ..TreeGridOptions::default()
        };
        let rows = HierarchicalRows::with_options(source_of(&roots), &options);
        assert!(!rows.row(0).unwrap().show_expander);
    }

    #[test]
    fn test_reentrant_expand_from_listener_is_deferred() {
        let roots = grid(2, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        let handle = rows.clone();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        rows.rows_changed().connect(move |event| {
            if event.reason == RowsChangeReason::Expanded && fired_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                assert!(handle.is_processing());
                // Handled after the current expansion completes.
                assert!(!handle.expand(&path![1]));
            }
        });
        let settled = Arc::new(AtomicUsize::new(0));
        let settled_clone = settled.clone();
        rows.settled().connect(move |_| {
            settled_clone.fetch_add(1, Ordering::SeqCst);
        });

        rows.expand(&path![0]);
        assert_eq!(names(&rows), vec!["r0", "r0.c0", "r0.c1", "r1", "r1.c0", "r1.c1"]);
        assert_eq!(settled.load(Ordering::SeqCst), 1);
        assert!(!rows.is_processing());
    }

    #[test]
    fn test_index_of_path() {
        let roots = grid(2, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![1]);
        assert_eq!(rows.index_of_path(&path![1, 1]), Some(3));
        assert_eq!(rows.index_of_path(&path![0, 1]), None);
    }

    #[test]
    fn test_format_outline() {
        let roots = grid(1, 2);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        let outline = rows.format_outline(TreeStyle::Ascii, |node| node.name.clone());
        assert_eq!(outline, "r0\n+-- r0.c0\n`-- r0.c1\n");
    }

    #[test]
    fn test_dropping_engine_disconnects_sources() {
        let roots = grid(1, 1);
        let rows = HierarchicalRows::new(source_of(&roots));
        rows.expand(&path![0]);
        assert_eq!(roots.changed().connection_count(), 1);
        drop(rows);
        assert_eq!(roots.changed().connection_count(), 0);
        assert_eq!(children_at(&roots, &[0]).changed().connection_count(), 0);
    }

    #[test]
    #[should_panic(expected = "unsupported collection change")]
    fn test_inconsistent_change_panics() {
        let roots = grid(1, 0);
        let _rows = HierarchicalRows::new(source_of(&roots));
        roots.changed().emit(CollectionChange::Remove {
            index: 4,
            items: vec![Node::leaf("ghost")],
        });
    }
}
