//! Observable source collections and the tree they describe.
//!
//! The engines never own the data they display. They read it through
//! [`ObservableList`] handles and follow its [`CollectionChange`]
//! notifications. A [`TreeSource`] ties a list of root models to a child
//! resolver that yields each model's own child list.
//!
//! # Example
//!
//! ```
//! use horizon_treegrid::model::{CollectionChange, ObservableList};
//!
//! let list = ObservableList::new(vec!["a", "b"]);
//! list.changed().connect(|change| {
//!     if let CollectionChange::Add { index, items } = change {
//!         println!("{} item(s) added at {}", items.len(), index);
//!     }
//! });
//! list.push("c");
//! assert_eq!(list.to_vec(), vec!["a", "b", "c"]);
//! ```

use std::sync::Arc;

use horizon_treegrid_core::Signal;
use horizon_treegrid_core::logging::targets;
use parking_lot::RwLock;

use super::path::Path;

/// Bound shared by every model type the engines handle.
///
/// Models are cloned into row snapshots and change payloads, so they should
/// be cheap to clone (an `Arc` or a handle type).
pub trait NodeModel: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> NodeModel for T {}

/// The five mutation shapes a source collection can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Items were inserted.
    Add,
    /// Items were removed.
    Remove,
    /// Items were overwritten in place.
    Replace,
    /// Items were moved to another position.
    Move,
    /// The whole collection was replaced.
    Reset,
}

/// A change notification raised by a source collection.
///
/// Every variant carries the affected items, so a consumer that handles the
/// change later never has to read the collection again.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange<T> {
    /// `items` were inserted starting at `index`.
    Add {
        /// Position of the first inserted item.
        index: usize,
        /// The inserted items, in order.
        items: Vec<T>,
    },
    /// `items` were removed starting at `index`.
    Remove {
        /// Position of the first removed item.
        index: usize,
        /// The removed items, in order.
        items: Vec<T>,
    },
    /// `old_items` starting at `index` were overwritten by `new_items`.
    Replace {
        /// Position of the first replaced item.
        index: usize,
        /// Items before the change.
        old_items: Vec<T>,
        /// Items after the change.
        new_items: Vec<T>,
    },
    /// `items` moved from `old_index` to `new_index`.
    Move {
        /// Position before the move.
        old_index: usize,
        /// Position after the move, in post-move numbering.
        new_index: usize,
        /// The moved items.
        items: Vec<T>,
    },
    /// The collection content was replaced wholesale.
    Reset {
        /// Content before the reset.
        old_items: Vec<T>,
        /// Content after the reset.
        new_items: Vec<T>,
    },
}

impl<T> CollectionChange<T> {
    /// The mutation shape of this change.
    pub fn kind(&self) -> ChangeKind {
        match self {
            CollectionChange::Add { .. } => ChangeKind::Add,
            CollectionChange::Remove { .. } => ChangeKind::Remove,
            CollectionChange::Replace { .. } => ChangeKind::Replace,
            CollectionChange::Move { .. } => ChangeKind::Move,
            CollectionChange::Reset { .. } => ChangeKind::Reset,
        }
    }
}

struct ListInner<T> {
    items: RwLock<Vec<T>>,
    changed: Signal<CollectionChange<T>>,
}

/// A shared, observable list.
///
/// Cloning the list clones the handle; all clones see the same items and the
/// same `changed` signal. Each mutation emits exactly one
/// [`CollectionChange`] after the write lock has been released, so slots may
/// read (or mutate) the list again.
pub struct ObservableList<T> {
    inner: Arc<ListInner<T>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: NodeModel> Default for ObservableList<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: NodeModel + std::fmt::Debug> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.inner.items.read().iter()).finish()
    }
}

impl<T: NodeModel> ObservableList<T> {
    /// Creates a list holding `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(ListInner {
                items: RwLock::new(items),
                changed: Signal::new(),
            }),
        }
    }

    /// Creates an empty list.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The change notification stream.
    pub fn changed(&self) -> &Signal<CollectionChange<T>> {
        &self.inner.changed
    }

    /// Returns `true` if both handles refer to the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.inner.items.read().len()
    }

    /// Returns `true` if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    /// A clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.items.read().get(index).cloned()
    }

    /// A clone of every item.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.read().clone()
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.inner.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.emit(CollectionChange::Add {
            index,
            items: vec![item],
        });
    }

    /// Inserts an item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, item: T) {
        self.insert_many(index, vec![item]);
    }

    /// Inserts a contiguous run of items at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_many(&self, index: usize, new_items: Vec<T>) {
        if new_items.is_empty() {
            return;
        }
        {
            let mut items = self.inner.items.write();
            assert!(index <= items.len(), "insert index {} out of bounds", index);
            items.splice(index..index, new_items.iter().cloned());
        }
        self.emit(CollectionChange::Add {
            index,
            items: new_items,
        });
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&self, index: usize) -> T {
        let removed = self.inner.items.write().remove(index);
        self.emit(CollectionChange::Remove {
            index,
            items: vec![removed.clone()],
        });
        removed
    }

    /// Removes `count` items starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the run extends past the end of the list.
    pub fn remove_range(&self, index: usize, count: usize) -> Vec<T> {
        if count == 0 {
            return Vec::new();
        }
        let removed: Vec<T> = self
            .inner
            .items
            .write()
            .drain(index..index + count)
            .collect();
        self.emit(CollectionChange::Remove {
            index,
            items: removed.clone(),
        });
        removed
    }

    /// Overwrites the item at `index`, returning the previous item.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn replace(&self, index: usize, item: T) -> T {
        let old = std::mem::replace(&mut self.inner.items.write()[index], item.clone());
        self.emit(CollectionChange::Replace {
            index,
            old_items: vec![old.clone()],
            new_items: vec![item],
        });
        old
    }

    /// Moves the item at `old_index` so it ends up at `new_index`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn move_item(&self, old_index: usize, new_index: usize) {
        let item = {
            let mut items = self.inner.items.write();
            assert!(new_index < items.len(), "move target {} out of bounds", new_index);
            let item = items.remove(old_index);
            items.insert(new_index, item.clone());
            item
        };
        if old_index == new_index {
            return;
        }
        self.emit(CollectionChange::Move {
            old_index,
            new_index,
            items: vec![item],
        });
    }

    /// Removes every item, reporting a reset.
    pub fn clear(&self) {
        self.set_items(Vec::new());
    }

    /// Replaces the content wholesale, reporting a reset.
    pub fn set_items(&self, new_items: Vec<T>) {
        let old_items = std::mem::replace(&mut *self.inner.items.write(), new_items.clone());
        self.emit(CollectionChange::Reset {
            old_items,
            new_items,
        });
    }

    fn emit(&self, change: CollectionChange<T>) {
        tracing::trace!(target: targets::SOURCE, kind = ?change.kind(), "collection changed");
        self.inner.changed.emit(change);
    }
}

/// Yields the child list of a model, or `None` if it cannot have children.
///
/// The resolver should hand out the same list (another handle to it) on every
/// call for the same model, so that changes to it reach the engines.
pub type ChildResolver<M> = Arc<dyn Fn(&M) -> Option<ObservableList<M>> + Send + Sync>;

/// A yes/no question asked about a model.
pub type ModelPredicate<M> = Arc<dyn Fn(&M) -> bool + Send + Sync>;

/// A lazily expandable tree of models.
pub struct TreeSource<M> {
    roots: ObservableList<M>,
    children: ChildResolver<M>,
    has_children: Option<ModelPredicate<M>>,
    initially_expanded: Option<ModelPredicate<M>>,
}

impl<M> Clone for TreeSource<M> {
    fn clone(&self) -> Self {
        Self {
            roots: self.roots.clone(),
            children: Arc::clone(&self.children),
            has_children: self.has_children.clone(),
            initially_expanded: self.initially_expanded.clone(),
        }
    }
}

impl<M: NodeModel> TreeSource<M> {
    /// Creates a tree over `roots` whose children are produced by `children`.
    pub fn new<F>(roots: ObservableList<M>, children: F) -> Self
    where
        F: Fn(&M) -> Option<ObservableList<M>> + Send + Sync + 'static,
    {
        Self::with_resolver(roots, Arc::new(children))
    }

    /// Creates a tree with an already shared resolver.
    pub fn with_resolver(roots: ObservableList<M>, children: ChildResolver<M>) -> Self {
        Self {
            roots,
            children,
            has_children: None,
            initially_expanded: None,
        }
    }

    /// Sets a cheap hint telling whether a model has children without
    /// resolving them.
    pub fn with_has_children<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.has_children = Some(Arc::new(predicate));
        self
    }

    /// Sets a predicate selecting models whose rows start out expanded.
    pub fn with_initially_expanded<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.initially_expanded = Some(Arc::new(predicate));
        self
    }

    /// The top-level list.
    pub fn roots(&self) -> &ObservableList<M> {
        &self.roots
    }

    /// The shared child resolver.
    pub fn resolver(&self) -> &ChildResolver<M> {
        &self.children
    }

    /// The child list of `model`.
    pub fn children_of(&self, model: &M) -> Option<ObservableList<M>> {
        (self.children)(model)
    }

    /// The `has_children` hint for `model`, if one was configured.
    pub fn has_children(&self, model: &M) -> Option<bool> {
        self.has_children.as_ref().map(|predicate| predicate(model))
    }

    /// Whether rows for `model` should be expanded as soon as they appear.
    pub fn is_initially_expanded(&self, model: &M) -> bool {
        self.initially_expanded
            .as_ref()
            .is_some_and(|predicate| predicate(model))
    }

    /// The list holding the children of the node at `parent`.
    ///
    /// The root path yields the top-level list. Returns `None` if the path
    /// does not resolve or the node has no child list.
    pub fn list_at(&self, parent: &Path) -> Option<ObservableList<M>> {
        let mut list = self.roots.clone();
        for &index in parent.components() {
            let model = list.get(index)?;
            list = self.children_of(&model)?;
        }
        Some(list)
    }

    /// The model addressed by `path`.
    pub fn model_at(&self, path: &Path) -> Option<M> {
        let leaf = path.leaf()?;
        self.list_at(&path.parent())?.get(leaf)
    }

    /// The model at `rest` below `model`, walking child lists.
    pub fn descend(&self, model: &M, rest: &[usize]) -> Option<M> {
        let mut current = model.clone();
        for &index in rest {
            current = self.children_of(&current)?.get(index)?;
        }
        Some(current)
    }
}
