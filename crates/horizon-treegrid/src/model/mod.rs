//! Tree flattening and selection.
//!
//! This module turns a lazily expandable tree of models into the flat list
//! of rows a virtualized grid displays, and tracks selection over that tree.
//!
//! # Core Types
//!
//! - `Path`: Addresses a node by one sibling index per level
//! - `RangeSet`: Compact per-parent runs of selected sibling indices
//! - `ObservableList` / `TreeSource`: The tree being displayed
//! - `HierarchicalRows`: The flattened, incrementally maintained rows
//! - `TreeSelectionModel`: Path-addressed selection that survives collapse
//! - `RowSelectionModel`: Flat, row-index-addressed selection
//! - `SelectionCoordinator`: Keeps the two selections in agreement
//! - `TreeGridSource`: Columns plus all of the above
//!
//! # Data Flow
//!
//! ```text
//! ┌────────────────┐   changed   ┌──────────────────┐  rows_changed  ┌───────────────────────┐
//! │ ObservableList │────────────>│ HierarchicalRows │───────────────>│ SelectionCoordinator  │
//! │  (any depth)   │──────┐      │ (sort, flatten)  │    settled     │  RowSelectionModel    │
//! └────────────────┘      │      └──────────────────┘                └───────────────────────┘
//!                         │      ┌────────────────────┐  selection_changed      ^
//!                         └─────>│ TreeSelectionModel │─────────────────────────┘
//!                                └────────────────────┘
//! ```

pub mod columns;
pub mod coordinator;
pub mod grid_source;
pub mod path;
pub mod range;
pub mod row_selection;
pub mod rows;
pub mod selection;
pub mod sorting;
pub mod source;

#[cfg(test)]
mod test_tree;

pub use columns::{Cell, CheckFn, CheckState, Column, ColumnKind, SortDirection, TextFn};
pub use coordinator::SelectionCoordinator;
pub use grid_source::TreeGridSource;
pub use path::Path;
pub use range::{IndexRange, IndexRanges, RangeSet};
pub use row_selection::{RowSelectionDelta, RowSelectionModel, SelectionFlags, SelectionMode};
pub use rows::{HierarchicalRows, Row, RowsChangeReason, RowsChanged};
pub use selection::{
    BatchGuard, IndexesChanged, SelectionChangeCause, TreeSelectionChanged, TreeSelectionModel,
};
pub use sorting::{Comparator, SortEntry, SortableRows};
pub use source::{
    ChangeKind, ChildResolver, CollectionChange, ModelPredicate, NodeModel, ObservableList,
    TreeSource,
};
