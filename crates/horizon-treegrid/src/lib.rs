//! Horizon TreeGrid - hierarchical row flattening and tree selection.
//!
//! The crate presents an arbitrarily deep, lazily expanded tree as one flat
//! list of rows for a virtualized grid, and tracks selection over that tree
//! by path so it survives collapsing, sorting and source mutations.
//!
//! # Example
//!
//! ```
//! use horizon_treegrid::model::{HierarchicalRows, ObservableList, TreeSelectionModel, TreeSource};
//! use horizon_treegrid::path;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Node(&'static str);
//!
//! let roots = ObservableList::new(vec![Node("a"), Node("b")]);
//! let source = TreeSource::new(roots.clone(), |_: &Node| None);
//!
//! let rows = HierarchicalRows::new(source.clone());
//! let selection = TreeSelectionModel::new(source);
//! selection.select(&path![1]);
//!
//! roots.insert(0, Node("first"));
//! assert_eq!(rows.row_count(), 3);
//! assert_eq!(selection.selected_paths(), vec![path![2]]);
//! ```
//!
//! # Logging
//!
//! Every engine logs through `tracing` with the targets in
//! [`horizon_treegrid_core::logging::targets`]; install any subscriber to
//! see them.

pub mod config;
pub mod error;
pub mod model;

pub use config::TreeGridOptions;
pub use error::{Result, TreeError};
pub use model::{
    HierarchicalRows, Path, Row, SelectionCoordinator, SelectionMode, TreeGridSource,
    TreeSelectionModel,
};
