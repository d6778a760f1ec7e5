//! The tree grid facade.
//!
//! [`TreeGridSource`] ties a root list and a set of [`Column`]s to the three
//! engines: [`HierarchicalRows`], [`TreeSelectionModel`] and
//! [`SelectionCoordinator`]. The engines are created when the expander
//! column is added, since that column defines how the tree expands. Until
//! then every row or selection operation fails with
//! [`TreeError::NoExpanderColumn`].
//!
//! ```
//! use horizon_treegrid::model::{Cell, Column, ObservableList, TreeGridSource};
//! use horizon_treegrid::{TreeError, path};
//!
//! #[derive(Clone)]
//! struct Dir { name: String, children: ObservableList<Dir> }
//!
//! let roots = ObservableList::new(vec![Dir {
//!     name: "src".into(),
//!     children: ObservableList::new(vec![Dir { name: "lib.rs".into(), children: ObservableList::empty() }]),
//! }]);
//! let mut grid = TreeGridSource::new(roots);
//! assert!(matches!(grid.row_count(), Err(TreeError::NoExpanderColumn)));
//!
//! grid.add_column(Column::expander(
//!     Column::text("Name", |d: &Dir| d.name.clone()),
//!     |d: &Dir| Some(d.children.clone()),
//! )).unwrap();
//!
//! grid.expand(&path![0]).unwrap();
//! assert_eq!(grid.row_count().unwrap(), 2);
//! let Some(Cell::Expander { depth, content, .. }) = grid.realize_cell(1, 0).unwrap() else {
//!     panic!("expected the tree cell");
//! };
//! assert_eq!(depth, 1);
//! assert!(matches!(*content, Cell::Text(ref name) if name == "lib.rs"));
//! ```

use horizon_treegrid_core::logging::targets;

use super::columns::{Cell, Column, ColumnKind, SortDirection};
use super::coordinator::SelectionCoordinator;
use super::path::Path;
use super::rows::HierarchicalRows;
use super::selection::TreeSelectionModel;
use super::source::{NodeModel, ObservableList, TreeSource};
use crate::config::TreeGridOptions;
use crate::error::{Result, TreeError};

struct Engines<M: NodeModel> {
    rows: HierarchicalRows<M>,
    selection: TreeSelectionModel<M>,
    coordinator: SelectionCoordinator<M>,
}

/// A root list, its columns, and the engines presenting it as a grid.
pub struct TreeGridSource<M: NodeModel> {
    roots: ObservableList<M>,
    options: TreeGridOptions,
    columns: Vec<Column<M>>,
    expander: Option<usize>,
    engines: Option<Engines<M>>,
    sort: Option<(usize, SortDirection)>,
}

impl<M: NodeModel> TreeGridSource<M> {
    /// Creates a grid over `roots` with default options.
    pub fn new(roots: ObservableList<M>) -> Self {
        Self::with_options(roots, TreeGridOptions::default())
    }

    /// Creates a grid over `roots`.
    pub fn with_options(roots: ObservableList<M>, options: TreeGridOptions) -> Self {
        Self {
            roots,
            options,
            columns: Vec::new(),
            expander: None,
            engines: None,
            sort: None,
        }
    }

    /// The options the engines were (or will be) created with.
    pub fn options(&self) -> &TreeGridOptions {
        &self.options
    }

    /// The top-level list.
    pub fn roots(&self) -> &ObservableList<M> {
        &self.roots
    }

    /// Appends a column and returns its index.
    ///
    /// Adding the expander column creates the engines. A grid has exactly
    /// one expander column.
    pub fn add_column(&mut self, column: Column<M>) -> Result<usize> {
        if let ColumnKind::Expander {
            children,
            has_children,
            initially_expanded,
            ..
        } = column.kind()
        {
            if self.expander.is_some() {
                return Err(TreeError::DuplicateExpanderColumn);
            }
            let mut source = TreeSource::with_resolver(self.roots.clone(), children.clone());
            if let Some(predicate) = has_children.clone() {
                source = source.with_has_children(move |model: &M| predicate(model));
            }
            if let Some(predicate) = initially_expanded.clone() {
                source = source.with_initially_expanded(move |model: &M| predicate(model));
            }
            let rows = HierarchicalRows::with_options(source.clone(), &self.options);
            let selection = TreeSelectionModel::new(source);
            let coordinator = SelectionCoordinator::new(rows.clone(), selection.clone(), &self.options);
            self.engines = Some(Engines {
                rows,
                selection,
                coordinator,
            });
            self.expander = Some(self.columns.len());
            tracing::debug!(target: targets::GRID, column = column.header(), "expander column installed");
        }
        self.columns.push(column);
        Ok(self.columns.len() - 1)
    }

    /// The columns, in display order.
    pub fn columns(&self) -> &[Column<M>] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The column at `index`.
    pub fn column(&self, index: usize) -> Result<&Column<M>> {
        self.columns.get(index).ok_or(TreeError::ColumnOutOfRange {
            index,
            count: self.columns.len(),
        })
    }

    /// Index of the expander column, if added.
    pub fn expander_column(&self) -> Option<usize> {
        self.expander
    }

    fn engines(&self) -> Result<&Engines<M>> {
        self.engines.as_ref().ok_or(TreeError::NoExpanderColumn)
    }

    /// The flattening engine.
    pub fn rows(&self) -> Result<&HierarchicalRows<M>> {
        Ok(&self.engines()?.rows)
    }

    /// The path selection.
    pub fn selection(&self) -> Result<&TreeSelectionModel<M>> {
        Ok(&self.engines()?.selection)
    }

    /// The flat row selection coordinator.
    pub fn coordinator(&self) -> Result<&SelectionCoordinator<M>> {
        Ok(&self.engines()?.coordinator)
    }

    /// Number of visible rows.
    pub fn row_count(&self) -> Result<usize> {
        Ok(self.engines()?.rows.row_count())
    }

    /// Expands the node at `path`. See [`HierarchicalRows::expand`].
    pub fn expand(&self, path: &Path) -> Result<bool> {
        Ok(self.engines()?.rows.expand(path))
    }

    /// Collapses the node at `path`.
    pub fn collapse(&self, path: &Path) -> Result<()> {
        self.engines()?.rows.collapse(path);
        Ok(())
    }

    /// Sorts every level by `column`. Returns `false` if the column is not
    /// sortable, leaving the current order untouched.
    pub fn sort_by(&mut self, column: usize, direction: SortDirection) -> Result<bool> {
        let rows = self.engines()?.rows.clone();
        let Some(comparator) = self.column(column)?.comparator(direction) else {
            return Ok(false);
        };
        rows.set_comparator(Some(comparator));
        self.sort = Some((column, direction));
        Ok(true)
    }

    /// Restores source order.
    pub fn clear_sort(&mut self) -> Result<()> {
        self.engines()?.rows.set_comparator(None);
        self.sort = None;
        Ok(())
    }

    /// The column and direction rows are currently sorted by.
    pub fn sort_column(&self) -> Option<(usize, SortDirection)> {
        self.sort
    }

    /// Builds the cell at visible `row` and `column`. A row index past the
    /// end yields `None`.
    pub fn realize_cell(&self, row: usize, column: usize) -> Result<Option<Cell<M>>> {
        let engines = self.engines()?;
        let column = self.column(column)?;
        Ok(engines.rows.row(row).map(|row| column.realize(&row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row_selection::SelectionMode;
    use crate::model::test_tree::{Node, grid};
    use crate::path;

    fn name_column() -> Column<Node> {
        Column::text("Name", |n: &Node| n.name.clone()).with_compare(|a: &Node, b: &Node| a.name.cmp(&b.name))
    }

    fn tree_column() -> Column<Node> {
        Column::expander(name_column(), |n: &Node| Some(n.children.clone()))
    }

    #[test]
    fn test_operations_require_expander() {
        let mut grid_source = TreeGridSource::new(grid(2, 2));
        grid_source.add_column(name_column()).unwrap();
        assert!(matches!(grid_source.rows(), Err(TreeError::NoExpanderColumn)));
        assert!(matches!(grid_source.selection(), Err(TreeError::NoExpanderColumn)));
        assert!(matches!(grid_source.expand(&path![0]), Err(TreeError::NoExpanderColumn)));
        assert!(matches!(grid_source.collapse(&path![0]), Err(TreeError::NoExpanderColumn)));
        assert!(matches!(
            grid_source.sort_by(0, SortDirection::Ascending),
            Err(TreeError::NoExpanderColumn)
        ));
        assert!(matches!(grid_source.realize_cell(0, 0), Err(TreeError::NoExpanderColumn)));
    }

    #[test]
    fn test_duplicate_expander_rejected() {
        let mut grid_source = TreeGridSource::new(grid(1, 1));
        assert_eq!(grid_source.add_column(tree_column()).unwrap(), 0);
        assert!(matches!(
            grid_source.add_column(tree_column()),
            Err(TreeError::DuplicateExpanderColumn)
        ));
        assert_eq!(grid_source.column_count(), 1);
        assert_eq!(grid_source.expander_column(), Some(0));
    }

    #[test]
    fn test_realize_cells() {
        let mut grid_source = TreeGridSource::new(grid(2, 2));
        grid_source.add_column(tree_column()).unwrap();
        grid_source
            .add_column(Column::text("Kids", |n: &Node| n.children.len().to_string()))
            .unwrap();
        grid_source.expand(&path![1]).unwrap();

        assert_eq!(grid_source.realize_cell(2, 1).unwrap(), Some(Cell::Text("0".into())));
        assert_eq!(grid_source.realize_cell(0, 1).unwrap(), Some(Cell::Text("2".into())));
        assert_eq!(grid_source.realize_cell(9, 0).unwrap(), None);
        assert!(matches!(
            grid_source.realize_cell(0, 5),
            Err(TreeError::ColumnOutOfRange { index: 5, count: 2 })
        ));
    }

    #[test]
    fn test_sort_by_column() {
        let mut grid_source = TreeGridSource::new(grid(3, 0));
        grid_source.add_column(tree_column()).unwrap();
        assert!(grid_source.sort_by(0, SortDirection::Descending).unwrap());
        let names: Vec<String> = grid_source
            .rows()
            .unwrap()
            .rows()
            .into_iter()
            .map(|row| row.model.name)
            .collect();
        assert_eq!(names, vec!["r2", "r1", "r0"]);
        assert_eq!(grid_source.sort_column(), Some((0, SortDirection::Descending)));

        grid_source.clear_sort().unwrap();
        assert_eq!(grid_source.rows().unwrap().model_at(0).map(|n| n.name), Some("r0".to_string()));
        assert_eq!(grid_source.sort_column(), None);
    }

    #[test]
    fn test_unsortable_column_leaves_order() {
        let mut grid_source = TreeGridSource::new(grid(2, 0));
        grid_source.add_column(tree_column()).unwrap();
        grid_source
            .add_column(Column::template("Icon", "icon"))
            .unwrap();
        assert!(!grid_source.sort_by(1, SortDirection::Ascending).unwrap());
        assert_eq!(grid_source.sort_column(), None);
    }

    #[test]
    fn test_options_reach_engines() {
        let options = TreeGridOptions {
            selection_mode: SelectionMode::Multiple,
            ..TreeGridOptions::default()
        };
        let mut grid_source = TreeGridSource::with_options(grid(3, 0), options);
        grid_source.add_column(tree_column()).unwrap();
        let coordinator = grid_source.coordinator().unwrap();
        assert_eq!(coordinator.mode(), SelectionMode::Multiple);
        coordinator.select_row(0);
        coordinator.select_row(2);
        assert_eq!(grid_source.selection().unwrap().count(), 2);
    }
}
