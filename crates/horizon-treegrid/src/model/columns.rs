//! Column definitions and realized cells.
//!
//! A grid's columns are a closed set of kinds ([`ColumnKind`]), each turning
//! a [`Row`] into a [`Cell`] by pattern match. The one [`ColumnKind::Expander`]
//! column of a grid also says how the tree expands: it carries the child
//! resolver and wraps the kind that renders its content.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::rows::Row;
use super::sorting::Comparator;
use super::source::{ChildResolver, ModelPredicate, NodeModel, ObservableList};

/// Produces the text of a cell.
pub type TextFn<M> = Arc<dyn Fn(&M) -> String + Send + Sync>;

/// Produces the check state of a cell.
pub type CheckFn<M> = Arc<dyn Fn(&M) -> CheckState + Send + Sync>;

/// Check state of a check box cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Not checked.
    #[default]
    Unchecked,
    /// Partially checked (tri-state).
    PartiallyChecked,
    /// Checked.
    Checked,
}

impl CheckState {
    /// Returns `true` if checked fully or partially.
    pub fn is_checked(&self) -> bool {
        !matches!(self, CheckState::Unchecked)
    }

    /// Flips between unchecked and checked. Partial becomes unchecked.
    pub fn toggle(&self) -> CheckState {
        match self {
            CheckState::Unchecked => CheckState::Checked,
            CheckState::PartiallyChecked | CheckState::Checked => CheckState::Unchecked,
        }
    }
}

impl From<bool> for CheckState {
    fn from(checked: bool) -> Self {
        if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }
}

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// What a column shows.
pub enum ColumnKind<M> {
    /// Plain text, optionally sortable by `compare`.
    Text {
        value: TextFn<M>,
        compare: Option<Comparator<M>>,
    },
    /// A check box.
    CheckBox { value: CheckFn<M> },
    /// Content built by the view from a named template.
    Template { template: String },
    /// The tree column: indentation and expander, then `inner`.
    Expander {
        inner: Box<ColumnKind<M>>,
        children: ChildResolver<M>,
        has_children: Option<ModelPredicate<M>>,
        initially_expanded: Option<ModelPredicate<M>>,
    },
}

impl<M> Clone for ColumnKind<M> {
    fn clone(&self) -> Self {
        match self {
            ColumnKind::Text { value, compare } => ColumnKind::Text {
                value: Arc::clone(value),
                compare: compare.clone(),
            },
            ColumnKind::CheckBox { value } => ColumnKind::CheckBox {
                value: Arc::clone(value),
            },
            ColumnKind::Template { template } => ColumnKind::Template {
                template: template.clone(),
            },
            ColumnKind::Expander {
                inner,
                children,
                has_children,
                initially_expanded,
            } => ColumnKind::Expander {
                inner: inner.clone(),
                children: Arc::clone(children),
                has_children: has_children.clone(),
                initially_expanded: initially_expanded.clone(),
            },
        }
    }
}

impl<M> fmt::Debug for ColumnKind<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Text { compare, .. } => f
                .debug_struct("Text")
                .field("sortable", &compare.is_some())
                .finish(),
            ColumnKind::CheckBox { .. } => f.write_str("CheckBox"),
            ColumnKind::Template { template } => {
                f.debug_struct("Template").field("template", template).finish()
            }
            ColumnKind::Expander { inner, .. } => f.debug_struct("Expander").field("inner", inner).finish(),
        }
    }
}

/// A realized cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<M> {
    /// Text content.
    Text(String),
    /// A check box.
    CheckBox(CheckState),
    /// Template content for the view to build around `model`.
    Template { template: String, model: M },
    /// Tree cell: indentation, expander state, then the inner content.
    Expander {
        depth: usize,
        is_expanded: bool,
        show_expander: bool,
        content: Box<Cell<M>>,
    },
}

/// A column of a tree grid.
#[derive(Clone, Debug)]
pub struct Column<M> {
    header: String,
    kind: ColumnKind<M>,
}

impl<M: NodeModel> Column<M> {
    /// A text column.
    pub fn text<F>(header: impl Into<String>, value: F) -> Self
    where
        F: Fn(&M) -> String + Send + Sync + 'static,
    {
        Self {
            header: header.into(),
            kind: ColumnKind::Text {
                value: Arc::new(value),
                compare: None,
            },
        }
    }

    /// A check box column.
    pub fn check_box<F>(header: impl Into<String>, value: F) -> Self
    where
        F: Fn(&M) -> CheckState + Send + Sync + 'static,
    {
        Self {
            header: header.into(),
            kind: ColumnKind::CheckBox { value: Arc::new(value) },
        }
    }

    /// A template column.
    pub fn template(header: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            kind: ColumnKind::Template {
                template: template.into(),
            },
        }
    }

    /// Turns `inner` into the tree column, expanding through `children`.
    ///
    /// The header is taken from `inner`. Wrapping an expander column again
    /// only replaces its child resolver.
    pub fn expander<F>(inner: Column<M>, children: F) -> Self
    where
        F: Fn(&M) -> Option<ObservableList<M>> + Send + Sync + 'static,
    {
        let inner_kind = match inner.kind {
            ColumnKind::Expander { inner, .. } => *inner,
            kind => kind,
        };
        Self {
            header: inner.header,
            kind: ColumnKind::Expander {
                inner: Box::new(inner_kind),
                children: Arc::new(children),
                has_children: None,
                initially_expanded: None,
            },
        }
    }

    /// Makes a text column sortable. Ignored for other kinds; for an
    /// expander column it applies to the wrapped kind.
    pub fn with_compare<F>(mut self, compare: F) -> Self
    where
        F: Fn(&M, &M) -> Ordering + Send + Sync + 'static,
    {
        let comparator: Comparator<M> = Arc::new(compare);
        match &mut self.kind {
            ColumnKind::Text { compare, .. } => *compare = Some(comparator),
            ColumnKind::Expander { inner, .. } => {
                if let ColumnKind::Text { compare, .. } = inner.as_mut() {
                    *compare = Some(comparator);
                }
            }
            ColumnKind::CheckBox { .. } | ColumnKind::Template { .. } => {}
        }
        self
    }

    /// Answers "can this model have children" without resolving them.
    /// Only meaningful on an expander column.
    pub fn with_has_children<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        if let ColumnKind::Expander { has_children, .. } = &mut self.kind {
            *has_children = Some(Arc::new(predicate));
        }
        self
    }

    /// Expands matching rows as soon as they appear. Only meaningful on an
    /// expander column.
    pub fn with_initially_expanded<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        if let ColumnKind::Expander {
            initially_expanded, ..
        } = &mut self.kind
        {
            *initially_expanded = Some(Arc::new(predicate));
        }
        self
    }

    /// The header text.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The column kind.
    pub fn kind(&self) -> &ColumnKind<M> {
        &self.kind
    }

    /// Returns `true` for the tree column.
    pub fn is_expander(&self) -> bool {
        matches!(self.kind, ColumnKind::Expander { .. })
    }

    /// Builds the cell of this column for `row`.
    pub fn realize(&self, row: &Row<M>) -> Cell<M> {
        realize_kind(&self.kind, row)
    }

    /// A comparator sorting rows by this column, or `None` if the column is
    /// not sortable.
    pub fn comparator(&self, direction: SortDirection) -> Option<Comparator<M>> {
        let compare = match &self.kind {
            ColumnKind::Text { compare, .. } => compare.clone(),
            ColumnKind::Expander { inner, .. } => match inner.as_ref() {
                ColumnKind::Text { compare, .. } => compare.clone(),
                _ => None,
            },
            ColumnKind::CheckBox { .. } | ColumnKind::Template { .. } => None,
        }?;
        match direction {
            SortDirection::Ascending => Some(compare),
            SortDirection::Descending => {
                let reversed: Comparator<M> = Arc::new(move |a: &M, b: &M| compare(b, a));
                Some(reversed)
            }
        }
    }
}

fn realize_kind<M: NodeModel>(kind: &ColumnKind<M>, row: &Row<M>) -> Cell<M> {
    match kind {
        ColumnKind::Text { value, .. } => Cell::Text(value(&row.model)),
        ColumnKind::CheckBox { value } => Cell::CheckBox(value(&row.model)),
        ColumnKind::Template { template } => Cell::Template {
            template: template.clone(),
            model: row.model.clone(),
        },
        ColumnKind::Expander { inner, .. } => Cell::Expander {
            depth: row.depth(),
            is_expanded: row.is_expanded,
            show_expander: row.show_expander,
            content: Box::new(realize_kind(inner, row)),
        },
    }
}
