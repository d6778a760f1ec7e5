//! Small in-memory trees for unit tests.

use std::fmt;

use super::source::{ObservableList, TreeSource};

/// A named node owning its child list.
#[derive(Clone)]
pub(crate) struct Node {
    pub name: String,
    pub children: ObservableList<Node>,
}

impl Node {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: ObservableList::empty(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            children: ObservableList::new(children),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// `roots` top-level nodes named `r{i}`, each with `children` leaves named
/// `r{i}.c{j}`.
pub(crate) fn grid(roots: usize, children: usize) -> ObservableList<Node> {
    ObservableList::new(
        (0..roots)
            .map(|i| {
                Node::with_children(
                    format!("r{}", i),
                    (0..children).map(|j| Node::leaf(format!("r{}.c{}", i, j))).collect(),
                )
            })
            .collect(),
    )
}

pub(crate) fn source_of(roots: &ObservableList<Node>) -> TreeSource<Node> {
    TreeSource::new(roots.clone(), |node: &Node| Some(node.children.clone()))
}

/// The child list of the node at `path`.
pub(crate) fn children_at(roots: &ObservableList<Node>, path: &[usize]) -> ObservableList<Node> {
    let mut list = roots.clone();
    for &index in path {
        list = list.get(index).expect("path resolves").children;
    }
    list
}
