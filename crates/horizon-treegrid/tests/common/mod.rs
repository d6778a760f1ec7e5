//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_treegrid::Path;
use horizon_treegrid::model::{Comparator, ObservableList, TreeSource};

/// A named node owning its child list.
#[derive(Clone)]
pub struct TestNode {
    pub name: String,
    pub children: ObservableList<TestNode>,
}

impl TestNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::with_children(name, Vec::new())
    }

    pub fn with_children(name: impl Into<String>, children: Vec<TestNode>) -> Self {
        Self {
            name: name.into(),
            children: ObservableList::new(children),
        }
    }
}

impl fmt::Debug for TestNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for TestNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Hands out names that sort in creation order.
#[derive(Default)]
pub struct Names(AtomicUsize);

impl Names {
    pub fn next(&self) -> String {
        format!("n{:05}", self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// `roots` top-level nodes named `r{i}`, each with `children` leaves named
/// `r{i}.c{j}`.
pub fn grid(roots: usize, children: usize) -> ObservableList<TestNode> {
    ObservableList::new(
        (0..roots)
            .map(|i| {
                TestNode::with_children(
                    format!("r{}", i),
                    (0..children)
                        .map(|j| TestNode::leaf(format!("r{}.c{}", i, j)))
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn source_of(roots: &ObservableList<TestNode>) -> TreeSource<TestNode> {
    TreeSource::new(roots.clone(), |node: &TestNode| Some(node.children.clone()))
}

/// The list holding the children of the node at `parent`.
pub fn list_at(roots: &ObservableList<TestNode>, parent: &Path) -> ObservableList<TestNode> {
    let mut list = roots.clone();
    for &index in parent.components() {
        list = list.get(index).expect("path resolves").children;
    }
    list
}

pub fn by_name() -> Comparator<TestNode> {
    Arc::new(|a: &TestNode, b: &TestNode| a.name.cmp(&b.name))
}

/// Removes `node` and everything below it from `expanded`.
pub fn forget(node: &TestNode, expanded: &mut HashSet<String>) {
    expanded.remove(&node.name);
    for child in node.children.to_vec() {
        forget(&child, expanded);
    }
}

/// Non-incremental flattening: pre-order over `list`, descending into nodes
/// named in `expanded`.
pub fn reference_rows(
    list: &ObservableList<TestNode>,
    parent: &Path,
    expanded: &HashSet<String>,
    sorted: bool,
    out: &mut Vec<(String, Path, bool)>,
) {
    let mut items: Vec<(usize, TestNode)> = list.to_vec().into_iter().enumerate().collect();
    if sorted {
        items.sort_by(|a, b| a.1.name.cmp(&b.1.name));
    }
    for (index, node) in items {
        let path = parent.with_child(index);
        let is_expanded = expanded.contains(&node.name);
        out.push((node.name.clone(), path.clone(), is_expanded));
        if is_expanded {
            reference_rows(&node.children, &path, expanded, sorted, out);
        }
    }
}

/// Opt-in log output: `RUST_LOG=horizon_treegrid=trace cargo test`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
