//! Variable-depth addresses for nodes in a tree.
//!
//! A [`Path`] lists one sibling index per tree level, from the root level down
//! to the addressed node. The empty path addresses the invisible root and is
//! used as the parent key of top-level nodes.
//!
//! Paths are plain values: they are not tied to a live tree and go stale when
//! the tree mutates. The engines that store paths rewrite them on structural
//! changes with [`Path::adjusted_for_insert`] and
//! [`Path::adjusted_for_remove`], and revalidate any path a caller hands them.
//!
//! # Ordering
//!
//! Paths order lexicographically by level, with a prefix sorting before its
//! extensions:
//!
//! ```
//! use horizon_treegrid::path;
//!
//! assert!(path![0] < path![0, 0]);
//! assert!(path![0, 5] < path![1]);
//! assert!(path![] < path![0]);
//! ```

use std::fmt;

/// An ordered sequence of sibling indices addressing one tree node.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<usize>);

/// Build a [`Path`] from a list of sibling indices.
///
/// ```
/// use horizon_treegrid::{path, Path};
///
/// assert_eq!(path![1, 2], Path::new(vec![1, 2]));
/// assert!(path![].is_root());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($index:expr),+ $(,)?) => {
        $crate::Path::new(vec![$($index),+])
    };
}

impl Path {
    /// The empty path, addressing the invisible root.
    #[inline]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Creates a path from its components, root level first.
    #[inline]
    pub fn new(components: Vec<usize>) -> Self {
        Self(components)
    }

    /// Returns `true` for the empty path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of components. Top-level nodes have length 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Nesting depth of the addressed node; top-level nodes are at depth 0.
    ///
    /// The root path has no depth and reports 0 as well.
    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// The components, root level first.
    #[inline]
    pub fn components(&self) -> &[usize] {
        &self.0
    }

    /// The sibling index at `level`, if the path is that deep.
    #[inline]
    pub fn get(&self, level: usize) -> Option<usize> {
        self.0.get(level).copied()
    }

    /// The path of the parent node. The root is its own parent.
    pub fn parent(&self) -> Path {
        match self.0.split_last() {
            Some((_, rest)) => Path(rest.to_vec()),
            None => Path::root(),
        }
    }

    /// The sibling index of the addressed node within its parent.
    #[inline]
    pub fn leaf(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// The path of this node's child at `index`.
    pub fn with_child(&self, index: usize) -> Path {
        let mut components = Vec::with_capacity(self.0.len() + 1);
        components.extend_from_slice(&self.0);
        components.push(index);
        Path(components)
    }

    /// Appends `index` in place.
    #[inline]
    pub fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    /// Removes and returns the last component.
    #[inline]
    pub fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }

    /// Returns a copy with the component at `level` replaced by `value`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= self.len()`.
    pub fn with_component(&self, level: usize, value: usize) -> Path {
        let mut components = self.0.clone();
        components[level] = value;
        Path(components)
    }

    /// Returns `true` if `self` is a strict prefix of `other`.
    ///
    /// The root is an ancestor of every non-empty path.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Returns `true` if `prefix` is a prefix of `self` (or equal to it).
    #[inline]
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns `true` if this path lies in the sibling run
    /// `index..index + count` under `parent`, or below one of those siblings.
    pub fn is_within(&self, parent: &Path, index: usize, count: usize) -> bool {
        if !parent.is_ancestor_of(self) {
            return false;
        }
        let component = self.0[parent.len()];
        component >= index && component < index + count
    }

    /// Rewrites this path for `count` siblings inserted at `index` under
    /// `parent`.
    ///
    /// Paths at or after the insertion point (and their descendants) move
    /// down by `count`; every other path is returned unchanged.
    pub fn adjusted_for_insert(&self, parent: &Path, index: usize, count: usize) -> Path {
        if count == 0 || !parent.is_ancestor_of(self) {
            return self.clone();
        }
        let level = parent.len();
        let component = self.0[level];
        if component >= index {
            self.with_component(level, component + count)
        } else {
            self.clone()
        }
    }

    /// Rewrites this path for `count` siblings removed at `index` under
    /// `parent`.
    ///
    /// Returns `None` if the path addressed one of the removed siblings or a
    /// node below them. Paths after the removed run move up by `count`.
    pub fn adjusted_for_remove(&self, parent: &Path, index: usize, count: usize) -> Option<Path> {
        if count == 0 || !parent.is_ancestor_of(self) {
            return Some(self.clone());
        }
        let level = parent.len();
        let component = self.0[level];
        if component < index {
            Some(self.clone())
        } else if component < index + count {
            None
        } else {
            Some(self.with_component(level, component - count))
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", component)?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path{}", self)
    }
}

impl From<Vec<usize>> for Path {
    fn from(components: Vec<usize>) -> Self {
        Path(components)
    }
}

impl From<&[usize]> for Path {
    fn from(components: &[usize]) -> Self {
        Path(components.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(components: [usize; N]) -> Self {
        Path(components.to_vec())
    }
}

impl AsRef<[usize]> for Path {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn test_parent_and_leaf() {
        let p = path![0, 2, 1];
        assert_eq!(p.parent(), path![0, 2]);
        assert_eq!(p.leaf(), Some(1));
        assert_eq!(p.depth(), 2);
        assert_eq!(Path::root().parent(), Path::root());
        assert_eq!(Path::root().leaf(), None);
    }

    #[test]
    fn test_with_child() {
        assert_eq!(path![3].with_child(4), path![3, 4]);
        assert_eq!(Path::root().with_child(0), path![0]);
    }

    #[test]
    fn test_is_ancestor_of() {
        assert!(Path::root().is_ancestor_of(&path![0]));
        assert!(path![0].is_ancestor_of(&path![0, 1, 2]));
        assert!(!path![0].is_ancestor_of(&path![0]));
        assert!(!path![1].is_ancestor_of(&path![0, 1]));
        assert!(path![0, 1].starts_with(&path![0, 1]));
    }

    #[test]
    fn test_ordering_prefix_first() {
        let mut paths = vec![path![1], path![0, 3], path![0], path![0, 1, 0], path![0, 1]];
        paths.sort();
        assert_eq!(
            paths,
            vec![path![0], path![0, 1], path![0, 1, 0], path![0, 3], path![1]]
        );
    }

    #[test]
    fn test_adjusted_for_insert() {
        let parent = path![0];
        assert_eq!(path![0, 2].adjusted_for_insert(&parent, 1, 3), path![0, 5]);
        assert_eq!(path![0, 2, 7].adjusted_for_insert(&parent, 2, 1), path![0, 3, 7]);
        assert_eq!(path![0, 0].adjusted_for_insert(&parent, 1, 3), path![0, 0]);
        // Other subtrees and the parent itself are untouched.
        assert_eq!(path![1, 2].adjusted_for_insert(&parent, 0, 1), path![1, 2]);
        assert_eq!(path![0].adjusted_for_insert(&parent, 0, 1), path![0]);
        // Top-level inserts shift top-level paths.
        assert_eq!(path![2, 0].adjusted_for_insert(&Path::root(), 1, 1), path![3, 0]);
    }

    #[test]
    fn test_adjusted_for_remove() {
        let parent = path![0];
        assert_eq!(path![0, 5].adjusted_for_remove(&parent, 1, 2), Some(path![0, 3]));
        assert_eq!(path![0, 1].adjusted_for_remove(&parent, 1, 2), None);
        assert_eq!(path![0, 2, 4].adjusted_for_remove(&parent, 1, 2), None);
        assert_eq!(path![0, 0].adjusted_for_remove(&parent, 1, 2), Some(path![0, 0]));
        assert_eq!(path![2].adjusted_for_remove(&parent, 0, 1), Some(path![2]));
    }

    #[test]
    fn test_is_within() {
        assert!(path![0, 2].is_within(&path![0], 1, 2));
        assert!(path![0, 2, 9].is_within(&path![0], 2, 1));
        assert!(!path![0, 3].is_within(&path![0], 1, 2));
        assert!(!path![0].is_within(&path![0], 0, 10));
    }

    #[test]
    fn test_display() {
        assert_eq!(path![0, 2].to_string(), "(0, 2)");
        assert_eq!(Path::root().to_string(), "()");
        assert_eq!(format!("{:?}", path![4]), "Path(4)");
    }
}
