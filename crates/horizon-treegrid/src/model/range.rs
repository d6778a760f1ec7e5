//! Compact storage for sets of sibling indices.
//!
//! [`IndexRanges`] keeps the indices under one parent as a sorted list of
//! inclusive [`IndexRange`]s. Ranges never overlap and never touch: adding an
//! index next to an existing run extends that run, and adding an index that
//! closes the gap between two runs merges them.
//!
//! [`RangeSet`] maps parent [`Path`]s to their [`IndexRanges`] and is the
//! storage behind tree selection. It enumerates full paths in parent-key
//! order, then ascending sibling index.

use std::collections::BTreeMap;

use super::path::Path;

/// An inclusive run of sibling indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    /// First index in the run.
    pub begin: usize,
    /// Last index in the run (inclusive).
    pub end: usize,
}

impl IndexRange {
    /// Creates a range covering `begin..=end`.
    ///
    /// # Panics
    ///
    /// Panics if `end < begin`.
    pub fn new(begin: usize, end: usize) -> Self {
        assert!(begin <= end, "invalid range {}..={}", begin, end);
        Self { begin, end }
    }

    /// A range holding one index.
    #[inline]
    pub fn single(index: usize) -> Self {
        Self {
            begin: index,
            end: index,
        }
    }

    /// Number of indices covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin + 1
    }

    /// Ranges always hold at least one index.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `index` lies inside the range.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.begin <= index && index <= self.end
    }

    /// Number of indices shared with `begin..=end`.
    fn overlap(&self, begin: usize, end: usize) -> usize {
        let lo = self.begin.max(begin);
        let hi = self.end.min(end);
        if lo > hi { 0 } else { hi - lo + 1 }
    }

    /// Iterates the indices in the range.
    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.begin..=self.end
    }
}

/// A sorted, coalesced set of sibling indices under one parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRanges {
    ranges: Vec<IndexRange>,
}

impl IndexRanges {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no index is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of stored indices.
    pub fn count(&self) -> usize {
        self.ranges.iter().map(IndexRange::len).sum()
    }

    /// The stored ranges in ascending order.
    #[inline]
    pub fn ranges(&self) -> &[IndexRange] {
        &self.ranges
    }

    /// Iterates every stored index in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.ranges.iter().flat_map(IndexRange::iter)
    }

    /// The smallest stored index.
    pub fn first(&self) -> Option<usize> {
        self.ranges.first().map(|r| r.begin)
    }

    /// Returns `true` if `index` is stored.
    pub fn contains(&self, index: usize) -> bool {
        let pos = self.ranges.partition_point(|r| r.end < index);
        pos < self.ranges.len() && self.ranges[pos].begin <= index
    }

    /// Adds one index. Returns `false` if it was already present.
    pub fn add(&mut self, index: usize) -> bool {
        let pos = self.ranges.partition_point(|r| r.end < index);
        if pos < self.ranges.len() && self.ranges[pos].begin <= index {
            return false;
        }

        let joins_prev = pos > 0 && self.ranges[pos - 1].end + 1 == index;
        let joins_next = pos < self.ranges.len() && self.ranges[pos].begin == index + 1;
        match (joins_prev, joins_next) {
            (true, true) => {
                self.ranges[pos - 1].end = self.ranges[pos].end;
                self.ranges.remove(pos);
            }
            (true, false) => self.ranges[pos - 1].end = index,
            (false, true) => self.ranges[pos].begin = index,
            (false, false) => self.ranges.insert(pos, IndexRange::single(index)),
        }
        true
    }

    /// Adds every index in `begin..=end`. Returns how many were newly added.
    pub fn add_range(&mut self, begin: usize, end: usize) -> usize {
        if end < begin {
            return 0;
        }
        // Every range that overlaps or touches the new one is absorbed.
        let lo = self
            .ranges
            .partition_point(|r| r.end.saturating_add(1) < begin);
        let hi = self
            .ranges
            .partition_point(|r| r.begin <= end.saturating_add(1));

        let mut merged = IndexRange::new(begin, end);
        let mut already = 0;
        for range in &self.ranges[lo..hi] {
            already += range.overlap(begin, end);
            merged.begin = merged.begin.min(range.begin);
            merged.end = merged.end.max(range.end);
        }
        self.ranges.splice(lo..hi, std::iter::once(merged));
        (end - begin + 1) - already
    }

    /// Removes one index. Returns `false` if it was not present.
    pub fn remove(&mut self, index: usize) -> bool {
        self.remove_range(index, index) == 1
    }

    /// Removes every index in `begin..=end`. Returns how many were present.
    pub fn remove_range(&mut self, begin: usize, end: usize) -> usize {
        if end < begin {
            return 0;
        }
        let lo = self.ranges.partition_point(|r| r.end < begin);
        let hi = self.ranges.partition_point(|r| r.begin <= end);
        if lo >= hi {
            return 0;
        }

        let mut removed = 0;
        let mut remaining = Vec::with_capacity(2);
        for range in &self.ranges[lo..hi] {
            removed += range.overlap(begin, end);
            if range.begin < begin {
                remaining.push(IndexRange::new(range.begin, begin - 1));
            }
            if range.end > end {
                remaining.push(IndexRange::new(end + 1, range.end));
            }
        }
        self.ranges.splice(lo..hi, remaining);
        removed
    }

    /// Opens a gap of `count` unselected indices at `index`, shifting every
    /// stored index `>= index` up by `count`.
    pub fn insert_gap(&mut self, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        let pos = self.ranges.partition_point(|r| r.end < index);
        if pos < self.ranges.len() && self.ranges[pos].begin < index {
            // The gap splits this range in two.
            let range = self.ranges[pos];
            self.ranges[pos].end = index - 1;
            self.ranges
                .insert(pos + 1, IndexRange::new(index, range.end));
        }
        for range in self.ranges.iter_mut().skip(pos) {
            if range.begin >= index {
                range.begin += count;
                range.end += count;
            }
        }
    }

    /// Removes the indices `index..index + count` and closes the hole,
    /// shifting every later index down by `count`.
    ///
    /// Returns the stored indices that fell inside the removed span, in their
    /// pre-removal numbering.
    pub fn remove_span(&mut self, index: usize, count: usize) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }
        let last = index + count - 1;
        let removed: Vec<usize> = self
            .indices()
            .skip_while(|&i| i < index)
            .take_while(|&i| i <= last)
            .collect();
        self.remove_range(index, last);

        for range in self.ranges.iter_mut() {
            if range.begin > last {
                range.begin -= count;
                range.end -= count;
            }
        }
        self.coalesce();
        removed
    }

    /// Removes all indices.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    fn coalesce(&mut self) {
        let mut merged: Vec<IndexRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(prev) if prev.end + 1 >= range.begin => prev.end = prev.end.max(range.end),
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }
}

/// A set of tree paths stored as per-parent [`IndexRanges`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    parents: BTreeMap<Path, IndexRanges>,
}

impl RangeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no path is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Number of stored paths.
    pub fn count(&self) -> usize {
        self.parents.values().map(IndexRanges::count).sum()
    }

    /// Adds `path`. Returns `false` if it was already present or is the root.
    pub fn add(&mut self, path: &Path) -> bool {
        let Some(leaf) = path.leaf() else {
            return false;
        };
        self.parents.entry(path.parent()).or_default().add(leaf)
    }

    /// Adds the siblings `begin..=end` under `parent`. Returns how many were
    /// newly added.
    pub fn add_range(&mut self, parent: &Path, begin: usize, end: usize) -> usize {
        if end < begin {
            return 0;
        }
        self.parents
            .entry(parent.clone())
            .or_default()
            .add_range(begin, end)
    }

    /// Removes `path`. Returns `false` if it was not present.
    pub fn remove(&mut self, path: &Path) -> bool {
        let Some(leaf) = path.leaf() else {
            return false;
        };
        let parent = path.parent();
        let Some(ranges) = self.parents.get_mut(&parent) else {
            return false;
        };
        let removed = ranges.remove(leaf);
        if ranges.is_empty() {
            self.parents.remove(&parent);
        }
        removed
    }

    /// Removes the siblings `begin..=end` under `parent`. Returns how many
    /// were present.
    pub fn remove_range(&mut self, parent: &Path, begin: usize, end: usize) -> usize {
        let Some(ranges) = self.parents.get_mut(parent) else {
            return 0;
        };
        let removed = ranges.remove_range(begin, end);
        if ranges.is_empty() {
            self.parents.remove(parent);
        }
        removed
    }

    /// Returns `true` if `path` is stored.
    pub fn contains(&self, path: &Path) -> bool {
        let Some(leaf) = path.leaf() else {
            return false;
        };
        self.parents
            .get(&path.parent())
            .is_some_and(|ranges| ranges.contains(leaf))
    }

    /// The ranges stored under `parent`.
    pub fn ranges(&self, parent: &Path) -> Option<&IndexRanges> {
        self.parents.get(parent)
    }

    /// Parent paths that hold at least one stored child, in path order.
    pub fn parents(&self) -> impl Iterator<Item = &Path> + '_ {
        self.parents.keys()
    }

    /// Iterates stored paths in parent-key order, then ascending index.
    pub fn iter(&self) -> impl Iterator<Item = Path> + '_ {
        self.parents
            .iter()
            .flat_map(|(parent, ranges)| ranges.indices().map(|i| parent.with_child(i)))
    }

    /// Collects [`iter`](Self::iter).
    pub fn paths(&self) -> Vec<Path> {
        self.iter().collect()
    }

    /// The first path in enumeration order.
    pub fn first(&self) -> Option<Path> {
        self.parents
            .iter()
            .find_map(|(parent, ranges)| ranges.first().map(|i| parent.with_child(i)))
    }

    /// Returns `true` if any stored path lies strictly below `path`.
    pub fn has_descendants(&self, path: &Path) -> bool {
        self.descendant_keys(path).next().is_some()
    }

    /// Stored paths strictly below `path`.
    pub fn descendants_of(&self, path: &Path) -> Vec<Path> {
        self.descendant_keys(path)
            .flat_map(|key| {
                let ranges = &self.parents[key];
                ranges.indices().map(move |i| key.with_child(i))
            })
            .collect()
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.parents.clear();
    }

    /// Shifts stored paths for `count` siblings inserted at `index` under
    /// `parent`.
    pub fn insert_gap(&mut self, parent: &Path, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        if let Some(ranges) = self.parents.get_mut(parent) {
            ranges.insert_gap(index, count);
        }
        let moved: Vec<Path> = self
            .strict_descendant_keys(parent)
            .filter(|key| key.get(parent.len()).is_some_and(|c| c >= index))
            .cloned()
            .collect();
        self.rekey(moved, |key| Some(key.adjusted_for_insert(parent, index, count)));
    }

    /// Removes the siblings `index..index + count` under `parent`, together
    /// with everything stored below them, and shifts later siblings down.
    ///
    /// Returns the removed paths in their pre-removal numbering, sorted.
    pub fn remove_span(&mut self, parent: &Path, index: usize, count: usize) -> Vec<Path> {
        let mut removed = self.detach(parent, index, count);
        if count == 0 {
            return removed;
        }
        if let Some(ranges) = self.parents.get_mut(parent) {
            // The span is already empty; this only closes the hole.
            ranges.remove_span(index, count);
            if ranges.is_empty() {
                self.parents.remove(parent);
            }
        }
        let moved: Vec<Path> = self
            .strict_descendant_keys(parent)
            .filter(|key| key.get(parent.len()).is_some_and(|c| c >= index + count))
            .cloned()
            .collect();
        self.rekey(moved, |key| key.adjusted_for_remove(parent, index, count));
        removed.sort();
        removed
    }

    /// Removes the siblings `index..index + count` under `parent` and
    /// everything stored below them, leaving later siblings in place.
    pub fn detach(&mut self, parent: &Path, index: usize, count: usize) -> Vec<Path> {
        if count == 0 {
            return Vec::new();
        }
        let last = index + count - 1;
        let mut removed = Vec::new();
        if let Some(ranges) = self.parents.get_mut(parent) {
            removed.extend(
                ranges
                    .indices()
                    .skip_while(|&i| i < index)
                    .take_while(|&i| i <= last)
                    .map(|i| parent.with_child(i)),
            );
            ranges.remove_range(index, last);
            if ranges.is_empty() {
                self.parents.remove(parent);
            }
        }
        let doomed: Vec<Path> = self
            .strict_descendant_keys(parent)
            .filter(|key| key.is_within(parent, index, count))
            .cloned()
            .collect();
        for key in doomed {
            if let Some(ranges) = self.parents.remove(&key) {
                removed.extend(ranges.indices().map(|i| key.with_child(i)));
            }
        }
        removed.sort();
        removed
    }

    /// Removes everything stored strictly below `parent`.
    pub fn clear_below(&mut self, parent: &Path) -> Vec<Path> {
        let mut keys: Vec<Path> = self.strict_descendant_keys(parent).cloned().collect();
        if self.parents.contains_key(parent) {
            keys.push(parent.clone());
        }
        let mut removed = Vec::new();
        for key in keys {
            if let Some(ranges) = self.parents.remove(&key) {
                removed.extend(ranges.indices().map(|i| key.with_child(i)));
            }
        }
        removed.sort();
        removed
    }

    /// Keys equal to or below `path`.
    fn descendant_keys<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Path> + 'a {
        self.parents
            .range(path.clone()..)
            .map(|(key, _)| key)
            .take_while(move |key| key.starts_with(path))
    }

    /// Keys strictly below `path`.
    fn strict_descendant_keys<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Path> + 'a {
        self.descendant_keys(path).filter(move |key| key.len() > path.len())
    }

    fn rekey<F>(&mut self, keys: Vec<Path>, adjust: F)
    where
        F: Fn(&Path) -> Option<Path>,
    {
        let mut moved = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(ranges) = self.parents.remove(&key) {
                if let Some(new_key) = adjust(&key) {
                    moved.push((new_key, ranges));
                }
            }
        }
        for (key, ranges) in moved {
            self.parents.insert(key, ranges);
        }
    }
}
