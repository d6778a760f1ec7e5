//! Per-level ordering of sibling rows.
//!
//! [`SortableRows`] keeps one tree level's entries in display order. Without
//! a comparator, display order is source order. With one, entries are kept
//! sorted by the comparator with source order as the tie-break, and source
//! mutations are applied by binary-searching the affected entries into place
//! instead of re-sorting the level.

use std::cmp::Ordering;
use std::sync::Arc;

/// Orders two models for display.
pub type Comparator<M> = Arc<dyn Fn(&M, &M) -> Ordering + Send + Sync>;

/// One displayed sibling.
#[derive(Debug, Clone)]
pub struct SortEntry<K, M> {
    /// Caller-assigned handle for the entry.
    pub key: K,
    /// The model shown by the entry.
    pub model: M,
    /// Position of the model in its source list.
    pub source_index: usize,
}

/// The display order of one tree level.
#[derive(Debug, Clone)]
pub struct SortableRows<K, M> {
    entries: Vec<SortEntry<K, M>>,
    sorted: bool,
}

impl<K, M> Default for SortableRows<K, M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            sorted: false,
        }
    }
}

impl<K: Copy + PartialEq, M> SortableRows<K, M> {
    /// Builds a level from `(key, model)` pairs given in source order.
    pub fn new<I>(items: I, comparator: Option<&Comparator<M>>) -> Self
    where
        I: IntoIterator<Item = (K, M)>,
    {
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(source_index, (key, model))| SortEntry {
                key,
                model,
                source_index,
            })
            .collect();
        let mut rows = Self {
            entries,
            sorted: false,
        };
        rows.resort(comparator);
        rows
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the level is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a comparator currently orders this level.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Entries in display order.
    #[inline]
    pub fn entries(&self) -> &[SortEntry<K, M>] {
        &self.entries
    }

    /// Keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|entry| entry.key)
    }

    /// The entry at display position `position`.
    pub fn get(&self, position: usize) -> Option<&SortEntry<K, M>> {
        self.entries.get(position)
    }

    /// The key at display position `position`.
    pub fn key_at(&self, position: usize) -> Option<K> {
        self.entries.get(position).map(|entry| entry.key)
    }

    /// Display position of the entry for source index `source_index`.
    pub fn position_of_source(&self, source_index: usize) -> Option<usize> {
        if !self.sorted {
            // Display order is source order.
            return self
                .entries
                .get(source_index)
                .filter(|entry| entry.source_index == source_index)
                .map(|_| source_index);
        }
        self.entries
            .iter()
            .position(|entry| entry.source_index == source_index)
    }

    /// Display position of `key`.
    pub fn position_of_key(&self, key: K) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    /// Inserts an entry and returns its display position.
    ///
    /// Source indices of existing entries must already account for the
    /// insertion (see [`shift_sources`](Self::shift_sources)).
    pub fn insert(
        &mut self,
        source_index: usize,
        key: K,
        model: M,
        comparator: Option<&Comparator<M>>,
    ) -> usize {
        let position = match comparator.filter(|_| self.sorted) {
            Some(compare) => self.entries.partition_point(|entry| {
                match compare(&entry.model, &model) {
                    Ordering::Less => true,
                    Ordering::Greater => false,
                    Ordering::Equal => entry.source_index < source_index,
                }
            }),
            None => self
                .entries
                .partition_point(|entry| entry.source_index < source_index),
        };
        self.entries.insert(
            position,
            SortEntry {
                key,
                model,
                source_index,
            },
        );
        position
    }

    /// Removes the entry at display position `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    pub fn remove_at(&mut self, position: usize) -> SortEntry<K, M> {
        self.entries.remove(position)
    }

    /// Adds `delta` to every source index `>= from`.
    ///
    /// Returns the keys whose source index changed, with the new index.
    pub fn shift_sources(&mut self, from: usize, delta: isize) -> Vec<(K, usize)> {
        if delta == 0 {
            return Vec::new();
        }
        let mut shifted = Vec::new();
        for entry in self.entries.iter_mut() {
            if entry.source_index >= from {
                entry.source_index = entry.source_index.saturating_add_signed(delta);
                shifted.push((entry.key, entry.source_index));
            }
        }
        shifted
    }

    /// Reorders the level for a new comparator (or source order for `None`).
    ///
    /// Returns `true` if the display order changed.
    pub fn resort(&mut self, comparator: Option<&Comparator<M>>) -> bool {
        let before: Vec<K> = self.keys().collect();
        match comparator {
            Some(compare) => {
                self.entries.sort_by(|a, b| {
                    compare(&a.model, &b.model).then(a.source_index.cmp(&b.source_index))
                });
                self.sorted = true;
            }
            None => {
                self.entries.sort_by_key(|entry| entry.source_index);
                self.sorted = false;
            }
        }
        !self.keys().eq(before)
    }

    /// Removes every entry and returns them in display order.
    pub fn take_all(&mut self) -> Vec<SortEntry<K, M>> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascending() -> Comparator<i32> {
        Arc::new(|a: &i32, b: &i32| a.cmp(b))
    }

    fn models(rows: &SortableRows<usize, i32>) -> Vec<i32> {
        rows.entries().iter().map(|entry| entry.model).collect()
    }

    #[test]
    fn test_unsorted_keeps_source_order() {
        let rows = SortableRows::new([(0, 30), (1, 10), (2, 20)], None);
        assert_eq!(models(&rows), vec![30, 10, 20]);
        assert_eq!(rows.position_of_source(2), Some(2));
        assert!(!rows.is_sorted());
    }

    #[test]
    fn test_sorted_with_stable_ties() {
        let compare = ascending();
        let rows = SortableRows::new([(0, 2), (1, 1), (2, 2), (3, 0)], Some(&compare));
        assert_eq!(models(&rows), vec![0, 1, 2, 2]);
        let ties: Vec<usize> = rows
            .entries()
            .iter()
            .filter(|entry| entry.model == 2)
            .map(|entry| entry.source_index)
            .collect();
        assert_eq!(ties, vec![0, 2]);
        assert_eq!(rows.position_of_source(3), Some(0));
    }

    #[test]
    fn test_insert_binary_searches_position() {
        let compare = ascending();
        let mut rows = SortableRows::new([(0, 10), (1, 30)], Some(&compare));
        rows.shift_sources(1, 1);
        let position = rows.insert(1, 7, 20, Some(&compare));
        assert_eq!(position, 1);
        assert_eq!(models(&rows), vec![10, 20, 30]);
        assert_eq!(rows.position_of_key(7), Some(1));
    }

    #[test]
    fn test_insert_unsorted_uses_source_index() {
        let mut rows = SortableRows::new([(0, 5), (1, 6)], None);
        let shifted = rows.shift_sources(0, 1);
        assert_eq!(shifted, vec![(0, 1), (1, 2)]);
        assert_eq!(rows.insert(0, 9, 99, None), 0);
        assert_eq!(models(&rows), vec![99, 5, 6]);
    }

    #[test]
    fn test_resort_reports_change() {
        let compare = ascending();
        let mut rows = SortableRows::new([(0, 3), (1, 1)], None);
        assert!(rows.resort(Some(&compare)));
        assert_eq!(models(&rows), vec![1, 3]);
        assert!(!rows.resort(Some(&compare)));
        assert!(rows.resort(None));
        assert_eq!(models(&rows), vec![3, 1]);
    }
}
