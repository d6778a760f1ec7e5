//! Randomized comparison of the incremental flat rows against a full rebuild.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{Names, TestNode, by_name, forget, init_tracing, list_at, reference_rows, source_of};
use horizon_treegrid::model::{CollectionChange, HierarchicalRows, ObservableList, RowsChanged};
use horizon_treegrid::{Path, Row, path};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct World {
    roots: ObservableList<TestNode>,
    rows: HierarchicalRows<TestNode>,
    expanded: HashSet<String>,
    sorted: bool,
    names: Names,
}

impl World {
    fn new(rng: &mut StdRng) -> Self {
        let names = Names::default();
        let roots = ObservableList::new(
            (0..rng.gen_range(1..6))
                .map(|_| random_node(rng, &names, 2))
                .collect(),
        );
        let rows = HierarchicalRows::new(source_of(&roots));
        Self {
            roots,
            rows,
            expanded: HashSet::new(),
            sorted: false,
            names,
        }
    }

    fn expected(&self) -> Vec<(String, Path, bool)> {
        let mut out = Vec::new();
        reference_rows(&self.roots, &Path::root(), &self.expanded, self.sorted, &mut out);
        out
    }

    fn actual(&self) -> Vec<(String, Path, bool)> {
        self.rows
            .rows()
            .into_iter()
            .map(|row| (row.model.name, row.path, row.is_expanded))
            .collect()
    }

    /// An expanded node whose last child went away is no longer expanded.
    fn close_if_emptied(&mut self, parent: &Path, siblings: &ObservableList<TestNode>) {
        let Some(leaf) = parent.leaf() else {
            return;
        };
        if siblings.is_empty()
            && let Some(owner) = list_at(&self.roots, &parent.parent()).get(leaf)
        {
            self.expanded.remove(&owner.name);
        }
    }

    /// Applies one random operation and returns its description.
    fn step(&mut self, rng: &mut StdRng) -> String {
        let count = self.rows.row_count();
        if count == 0 {
            let node = random_node(rng, &self.names, 1);
            let description = format!("insert {:?} into empty roots", node);
            self.roots.push(node);
            return description;
        }

        let row = self.rows.row(rng.gen_range(0..count)).expect("row in range");
        let siblings = list_at(&self.roots, &row.path.parent());
        let len = siblings.len();

        match rng.gen_range(0..10) {
            0 | 1 => {
                let was_expanded = self.expanded.contains(&row.model.name);
                let expanded = self.rows.expand(&row.path);
                let expected = was_expanded || !row.model.children.is_empty();
                assert_eq!(expanded, expected, "expand {}", row.path);
                if expanded {
                    self.expanded.insert(row.model.name.clone());
                }
                format!("expand {}", row.path)
            }
            2 => {
                self.rows.collapse(&row.path);
                forget(&row.model, &mut self.expanded);
                format!("collapse {}", row.path)
            }
            3 => {
                let index = rng.gen_range(0..=len);
                let node = random_node(rng, &self.names, 2);
                let description = format!("insert {:?} at {} under {}", node, index, row.path.parent());
                siblings.insert(index, node);
                description
            }
            4 => {
                let index = rng.gen_range(0..len);
                let take = rng.gen_range(1..=(len - index).min(3));
                let removed = siblings.remove_range(index, take);
                for node in &removed {
                    forget(node, &mut self.expanded);
                }
                self.close_if_emptied(&row.path.parent(), &siblings);
                format!("remove {}+{} under {}", index, take, row.path.parent())
            }
            5 => {
                let index = rng.gen_range(0..len);
                let node = random_node(rng, &self.names, 2);
                let old = siblings.replace(index, node);
                forget(&old, &mut self.expanded);
                format!("replace {} under {}", index, row.path.parent())
            }
            6 if len >= 2 => {
                let from = rng.gen_range(0..len);
                let to = rng.gen_range(0..len);
                if let Some(node) = siblings.get(from) {
                    if from != to {
                        forget(&node, &mut self.expanded);
                    }
                }
                siblings.move_item(from, to);
                format!("move {} -> {} under {}", from, to, row.path.parent())
            }
            7 => {
                for node in siblings.to_vec() {
                    forget(&node, &mut self.expanded);
                }
                let fresh = (0..rng.gen_range(0..4))
                    .map(|_| random_node(rng, &self.names, 1))
                    .collect();
                siblings.set_items(fresh);
                self.close_if_emptied(&row.path.parent(), &siblings);
                format!("reset under {}", row.path.parent())
            }
            8 => {
                let children = &row.model.children;
                let index = rng.gen_range(0..=children.len());
                children.insert(index, random_node(rng, &self.names, 1));
                format!("insert child {} under {}", index, row.path)
            }
            _ => {
                self.sorted = !self.sorted;
                self.rows.set_comparator(self.sorted.then(by_name));
                format!("sorted = {}", self.sorted)
            }
        }
    }
}

fn random_node(rng: &mut StdRng, names: &Names, depth: usize) -> TestNode {
    let name = names.next();
    if depth == 0 {
        return TestNode::leaf(name);
    }
    let children = (0..rng.gen_range(0..4))
        .map(|_| random_node(rng, names, depth - 1))
        .collect();
    TestNode::with_children(name, children)
}

fn run_seed(seed: u64, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = World::new(&mut rng);
    assert_eq!(world.actual(), world.expected(), "initial state, seed {}", seed);

    for step in 0..steps {
        let description = world.step(&mut rng);
        assert_eq!(
            world.actual(),
            world.expected(),
            "seed {} step {}: {}",
            seed,
            step,
            description
        );
    }
}

#[test]
fn test_random_operations_match_rebuild() {
    init_tracing();
    for seed in 0..40 {
        run_seed(seed, 150);
    }
}

#[test]
fn test_flat_events_replay_to_same_sequence() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut world = World::new(&mut rng);

    let mirror = Arc::new(Mutex::new(world.actual()));
    let mirror_clone = mirror.clone();
    world.rows.rows_changed().connect(move |event: &RowsChanged<TestNode>| {
        let mut mirror = mirror_clone.lock();
        let snapshot = |items: &[Row<TestNode>]| -> Vec<(String, Path, bool)> {
            items
                .iter()
                .map(|row| (row.model.name.clone(), row.path.clone(), row.is_expanded))
                .collect()
        };
        match &event.change {
            CollectionChange::Add { index, items } => {
                let block = snapshot(items.as_slice());
                mirror.splice(*index..*index, block);
            }
            CollectionChange::Remove { index, items } => {
                mirror.drain(*index..*index + items.len());
            }
            CollectionChange::Replace { index, new_items, .. } => {
                let block = snapshot(new_items.as_slice());
                mirror.splice(*index..*index + block.len(), block);
            }
            CollectionChange::Move {
                old_index,
                new_index,
                items,
            } => {
                let moved: Vec<_> = mirror.drain(*old_index..*old_index + items.len()).collect();
                mirror.splice(*new_index..*new_index, moved);
            }
            CollectionChange::Reset { new_items, .. } => {
                *mirror = snapshot(new_items.as_slice());
            }
        }
    });

    for _ in 0..300 {
        world.step(&mut rng);
        // Paths and expansion flags of untouched rows shift without an
        // event, so only the model order is replayed exactly.
        let names = |rows: &[(String, Path, bool)]| -> Vec<String> {
            rows.iter().map(|(name, _, _)| name.clone()).collect()
        };
        assert_eq!(names(&mirror.lock()), names(&world.actual()));
    }
}

#[test]
fn test_expand_all_then_collapse_all() {
    let mut rng = StdRng::seed_from_u64(99);
    let world = World::new(&mut rng);
    world.rows.expand_all();

    let mut every = HashSet::new();
    fn mark(list: &ObservableList<TestNode>, into: &mut HashSet<String>) {
        for node in list.to_vec() {
            if !node.children.is_empty() {
                into.insert(node.name.clone());
                mark(&node.children, into);
            }
        }
    }
    mark(&world.roots, &mut every);
    let mut expected = Vec::new();
    reference_rows(&world.roots, &Path::root(), &every, false, &mut expected);
    assert_eq!(world.actual(), expected);

    world.rows.collapse_all();
    assert_eq!(world.rows.row_count(), world.roots.len());
    assert!(!world.rows.is_expanded(&path![0]));
}
