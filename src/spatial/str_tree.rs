//! Sort-Tile-Recursive packed spatial tree.
//!
//! A bulk-loaded R-tree in the STR style: items are tiled into vertical
//! slices by x, packed into capacity-sized nodes by y, and the packing
//! repeats level by level. The overlay's batch union consumes the tree
//! purely through its hierarchical [`items_tree`](StrTree::items_tree) view,
//! which groups spatially close items under shared subtrees.

use crate::geom::Envelope;

/// The nested grouping of the tree's items, mirroring its node structure.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemsTree<T> {
    Item(T),
    Node(Vec<ItemsTree<T>>),
}

impl<T> ItemsTree<T> {
    /// Number of items in this subtree.
    pub fn item_count(&self) -> usize {
        match self {
            ItemsTree::Item(_) => 1,
            ItemsTree::Node(children) => children.iter().map(ItemsTree::item_count).sum(),
        }
    }
}

/// A bulk-insert spatial index with a configurable node capacity.
///
/// Inserts buffer the items; the tree structure materializes when
/// [`items_tree`](StrTree::items_tree) consumes the index.
pub struct StrTree<T> {
    node_capacity: usize,
    entries: Vec<(Envelope, T)>,
}

const DEFAULT_NODE_CAPACITY: usize = 4;

impl<T> StrTree<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_NODE_CAPACITY)
    }

    pub fn with_capacity(node_capacity: usize) -> Self {
        assert!(node_capacity > 1, "node capacity must be greater than 1");
        Self {
            node_capacity,
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, env: Envelope, item: T) {
        self.entries.push((env, item));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the packed tree and returns its nested item view (the root's
    /// children).
    pub fn items_tree(self) -> Vec<ItemsTree<T>> {
        let node_capacity = self.node_capacity;
        let mut level: Vec<(Envelope, ItemsTree<T>)> = self
            .entries
            .into_iter()
            .map(|(env, item)| (env, ItemsTree::Item(item)))
            .collect();

        if level.is_empty() {
            return Vec::new();
        }
        while level.len() > node_capacity {
            level = build_parent_level(level, node_capacity);
        }
        level.into_iter().map(|(_, node)| node).collect()
    }
}

impl<T> Default for StrTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Packs one level into parents: x-sort into vertical slices, y-sort within
/// each slice, chunk by capacity.
fn build_parent_level<T>(
    mut children: Vec<(Envelope, ItemsTree<T>)>,
    node_capacity: usize,
) -> Vec<(Envelope, ItemsTree<T>)> {
    let min_node_count = div_ceil(children.len(), node_capacity);
    let slice_count = (min_node_count as f64).sqrt().ceil() as usize;
    let slice_capacity = div_ceil(children.len(), slice_count.max(1));

    children.sort_by(|a, b| {
        a.0.center_x()
            .partial_cmp(&b.0.center_x())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut parents = Vec::new();
    let mut rest = children;
    while !rest.is_empty() {
        let take = slice_capacity.min(rest.len());
        let mut slice: Vec<_> = rest.drain(..take).collect();
        slice.sort_by(|a, b| {
            a.0.center_y()
                .partial_cmp(&b.0.center_y())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        while !slice.is_empty() {
            let take = node_capacity.min(slice.len());
            let group: Vec<_> = slice.drain(..take).collect();
            let mut env = Envelope::null();
            for (e, _) in &group {
                env.expand_to_include_envelope(e);
            }
            let node = ItemsTree::Node(group.into_iter().map(|(_, n)| n).collect());
            parents.push((env, node));
        }
    }
    parents
}

#[inline]
fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_env(x: f64, y: f64) -> Envelope {
        Envelope::new(x, x + 1.0, y, y + 1.0)
    }

    #[test]
    fn test_empty_tree() {
        let tree: StrTree<usize> = StrTree::new();
        assert!(tree.is_empty());
        assert!(tree.items_tree().is_empty());
    }

    #[test]
    fn test_few_items_stay_flat() {
        let mut tree = StrTree::with_capacity(4);
        for i in 0..3usize {
            tree.insert(unit_env(i as f64, 0.0), i);
        }
        let items = tree.items_tree();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|t| matches!(t, ItemsTree::Item(_))));
    }

    #[test]
    fn test_all_items_preserved() {
        let mut tree = StrTree::new();
        for i in 0..100usize {
            tree.insert(unit_env((i % 10) as f64 * 3.0, (i / 10) as f64 * 3.0), i);
        }
        let items = tree.items_tree();
        let total: usize = items.iter().map(ItemsTree::item_count).sum();
        assert_eq!(total, 100);
        // With capacity 4 and 100 items, the root view must be grouped.
        assert!(items.len() <= 4);
        assert!(items.iter().any(|t| matches!(t, ItemsTree::Node(_))));
    }

    #[test]
    fn test_spatially_close_items_grouped() {
        let mut tree = StrTree::with_capacity(2);
        // Two tight clusters far apart.
        tree.insert(unit_env(0.0, 0.0), 0usize);
        tree.insert(unit_env(0.5, 0.5), 1);
        tree.insert(unit_env(100.0, 100.0), 2);
        tree.insert(unit_env(100.5, 100.5), 3);
        let items = tree.items_tree();
        assert_eq!(items.len(), 2);
        let groups: Vec<Vec<usize>> = items
            .iter()
            .map(|t| match t {
                ItemsTree::Node(children) => children
                    .iter()
                    .map(|c| match c {
                        ItemsTree::Item(i) => *i,
                        _ => panic!("expected items at leaf level"),
                    })
                    .collect(),
                ItemsTree::Item(i) => vec![*i],
            })
            .collect();
        assert!(groups.contains(&vec![0, 1]));
        assert!(groups.contains(&vec![2, 3]));
    }
}
