use super::node::{Arena, Node, NodeRef};
use super::*;
use crate::{Comparator, NaturalOrder};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::mem;

/// An ordered map from `K` to `V`, with keys ordered by the comparator `C` and
/// the shape kept balanced by the strategy `B`.
///
/// Inserting a key that is already present overwrites its value (the stored key is kept)
pub struct Tree<K, V, C = NaturalOrder, B = Avl> {
    arena: Arena<K, V>,
    root: Option<NodeId>,
    comparator: C,
    strategy: PhantomData<B>,
}

/// Outcome of a descent looking for a key
enum Search {
    Found(NodeId),
    /// The key is absent and would be attached at this slot (`None` for an empty tree)
    Vacant(Option<(NodeId, Side)>),
}

impl<K: Ord, V> Tree<K, V> {
    /// Create a new empty tree ordered by `K: Ord`
    pub fn new() -> Self {
        Tree::with_comparator(NaturalOrder)
    }
}

impl<K: Ord, V> Default for Tree<K, V> {
    fn default() -> Self {
        Tree::new()
    }
}

impl<K, V, C, B> Tree<K, V, C, B> {
    /// Create a new empty tree ordered by the given comparator
    pub fn with_comparator(comparator: C) -> Self {
        Tree {
            arena: Arena::new(),
            root: None,
            comparator,
            strategy: PhantomData,
        }
    }

    /// Return the number of entries in the tree
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Height of the root, -1 for an empty tree
    pub fn height(&self) -> i32 {
        self.arena.height(self.root)
    }

    pub fn root_node(&self) -> Option<NodeRef<K, V>> {
        self.root.map(|root| self.arena.node_ref(root))
    }

    /// Return the node with the smallest key, or `None` if the tree is empty
    pub fn get_min_node(&self) -> Option<NodeRef<K, V>> {
        self.root
            .map(|root| self.arena.node_ref(self.arena.min_descendant(root)))
    }

    /// Return the node with the largest key, or `None` if the tree is empty
    pub fn get_max_node(&self) -> Option<NodeRef<K, V>> {
        self.root
            .map(|root| self.arena.node_ref(self.arena.max_descendant(root)))
    }

    /// Return a sorted iterator over the entries of the tree
    pub fn iter(&self) -> Iter<K, V> {
        Iter::new(&self.arena, self.root)
    }
}

impl<K, V, C: Comparator<K>, B: Balance> Tree<K, V, C, B> {
    /// Insert a new entry into the tree.
    /// If the key was already present, its value is replaced and the previous one returned
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut path = Path::new();
        match self.search(&key, &mut path) {
            Search::Found(id) => Some(mem::replace(&mut self.arena[id].value, value)),
            Search::Vacant(slot) => {
                self.attach(slot, &path, key, value);
                None
            }
        }
    }

    /// Return the value stored under `key`, inserting the one built by `default` if absent
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let mut path = Path::new();
        let id = match self.search(&key, &mut path) {
            Search::Found(id) => id,
            Search::Vacant(slot) => self.attach(slot, &path, key, default()),
        };
        &mut self.arena[id].value
    }

    /// Remove the entry with the given key and return its value
    pub fn delete(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove the entry with the given key and return it
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let mut path = Path::new();
        let target = match self.search(key, &mut path) {
            Search::Found(id) => id,
            Search::Vacant(_) => return None,
        };

        let node = &self.arena[target];
        let removed = match (node.small, node.large) {
            (Some(_), Some(large)) => {
                // Splice out the in-order successor and move its entry into the target node
                path.push(target);
                let mut successor = large;
                while let Some(small) = self.arena[successor].small {
                    path.push(successor);
                    successor = small;
                }
                let orphan = self.arena[successor].large;
                self.arena
                    .replace_child(path.last().copied(), successor, orphan);
                if let Some((target_node, successor_node)) = self.arena.pair_mut(target, successor)
                {
                    mem::swap(&mut target_node.key, &mut successor_node.key);
                    mem::swap(&mut target_node.value, &mut successor_node.value);
                }
                successor
            }
            (child, None) | (None, child) => {
                self.arena.replace_child(path.last().copied(), target, child);
                if path.is_empty() {
                    self.root = child;
                }
                target
            }
        };

        let entry = self.arena.release(removed).into_entry();
        if let Some(root) = B::rebalance(&mut self.arena, &path) {
            self.root = Some(root);
        }
        Some(entry)
    }

    /// Return the node with the given key, or `None` if there is no such node
    pub fn find_node_by_key(&self, key: &K) -> Option<NodeRef<K, V>> {
        self.find_id(key).map(|id| self.arena.node_ref(id))
    }

    pub fn find_data_by_key(&self, key: &K) -> Option<&V> {
        self.find_id(key).map(|id| self.arena[id].value())
    }

    pub fn find_data_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find_id(key)?;
        Some(&mut self.arena[id].value)
    }

    /// Return the node with the next larger key after `key`.
    /// `None` if `key` is not in the tree or is its maximum
    pub fn get_successor_node(&self, key: &K) -> Option<NodeRef<K, V>> {
        let id = self.find_id(key)?;
        self.arena
            .successor(id)
            .map(|successor| self.arena.node_ref(successor))
    }

    fn find_id(&self, key: &K) -> Option<NodeId> {
        self.root
            .and_then(|root| self.arena.descendant(root, key, &self.comparator))
    }

    /// Walk down from the root looking for `key`, recording in `path` every node
    /// visited before the match (or before falling off the tree)
    fn search(&self, key: &K, path: &mut Path) -> Search {
        let mut slot = None;
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.arena[id];
            let side = match self.comparator.compare(key, &node.key) {
                Ordering::Equal => return Search::Found(id),
                Ordering::Less => Side::Small,
                Ordering::Greater => Side::Large,
            };
            path.push(id);
            slot = Some((id, side));
            current = node.child(side);
        }
        Search::Vacant(slot)
    }

    /// Link a new leaf at `slot` and rebalance along the path that led to it
    fn attach(&mut self, slot: Option<(NodeId, Side)>, path: &Path, key: K, value: V) -> NodeId {
        let parent = slot.map(|(parent, _)| parent);
        let id = self.arena.allocate(Node::leaf(parent, key, value));
        match slot {
            Some((parent, side)) => self.arena.set_child(parent, side, Some(id)),
            None => self.root = Some(id),
        }
        if let Some(root) = B::rebalance(&mut self.arena, path) {
            self.root = Some(root);
        }
        id
    }
}

#[cfg(test)]
impl<K, V, C: Comparator<K>> Tree<K, V, C, Avl> {
    /// Check ordering, parent links, heights, AVL balance and size.
    /// Panics if the tree is not a valid AVL tree
    pub(crate) fn validate(&self) {
        let mut count = 0;
        if let Some(root) = self.root {
            assert_eq!(self.arena[root].parent, None, "root must not have a parent");
            self.validate_node(root, None, None, &mut count);
        }
        assert_eq!(count, self.len(), "reachable nodes must match the arena");
    }

    fn validate_node(&self, id: NodeId, min: Option<&K>, max: Option<&K>, count: &mut usize) -> i32 {
        let node = &self.arena[id];
        *count += 1;
        if let Some(min) = min {
            assert_eq!(self.comparator.compare(&node.key, min), Ordering::Greater);
        }
        if let Some(max) = max {
            assert_eq!(self.comparator.compare(&node.key, max), Ordering::Less);
        }

        let small_height = self.validate_child(id, node.small, min, Some(&node.key), count);
        let large_height = self.validate_child(id, node.large, Some(&node.key), max, count);

        assert_eq!(node.height, small_height.max(large_height) + 1, "stale height");
        assert!((small_height - large_height).abs() <= 1, "node out of balance");
        node.height
    }

    fn validate_child(
        &self,
        parent: NodeId,
        child: Option<NodeId>,
        min: Option<&K>,
        max: Option<&K>,
        count: &mut usize,
    ) -> i32 {
        match child {
            None => -1,
            Some(child) => {
                assert_eq!(self.arena[child].parent, Some(parent), "broken parent link");
                self.validate_node(child, min, max, count)
            }
        }
    }
}

impl<K: Clone, V: Clone, C: Clone, B> Clone for Tree<K, V, C, B> {
    fn clone(&self) -> Self {
        Tree {
            arena: self.arena.clone(),
            root: self.root,
            comparator: self.comparator.clone(),
            strategy: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, B> fmt::Debug for Tree<K, V, C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C, B> IntoIterator for &'a Tree<K, V, C, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
