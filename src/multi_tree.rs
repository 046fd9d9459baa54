//! Composite-key index built as a tree of trees.
//!
//! A `MultiTree` of `D` dimensions resolves a key `(k1, ..., kD)` by looking up `k1`
//! in the first tree, whose entry holds the tree of the second dimension, and so on
//! until `kD` is found in a tree of the last dimension, which holds the data itself.
//! Intermediate trees are created on demand when inserting, and removed as soon as
//! a deletion leaves them empty.

use crate::bst::{NodeRef, Tree};
use crate::error::{Error, Result};
use crate::{Comparator, NaturalOrder};
use std::fmt;
use tracing::{debug, trace};

/// The tree of one dimension
enum Level<K, V, C> {
    /// Dimensions before the last: every entry owns the tree of the next dimension
    Inner(Tree<K, Level<K, V, C>, C>),
    /// Last dimension: entries hold the caller's data
    Bottom(Tree<K, V, C>),
}

impl<K, V, C> Level<K, V, C> {
    /// Empty tree heading a chain of `dimensions` trees
    fn empty(dimensions: usize, comparator: C) -> Self {
        if dimensions > 1 {
            Level::Inner(Tree::with_comparator(comparator))
        } else {
            Level::Bottom(Tree::with_comparator(comparator))
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Level::Inner(tree) => tree.is_empty(),
            Level::Bottom(tree) => tree.is_empty(),
        }
    }

    /// Number of data entries reachable from this tree
    fn count(&self) -> usize {
        match self {
            Level::Inner(tree) => tree.iter().map(|(_, level)| level.count()).sum(),
            Level::Bottom(tree) => tree.len(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Level<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Inner(tree) => tree.fmt(f),
            Level::Bottom(tree) => tree.fmt(f),
        }
    }
}

/// What a successful delete takes out of a `MultiTree`
pub enum Removed<K, V, C = NaturalOrder> {
    /// The data of a full-length key
    Data(V),
    /// Everything under a key prefix, as a tree of the remaining dimensions
    Subtree(MultiTree<K, V, C>),
}

impl<K, V, C> Removed<K, V, C> {
    pub fn into_data(self) -> Option<V> {
        match self {
            Removed::Data(data) => Some(data),
            Removed::Subtree(_) => None,
        }
    }

    pub fn into_subtree(self) -> Option<MultiTree<K, V, C>> {
        match self {
            Removed::Data(_) => None,
            Removed::Subtree(subtree) => Some(subtree),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Removed<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Removed::Data(data) => f.debug_tuple("Data").field(data).finish(),
            Removed::Subtree(subtree) => f.debug_tuple("Subtree").field(subtree).finish(),
        }
    }
}

/// Entry detached from some tree while deleting
enum Detached<K, V, C> {
    Data(V),
    Level(Level<K, V, C>),
}

/// A map from composite keys of a fixed number of components to values of type `V`.
///
/// Every component is ordered by the same comparator `C`, and composite keys are
/// ordered lexicographically. To store entries without data, use `V = Option<T>`:
/// lookups answer `None` for a missing key and `Some(&None)` for a key without data.
pub struct MultiTree<K, V, C = NaturalOrder> {
    dimensions: usize,
    comparator: C,
    root: Level<K, V, C>,
    len: usize,
}

impl<K: Ord, V> MultiTree<K, V> {
    /// Create an empty tree whose key components are ordered by `K: Ord`.
    /// Panics if `dimensions` is zero
    pub fn new(dimensions: usize) -> Self {
        MultiTree::with_comparator(dimensions, NaturalOrder)
    }
}

impl<K, V, C: Clone> MultiTree<K, V, C> {
    /// Create an empty tree whose key components are ordered by `comparator`.
    /// Panics if `dimensions` is zero
    pub fn with_comparator(dimensions: usize, comparator: C) -> Self {
        assert!(dimensions > 0, "A MultiTree needs at least one dimension");
        MultiTree {
            dimensions,
            root: Level::empty(dimensions, comparator.clone()),
            comparator,
            len: 0,
        }
    }
}

impl<K, V, C> MultiTree<K, V, C> {
    /// Number of components of every full key
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Return the number of data entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Return the node holding the smallest composite key, or `None` if the tree is empty
    pub fn get_min_node(&self) -> Option<NodeRef<K, V>> {
        let mut level = &self.root;
        loop {
            match level {
                Level::Inner(tree) => level = tree.get_min_node()?.value(),
                Level::Bottom(tree) => return tree.get_min_node(),
            }
        }
    }

    /// Return the node holding the largest composite key, or `None` if the tree is empty
    pub fn get_max_node(&self) -> Option<NodeRef<K, V>> {
        let mut level = &self.root;
        loop {
            match level {
                Level::Inner(tree) => level = tree.get_max_node()?.value(),
                Level::Bottom(tree) => return tree.get_max_node(),
            }
        }
    }

    pub fn get_min_data(&self) -> Option<&V> {
        self.get_min_node().map(|node| node.value())
    }

    pub fn get_max_data(&self) -> Option<&V> {
        self.get_max_node().map(|node| node.value())
    }

    fn check_full_key(&self, key: &[K]) -> Result<()> {
        if key.len() == self.dimensions {
            Ok(())
        } else {
            debug!(
                len = key.len(),
                dimensions = self.dimensions,
                "rejecting composite key"
            );
            Err(Error::KeyLength {
                len: key.len(),
                expected: self.dimensions,
            })
        }
    }
}

impl<K, V, C: Comparator<K> + Clone> MultiTree<K, V, C> {
    /// Insert `data` under the full-length composite `key`, creating the trees of the
    /// missing dimensions along the way.
    /// If the key was already present, its data is replaced and the previous one returned
    pub fn insert(&mut self, key: &[K], data: V) -> Result<Option<V>>
    where
        K: Clone,
    {
        self.check_full_key(key)?;

        let comparator = &self.comparator;
        let mut level = &mut self.root;
        for (dimension, component) in key.iter().enumerate() {
            level = match level {
                Level::Inner(tree) => {
                    let remaining = self.dimensions - dimension - 1;
                    tree.get_or_insert_with(component.clone(), || {
                        trace!(dimension = dimension + 1, "creating sub-tree");
                        Level::empty(remaining, comparator.clone())
                    })
                }
                Level::Bottom(tree) => {
                    let previous = tree.insert(component.clone(), data);
                    if previous.is_none() {
                        self.len += 1;
                    }
                    return Ok(previous);
                }
            };
        }
        unreachable!("the last dimension always holds a bottom tree")
    }

    /// Delete everything under `key`, which can be any non-empty prefix of a full key.
    ///
    /// A full-length key removes a single entry and gives back its data; a shorter key
    /// detaches the whole sub-tree under that prefix. Return `Ok(None)`, leaving the tree
    /// untouched, if nothing is stored under `key`. Trees emptied by the deletion are
    /// removed from their parent dimension
    pub fn delete(&mut self, key: &[K]) -> Result<Option<Removed<K, V, C>>> {
        if key.is_empty() || key.len() > self.dimensions {
            debug!(
                len = key.len(),
                dimensions = self.dimensions,
                "rejecting composite key prefix"
            );
            return Err(Error::PrefixLength {
                len: key.len(),
                dimensions: self.dimensions,
            });
        }

        let removed = match remove_from(&mut self.root, key) {
            None => return Ok(None),
            Some(Detached::Data(data)) => {
                self.len -= 1;
                Removed::Data(data)
            }
            Some(Detached::Level(root)) => {
                let subtree = MultiTree {
                    dimensions: self.dimensions - key.len(),
                    comparator: self.comparator.clone(),
                    len: root.count(),
                    root,
                };
                trace!(
                    prefix_len = key.len(),
                    entries = subtree.len,
                    "detached sub-tree"
                );
                self.len -= subtree.len;
                Removed::Subtree(subtree)
            }
        };
        Ok(Some(removed))
    }

    /// Return the node holding the full-length composite `key`, if present
    pub fn find_node_by_key(&self, key: &[K]) -> Result<Option<NodeRef<K, V>>> {
        self.check_full_key(key)?;

        let mut level = &self.root;
        for component in key {
            match level {
                Level::Inner(tree) => match tree.find_data_by_key(component) {
                    Some(next) => level = next,
                    None => return Ok(None),
                },
                Level::Bottom(tree) => return Ok(tree.find_node_by_key(component)),
            }
        }
        Ok(None)
    }

    /// Return the data stored under the full-length composite `key`, if present
    pub fn find_data_by_key(&self, key: &[K]) -> Result<Option<&V>> {
        Ok(self.find_node_by_key(key)?.map(|node| node.value()))
    }

    pub fn find_data_mut(&mut self, key: &[K]) -> Result<Option<&mut V>> {
        self.check_full_key(key)?;

        let mut level = &mut self.root;
        for component in key {
            level = match level {
                Level::Inner(tree) => match tree.find_data_mut(component) {
                    Some(next) => next,
                    None => return Ok(None),
                },
                Level::Bottom(tree) => return Ok(tree.find_data_mut(component)),
            };
        }
        Ok(None)
    }
}

/// Remove `key` from the trees under `level`, pruning on the way back up every entry
/// whose sub-tree became empty
fn remove_from<K, V, C>(level: &mut Level<K, V, C>, key: &[K]) -> Option<Detached<K, V, C>>
where
    C: Comparator<K>,
{
    let (first, rest) = key.split_first()?;
    match level {
        Level::Bottom(tree) if rest.is_empty() => tree.delete(first).map(Detached::Data),
        Level::Bottom(_) => None,
        Level::Inner(tree) if rest.is_empty() => tree.delete(first).map(Detached::Level),
        Level::Inner(tree) => {
            let child = tree.find_data_mut(first)?;
            let detached = remove_from(child, rest)?;
            if child.is_empty() {
                trace!(remaining_dimensions = rest.len(), "pruning emptied sub-tree");
                tree.delete(first);
            }
            Some(detached)
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for MultiTree<K, V, C> {
    /// Nested ordered maps, one level per dimension
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

#[cfg(test)]
impl<K, V, C: Comparator<K>> Level<K, V, C> {
    fn validate(&self, dimensions: usize) {
        match self {
            Level::Inner(tree) => {
                assert!(dimensions > 1, "inner tree at the last dimension");
                tree.validate();
                for (_, child) in tree.iter() {
                    assert!(!child.is_empty(), "empty sub-tree left behind");
                    child.validate(dimensions - 1);
                }
            }
            Level::Bottom(tree) => {
                assert_eq!(dimensions, 1, "bottom tree above the last dimension");
                tree.validate();
            }
        }
    }
}

#[cfg(test)]
impl<K, V, C: Comparator<K>> MultiTree<K, V, C> {
    /// Validate every tree of every dimension.
    /// Panics if any of them is not a valid AVL tree or if the shape is inconsistent
    pub(crate) fn validate(&self) {
        self.root.validate(self.dimensions);
        assert_eq!(self.root.count(), self.len, "stale entry count");
    }
}
