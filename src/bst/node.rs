use super::*;
use crate::Comparator;
use slab::Slab;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Height contributed by a missing child
const ABSENT_HEIGHT: i32 = -1;

/// A single entry of a tree.
/// Children are owned through the tree's arena, the parent handle is only used to walk upwards
#[derive(Clone)]
pub struct Node<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) height: i32,
    pub(super) parent: Option<NodeId>,
    pub(super) small: Option<NodeId>,
    pub(super) large: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    pub(super) fn leaf(parent: Option<NodeId>, key: K, value: V) -> Self {
        Node {
            key,
            value,
            height: 0,
            parent,
            small: None,
            large: None,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Zero for a leaf
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Root of the subtree holding the smaller keys
    pub fn small_child(&self) -> Option<NodeId> {
        self.small
    }

    /// Root of the subtree holding the larger keys
    pub fn large_child(&self) -> Option<NodeId> {
        self.large
    }

    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Small => self.small,
            Side::Large => self.large,
        }
    }

    pub(super) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Storage for all the nodes of one tree.
///
/// The arena exposes the navigation primitives shared by every tree and the structural
/// primitives (relinking, rotations, height bookkeeping) a [`Balance`] strategy is built from.
/// Every method taking a `NodeId` panics if the handle does not belong to this arena.
#[derive(Clone)]
pub struct Arena<K, V> {
    slab: Slab<Node<K, V>>,
}

impl<K, V> Arena<K, V> {
    pub(super) fn new() -> Self {
        Arena { slab: Slab::new() }
    }

    /// Return the number of live nodes
    pub fn len(&self) -> usize {
        self.slab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }

    pub(super) fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        NodeId(self.slab.insert(node))
    }

    pub(super) fn release(&mut self, id: NodeId) -> Node<K, V> {
        self.slab.remove(id.0)
    }

    /// Borrow two distinct nodes mutably at once
    pub(super) fn pair_mut(
        &mut self,
        a: NodeId,
        b: NodeId,
    ) -> Option<(&mut Node<K, V>, &mut Node<K, V>)> {
        self.slab.get2_mut(a.0, b.0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slab.get(id.0)
    }

    pub fn node_ref(&self, id: NodeId) -> NodeRef<K, V> {
        NodeRef { arena: self, id }
    }

    /// Height of an optional node: absent nodes count as -1
    pub fn height(&self, id: Option<NodeId>) -> i32 {
        id.map_or(ABSENT_HEIGHT, |id| self[id].height)
    }

    /// Recompute the height of `id` from the (already up to date) heights of its children
    pub fn update_height(&mut self, id: NodeId) {
        let node = &self[id];
        let height = self.height(node.small).max(self.height(node.large)) + 1;
        self[id].height = height;
    }

    /// Height of the small subtree minus the height of the large one
    pub fn balance_factor(&self, id: NodeId) -> i32 {
        let node = &self[id];
        self.height(node.small) - self.height(node.large)
    }

    /// Search the subtree rooted at `id` for a node with the given key
    pub fn descendant<C: Comparator<K>>(
        &self,
        id: NodeId,
        key: &K,
        comparator: &C,
    ) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = &self[current];
            let next = match comparator.compare(key, &node.key) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.small,
                Ordering::Greater => node.large,
            };
            current = next?;
        }
    }

    /// Node with the smallest key in the subtree rooted at `id` (possibly `id` itself)
    pub fn min_descendant(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(small) = self[current].small {
            current = small;
        }
        current
    }

    /// Node with the largest key in the subtree rooted at `id` (possibly `id` itself)
    pub fn max_descendant(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(large) = self[current].large {
            current = large;
        }
        current
    }

    /// Node holding the next larger key in the whole tree, if any
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(large) = self[id].large {
            return Some(self.min_descendant(large));
        }

        // Climb while coming from a large child: the first ancestor reached
        // from its small side is the successor
        let mut current = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].large != Some(current) {
                break;
            }
            current = p;
            parent = self[p].parent;
        }
        parent
    }

    /// Attach `child` (or nothing) under `parent`, fixing the child's parent handle
    pub fn set_child(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        match side {
            Side::Small => self[parent].small = child,
            Side::Large => self[parent].large = child,
        }
        if let Some(child) = child {
            self[child].parent = Some(parent);
        }
    }

    /// Put `new` in the slot of `parent` currently holding `old`.
    /// With no parent, `new` simply becomes a root
    pub fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            Some(parent) => {
                let side = if self[parent].small == Some(old) {
                    Side::Small
                } else {
                    Side::Large
                };
                self.set_child(parent, side, new);
            }
            None => {
                if let Some(new) = new {
                    self[new].parent = None;
                }
            }
        }
    }

    /// Lift the large child of `id` into its place and return it.
    /// The caller is responsible for attaching the returned node where `id` used to be
    pub fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self[id].large else {
            return id;
        };
        let inner = self[pivot].small;
        let parent = self[id].parent;

        self.set_child(id, Side::Large, inner);
        self.set_child(pivot, Side::Small, Some(id));
        self[pivot].parent = parent;

        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// Lift the small child of `id` into its place and return it.
    /// The caller is responsible for attaching the returned node where `id` used to be
    pub fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self[id].small else {
            return id;
        };
        let inner = self[pivot].large;
        let parent = self[id].parent;

        self.set_child(id, Side::Small, inner);
        self.set_child(pivot, Side::Large, Some(id));
        self[pivot].parent = parent;

        self.update_height(id);
        self.update_height(pivot);
        pivot
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.slab[id.0]
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.slab[id.0]
    }
}

/// A borrowed view of one node, able to navigate to its neighbours
pub struct NodeRef<'a, K, V> {
    arena: &'a Arena<K, V>,
    id: NodeId,
}

impl<'a, K, V> Clone for NodeRef<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for NodeRef<'a, K, V> {}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> &'a K {
        &self.arena[self.id].key
    }

    pub fn value(&self) -> &'a V {
        &self.arena[self.id].value
    }

    pub fn height(&self) -> i32 {
        self.arena[self.id].height
    }

    pub fn parent(&self) -> Option<Self> {
        self.arena[self.id].parent.map(|id| self.with_id(id))
    }

    pub fn small_child(&self) -> Option<Self> {
        self.arena[self.id].small.map(|id| self.with_id(id))
    }

    pub fn large_child(&self) -> Option<Self> {
        self.arena[self.id].large.map(|id| self.with_id(id))
    }

    pub fn min_descendant(&self) -> Self {
        self.with_id(self.arena.min_descendant(self.id))
    }

    pub fn max_descendant(&self) -> Self {
        self.with_id(self.arena.max_descendant(self.id))
    }

    /// Return the node with the next larger key, or `None` for the maximum of the tree
    pub fn successor(&self) -> Option<Self> {
        self.arena.successor(self.id).map(|id| self.with_id(id))
    }

    fn with_id(&self, id: NodeId) -> Self {
        NodeRef {
            arena: self.arena,
            id,
        }
    }
}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}
