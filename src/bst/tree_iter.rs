use super::node::Arena;
use super::NodeId;

/// Iterate over the entries of a tree in ascending key order, by following successors
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    next: Option<NodeId>,
    len: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(arena: &'a Arena<K, V>, root: Option<NodeId>) -> Self {
        Iter {
            arena,
            next: root.map(|root| arena.min_descendant(root)),
            len: arena.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let id = self.next?;
        self.next = arena.successor(id);
        self.len -= 1;
        let node = &arena[id];
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> std::iter::FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            arena: self.arena,
            next: self.next,
            len: self.len,
        }
    }
}
