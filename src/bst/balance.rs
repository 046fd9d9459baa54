use super::*;

/// A self-balancing strategy, run by a [`Tree`] after each insertion or deletion.
///
/// `path` lists the nodes from the root down to the deepest node whose subtree changed,
/// each element being the parent of the next. An implementation must:
/// 1. recompute the height of every node in `path`, bottom-up, up to the root
/// 2. restore its balance condition, attaching rotated subtrees with [`Arena::replace_child`]
/// 3. return the node now sitting where `path[0]` was (the new root), or `None` for an empty path
///
/// The height of the tree must stay logarithmic in its size, and in any case below [`MAX_HEIGHT`]
pub trait Balance {
    fn rebalance<K, V>(arena: &mut Arena<K, V>, path: &[NodeId]) -> Option<NodeId>;
}

/// Height-balanced strategy (AVL): the subtrees of any node differ in height by at most one
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Avl;

impl Balance for Avl {
    fn rebalance<K, V>(arena: &mut Arena<K, V>, path: &[NodeId]) -> Option<NodeId> {
        let mut subtree_root = None;
        for (depth, &id) in path.iter().enumerate().rev() {
            let new_id = balance_node(arena, id);
            if new_id != id {
                let parent = depth.checked_sub(1).map(|depth| path[depth]);
                arena.replace_child(parent, id, Some(new_id));
            }
            subtree_root = Some(new_id);
        }
        subtree_root
    }
}

/// Fix the height of `id` and rotate it if needed.
/// Return the root of the balanced subtree
fn balance_node<K, V>(arena: &mut Arena<K, V>, id: NodeId) -> NodeId {
    arena.update_height(id);
    let balance = arena.balance_factor(id);

    if balance > 1 {
        // Small side too tall: a small-large grandchild needs a double rotation
        if let Some(small) = arena[id].small_child() {
            if arena.balance_factor(small) < 0 {
                let new_small = arena.rotate_left(small);
                arena.set_child(id, Side::Small, Some(new_small));
            }
        }
        arena.rotate_right(id)
    } else if balance < -1 {
        if let Some(large) = arena[id].large_child() {
            if arena.balance_factor(large) > 0 {
                let new_large = arena.rotate_right(large);
                arena.set_child(id, Side::Large, Some(new_large));
            }
        }
        arena.rotate_left(id)
    } else {
        id
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::NaturalOrder;

    /// Only keeps heights up to date: the tree degrades into a list on sorted input
    #[derive(Debug, Default, Copy, Clone)]
    struct HeightsOnly;

    impl Balance for HeightsOnly {
        fn rebalance<K, V>(arena: &mut Arena<K, V>, path: &[NodeId]) -> Option<NodeId> {
            for &id in path.iter().rev() {
                arena.update_height(id);
            }
            path.first().copied()
        }
    }

    fn helper_root_key(keys: &[i32]) -> (i32, i32) {
        let mut tree = Tree::new();
        for &key in keys {
            tree.insert(key, ());
        }
        tree.validate();
        let root = tree.root_node().unwrap();
        (*root.key(), root.height())
    }

    #[test]
    fn single_rotations() {
        assert_eq!(helper_root_key(&[3, 2, 1]), (2, 1));
        assert_eq!(helper_root_key(&[1, 2, 3]), (2, 1));
    }

    #[test]
    fn double_rotations() {
        assert_eq!(helper_root_key(&[3, 1, 2]), (2, 1));
        assert_eq!(helper_root_key(&[1, 3, 2]), (2, 1));
    }

    #[test]
    fn ascending_insertions_build_a_perfect_tree() {
        let keys = (0..1023).collect::<Vec<_>>();
        assert_eq!(helper_root_key(&keys), (511, 9));
    }

    #[test]
    fn strategy_is_pluggable() {
        let mut tree: Tree<i32, (), NaturalOrder, HeightsOnly> =
            Tree::with_comparator(NaturalOrder);
        for key in 0..10 {
            tree.insert(key, ());
        }
        assert_eq!(tree.height(), 9);
        assert_eq!(*tree.root_node().unwrap().key(), 0);
        assert_eq!(
            tree.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
            (0..10).collect::<Vec<_>>()
        );

        assert_eq!(tree.delete(&0), Some(()));
        assert_eq!(*tree.root_node().unwrap().key(), 1);
        assert_eq!(tree.height(), 8);
    }
}
