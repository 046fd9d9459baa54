//! Binary search trees with a pluggable balancing strategy, composed into a
//! multidimensional index.
//!
//! A [`Tree`] is an ordered map whose nodes live in an arena and whose shape is
//! kept balanced by a [`Balance`] strategy ([`Avl`] by default). A [`MultiTree`]
//! chains one tree per key dimension: the entries of dimension `i` hold, as their
//! payload, the tree of dimension `i + 1`.
//!
//! ```rust
//! use multi_tree::MultiTree;
//!
//! let mut tree = MultiTree::new(2);
//! tree.insert(&[1, 2], "hello").unwrap();
//! tree.insert(&[1, 3], "my").unwrap();
//! tree.insert(&[1, 4], "name").unwrap();
//!
//! assert_eq!(tree.find_data_by_key(&[1, 3]).unwrap(), Some(&"my"));
//! assert_eq!(tree.get_max_data(), Some(&"name"));
//! ```

#[cfg(test)]
mod tests;

pub mod bst;

pub mod error;

pub mod multi_tree;

pub use bst::{Avl, Balance, NodeId, NodeRef, Tree};
pub use error::{Error, Result};
pub use multi_tree::{MultiTree, Removed};

use std::cmp::Ordering;

/// A strict total order over keys.
///
/// `Ordering::Equal`, `Ordering::Greater` and `Ordering::Less` mean, respectively,
/// that the keys are equal, that `a` is bigger than `b` and that `a` is smaller than `b`.
/// Implementations must be pure and deterministic: a tree relies on getting the same
/// answer every time it compares the same two keys.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Compare keys with their `Ord` implementation.
/// This is the default comparator, used for integer keys among others
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn natural_order() {
        assert_eq!(NaturalOrder.compare(&1, &1), Ordering::Equal);
        assert_eq!(NaturalOrder.compare(&2, &1), Ordering::Greater);
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(NaturalOrder.compare("abc", "abd"), Ordering::Less);
    }

    #[test]
    fn closure_comparator() {
        let reversed = |a: &i32, b: &i32| b.cmp(a);
        assert_eq!(reversed.compare(&2, &1), Ordering::Less);
        assert_eq!(reversed.compare(&1, &2), Ordering::Greater);
        assert_eq!(reversed.compare(&7, &7), Ordering::Equal);
    }

    #[test]
    fn float_comparator() {
        fn compare_floats(a: &f64, b: &f64) -> Ordering {
            a.partial_cmp(b).unwrap()
        }
        assert_eq!(compare_floats.compare(&0.5, &0.25), Ordering::Greater);
        assert_eq!(compare_floats.compare(&-1., &0.), Ordering::Less);
    }
}
