mod balance;
mod node;
mod tree;
mod tree_iter;

pub use balance::{Avl, Balance};
pub use node::{Arena, Node, NodeRef};
pub use tree::Tree;
pub use tree_iter::Iter;

use arrayvec::ArrayVec;

// Balanced trees addressable in a 64-bit arena never get this tall
pub const MAX_HEIGHT: usize = 96;

/// Nodes visited while descending from the root, root first
pub type Path = ArrayVec<NodeId, MAX_HEIGHT>;

/// Stable handle of a node inside its tree's arena.
/// Rotations relink nodes but never move them, so a handle stays valid until its node is deleted
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which child slot of a node
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Small,
    Large,
}
