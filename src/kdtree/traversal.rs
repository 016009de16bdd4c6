//! Utilities to traverse the KDTree structure.

use std::marker::PhantomData;

use crate::kdtree::{KDTreeIndex, Node};
use crate::r#type::IndexableNum;

/// A node in the KDTree, borrowed for manual traversal.
#[derive(Debug, Clone)]
pub struct NodeRef<'a, N: IndexableNum, T: KDTreeIndex<N>> {
    /// The tree that this node is a reference onto
    tree: &'a T,

    /// Position of this node in the tree's node array
    id: usize,

    phantom: PhantomData<N>,
}

impl<'a, N: IndexableNum, T: KDTreeIndex<N>> NodeRef<'a, N, T> {
    pub(crate) fn from_root(tree: &'a T) -> Self {
        Self::new(tree, 0)
    }

    fn new(tree: &'a T, id: usize) -> Self {
        Self {
            tree,
            id,
            phantom: PhantomData,
        }
    }

    /// The underlying node.
    pub fn node(&self) -> &'a Node<N> {
        &self.tree.nodes()[self.id]
    }

    /// The child node representing the "left" half, or `None` for a leaf.
    pub fn left_child(&self) -> Option<NodeRef<'a, N, T>> {
        match *self.node() {
            Node::Split { left, .. } => Some(Self::new(self.tree, left)),
            Node::Leaf { .. } => None,
        }
    }

    /// The child node representing the "right" half, or `None` for a leaf.
    pub fn right_child(&self) -> Option<NodeRef<'a, N, T>> {
        match *self.node() {
            Node::Split { right, .. } => Some(Self::new(self.tree, right)),
            Node::Leaf { .. } => None,
        }
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.node(), Node::Leaf { .. })
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The lower corner of the bounding box of every point under this node.
    pub fn min(&self) -> &'a [N] {
        self.tree.node_box(self.id).0
    }

    /// The upper corner of the bounding box of every point under this node.
    pub fn max(&self) -> &'a [N] {
        self.tree.node_box(self.id).1
    }

    /// The point indices held by this node if it is a leaf; empty for intermediate nodes.
    pub fn point_indices(&self) -> Vec<usize> {
        match *self.node() {
            Node::Leaf { start, end } => {
                let indices = self.tree.indices();
                (start..end).map(|pos| indices.get(pos)).collect()
            }
            Node::Split { .. } => vec![],
        }
    }
}
