use crate::error::Result;
use crate::indices::IndexBuffer;
use crate::kdtree::KDTreeBuilder;
use crate::metric::Metric;
use crate::points::{BoundingBox, PointSetView};
use crate::r#type::IndexableNum;

/// Common metadata to describe a KDTree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KDTreeMetadata {
    pub(crate) num_items: u32,
    pub(crate) dim: usize,
    pub(crate) node_size: u16,
    pub(crate) num_nodes: usize,
    pub(crate) metric: Metric,
}

impl KDTreeMetadata {
    /// The number of points in the tree.
    pub fn num_items(&self) -> u32 {
        self.num_items
    }

    /// The dimension of every point, and of every query against this tree.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The largest number of points held by a leaf.
    pub fn node_size(&self) -> u16 {
        self.node_size
    }

    /// The number of nodes, internal and leaf.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// The metric that distances and pruning bounds are computed with.
    pub fn metric(&self) -> Metric {
        self.metric
    }
}

/// One node of the tree.
///
/// Nodes are stored in a flat array with the root at position 0. Child links are positions in
/// that array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<N: IndexableNum> {
    /// An internal node. Points of the left subtree have `coord[axis] <= value`, points of the
    /// right subtree have `coord[axis] >= value`.
    Split {
        /// The coordinate axis compared at this node
        axis: usize,
        /// The median coordinate on `axis`
        value: N,
        /// Position of the left child
        left: usize,
        /// Position of the right child
        right: usize,
    },
    /// A leaf owning the range `start..end` of the point-index permutation.
    Leaf {
        /// First permutation position of this leaf
        start: usize,
        /// One past the last permutation position of this leaf
        end: usize,
    },
}

/// An immutable k-d tree over a borrowed point set.
///
/// The tree owns only its nodes, their bounding boxes, and a permutation of point indices;
/// coordinates are read through the [`PointSetView`] it was built from. Usually this will be
/// created via [`KDTreeBuilder`] or [`KDTree::try_new`].
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree<'a, N: IndexableNum> {
    pub(crate) points: PointSetView<'a, N>,
    pub(crate) indices: IndexBuffer,
    pub(crate) nodes: Vec<Node<N>>,
    /// `2 * dim` values per node: the box minimum then the box maximum
    pub(crate) boxes: Vec<N>,
    pub(crate) metadata: KDTreeMetadata,
}

impl<'a, N: IndexableNum> KDTree<'a, N> {
    /// Build a tree over `points` with the default node size.
    ///
    /// Fails with [`NeighborError::InvalidArgument`][crate::NeighborError::InvalidArgument] when
    /// `points` is empty or holds a non-finite coordinate.
    pub fn try_new(points: PointSetView<'a, N>, metric: Metric) -> Result<Self> {
        KDTreeBuilder::new(metric).build(points)
    }

    /// The bounding box of every point in the tree.
    pub fn bbox(&self) -> BoundingBox<N> {
        let dim = self.metadata.dim;
        BoundingBox::from_parts(
            self.boxes[..dim].to_vec(),
            self.boxes[dim..2 * dim].to_vec(),
        )
    }
}
