use tinyvec::TinyVec;
use tracing::debug;

use crate::error::{NeighborError, Result};
use crate::indices::Indices;
use crate::kdtree::heap::{BestK, Collector, WithinRadius};
use crate::kdtree::result::{pack_dense, pack_ragged, DenseNeighbors, RaggedNeighbors};
use crate::kdtree::traversal::NodeRef;
use crate::kdtree::{KDTree, KDTreeMetadata, Node};
use crate::metric::Metric;
use crate::points::PointSetView;
use crate::r#type::IndexableNum;

/// A trait for searching and accessing data out of a KDTree.
///
/// All batch searches validate their arguments before doing any work, and run each query point
/// independently, in parallel when the `rayon` feature is enabled. Every mode reports true
/// distances (Euclidean, not squared, for [`Metric::L2`]) and orders each query's neighbors by
/// ascending distance with ties broken by ascending point index.
pub trait KDTreeIndex<N: IndexableNum>: Sized + Sync {
    /// The point set this tree was built over
    fn points(&self) -> PointSetView<'_, N>;

    /// The point-index permutation; every leaf owns a contiguous range of it
    fn indices(&self) -> Indices<'_>;

    /// The flat node array, root first
    fn nodes(&self) -> &[Node<N>];

    /// The flat bounding box array, `2 * dim` values per node
    fn boxes(&self) -> &[N];

    /// Access the metadata describing this KDTree
    fn metadata(&self) -> &KDTreeMetadata;

    /// The number of items in this KDTree
    fn num_items(&self) -> u32 {
        self.metadata().num_items()
    }

    /// The point dimension of this KDTree
    fn dim(&self) -> usize {
        self.metadata().dim()
    }

    /// The node size of this KDTree
    fn node_size(&self) -> u16 {
        self.metadata().node_size()
    }

    /// The distance metric of this KDTree
    fn metric(&self) -> Metric {
        self.metadata().metric()
    }

    /// The `(min, max)` corners of the bounding box of node `node`.
    fn node_box(&self, node: usize) -> (&[N], &[N]) {
        let dim = self.dim();
        self.boxes()[node * 2 * dim..(node + 1) * 2 * dim].split_at(dim)
    }

    /// Search the `k` nearest neighbors of every query point.
    ///
    /// The result has one row per query. Its width is `min(k, num_items)`: asking for more
    /// neighbors than there are points yields narrower rows rather than padding.
    ///
    /// ```
    /// use kd_neighbors::kdtree::{KDTree, KDTreeIndex};
    /// use kd_neighbors::{Metric, PointSetView};
    ///
    /// let coords = [0., 0., 1., 0., 0., 1., 5., 5.];
    /// let tree = KDTree::try_new(PointSetView::try_new(&coords, 2).unwrap(), Metric::L2).unwrap();
    ///
    /// let query = [0., 0.];
    /// let result = tree.search_knn(&PointSetView::try_new(&query, 2).unwrap(), 2).unwrap();
    /// assert_eq!(result.indices(), &[0, 1]);
    /// assert_eq!(result.distances(), &[0., 1.]);
    /// ```
    fn search_knn(&self, queries: &PointSetView<N>, k: usize) -> Result<DenseNeighbors<N>> {
        check_queries(queries, self.dim())?;
        check_count(k, "k")?;

        let num_items = self.num_items() as usize;
        let width = k.min(num_items);
        debug!(num_queries = queries.num_points(), k, width, "knn search");
        pack_dense(queries.num_points(), width, |q| {
            let mut best = BestK::new(width, num_items);
            traverse(self, queries.point(q), &mut best);
            best.into_sorted_vec()
        })
    }

    /// Search all neighbors within a per-query radius: query `i` uses `radii[i]`.
    ///
    /// Radii must be non-negative and the bound is inclusive. A query with no neighbors gets an
    /// empty row.
    fn search_radius(&self, queries: &PointSetView<N>, radii: &[N]) -> Result<RaggedNeighbors<N>> {
        check_queries(queries, self.dim())?;
        check_radii(radii, queries.num_points())?;

        let result = pack_ragged(queries.num_points(), |q| {
            let mut within = WithinRadius::new(radii[q]);
            traverse(self, queries.point(q), &mut within);
            within.into_sorted_vec()
        });
        debug!(
            num_queries = queries.num_points(),
            num_neighbors = result.len(),
            "radius search"
        );
        Ok(result)
    }

    /// Search all neighbors within the same `radius` of every query point.
    ///
    /// ```
    /// use kd_neighbors::kdtree::{KDTree, KDTreeIndex};
    /// use kd_neighbors::{Metric, PointSetView};
    ///
    /// let coords = [0., 0., 1., 0., 0., 1., 5., 5.];
    /// let tree = KDTree::try_new(PointSetView::try_new(&coords, 2).unwrap(), Metric::L2).unwrap();
    ///
    /// let query = [0., 0.];
    /// let result = tree
    ///     .search_fixed_radius(&PointSetView::try_new(&query, 2).unwrap(), 1.0)
    ///     .unwrap();
    /// assert_eq!(result.indices(), &[0, 1, 2]);
    /// assert_eq!(result.row_splits(), &[0, 3]);
    /// ```
    fn search_fixed_radius(
        &self,
        queries: &PointSetView<N>,
        radius: N,
    ) -> Result<RaggedNeighbors<N>> {
        check_queries(queries, self.dim())?;
        check_radius(radius)?;

        let result = pack_ragged(queries.num_points(), |q| {
            let mut within = WithinRadius::new(radius);
            traverse(self, queries.point(q), &mut within);
            within.into_sorted_vec()
        });
        debug!(
            num_queries = queries.num_points(),
            radius = ?radius,
            num_neighbors = result.len(),
            "fixed radius search"
        );
        Ok(result)
    }

    /// Search at most `max_knn` nearest neighbors within `radius` of every query point.
    ///
    /// Every row has exactly `max_knn` slots; slots beyond the neighbors found hold
    /// [`SENTINEL_INDEX`][crate::kdtree::SENTINEL_INDEX] and `+infinity`. Fails with
    /// [`NeighborError::Internal`] when the output rows cannot be allocated.
    fn hybrid_search(
        &self,
        queries: &PointSetView<N>,
        radius: N,
        max_knn: usize,
    ) -> Result<DenseNeighbors<N>> {
        check_queries(queries, self.dim())?;
        check_radius(radius)?;
        check_count(max_knn, "max_knn")?;

        debug!(
            num_queries = queries.num_points(),
            radius = ?radius,
            max_knn,
            "hybrid search"
        );
        let num_items = self.num_items() as usize;
        pack_dense(queries.num_points(), max_knn, |q| {
            let mut best = BestK::within(max_knn, num_items, radius);
            traverse(self, queries.point(q), &mut best);
            best.into_sorted_vec()
        })
    }

    /// Access the root node of the KDTree for manual traversal.
    fn root(&self) -> NodeRef<'_, N, Self> {
        NodeRef::from_root(self)
    }
}

impl<N: IndexableNum> KDTreeIndex<N> for KDTree<'_, N> {
    fn points(&self) -> PointSetView<'_, N> {
        self.points
    }

    fn indices(&self) -> Indices<'_> {
        self.indices.as_indices()
    }

    fn nodes(&self) -> &[Node<N>] {
        &self.nodes
    }

    fn boxes(&self) -> &[N] {
        &self.boxes
    }

    fn metadata(&self) -> &KDTreeMetadata {
        &self.metadata
    }
}

/// Branch-and-bound descent from the root, feeding every point of every leaf that may still
/// matter into `collector`.
///
/// Children are visited nearer box first. A subtree is skipped once the distance to its box
/// exceeds the collector's bound, which is re-read when the subtree is popped since it may have
/// tightened in the meantime.
pub(crate) fn traverse<N, T, C>(tree: &T, query: &[N], collector: &mut C)
where
    N: IndexableNum,
    T: KDTreeIndex<N>,
    C: Collector<N>,
{
    let nodes = tree.nodes();
    if nodes.is_empty() {
        return;
    }
    let points = tree.points();
    let indices = tree.indices();
    let metric = tree.metric();
    let box_dist = |node: usize| {
        let (min, max) = tree.node_box(node);
        metric.distance_to_box(query, min, max)
    };

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[(usize, N); 64]> = TinyVec::new();
    stack.push((0, box_dist(0)));

    while let Some((node, dist)) = stack.pop() {
        if dist > collector.bound() {
            continue;
        }

        match nodes[node] {
            Node::Leaf { start, end } => {
                for pos in start..end {
                    let index = indices.get(pos);
                    collector.offer(index, metric.distance(query, points.point(index)));
                }
            }
            Node::Split { left, right, .. } => {
                let left = (left, box_dist(left));
                let right = (right, box_dist(right));
                let (near, far) = if left.1 <= right.1 {
                    (left, right)
                } else {
                    (right, left)
                };

                // Note: pushed in backwards order to what gets popped
                let bound = collector.bound();
                if far.1 <= bound {
                    stack.push(far);
                }
                if near.1 <= bound {
                    stack.push(near);
                }
            }
        }
    }
}

pub(crate) fn check_queries<N: IndexableNum>(queries: &PointSetView<N>, dim: usize) -> Result<()> {
    if queries.dim() != dim {
        return Err(NeighborError::invalid(format!(
            "query dimension {} does not match index dimension {}",
            queries.dim(),
            dim
        )));
    }
    queries.check_finite("query")
}

pub(crate) fn check_count(count: usize, name: &str) -> Result<()> {
    if count < 1 {
        return Err(NeighborError::invalid(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(())
}

pub(crate) fn check_radius<N: IndexableNum>(radius: N) -> Result<()> {
    if radius.is_nan() || radius < N::zero() {
        return Err(NeighborError::invalid(format!(
            "radius must be non-negative, got {:?}",
            radius
        )));
    }
    Ok(())
}

pub(crate) fn check_radii<N: IndexableNum>(radii: &[N], num_queries: usize) -> Result<()> {
    if radii.len() != num_queries {
        return Err(NeighborError::invalid(format!(
            "got {} radii for {} queries",
            radii.len(),
            num_queries
        )));
    }
    radii.iter().try_for_each(|&radius| check_radius(radius))
}
