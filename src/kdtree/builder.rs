use std::cmp;

use tracing::debug;

use crate::error::{NeighborError, Result};
use crate::indices::{IndexBuffer, MutableIndices};
use crate::kdtree::{KDTree, KDTreeMetadata, Node};
use crate::metric::Metric;
use crate::points::{widest_axis, PointSetView};
use crate::r#type::IndexableNum;

/// The default node size used by [`KDTreeBuilder::new`]
pub const DEFAULT_NODE_SIZE: u16 = 10;

/// A builder to create a [`KDTree`].
///
/// ```
/// use kd_neighbors::kdtree::{KDTreeBuilder, KDTreeIndex};
/// use kd_neighbors::{Metric, PointSetView};
///
/// let coords = [0., 0., 1., 0., 0., 1., 5., 5.];
/// let points = PointSetView::try_new(&coords, 2).unwrap();
/// let tree = KDTreeBuilder::new_with_node_size(Metric::L1, 2)
///     .unwrap()
///     .build(points)
///     .unwrap();
/// assert_eq!(tree.num_items(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KDTreeBuilder {
    metric: Metric,
    node_size: u16,
}

impl KDTreeBuilder {
    /// Create a new builder with the provided metric and the default node size.
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            node_size: DEFAULT_NODE_SIZE,
        }
    }

    /// Create a new builder with the provided metric and node size.
    ///
    /// The node size is the largest number of points a leaf may hold; it must be at least 1.
    pub fn new_with_node_size(metric: Metric, node_size: u16) -> Result<Self> {
        if node_size == 0 {
            return Err(NeighborError::invalid("node size must be at least 1"));
        }
        Ok(Self { metric, node_size })
    }

    /// The metric trees from this builder are searched with.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// The largest number of points per leaf.
    pub fn node_size(&self) -> u16 {
        self.node_size
    }

    /// Perform the k-d partitioning of `points` and generate a tree ready for queries.
    pub fn build<'a, N: IndexableNum>(&self, points: PointSetView<'a, N>) -> Result<KDTree<'a, N>> {
        let num_items = points.num_points();
        let dim = points.dim();
        if num_items == 0 {
            return Err(NeighborError::invalid("cannot build an index over zero points"));
        }
        let num_items_u32 = u32::try_from(num_items).map_err(|_| {
            NeighborError::invalid(format!("{} points exceed the index capacity", num_items))
        })?;
        points.check_finite("point")?;

        let node_size = self.node_size as usize;
        let mut ids = IndexBuffer::identity(num_items);
        let mut nodes: Vec<Node<N>> = Vec::with_capacity(2 * num_items.div_ceil(node_size));
        let mut boxes: Vec<N> = Vec::with_capacity(nodes.capacity() * 2 * dim);

        push_node(&mut nodes, &mut boxes, dim);

        // explicit stack of (node, start, end) so pathological inputs cannot overflow the call
        // stack
        let mut stack = vec![(0, 0, num_items)];
        while let Some((node, start, end)) = stack.pop() {
            let bounds = &mut boxes[node * 2 * dim..(node + 1) * 2 * dim];
            let (min, max) = bounds.split_at_mut(dim);
            fill_bounds(&points, &ids, start, end, min, max);

            if end - start <= node_size {
                nodes[node] = Node::Leaf { start, end };
                continue;
            }

            let axis = widest_axis(min, max);

            // the median position; [start..mid) sorts before it and [mid..end) from it onwards
            let mid = start + ((end - start) >> 1);
            select(&mut ids.as_mut_indices(), &points, axis, mid, start, end - 1);
            let value = points.coord(ids.as_indices().get(mid), axis);

            let left = push_node(&mut nodes, &mut boxes, dim);
            let right = push_node(&mut nodes, &mut boxes, dim);
            nodes[node] = Node::Split {
                axis,
                value,
                left,
                right,
            };

            // Note: pushed in backwards order to what gets popped
            stack.push((right, mid, end));
            stack.push((left, start, mid));
        }

        let metadata = KDTreeMetadata {
            num_items: num_items_u32,
            dim,
            node_size: self.node_size,
            num_nodes: nodes.len(),
            metric: self.metric,
        };
        debug!(
            num_items,
            dim,
            num_nodes = metadata.num_nodes,
            metric = ?self.metric,
            "built kd-tree"
        );

        Ok(KDTree {
            points,
            indices: ids,
            nodes,
            boxes,
            metadata,
        })
    }
}

/// Append a placeholder node with an unset box, returning its position.
fn push_node<N: IndexableNum>(nodes: &mut Vec<Node<N>>, boxes: &mut Vec<N>, dim: usize) -> usize {
    nodes.push(Node::Leaf { start: 0, end: 0 });
    boxes.resize(boxes.len() + 2 * dim, N::zero());
    nodes.len() - 1
}

/// Compute the bounding box of the points at permutation positions `start..end`.
fn fill_bounds<N: IndexableNum>(
    points: &PointSetView<N>,
    ids: &IndexBuffer,
    start: usize,
    end: usize,
    min: &mut [N],
    max: &mut [N],
) {
    min.fill(N::infinity());
    max.fill(N::neg_infinity());
    let ids = ids.as_indices();
    for pos in start..end {
        let point = points.point(ids.get(pos));
        for ((lo, hi), &c) in min.iter_mut().zip(max.iter_mut()).zip(point) {
            if c < *lo {
                *lo = c;
            }
            if c > *hi {
                *hi = c;
            }
        }
    }
}

/// The sort key of the point at permutation position `pos`: its coordinate on `axis`, with the
/// point index breaking ties.
#[inline]
fn key<N: IndexableNum>(
    ids: &MutableIndices,
    points: &PointSetView<N>,
    axis: usize,
    pos: usize,
) -> (N, usize) {
    let id = ids.get(pos);
    (points.coord(id, axis), id)
}

#[inline]
fn less<N: IndexableNum>(a: (N, usize), b: (N, usize)) -> bool {
    a.0 < b.0 || (a.0 == b.0 && a.1 < b.1)
}

/// Custom Floyd-Rivest selection algorithm: reorder ids so that positions [left..k-1] sort
/// before the k-th item and positions [k+1..right] after it.
///
/// Keys are unique because they include the point index, so the split is exact and does not
/// depend on how duplicate coordinates were ordered in the input.
fn select<N: IndexableNum>(
    ids: &mut MutableIndices,
    points: &PointSetView<N>,
    axis: usize,
    k: usize,
    mut left: usize,
    mut right: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(ids, points, axis, k, new_left, new_right);
        }

        let t = key(ids, points, axis, k);
        let mut i = left;
        let mut j = right;

        ids.swap(left, k);
        if less(t, key(ids, points, axis, right)) {
            ids.swap(left, right);
        }

        while i < j {
            ids.swap(i, j);
            i += 1;
            j -= 1;
            while less(key(ids, points, axis, i), t) {
                i += 1;
            }
            while less(t, key(ids, points, axis, j)) {
                j -= 1;
            }
        }

        if key(ids, points, axis, left) == t {
            ids.swap(left, j);
        } else {
            j += 1;
            ids.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn select_places_median_by_key() {
        // duplicate x coordinates: ties resolve by point index
        let coords = [3.0f64, 0.0, 1.0, 0.0, 3.0, 0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 0.0];
        let points = PointSetView::try_new(&coords, 2).unwrap();
        let mut ids = IndexBuffer::identity(points.num_points());
        select(&mut ids.as_mut_indices(), &points, 0, 3, 0, 6);

        let order = ids.as_indices();
        // sorted keys: (0,6) (1,1) (1,3) (2,4) (3,0) (3,2) (3,5)
        assert_eq!(order.get(3), 4);
        for pos in 0..3 {
            assert!([6, 1, 3].contains(&order.get(pos)));
        }
        for pos in 4..7 {
            assert!([0, 2, 5].contains(&order.get(pos)));
        }
    }

    #[test]
    fn select_large_range() {
        let coords: Vec<f64> = (0..2000).map(|i| ((i * 7919) % 2000) as f64).collect();
        let points = PointSetView::try_new(&coords, 1).unwrap();
        let mut ids = IndexBuffer::identity(points.num_points());
        select(&mut ids.as_mut_indices(), &points, 0, 1000, 0, 1999);

        let order = ids.as_indices();
        assert_eq!(points.coord(order.get(1000), 0), 1000.0);
        for pos in 0..1000 {
            assert!(points.coord(order.get(pos), 0) < 1000.0);
        }
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        let empty: [f64; 0] = [];
        let points = PointSetView::try_new(&empty, 2).unwrap();
        let err = KDTreeBuilder::new(Metric::L2).build(points).unwrap_err();
        assert!(matches!(err, NeighborError::InvalidArgument(_)));

        let coords = [0.0f64, f64::INFINITY];
        let points = PointSetView::try_new(&coords, 2).unwrap();
        assert!(KDTreeBuilder::new(Metric::L2).build(points).is_err());

        assert!(KDTreeBuilder::new_with_node_size(Metric::L2, 0).is_err());
    }
}
