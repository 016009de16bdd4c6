//! A nearest-neighbor search object that owns its configuration and index lifecycle.

use tracing::debug;

use crate::error::{NeighborError, Result};
use crate::kdtree::{
    check_count, check_queries, check_radii, check_radius, pack_dense, pack_ragged,
    DenseNeighbors, KDTree, KDTreeBuilder, KDTreeIndex, RaggedNeighbors,
};
use crate::metric::Metric;
use crate::points::PointSetView;
use crate::r#type::IndexableNum;

/// What has been built for the current data.
#[derive(Debug)]
enum IndexState<'a, N: IndexableNum> {
    Unbuilt,
    /// The data holds no points: every query has zero matches
    Empty,
    Tree(KDTree<'a, N>),
}

/// Nearest-neighbor search over a fixed-dimension point set.
///
/// The dimension of the first point set is fixed for the lifetime of the object. An index must
/// be prepared with one of [`knn_index`][Self::knn_index], [`radius_index`][Self::radius_index],
/// [`fixed_radius_index`][Self::fixed_radius_index] or [`hybrid_index`][Self::hybrid_index]
/// before searching. All four modes share one k-d tree, so preparing any of them makes every
/// search available.
///
/// Unlike [`KDTreeBuilder`], an empty point set is accepted here; searches against it succeed
/// with zero matches.
///
/// ```
/// use kd_neighbors::{NearestNeighbor, PointSetView};
///
/// let coords = [0., 0., 1., 0., 0., 1., 5., 5.];
/// let mut nn = NearestNeighbor::new(PointSetView::try_new(&coords, 2).unwrap());
/// nn.hybrid_index().unwrap();
///
/// let query = [0., 0.];
/// let result = nn
///     .hybrid_search(&PointSetView::try_new(&query, 2).unwrap(), 0.5, 2)
///     .unwrap();
/// assert_eq!(result.indices(), &[0, -1]);
/// assert_eq!(result.distances(), &[0., f64::INFINITY]);
/// ```
#[derive(Debug)]
pub struct NearestNeighbor<'a, N: IndexableNum> {
    data: PointSetView<'a, N>,
    builder: KDTreeBuilder,
    state: IndexState<'a, N>,
}

impl<'a, N: IndexableNum> NearestNeighbor<'a, N> {
    /// Search `data` under the Euclidean metric.
    pub fn new(data: PointSetView<'a, N>) -> Self {
        Self::with_metric(data, Metric::default())
    }

    /// Search `data` under `metric`.
    pub fn with_metric(data: PointSetView<'a, N>, metric: Metric) -> Self {
        Self::with_builder(data, KDTreeBuilder::new(metric))
    }

    /// Search `data` with a custom tree configuration.
    pub fn with_builder(data: PointSetView<'a, N>, builder: KDTreeBuilder) -> Self {
        Self {
            data,
            builder,
            state: IndexState::Unbuilt,
        }
    }

    /// The point set currently searched.
    pub fn data(&self) -> PointSetView<'a, N> {
        self.data
    }

    /// The point dimension every query must have.
    pub fn dim(&self) -> usize {
        self.data.dim()
    }

    /// The metric distances are reported in.
    pub fn metric(&self) -> Metric {
        self.builder.metric()
    }

    /// Whether an index is ready for searching.
    pub fn is_built(&self) -> bool {
        !matches!(self.state, IndexState::Unbuilt)
    }

    /// The underlying tree, if one has been built over non-empty data.
    pub fn tree(&self) -> Option<&KDTree<'a, N>> {
        match &self.state {
            IndexState::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Prepare the index for [`knn_search`][Self::knn_search].
    pub fn knn_index(&mut self) -> Result<()> {
        self.prepare()
    }

    /// Prepare the index for [`radius_search`][Self::radius_search].
    pub fn radius_index(&mut self) -> Result<()> {
        self.prepare()
    }

    /// Prepare the index for [`fixed_radius_search`][Self::fixed_radius_search].
    pub fn fixed_radius_index(&mut self) -> Result<()> {
        self.prepare()
    }

    /// Prepare the index for [`hybrid_search`][Self::hybrid_search].
    pub fn hybrid_index(&mut self) -> Result<()> {
        self.prepare()
    }

    /// Replace the point set and rebuild the index over it.
    ///
    /// Taking `&mut self` keeps the rebuild exclusive of any search. Fails if `data` has a
    /// different dimension than the current point set, or if the build fails; in both cases the
    /// previous data and index are left untouched.
    pub fn set_data(&mut self, data: PointSetView<'a, N>) -> Result<()> {
        if data.dim() != self.dim() {
            return Err(NeighborError::invalid(format!(
                "data dimension {} does not match configured dimension {}",
                data.dim(),
                self.dim()
            )));
        }
        let state = self.build(data)?;
        self.data = data;
        self.state = state;
        Ok(())
    }

    /// Search the `k` nearest neighbors of every query point.
    ///
    /// Rows have width `min(k, N)`, so an empty point set yields rows of width zero. See
    /// [`KDTreeIndex::search_knn`].
    pub fn knn_search(&self, queries: &PointSetView<N>, k: usize) -> Result<DenseNeighbors<N>> {
        match &self.state {
            IndexState::Unbuilt => Err(NeighborError::NotBuilt),
            IndexState::Empty => {
                check_queries(queries, self.dim())?;
                check_count(k, "k")?;
                pack_dense(queries.num_points(), 0, |_| vec![])
            }
            IndexState::Tree(tree) => tree.search_knn(queries, k),
        }
    }

    /// Search all neighbors within `radii[i]` of query point `i`.
    ///
    /// See [`KDTreeIndex::search_radius`].
    pub fn radius_search(
        &self,
        queries: &PointSetView<N>,
        radii: &[N],
    ) -> Result<RaggedNeighbors<N>> {
        match &self.state {
            IndexState::Unbuilt => Err(NeighborError::NotBuilt),
            IndexState::Empty => {
                check_queries(queries, self.dim())?;
                check_radii(radii, queries.num_points())?;
                Ok(pack_ragged(queries.num_points(), |_| vec![]))
            }
            IndexState::Tree(tree) => tree.search_radius(queries, radii),
        }
    }

    /// Search all neighbors within the same `radius` of every query point.
    ///
    /// See [`KDTreeIndex::search_fixed_radius`].
    pub fn fixed_radius_search(
        &self,
        queries: &PointSetView<N>,
        radius: N,
    ) -> Result<RaggedNeighbors<N>> {
        match &self.state {
            IndexState::Unbuilt => Err(NeighborError::NotBuilt),
            IndexState::Empty => {
                check_queries(queries, self.dim())?;
                check_radius(radius)?;
                Ok(pack_ragged(queries.num_points(), |_| vec![]))
            }
            IndexState::Tree(tree) => tree.search_fixed_radius(queries, radius),
        }
    }

    /// Search at most `max_knn` nearest neighbors within `radius` of every query point, padding
    /// rows with sentinels.
    ///
    /// See [`KDTreeIndex::hybrid_search`].
    pub fn hybrid_search(
        &self,
        queries: &PointSetView<N>,
        radius: N,
        max_knn: usize,
    ) -> Result<DenseNeighbors<N>> {
        match &self.state {
            IndexState::Unbuilt => Err(NeighborError::NotBuilt),
            IndexState::Empty => {
                check_queries(queries, self.dim())?;
                check_radius(radius)?;
                check_count(max_knn, "max_knn")?;
                pack_dense(queries.num_points(), max_knn, |_| vec![])
            }
            IndexState::Tree(tree) => tree.hybrid_search(queries, radius, max_knn),
        }
    }

    fn prepare(&mut self) -> Result<()> {
        if self.is_built() {
            return Ok(());
        }
        self.state = self.build(self.data)?;
        Ok(())
    }

    fn build(&self, data: PointSetView<'a, N>) -> Result<IndexState<'a, N>> {
        if data.is_empty() {
            debug!(dim = data.dim(), "nearest neighbor data is empty");
            return Ok(IndexState::Empty);
        }
        Ok(IndexState::Tree(self.builder.build(data)?))
    }
}
