//! Output shapes for batch queries, and packing of per-query neighbor lists into them.

use std::cmp::Ordering;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{NeighborError, Result};
use crate::r#type::IndexableNum;

/// Index written to unused slots of a fixed-width row.
pub const SENTINEL_INDEX: i64 = -1;

/// A single neighbor of a query point: the position of the point in the indexed set and its
/// distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<N: IndexableNum> {
    /// Position of the point in the indexed point set
    pub index: usize,
    /// Distance from the query to the point
    pub distance: N,
}

impl<N: IndexableNum> Eq for Neighbor<N> {}

impl<N: IndexableNum> Ord for Neighbor<N> {
    /// Ascending by distance, then by point index.
    fn cmp(&self, other: &Self) -> Ordering {
        // Distances are never NaN: coordinates are checked for finiteness up front
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }
}

impl<N: IndexableNum> PartialOrd for Neighbor<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fixed-width results of KNN and hybrid queries: one row of `width` slots per query.
///
/// Unused slots hold [`SENTINEL_INDEX`] and a distance of `+infinity`, and only ever appear after
/// all real entries of their row.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseNeighbors<N: IndexableNum> {
    num_queries: usize,
    width: usize,
    indices: Vec<i64>,
    distances: Vec<N>,
}

impl<N: IndexableNum> DenseNeighbors<N> {
    /// The number of query rows.
    pub fn num_queries(&self) -> usize {
        self.num_queries
    }

    /// The number of slots in every row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Row-major `num_queries × width` neighbor indices.
    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Row-major `num_queries × width` neighbor distances.
    pub fn distances(&self) -> &[N] {
        &self.distances
    }

    /// The indices and distances of one query's row.
    pub fn row(&self, query: usize) -> (&[i64], &[N]) {
        let range = query * self.width..(query + 1) * self.width;
        (&self.indices[range.clone()], &self.distances[range])
    }

    /// Consume into `(indices, distances)`.
    pub fn into_parts(self) -> (Vec<i64>, Vec<N>) {
        (self.indices, self.distances)
    }
}

/// Variable-length results of radius queries, stored as flat arrays plus row splits.
///
/// The neighbors of query `i` are `indices[row_splits[i]..row_splits[i + 1]]` (and likewise for
/// distances). `row_splits` starts at 0, is non-decreasing, and ends at the flat length.
#[derive(Debug, Clone, PartialEq)]
pub struct RaggedNeighbors<N: IndexableNum> {
    indices: Vec<i64>,
    distances: Vec<N>,
    row_splits: Vec<i64>,
}

impl<N: IndexableNum> RaggedNeighbors<N> {
    /// The number of query rows.
    pub fn num_queries(&self) -> usize {
        self.row_splits.len() - 1
    }

    /// The total number of neighbors over all queries.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no query found any neighbor.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Flat neighbor indices of all queries, in query order.
    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Flat neighbor distances of all queries, in query order.
    pub fn distances(&self) -> &[N] {
        &self.distances
    }

    /// Offsets of length `num_queries + 1` into the flat arrays.
    pub fn row_splits(&self) -> &[i64] {
        &self.row_splits
    }

    /// The indices and distances of one query's row.
    pub fn row(&self, query: usize) -> (&[i64], &[N]) {
        let range = self.row_splits[query] as usize..self.row_splits[query + 1] as usize;
        (&self.indices[range.clone()], &self.distances[range])
    }

    /// Consume into `(indices, distances, row_splits)`.
    pub fn into_parts(self) -> (Vec<i64>, Vec<N>, Vec<i64>) {
        (self.indices, self.distances, self.row_splits)
    }
}

/// Run `search` for every query and write each result into its own fixed-width row, padding
/// with sentinels.
///
/// `search` must return at most `width` neighbors, already sorted. The output is allocated
/// before any search runs, and fails with [`NeighborError::Internal`] when `num_queries × width`
/// slots cannot be held in memory.
pub(crate) fn pack_dense<N, F>(
    num_queries: usize,
    width: usize,
    search: F,
) -> Result<DenseNeighbors<N>>
where
    N: IndexableNum,
    F: Fn(usize) -> Vec<Neighbor<N>> + Sync + Send,
{
    let len = num_queries.checked_mul(width).ok_or_else(|| {
        NeighborError::Internal(format!(
            "{} rows of {} neighbors overflow the output size",
            num_queries, width
        ))
    })?;
    let mut indices = filled(len, SENTINEL_INDEX)?;
    let mut distances = filled(len, N::infinity())?;

    let fill_row = |query: usize, index_row: &mut [i64], distance_row: &mut [N]| {
        let neighbors = search(query);
        debug_assert!(neighbors.len() <= width);
        for (slot, neighbor) in neighbors.into_iter().enumerate() {
            index_row[slot] = neighbor.index as i64;
            distance_row[slot] = neighbor.distance;
        }
    };

    // chunks of size zero are not allowed, and there is nothing to write anyways
    if width > 0 {
        #[cfg(feature = "rayon")]
        {
            indices
                .par_chunks_mut(width)
                .zip(distances.par_chunks_mut(width))
                .enumerate()
                .for_each(|(query, (index_row, distance_row))| {
                    fill_row(query, index_row, distance_row)
                });
        }

        #[cfg(not(feature = "rayon"))]
        {
            indices
                .chunks_mut(width)
                .zip(distances.chunks_mut(width))
                .enumerate()
                .for_each(|(query, (index_row, distance_row))| {
                    fill_row(query, index_row, distance_row)
                });
        }
    }

    Ok(DenseNeighbors {
        num_queries,
        width,
        indices,
        distances,
    })
}

/// `len` copies of `value`, reporting an allocation failure instead of aborting.
fn filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|err| {
        NeighborError::Internal(format!("cannot allocate {} output slots: {}", len, err))
    })?;
    buffer.resize(len, value);
    Ok(buffer)
}

/// Run `search` for every query and concatenate the results in query order, recording where
/// each query's neighbors start.
pub(crate) fn pack_ragged<N, F>(num_queries: usize, search: F) -> RaggedNeighbors<N>
where
    N: IndexableNum,
    F: Fn(usize) -> Vec<Neighbor<N>> + Sync + Send,
{
    #[cfg(feature = "rayon")]
    let rows: Vec<Vec<Neighbor<N>>> = (0..num_queries).into_par_iter().map(search).collect();

    #[cfg(not(feature = "rayon"))]
    let rows: Vec<Vec<Neighbor<N>>> = (0..num_queries).map(search).collect();

    let mut row_splits = Vec::with_capacity(num_queries + 1);
    row_splits.push(0);
    let mut total = 0;
    for row in &rows {
        total += row.len();
        row_splits.push(total as i64);
    }

    let mut indices = Vec::with_capacity(total);
    let mut distances = Vec::with_capacity(total);
    for neighbor in rows.into_iter().flatten() {
        indices.push(neighbor.index as i64);
        distances.push(neighbor.distance);
    }

    RaggedNeighbors {
        indices,
        distances,
        row_splits,
    }
}
