//! Shared fixtures for unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::kdtree::Neighbor;
use crate::metric::Metric;
use crate::points::PointSetView;

/// `num_points * dim` coordinates drawn uniformly from `[-50, 50)`, reproducible from `seed`.
pub(crate) fn random_coords(seed: u64, num_points: usize, dim: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_points * dim)
        .map(|_| rng.gen_range(-50.0..50.0))
        .collect()
}

/// Like [`random_coords`], but snapped to a coarse integer grid so that duplicate points and
/// equal distances are common.
pub(crate) fn grid_coords(seed: u64, num_points: usize, dim: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_points * dim)
        .map(|_| rng.gen_range(0..8) as f64)
        .collect()
}

/// Every point with its distance to `query`, nearest first, ties by index.
pub(crate) fn brute_force(
    points: &PointSetView<f64>,
    query: &[f64],
    metric: Metric,
) -> Vec<Neighbor<f64>> {
    let mut all: Vec<Neighbor<f64>> = points
        .iter()
        .enumerate()
        .map(|(index, point)| Neighbor {
            index,
            distance: metric.distance(query, point),
        })
        .collect();
    all.sort();
    all
}
