//! Distance metrics used for both tree pruning and exact neighbor distances.

use crate::r#type::IndexableNum;

/// The closed set of supported distance functions.
///
/// The metric is fixed when an index is built, since subtree pruning bounds depend on it.
/// Every metric reports true distances: [`Metric::L2`] returns the Euclidean distance, not its
/// square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    /// Manhattan distance, the sum of absolute coordinate differences.
    L1,
    /// Euclidean distance.
    #[default]
    L2,
    /// Chebyshev distance, the largest absolute coordinate difference.
    Linf,
}

impl Metric {
    /// Distance between two points of equal dimension.
    #[inline]
    pub fn distance<N: IndexableNum>(&self, a: &[N], b: &[N]) -> N {
        debug_assert_eq!(a.len(), b.len());
        self.reduce(a.iter().zip(b).map(|(&x, &y)| (x - y).abs()))
    }

    /// Smallest distance from `point` to any location inside the box `[min, max]`.
    ///
    /// Zero when the point lies inside the box. Never larger than [`Metric::distance`] to a
    /// point contained in the box.
    #[inline]
    pub fn distance_to_box<N: IndexableNum>(&self, point: &[N], min: &[N], max: &[N]) -> N {
        debug_assert_eq!(point.len(), min.len());
        self.reduce(
            point
                .iter()
                .zip(min.iter().zip(max))
                .map(|(&k, (&lo, &hi))| axis_dist(k, lo, hi)),
        )
    }

    /// Combine per-axis absolute differences into a distance.
    #[inline]
    fn reduce<N: IndexableNum>(&self, diffs: impl Iterator<Item = N>) -> N {
        match self {
            Metric::L1 => diffs.fold(N::zero(), |acc, d| acc + d),
            Metric::L2 => diffs.fold(N::zero(), |acc, d| acc + d * d).sqrt(),
            Metric::Linf => diffs.fold(N::zero(), |acc, d| if d > acc { d } else { acc }),
        }
    }
}

/// 1D distance from a value to a range.
#[inline]
pub(crate) fn axis_dist<N: IndexableNum>(k: N, min: N, max: N) -> N {
    if k < min {
        min - k
    } else if k <= max {
        N::zero()
    } else {
        k - max
    }
}
