//! Candidate collectors driven by the tree traversal.

use std::collections::BinaryHeap;

use crate::kdtree::result::Neighbor;
use crate::r#type::IndexableNum;

/// Accumulates candidates during a traversal and reports how far away a subtree may be while
/// still possibly contributing.
pub(crate) trait Collector<N: IndexableNum> {
    /// Subtrees whose box is farther than this are skipped.
    fn bound(&self) -> N;

    /// Consider one point at an exactly computed distance.
    fn offer(&mut self, index: usize, distance: N);
}

/// The `k` best neighbors no farther than `max_distance`, kept in a max-heap so the current
/// worst candidate is on top.
#[derive(Debug)]
pub(crate) struct BestK<N: IndexableNum> {
    heap: BinaryHeap<Neighbor<N>>,
    k: usize,
    max_distance: N,
}

impl<N: IndexableNum> BestK<N> {
    /// Plain k nearest neighbors among `num_items` points.
    pub(crate) fn new(k: usize, num_items: usize) -> Self {
        Self::within(k, num_items, N::infinity())
    }

    /// At most `k` nearest neighbors inside `max_distance`, among `num_items` points.
    ///
    /// No more than `num_items` candidates can ever be offered, so the heap never grows past
    /// `min(k, num_items)`.
    pub(crate) fn within(k: usize, num_items: usize, max_distance: N) -> Self {
        let k = k.min(num_items);
        Self {
            heap: BinaryHeap::with_capacity(k),
            k,
            max_distance,
        }
    }

    /// The collected neighbors, nearest first.
    pub(crate) fn into_sorted_vec(self) -> Vec<Neighbor<N>> {
        self.heap.into_sorted_vec()
    }
}

impl<N: IndexableNum> Collector<N> for BestK<N> {
    #[inline]
    fn bound(&self) -> N {
        if self.heap.len() < self.k {
            return self.max_distance;
        }
        match self.heap.peek() {
            Some(worst) => worst.distance.min(self.max_distance),
            // k == 0 accepts nothing
            None => N::neg_infinity(),
        }
    }

    #[inline]
    fn offer(&mut self, index: usize, distance: N) {
        if distance > self.max_distance {
            return;
        }
        let candidate = Neighbor { index, distance };
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if candidate < *worst {
                *worst = candidate;
            }
        }
    }
}

/// Every neighbor no farther than `radius`.
#[derive(Debug)]
pub(crate) struct WithinRadius<N: IndexableNum> {
    radius: N,
    found: Vec<Neighbor<N>>,
}

impl<N: IndexableNum> WithinRadius<N> {
    pub(crate) fn new(radius: N) -> Self {
        Self {
            radius,
            found: vec![],
        }
    }

    /// The collected neighbors, nearest first.
    pub(crate) fn into_sorted_vec(mut self) -> Vec<Neighbor<N>> {
        // indices are unique so the order is total
        self.found.sort_unstable();
        self.found
    }
}

impl<N: IndexableNum> Collector<N> for WithinRadius<N> {
    #[inline]
    fn bound(&self) -> N {
        self.radius
    }

    #[inline]
    fn offer(&mut self, index: usize, distance: N) {
        if distance <= self.radius {
            self.found.push(Neighbor { index, distance });
        }
    }
}
