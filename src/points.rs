//! A non-owning view over a contiguous, row-major block of points.

use crate::error::{NeighborError, Result};
use crate::r#type::{CoordType, IndexableNum};

/// An immutable N×D view over a row-major coordinate buffer.
///
/// The same type is used both for the reference points an index is built from and for blocks
/// of query points.
///
/// ```
/// use kd_neighbors::PointSetView;
///
/// let coords = [0., 0., 1., 0., 0., 1.];
/// let points = PointSetView::try_new(&coords, 2).unwrap();
/// assert_eq!(points.num_points(), 3);
/// assert_eq!(points.point(1), &[1., 0.]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSetView<'a, N: IndexableNum> {
    coords: &'a [N],
    dim: usize,
}

impl<'a, N: IndexableNum> PointSetView<'a, N> {
    /// Wrap a row-major slice of `coords.len() / dim` points of dimension `dim`.
    pub fn try_new(coords: &'a [N], dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(NeighborError::invalid("point dimension must be at least 1"));
        }
        if coords.len() % dim != 0 {
            return Err(NeighborError::invalid(format!(
                "buffer of length {} is not a multiple of dimension {}",
                coords.len(),
                dim
            )));
        }
        Ok(Self { coords, dim })
    }

    /// Reinterpret a raw byte buffer of dtype `dtype` as points of dimension `dim`.
    ///
    /// Fails if `dtype` does not match `N`, or if the buffer is misaligned or not a whole number
    /// of elements.
    pub fn from_bytes(bytes: &'a [u8], dim: usize, dtype: CoordType) -> Result<Self> {
        if dtype != N::COORD_TYPE {
            return Err(NeighborError::invalid(format!(
                "got {:?} data when expected {:?}",
                dtype,
                N::COORD_TYPE
            )));
        }
        let coords: &[N] = bytemuck::try_cast_slice(bytes)
            .map_err(|err| NeighborError::invalid(format!("cannot view buffer: {}", err)))?;
        Self::try_new(coords, dim)
    }

    /// The number of points N in this view.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.coords.len() / self.dim
    }

    /// The dimension D of each point.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// The underlying contiguous coordinate buffer.
    pub fn coords(&self) -> &'a [N] {
        self.coords
    }

    /// The coordinates of the point at `index`.
    #[inline]
    pub fn point(&self, index: usize) -> &'a [N] {
        &self.coords[index * self.dim..(index + 1) * self.dim]
    }

    /// A single coordinate of the point at `index`.
    #[inline]
    pub fn coord(&self, index: usize, axis: usize) -> N {
        self.coords[index * self.dim + axis]
    }

    /// Iterate over all points in row order.
    pub fn iter(&self) -> std::slice::ChunksExact<'a, N> {
        self.coords.chunks_exact(self.dim)
    }

    /// The axis-aligned bounding box of all points, or `None` for an empty view.
    pub fn bbox(&self) -> Option<BoundingBox<N>> {
        if self.is_empty() {
            return None;
        }
        let mut bbox = BoundingBox::empty(self.dim);
        self.iter().for_each(|p| bbox.extend(p));
        Some(bbox)
    }

    /// Fail unless every coordinate is finite.
    pub(crate) fn check_finite(&self, what: &str) -> Result<()> {
        match self.coords.iter().position(|c| !c.is_finite()) {
            Some(pos) => Err(NeighborError::invalid(format!(
                "{} {} has a non-finite coordinate",
                what,
                pos / self.dim
            ))),
            None => Ok(()),
        }
    }
}

/// An axis-aligned box in D dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox<N: IndexableNum> {
    min: Vec<N>,
    max: Vec<N>,
}

impl<N: IndexableNum> BoundingBox<N> {
    /// An inverted box that any point will extend.
    pub fn empty(dim: usize) -> Self {
        Self {
            min: vec![N::infinity(); dim],
            max: vec![N::neg_infinity(); dim],
        }
    }

    pub(crate) fn from_parts(min: Vec<N>, max: Vec<N>) -> Self {
        Self { min, max }
    }

    /// Grow the box to contain `point`.
    #[inline]
    pub fn extend(&mut self, point: &[N]) {
        for ((lo, hi), &c) in self.min.iter_mut().zip(self.max.iter_mut()).zip(point) {
            if c < *lo {
                *lo = c;
            }
            if c > *hi {
                *hi = c;
            }
        }
    }

    pub fn min(&self) -> &[N] {
        &self.min
    }

    pub fn max(&self) -> &[N] {
        &self.max
    }

    pub fn dim(&self) -> usize {
        self.min.len()
    }

    /// The axis of largest extent; ties go to the lowest axis.
    pub fn widest_axis(&self) -> usize {
        widest_axis(&self.min, &self.max)
    }
}

/// The axis where `max - min` is largest; ties go to the lowest axis.
pub(crate) fn widest_axis<N: IndexableNum>(min: &[N], max: &[N]) -> usize {
    let mut best_axis = 0;
    let mut best_spread = N::neg_infinity();
    for (axis, (&lo, &hi)) in min.iter().zip(max).enumerate() {
        let spread = hi - lo;
        if spread > best_spread {
            best_spread = spread;
            best_axis = axis;
        }
    }
    best_axis
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_bad_shapes() {
        let coords = [1.0f64, 2.0, 3.0];
        assert!(PointSetView::try_new(&coords, 0).is_err());
        assert!(PointSetView::try_new(&coords, 2).is_err());
        let view = PointSetView::try_new(&coords, 3).unwrap();
        assert_eq!(view.num_points(), 1);
        assert_eq!(view.coord(0, 2), 3.0);
    }

    #[test]
    fn empty_view_has_no_bbox() {
        let coords: [f32; 0] = [];
        let view = PointSetView::try_new(&coords, 3).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.num_points(), 0);
        assert!(view.bbox().is_none());
    }

    #[test]
    fn bbox_and_widest_axis() {
        let coords = [0.0f64, 5.0, 2.0, -1.0, 1.0, 0.0];
        let view = PointSetView::try_new(&coords, 2).unwrap();
        let bbox = view.bbox().unwrap();
        assert_eq!(bbox.min(), &[0.0, -1.0]);
        assert_eq!(bbox.max(), &[2.0, 5.0]);
        assert_eq!(bbox.widest_axis(), 1);

        let square = BoundingBox::from_parts(vec![0.0f64, 0.0], vec![1.0, 1.0]);
        assert_eq!(square.widest_axis(), 0);
    }

    #[test]
    fn views_raw_bytes_with_dtype_check() {
        let coords = [1.0f64, 2.0, 3.0, 4.0];
        let bytes: &[u8] = bytemuck::cast_slice(&coords[..]);

        let view = PointSetView::<f64>::from_bytes(bytes, 2, CoordType::Float64).unwrap();
        assert_eq!(view.point(1), &[3.0, 4.0]);

        let err = PointSetView::<f64>::from_bytes(bytes, 2, CoordType::Float32).unwrap_err();
        assert!(matches!(err, NeighborError::InvalidArgument(_)));

        assert!(PointSetView::<f64>::from_bytes(&bytes[..12], 2, CoordType::Float64).is_err());
    }

    #[test]
    fn detects_non_finite() {
        let coords = [0.0f64, 1.0, f64::NAN, 2.0];
        let view = PointSetView::try_new(&coords, 2).unwrap();
        assert!(view.check_finite("point").is_err());
    }
}
