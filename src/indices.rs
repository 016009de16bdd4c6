//! Data structures to hold the point-index permutation as either `u16` or `u32` to save space.

/// Point sets smaller than this store their permutation as `u16`.
const U16_LIMIT: usize = 65536;

/// An owned permutation of point indices that may be either `u16` or `u32`.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// The identity permutation `0..num_items`, in the narrowest width that fits.
    ///
    /// `num_items` must fit in a `u32`; callers validate this before building.
    pub fn identity(num_items: usize) -> Self {
        if num_items < U16_LIMIT {
            Self::U16((0..num_items as u16).collect())
        } else {
            Self::U32((0..num_items as u32).collect())
        }
    }

    /// A read-only view of this permutation.
    pub fn as_indices(&self) -> Indices<'_> {
        match self {
            Self::U16(arr) => Indices::U16(arr),
            Self::U32(arr) => Indices::U32(arr),
        }
    }

    /// A mutable view of this permutation.
    pub fn as_mut_indices(&mut self) -> MutableIndices<'_> {
        match self {
            Self::U16(arr) => MutableIndices::U16(arr),
            Self::U32(arr) => MutableIndices::U32(arr),
        }
    }
}

/// A mutable slice of indices that may be either `u16` or `u32`.
#[derive(Debug)]
pub enum MutableIndices<'a> {
    U16(&'a mut [u16]),
    U32(&'a mut [u32]),
}

impl MutableIndices<'_> {
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        match self {
            Self::U16(arr) => arr.swap(a, b),
            Self::U32(arr) => arr.swap(a, b),
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        match self {
            Self::U16(arr) => arr[index] as usize,
            Self::U32(arr) => arr[index] as usize,
        }
    }
}

/// A slice of indices that may be either `u16` or `u32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indices<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl Indices<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::U16(arr) => arr.len(),
            Self::U32(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        match self {
            Self::U16(arr) => arr[index] as usize,
            Self::U32(arr) => arr[index] as usize,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn picks_width_by_item_count() {
        let small = IndexBuffer::identity(10);
        assert!(matches!(small, IndexBuffer::U16(_)));
        assert_eq!(small.as_indices().len(), 10);
        assert_eq!(small.as_indices().get(7), 7);

        let mut large = IndexBuffer::identity(70_000);
        assert!(matches!(large, IndexBuffer::U32(_)));
        let mut view = large.as_mut_indices();
        view.swap(0, 69_999);
        assert_eq!(view.get(0), 69_999);
        assert_eq!(large.as_indices().get(69_999), 0);
    }
}
