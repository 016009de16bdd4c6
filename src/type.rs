use std::fmt::Debug;

use num_traits::{Float, NumCast, ToPrimitive};

use crate::error::NeighborError;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Only the two IEEE float
/// widths are supported, because distances, sentinels and pruning bounds all rely on
/// `+infinity` and a square root.
pub trait IndexableNum:
    private::Sealed + Float + NumCast + ToPrimitive + Debug + Default + Send + Sync + bytemuck::Pod
{
    /// The dtype tag of this coordinate type at the array boundary
    const COORD_TYPE: CoordType;
    /// The number of bytes per element
    const BYTES_PER_ELEMENT: usize;
}

impl IndexableNum for f32 {
    const COORD_TYPE: CoordType = CoordType::Float32;
    const BYTES_PER_ELEMENT: usize = 4;
}

impl IndexableNum for f64 {
    const COORD_TYPE: CoordType = CoordType::Float64;
    const BYTES_PER_ELEMENT: usize = 8;
}

/// An enum over the element dtypes accepted for point and query buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordType {
    Float32,
    Float64,
}

impl CoordType {
    /// The number of bytes of one element of this dtype.
    pub fn bytes_per_element(&self) -> usize {
        match self {
            CoordType::Float32 => f32::BYTES_PER_ELEMENT,
            CoordType::Float64 => f64::BYTES_PER_ELEMENT,
        }
    }

    /// Parse a dtype name such as `"float32"` or `"f64"`.
    pub fn from_name(name: &str) -> Result<Self, NeighborError> {
        let result = match name {
            "float32" | "f32" => CoordType::Float32,
            "float64" | "f64" => CoordType::Float64,
            t => {
                return Err(NeighborError::InvalidArgument(format!(
                    "Unexpected dtype {}.",
                    t
                )))
            }
        };
        Ok(result)
    }
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
