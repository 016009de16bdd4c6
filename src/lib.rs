#![doc = include_str!("../README.md")]

mod error;
pub mod indices;
pub mod kdtree;
mod metric;
mod nn;
mod points;
mod r#type;

pub use error::{NeighborError, Result};
pub use metric::Metric;
pub use nn::NearestNeighbor;
pub use points::{BoundingBox, PointSetView};
pub use r#type::{CoordType, IndexableNum};

#[cfg(test)]
pub(crate) mod test;
