//! An implementation of an immutable k-d tree for exact nearest-neighbor search.

#![warn(missing_docs)]

mod builder;
mod heap;
mod index;
mod result;
mod r#trait;
mod traversal;

pub use builder::{KDTreeBuilder, DEFAULT_NODE_SIZE};
pub use index::{KDTree, KDTreeMetadata, Node};
pub use r#trait::KDTreeIndex;
pub(crate) use r#trait::{check_count, check_queries, check_radii, check_radius};
pub(crate) use result::{pack_dense, pack_ragged};
pub use result::{DenseNeighbors, Neighbor, RaggedNeighbors, SENTINEL_INDEX};
pub use traversal::NodeRef;
