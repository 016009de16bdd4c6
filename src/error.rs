use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NeighborError {
    /// The caller passed a bad argument: bad k, negative radius, dimension mismatch, etc.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A query was issued before any index was built.
    #[error("Index has not been built")]
    NotBuilt,

    /// A failure unrelated to caller input.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NeighborError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NeighborError>;
