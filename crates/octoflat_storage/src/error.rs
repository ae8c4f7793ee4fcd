//! Error types for octree storage and serialization.

use octoflat_core::Point3f;

use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    /// No leaf of the tree covers the coordinate.
    #[error("no leaf covers coordinate {coordinate:?}")]
    NotFound { coordinate: Point3f },

    /// The coordinate cannot be addressed by a key of the tree.
    #[error("coordinate {coordinate:?} is outside of the addressable key space")]
    OutOfBounds { coordinate: Point3f },

    /// The message does not carry an occupancy octree.
    #[error("unsupported tree type: {0}")]
    UnsupportedTreeType(String),

    /// The resolution is not a positive, finite number.
    #[error("invalid resolution: {0}")]
    InvalidResolution(f32),

    /// The binary stream is truncated or malformed.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}
