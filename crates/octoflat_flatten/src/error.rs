//! Error types for a flattening pass.

use octoflat_storage::{StorageError, Timestamp};

use thiserror::Error;

/// Result type for flattening operations.
pub type Result<T> = std::result::Result<T, FlattenError>;

#[derive(Error, Debug)]
pub enum FlattenError {
    /// The tree has no leaves, so there is no ground to flatten onto.
    #[error("the octree has no leaves")]
    EmptyTree,

    /// The pose of the robot could not be resolved at the time of the input.
    #[error("no transform from {reference} to {target} at {stamp}: {reason}")]
    TransformUnavailable {
        target: String,
        reference: String,
        stamp: Timestamp,
        reason: String,
    },

    /// The height map service did not answer.
    #[error("height map service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An image message does not describe a height map.
    #[error("invalid height image: {0}")]
    InvalidImage(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
