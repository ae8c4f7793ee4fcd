//! Storage for probabilistic occupancy maps and the height maps projected from them.
//!
//! The core storage types are:
//!   - `OccupancyOctree`: a sparse occupancy map over a 16-level voxel lattice, stored as a hashed arena of nodes
//!   - `HeightMap`: a dense, row-major grid of normalized heights, one byte per cell
//!
//! An `OccupancyOctree` can be exchanged with other processes as an `OctreeMessage`, either in the lossless "full" format or
//! in the compact maximum-likelihood "binary" format. See the `octree::binary` module.

pub mod error;
pub mod height_map;
pub mod message;
pub mod octree;

pub use error::{Result, StorageError};
pub use height_map::HeightMap;
pub use message::{Header, OctreeMessage, Timestamp, OCTREE_ID};
pub use octree::*;

// Hash types to use for small keys like `LocationCode`.
pub type SmallKeyHashMap<K, V> = ahash::AHashMap<K, V>;
pub type SmallKeyBuildHasher = ahash::RandomState;

pub mod prelude {
    pub use super::{
        HeightMap, Header, LeafIter, OccupancyOctree, OccupancyParams, OctreeMessage,
        StorageError, Timestamp, Voxel,
    };
}

#[cfg(feature = "image")]
mod image_conversions;
#[cfg(feature = "image")]
pub use image_conversions::*;
