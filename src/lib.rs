//! Height projection and ground flattening for probabilistic occupancy octrees.
//!
//! This crate re-exports the workspace crates:
//!   - `core`: points, bounding boxes, voxel keys and poses
//!   - `storage`: the `OccupancyOctree`, its serialized messages and `HeightMap`
//!   - `flatten`: the region of interest, rasterization, the flattening rewrite and the `FlattenPass` pipeline

pub use octoflat_core as core;
pub use octoflat_flatten as flatten;
pub use octoflat_storage as storage;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::flatten::prelude::*;
    pub use super::storage::prelude::*;
}
