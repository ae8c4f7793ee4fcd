//! The probabilistic occupancy octree and its serialization formats.

pub mod binary;
pub mod iter;
pub mod occupancy;
pub mod params;

pub use iter::{LeafIter, Voxel};
pub use occupancy::{ChildBitMask, OccupancyOctree};
pub use params::{log_odds, probability, OccupancyParams};
