//! The core data types shared by the octoflat crates:
//! - `PointN`: an N-dimensional point, most importantly `Point2f` and `Point3f`
//! - `VoxelKey`: the integer address of a voxel at the finest level of an octree
//! - `BoundingBox`: an axis-aligned box in world coordinates
//! - `Pose`: a position plus a heading about the vertical axis

pub mod bounding_box;
pub mod key;
pub mod point;
pub mod point2;
pub mod point3;
pub mod pose;

pub use bounding_box::BoundingBox;
pub use key::{node_edge_keys, node_size, Morton3, VoxelKey, KEY_ORIGIN, TREE_DEPTH};
pub use point::{Bounded, DotProduct, Norm, Point, PointN, SmallZero};
pub use point2::{Point2, Point2f};
pub use point3::{Point3, Point3f};
pub use pose::Pose;

pub use num;

pub mod prelude {
    pub use super::{
        BoundingBox, Bounded, DotProduct, Norm, Point, Point2, Point2f, Point3, Point3f, PointN,
        Pose, SmallZero, VoxelKey,
    };
}
