//! Integer addressing of voxels in an octree of fixed depth.
//!
//! A `VoxelKey` is the lattice coordinate of a voxel at the finest resolution of the tree. Keys are
//! unsigned and the world origin sits at `KEY_ORIGIN` on every axis, so a tree of `TREE_DEPTH`
//! levels covers `[-32768, 32768) * resolution` meters along each axis.
//!
//! Coarser nodes are addressed by the key of their minimum corner plus a depth, which is pure bit
//! masking:
//!
//! ```
//! use octoflat_core::VoxelKey;
//!
//! let key = VoxelKey::new(32771, 32770, 32769);
//! // The depth-14 node containing `key` covers 4x4x4 finest voxels.
//! assert_eq!(key.ancestor_at_depth(14), VoxelKey::new(32768, 32768, 32768));
//! ```

use crate::{Point3f, PointN};

use morton_encoding::{morton_decode, morton_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of levels below the root. Leaves at this depth have the edge length of the tree resolution.
pub const TREE_DEPTH: u8 = 16;

/// The key of the voxel whose minimum corner is the world origin.
pub const KEY_ORIGIN: u32 = 1 << (TREE_DEPTH - 1);

/// Identifies a voxel at the finest resolution of the tree.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct VoxelKey(pub [u16; 3]);

impl VoxelKey {
    pub const fn new(x: u16, y: u16, z: u16) -> Self {
        Self([x, y, z])
    }

    pub fn x(&self) -> u16 {
        self.0[0]
    }

    pub fn y(&self) -> u16 {
        self.0[1]
    }

    pub fn z(&self) -> u16 {
        self.0[2]
    }

    /// The key of the voxel containing `p`, or `None` if `p` is outside of the key space.
    pub fn from_point(p: Point3f, resolution: f32) -> Option<Self> {
        Some(Self([
            coordinate_to_key(p.x(), resolution)?,
            coordinate_to_key(p.y(), resolution)?,
            coordinate_to_key(p.z(), resolution)?,
        ]))
    }

    /// The center of the finest voxel addressed by this key.
    pub fn center(&self, resolution: f32) -> Point3f {
        self.center_at_depth(TREE_DEPTH, resolution)
    }

    /// The center of the node at `depth` which contains this key.
    pub fn center_at_depth(&self, depth: u8, resolution: f32) -> Point3f {
        let min = self.ancestor_at_depth(depth);
        let half_edge = node_edge_keys(depth) as f64 / 2.0;
        let axis = |k: u16| ((k as f64 - KEY_ORIGIN as f64 + half_edge) * resolution as f64) as f32;

        PointN([axis(min.x()), axis(min.y()), axis(min.z())])
    }

    /// The minimum-corner key of the node at `depth` which contains this key.
    pub fn ancestor_at_depth(&self, depth: u8) -> Self {
        let shift = (TREE_DEPTH - depth.min(TREE_DEPTH)) as u32;
        let mask = if shift >= 16 {
            0
        } else {
            (u16::MAX >> shift) << shift
        };

        Self([self.x() & mask, self.y() & mask, self.z() & mask])
    }

    /// The index in `[0, 8)` of the child, one level below `depth`, that contains this key.
    ///
    /// Bit 0 selects +X, bit 1 selects +Y and bit 2 selects +Z.
    pub fn child_index(&self, depth: u8) -> u8 {
        debug_assert!(depth < TREE_DEPTH);

        let bit = TREE_DEPTH - 1 - depth;
        let select = |k: u16| ((k >> bit) & 1) as u8;

        select(self.x()) | (select(self.y()) << 1) | (select(self.z()) << 2)
    }

    /// The minimum-corner key of the child `child_index` of the node at `depth` whose minimum corner
    /// is this key.
    pub fn child_min(&self, depth: u8, child_index: u8) -> Self {
        debug_assert!(depth < TREE_DEPTH);

        let bit = TREE_DEPTH - 1 - depth;
        let offset = |selected: u8| (selected as u16) << bit;

        Self([
            self.x() | offset(child_index & 1),
            self.y() | offset((child_index >> 1) & 1),
            self.z() | offset((child_index >> 2) & 1),
        ])
    }
}

/// The edge length, in finest voxels, of a node at `depth`.
pub fn node_edge_keys(depth: u8) -> u32 {
    1 << (TREE_DEPTH - depth.min(TREE_DEPTH))
}

/// The edge length, in meters, of a node at `depth`.
pub fn node_size(depth: u8, resolution: f32) -> f32 {
    node_edge_keys(depth) as f32 * resolution
}

fn coordinate_to_key(coordinate: f32, resolution: f32) -> Option<u16> {
    let cell = (coordinate as f64 / resolution as f64).floor();
    if !cell.is_finite() {
        return None;
    }
    let key = cell as i64 + KEY_ORIGIN as i64;

    if key >= 0 && key < (2 * KEY_ORIGIN) as i64 {
        Some(key as u16)
    } else {
        None
    }
}

/// A Morton-encoded `VoxelKey`. Sorting keys by their Morton code groups siblings contiguously, which
/// gives leaf snapshots a deterministic, tree-friendly order.
///
/// <https://en.wikipedia.org/wiki/Z-order_curve>
#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
pub struct Morton3(pub u128);

impl fmt::Debug for Morton3 {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} = {:b}", self.0, self.0)
    }
}

impl From<VoxelKey> for Morton3 {
    #[inline]
    fn from(k: VoxelKey) -> Self {
        Self(morton_encode([k.z() as u32, k.y() as u32, k.x() as u32]))
    }
}

impl From<Morton3> for VoxelKey {
    #[inline]
    fn from(m: Morton3) -> Self {
        let zyx: [u32; 3] = morton_decode(m.0);

        Self([zyx[2] as u16, zyx[1] as u16, zyx[0] as u16])
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
