//! The ground-flattening rewrite of an `OccupancyOctree`.
//!
//! The ground is the lowest leaf anywhere in the tree, occupied or free. Every leaf whose center is at most
//! `height_threshold` above the ground is removed and replaced by occupied voxels in the ground layer, directly below its
//! footprint, so free space near the ground becomes part of the ground as well. Finally the tree is `compact`ed.
//!
//! The leaves are collected into a snapshot before the tree is touched, and all deletions happen before any insertion, so
//! neither the traversal nor a later deletion ever observes a voxel that this pass inserted.

use crate::{FlattenError, Result};

use octoflat_core::{prelude::*, Morton3};
use octoflat_storage::{OccupancyOctree, Voxel};

use itertools::iproduct;

/// The lowest layer of a tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundLevel {
    /// The lowest center height of any leaf.
    pub height: f32,
    /// The key Z of the finest layer that relocated voxels are written into. This is the bottom layer of the lowest leaf.
    pub key_z: u16,
}

/// Summary of one `flatten`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlattenReport {
    pub ground_height: f32,
    /// The number of leaves that were moved onto the ground.
    pub relocated: usize,
    pub nodes_before: usize,
    pub nodes_after: usize,
}

/// Find the ground of `octree`. Fails with `EmptyTree` if the tree has no leaves.
pub fn ground_level(octree: &OccupancyOctree) -> Result<GroundLevel> {
    octree
        .leaves()
        .fold(None, |lowest: Option<Voxel>, v| match lowest {
            Some(l) if l.coordinate.z() <= v.coordinate.z() => Some(l),
            _ => Some(v),
        })
        .map(|lowest| GroundLevel {
            height: lowest.coordinate.z(),
            key_z: lowest.key.z(),
        })
        .ok_or(FlattenError::EmptyTree)
}

/// Move every leaf within `height_threshold` of the ground onto the ground as occupied space, then compact the tree.
pub fn flatten(octree: &mut OccupancyOctree, height_threshold: f32) -> Result<FlattenReport> {
    let ground = ground_level(octree)?;

    Ok(flatten_onto(octree, ground, height_threshold))
}

/// Same as `flatten`, but with a ground that has already been found by `ground_level`.
pub fn flatten_onto(
    octree: &mut OccupancyOctree,
    ground: GroundLevel,
    height_threshold: f32,
) -> FlattenReport {
    let nodes_before = octree.num_nodes();
    let ceiling = ground.height + height_threshold;

    let near_ground: Vec<Voxel> = octree
        .leaves()
        .filter(|v| v.coordinate.z() <= ceiling)
        .collect();

    for voxel in near_ground.iter() {
        octree.delete_leaf(voxel.key);
    }

    let mut targets: Vec<VoxelKey> = near_ground
        .iter()
        .flat_map(|voxel| ground_footprint(voxel, ground.key_z))
        .collect();
    // Coarse leaves and columns of voxels share targets. Sorting by Morton code also makes neighboring inserts share most of
    // their path.
    targets.sort_by_key(|&key| Morton3::from(key));
    targets.dedup();
    for key in targets.iter() {
        octree.set_occupied_key(*key, true);
    }

    octree.compact();

    let report = FlattenReport {
        ground_height: ground.height,
        relocated: near_ground.len(),
        nodes_before,
        nodes_after: octree.num_nodes(),
    };
    tracing::debug!(
        ground_height = report.ground_height,
        relocated = report.relocated,
        ground_voxels = targets.len(),
        nodes_before,
        nodes_after = report.nodes_after,
        "flattened octree"
    );

    report
}

/// The keys of the ground layer below the horizontal footprint of `voxel`.
fn ground_footprint(voxel: &Voxel, ground_key_z: u16) -> impl Iterator<Item = VoxelKey> {
    let min = voxel.key;
    let edge = voxel.edge_keys();

    iproduct!(0..edge, 0..edge).map(move |(dy, dx)| {
        VoxelKey::new(
            (min.x() as u32 + dx) as u16,
            (min.y() as u32 + dy) as u16,
            ground_key_z,
        )
    })
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    use octoflat_storage::StorageError;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    const RES: f32 = 0.2;

    fn p(x: f32, y: f32, z: f32) -> Point3f {
        PointN([x, y, z])
    }

    fn occupied_keys(octree: &OccupancyOctree) -> BTreeSet<(VoxelKey, u8)> {
        let params = *octree.params();
        octree
            .leaves()
            .filter(|v| params.is_occupied(v.log_odds))
            .map(|v| (v.key, v.depth))
            .collect()
    }

    #[test]
    fn empty_tree_has_no_ground() {
        let mut octree = OccupancyOctree::new(RES);

        assert!(matches!(ground_level(&octree), Err(FlattenError::EmptyTree)));
        assert!(matches!(flatten(&mut octree, 0.5), Err(FlattenError::EmptyTree)));
    }

    #[test]
    fn free_leaves_count_as_ground() {
        let mut octree = OccupancyOctree::new(RES);
        octree.update(p(0.0, 0.0, 0.1), false).unwrap();
        octree.set_occupied(p(1.0, 0.0, 0.3), true).unwrap();

        let report = flatten(&mut octree, 0.5).unwrap();

        assert!((report.ground_height - 0.1).abs() < 1e-5);
        assert_eq!(report.relocated, 2);
        assert!(octree.is_occupied_at(p(0.0, 0.0, 0.1)).unwrap());
        assert!(octree.is_occupied_at(p(1.0, 0.0, 0.1)).unwrap());
        assert!(matches!(
            octree.occupancy_at(p(1.0, 0.0, 0.3)),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn tree_of_free_leaves_still_has_ground() {
        let mut octree = OccupancyOctree::new(RES);
        octree.update(p(0.5, 0.5, 0.5), false).unwrap();

        let ground = ground_level(&octree).unwrap();
        assert!((ground.height - 0.5).abs() < 1e-5);

        let report = flatten(&mut octree, 0.0).unwrap();
        assert_eq!(report.relocated, 1);
        assert!(octree.is_occupied_at(p(0.5, 0.5, 0.5)).unwrap());
    }

    #[test]
    fn near_ground_voxels_drop_onto_lowest_voxel() {
        let mut octree = OccupancyOctree::new(RES);
        octree.set_occupied(p(0.0, 0.0, 0.1), true).unwrap();
        octree.set_occupied(p(1.0, 0.0, 0.3), true).unwrap();
        octree.set_occupied(p(2.0, 0.0, 5.0), true).unwrap();

        let report = flatten(&mut octree, 0.5).unwrap();

        assert!((report.ground_height - 0.1).abs() < 1e-5);
        assert_eq!(report.relocated, 2);
        assert!(octree.is_occupied_at(p(0.0, 0.0, 0.1)).unwrap());
        assert!(octree.is_occupied_at(p(1.0, 0.0, 0.1)).unwrap());
        assert!(matches!(
            octree.occupancy_at(p(1.0, 0.0, 0.3)),
            Err(StorageError::NotFound { .. })
        ));
        assert!(octree.is_occupied_at(p(2.0, 0.0, 5.0)).unwrap());
        assert_eq!(occupied_keys(&octree).len(), 3);
    }

    #[test]
    fn free_voxels_above_the_threshold_stay_in_place() {
        let mut octree = OccupancyOctree::new(RES);
        octree.set_occupied(p(0.0, 0.0, 0.1), true).unwrap();
        octree.update(p(1.0, 0.0, 1.5), false).unwrap();

        let report = flatten(&mut octree, 0.5).unwrap();

        assert_eq!(report.relocated, 1);
        assert!(!octree.is_occupied_at(p(1.0, 0.0, 1.5)).unwrap());
        assert!(matches!(
            octree.occupancy_at(p(1.0, 0.0, 0.1)),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn stacked_voxels_collapse_to_one() {
        let mut octree = OccupancyOctree::new(RES);
        for &z in [0.1, 0.3, 0.5].iter() {
            octree.set_occupied(p(0.5, 0.5, z), true).unwrap();
        }

        let report = flatten(&mut octree, 0.45).unwrap();

        assert_eq!(report.relocated, 3);
        assert_eq!(occupied_keys(&octree).len(), 1);
    }

    #[test]
    fn coarse_leaf_covers_its_footprint() {
        let mut octree = OccupancyOctree::new(RES);
        octree.set_occupied(p(-1.0, -1.0, 0.1), true).unwrap();
        // One pruned 2x2x2 block resting right above the ground layer.
        for (dx, dy, dz) in iproduct!(0..2, 0..2, 0..2) {
            let q = p(0.1 + 0.2 * dx as f32, 0.1 + 0.2 * dy as f32, 0.5 + 0.2 * dz as f32);
            octree.set_occupied(q, true).unwrap();
        }
        octree.compact();
        assert_eq!(octree.num_leaves(), 2);

        // The block's center is 0.5 above the ground.
        let report = flatten(&mut octree, 0.55).unwrap();

        assert_eq!(report.relocated, 2);
        for (dx, dy) in iproduct!(0..2, 0..2) {
            let q = p(0.1 + 0.2 * dx as f32, 0.1 + 0.2 * dy as f32, 0.1);
            assert!(octree.is_occupied_at(q).unwrap());
        }
        assert!(matches!(
            octree.occupancy_at(p(0.1, 0.1, 0.5)),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn second_flatten_changes_nothing() {
        let (mut octree, _) = utilities::data_sets::cluttered_room(0.1, 1.0);

        flatten(&mut octree, 0.3).unwrap();
        let once = octree.clone();
        flatten(&mut octree, 0.3).unwrap();

        assert_eq!(occupied_keys(&octree), occupied_keys(&once));
        assert_eq!(octree.num_leaves(), once.num_leaves());
    }
}
