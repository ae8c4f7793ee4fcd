use super::{
    occupancy::{LocationCode, OccupancyOctree},
    params::probability,
};

use octoflat_core::{node_size, prelude::*, TREE_DEPTH};

/// A leaf of an `OccupancyOctree`, as seen during traversal.
///
/// This is a copy of the leaf's state at the time it was visited, so a `Vec<Voxel>` collected from `leaves()` is a stable
/// snapshot that can drive later mutation of the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voxel {
    /// The minimum-corner key of the leaf. For a leaf at `TREE_DEPTH` this is simply the key of the voxel.
    pub key: VoxelKey,
    /// Depth of the leaf; `TREE_DEPTH` for voxels at the tree resolution.
    pub depth: u8,
    /// Center of the leaf in world coordinates.
    pub coordinate: Point3f,
    /// Edge length of the leaf in meters.
    pub size: f32,
    pub log_odds: f32,
}

impl Voxel {
    /// The occupancy probability.
    pub fn occupancy(&self) -> f32 {
        probability(self.log_odds)
    }

    /// The cube covered by this leaf.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::cube(self.coordinate, self.size)
    }

    /// The number of finest voxels along each edge of this leaf.
    pub fn edge_keys(&self) -> u32 {
        octoflat_core::node_edge_keys(self.depth)
    }
}

/// Depth-first iterator over the leaves of an `OccupancyOctree`, optionally restricted to a region.
///
/// Created by `OccupancyOctree::leaves` and `OccupancyOctree::leaves_in_box`.
pub struct LeafIter<'a> {
    octree: &'a OccupancyOctree,
    region: Option<BoundingBox>,
    stack: Vec<Frame>,
}

#[derive(Clone, Copy)]
struct Frame {
    code: LocationCode,
    min_key: VoxelKey,
    depth: u8,
}

impl<'a> LeafIter<'a> {
    pub(crate) fn new(octree: &'a OccupancyOctree, region: Option<BoundingBox>) -> Self {
        let mut stack = Vec::with_capacity(8 * TREE_DEPTH as usize);
        if !octree.is_empty() {
            stack.push(Frame {
                code: LocationCode::ROOT,
                min_key: VoxelKey::default(),
                depth: 0,
            });
        }

        Self {
            octree,
            region,
            stack,
        }
    }
}

impl<'a> Iterator for LeafIter<'a> {
    type Item = Voxel;

    fn next(&mut self) -> Option<Voxel> {
        let resolution = self.octree.resolution();

        while let Some(frame) = self.stack.pop() {
            let node = match self.octree.node(frame.code) {
                Some(node) => *node,
                None => continue,
            };
            let center = frame.min_key.center_at_depth(frame.depth, resolution);
            let size = node_size(frame.depth, resolution);

            if let Some(region) = &self.region {
                if !BoundingBox::cube(center, size).intersects(region) {
                    continue;
                }
            }

            if node.is_leaf() || frame.depth == TREE_DEPTH {
                if self.region.map_or(true, |r| r.contains(&center)) {
                    return Some(Voxel {
                        key: frame.min_key,
                        depth: frame.depth,
                        coordinate: center,
                        size,
                        log_odds: node.log_odds,
                    });
                }
                continue;
            }

            // Push in reverse so children are visited in octant order.
            for child_index in (0..8).rev() {
                if node.has_child(child_index) {
                    self.stack.push(Frame {
                        code: frame.code.child(child_index),
                        min_key: frame.min_key.child_min(frame.depth, child_index),
                        depth: frame.depth + 1,
                    });
                }
            }
        }

        None
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
