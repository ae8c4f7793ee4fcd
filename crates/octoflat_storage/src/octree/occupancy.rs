//! The `OccupancyOctree` is a probabilistic occupancy map organized as a "hashed octree."
//!
//! Every node of the tree is stored as a `(LocationCode, OctreeNode)` entry in a hash map. A location code is the path from
//! the root to the node, three bits per level, so parent and child relations are plain bit shifts and there are no pointers
//! between nodes. A node without children is a leaf. Leaves at depth `TREE_DEPTH` have the edge length of the tree
//! resolution; shallower leaves are "coarse" and stand for a whole octant with a single value, usually because `prune`
//! collapsed eight identical siblings into their parent.
//!
//! Each node stores an occupancy estimate as log-odds. Inner nodes carry the maximum of their children, so a bounded
//! traversal can skip any subtree that does not intersect its region.
//!
//! # Mutation
//!
//! `update`, `set_occupied`, and `delete_leaf` each touch a single path from the root to a leaf. Writing below a coarse leaf
//! first expands it into eight children with the same value. Deleting a leaf also removes any ancestors that are left
//! without children.
//!
//! `compact` is the lossy simplification step: all values are snapped to their maximum-likelihood class and identical
//! siblings are merged.
//!
//! ```
//! use octoflat_core::prelude::*;
//! use octoflat_storage::prelude::*;
//!
//! let mut octree = OccupancyOctree::new(0.1);
//! octree.set_occupied(PointN([0.0, 0.0, 0.0]), true).unwrap();
//! octree.update(PointN([0.5, 0.0, 0.0]), false).unwrap();
//!
//! assert_eq!(octree.num_leaves(), 2);
//! assert!(octree.occupancy_at(PointN([0.02, 0.02, 0.02])).unwrap() > 0.9);
//! ```

use super::{
    iter::LeafIter,
    params::{probability, OccupancyParams},
};
use crate::{
    error::{Result, StorageError},
    SmallKeyHashMap,
};

use octoflat_core::{prelude::*, TREE_DEPTH};

use serde::{Deserialize, Serialize};
use std::fmt::Formatter;

/// A sparse, probabilistic occupancy map over a fixed-depth voxel lattice.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OccupancyOctree {
    resolution: f32,
    params: OccupancyParams,
    // Save memory by using 8-byte location codes as hash map keys instead of node pointers. The root exists iff the tree has
    // at least one leaf.
    nodes: SmallKeyHashMap<LocationCode, OctreeNode>,
}

impl OccupancyOctree {
    /// Make an empty tree whose finest voxels have edge length `resolution` (meters).
    pub fn new(resolution: f32) -> Self {
        Self::with_params(resolution, OccupancyParams::default())
    }

    pub fn with_params(resolution: f32, params: OccupancyParams) -> Self {
        assert!(
            resolution.is_finite() && resolution > 0.0,
            "resolution must be positive, got {}",
            resolution
        );

        Self {
            resolution,
            params,
            nodes: SmallKeyHashMap::default(),
        }
    }

    /// Same as `with_params`, but fails instead of panicking on an invalid resolution.
    pub fn try_with_params(resolution: f32, params: OccupancyParams) -> Result<Self> {
        if resolution.is_finite() && resolution > 0.0 {
            Ok(Self::with_params(resolution, params))
        } else {
            Err(StorageError::InvalidResolution(resolution))
        }
    }

    /// The edge length of the finest voxels, in meters.
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn params(&self) -> &OccupancyParams {
        &self.params
    }

    /// The probability at or above which a leaf counts as occupied.
    pub fn occupancy_threshold(&self) -> f32 {
        self.params.occupancy_threshold()
    }

    /// Returns `true` iff the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The number of stored nodes, both inner nodes and leaves.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf()).count()
    }

    /// The key of the finest voxel containing `p`.
    pub fn key_of(&self, p: Point3f) -> Result<VoxelKey> {
        VoxelKey::from_point(p, self.resolution).ok_or(StorageError::OutOfBounds { coordinate: p })
    }

    /// Iterate over every leaf, occupied or free, in depth-first order.
    ///
    /// The iterator borrows the tree, so the tree cannot be mutated while leaves are being visited. Collect the leaves
    /// first if they should drive mutation.
    pub fn leaves(&self) -> LeafIter<'_> {
        LeafIter::new(self, None)
    }

    /// Same as `leaves`, but only yield the leaves whose center lies within `region` (boundary included). Subtrees that do
    /// not intersect `region` are skipped.
    pub fn leaves_in_box(&self, region: &BoundingBox) -> LeafIter<'_> {
        LeafIter::new(self, Some(*region))
    }

    /// The occupancy probability of the leaf covering `p`.
    pub fn occupancy_at(&self, p: Point3f) -> Result<f32> {
        let key = self.key_of(p)?;

        self.search(key)
            .map(|found| probability(found.node.log_odds))
            .ok_or(StorageError::NotFound { coordinate: p })
    }

    /// Returns whether the leaf covering `p` is classified as occupied.
    pub fn is_occupied_at(&self, p: Point3f) -> Result<bool> {
        let key = self.key_of(p)?;

        self.search(key)
            .map(|found| self.params.is_occupied(found.node.log_odds))
            .ok_or(StorageError::NotFound { coordinate: p })
    }

    /// Integrate a single observation of the voxel containing `p` using the tree's sensor model. Returns the new log-odds.
    pub fn update(&mut self, p: Point3f, occupied: bool) -> Result<f32> {
        let key = self.key_of(p)?;
        let delta = if occupied {
            self.params.hit()
        } else {
            self.params.miss()
        };

        Ok(self.update_key(key, |prior| prior.unwrap_or(0.0) + delta))
    }

    /// Mark the voxel containing `p` as occupied.
    ///
    /// When `confident` is `true`, the voxel is set to the maximum occupancy value regardless of its prior, instead of
    /// integrating a single hit.
    pub fn set_occupied(&mut self, p: Point3f, confident: bool) -> Result<()> {
        let key = self.key_of(p)?;
        self.set_occupied_key(key, confident);

        Ok(())
    }

    /// Same as `set_occupied`, but addressed by key.
    pub fn set_occupied_key(&mut self, key: VoxelKey, confident: bool) {
        let hit = self.params.hit();
        let max = self.params.clamping_max();
        self.update_key(key, |prior| {
            if confident {
                max
            } else {
                prior.unwrap_or(0.0) + hit
            }
        });
    }

    /// Remove the leaf covering `key`, whatever its depth. Ancestors left without children are removed as well. Returns
    /// `false` if no leaf covers `key`.
    pub fn delete_leaf(&mut self, key: VoxelKey) -> bool {
        let found = match self.search(key) {
            Some(found) => found,
            None => return false,
        };
        self.nodes.remove(&found.code);

        let mut code = found.code;
        while code != LocationCode::ROOT {
            let parent_code = code.parent();
            let parent_is_empty = match self.nodes.get_mut(&parent_code) {
                Some(parent) => {
                    parent.child_bitmask &= !(1 << code.octant());
                    parent.child_bitmask == 0
                }
                None => break,
            };

            if parent_is_empty {
                self.nodes.remove(&parent_code);
                code = parent_code;
            } else {
                self.refresh_ancestors(parent_code);
                break;
            }
        }

        true
    }

    /// Set every inner node to the maximum value of its children.
    pub fn update_inner_occupancy(&mut self) {
        if self.nodes.contains_key(&LocationCode::ROOT) {
            self.update_inner_occupancy_recursive(LocationCode::ROOT);
        }
    }

    /// Snap every node to the most confident value of its class: `clamping_max` if occupied, `clamping_min` if free.
    pub fn to_max_likelihood(&mut self) {
        let params = self.params;
        for node in self.nodes.values_mut() {
            node.log_odds = params.max_likelihood(node.log_odds);
        }
    }

    /// Collapse every octant whose eight children are leaves with identical values into a single leaf. Returns the number
    /// of collapsed octants.
    pub fn prune(&mut self) -> usize {
        if self.nodes.contains_key(&LocationCode::ROOT) {
            self.prune_recursive(LocationCode::ROOT)
        } else {
            0
        }
    }

    /// Lossy simplification: propagate inner occupancy, convert to maximum likelihood, then prune.
    pub fn compact(&mut self) {
        let nodes_before = self.num_nodes();
        self.update_inner_occupancy();
        self.to_max_likelihood();
        let collapsed = self.prune();

        tracing::debug!(
            nodes_before,
            nodes_after = self.num_nodes(),
            collapsed,
            "compacted octree"
        );
    }

    /// The smallest box containing the centers of all occupied leaves.
    pub fn occupied_bounds(&self) -> Option<BoundingBox> {
        let params = self.params;

        BoundingBox::bounding(
            self.leaves()
                .filter(|v| params.is_occupied(v.log_odds))
                .map(|v| v.coordinate),
        )
    }

    pub(crate) fn node(&self, code: LocationCode) -> Option<&OctreeNode> {
        self.nodes.get(&code)
    }

    pub(crate) fn insert_node(&mut self, code: LocationCode, node: OctreeNode) {
        self.nodes.insert(code, node);
    }

    /// Find the leaf covering `key`.
    pub(crate) fn search(&self, key: VoxelKey) -> Option<FoundLeaf> {
        let mut code = LocationCode::ROOT;
        let mut node = *self.nodes.get(&code)?;
        for depth in 0..TREE_DEPTH {
            if node.is_leaf() {
                return Some(FoundLeaf { code, node });
            }

            let child_index = key.child_index(depth);
            if !node.has_child(child_index) {
                return None;
            }
            code = code.child(child_index);
            node = *self.nodes.get(&code)?;
        }

        Some(FoundLeaf { code, node })
    }

    /// Walk from the root to the finest voxel at `key`, creating nodes and expanding coarse leaves as needed, then set the
    /// voxel to `value(prior)` (clamped). `prior` is `None` if the voxel did not exist.
    fn update_key(&mut self, key: VoxelKey, value: impl FnOnce(Option<f32>) -> f32) -> f32 {
        let mut code = LocationCode::ROOT;
        let mut created = !self.nodes.contains_key(&code);
        if created {
            self.nodes.insert(code, OctreeNode::leaf(0.0));
        }

        for depth in 0..TREE_DEPTH {
            if !created {
                self.expand_if_leaf(code);
            }
            let child_index = key.child_index(depth);
            created = self.attach_child(code, child_index);
            code = code.child(child_index);
        }

        let leaf = self.nodes.entry(code).or_insert(OctreeNode::leaf(0.0));
        let prior = if created { None } else { Some(leaf.log_odds) };
        let new_value = self.params.clamp(value(prior));
        leaf.log_odds = new_value;

        self.refresh_ancestors(code.parent());

        new_value
    }

    fn expand_if_leaf(&mut self, code: LocationCode) {
        let value = match self.nodes.get_mut(&code) {
            Some(node) if node.is_leaf() => {
                node.child_bitmask = FULL_CHILD_BIT_MASK;
                node.log_odds
            }
            _ => return,
        };

        for child_index in 0..8 {
            self.nodes
                .insert(code.child(child_index), OctreeNode::leaf(value));
        }
    }

    /// Make sure `parent` has the child at `child_index`. Returns `true` iff the child was created.
    fn attach_child(&mut self, parent: LocationCode, child_index: u8) -> bool {
        let created = match self.nodes.get_mut(&parent) {
            Some(node) if !node.has_child(child_index) => {
                node.child_bitmask |= 1 << child_index;
                true
            }
            _ => false,
        };

        if created {
            self.nodes
                .insert(parent.child(child_index), OctreeNode::leaf(0.0));
        }

        created
    }

    /// Recompute the values of `code` and all of its ancestors from their children.
    fn refresh_ancestors(&mut self, mut code: LocationCode) {
        loop {
            self.refresh_inner(code);
            if code == LocationCode::ROOT {
                break;
            }
            code = code.parent();
        }
    }

    fn refresh_inner(&mut self, code: LocationCode) {
        let bitmask = match self.nodes.get(&code) {
            Some(node) if !node.is_leaf() => node.child_bitmask,
            _ => return,
        };
        if let Some(max) = self.max_child_log_odds(code, bitmask) {
            if let Some(node) = self.nodes.get_mut(&code) {
                node.log_odds = max;
            }
        }
    }

    fn max_child_log_odds(&self, code: LocationCode, bitmask: ChildBitMask) -> Option<f32> {
        (0..8)
            .filter(|i| bitmask & (1 << i) != 0)
            .filter_map(|i| self.nodes.get(&code.child(i)))
            .map(|child| child.log_odds)
            .fold(None, |max: Option<f32>, v| Some(max.map_or(v, |m| m.max(v))))
    }

    fn update_inner_occupancy_recursive(&mut self, code: LocationCode) {
        let bitmask = match self.nodes.get(&code) {
            Some(node) if !node.is_leaf() => node.child_bitmask,
            _ => return,
        };
        for child_index in 0..8 {
            if bitmask & (1 << child_index) != 0 {
                self.update_inner_occupancy_recursive(code.child(child_index));
            }
        }
        self.refresh_inner(code);
    }

    fn prune_recursive(&mut self, code: LocationCode) -> usize {
        let bitmask = match self.nodes.get(&code) {
            Some(node) if !node.is_leaf() => node.child_bitmask,
            _ => return 0,
        };

        let mut collapsed = 0;
        for child_index in 0..8 {
            if bitmask & (1 << child_index) != 0 {
                collapsed += self.prune_recursive(code.child(child_index));
            }
        }

        if bitmask != FULL_CHILD_BIT_MASK {
            return collapsed;
        }

        let first = match self.nodes.get(&code.child(0)) {
            Some(child) if child.is_leaf() => child.log_odds,
            _ => return collapsed,
        };
        let identical = (1..8).all(|i| {
            self.nodes
                .get(&code.child(i))
                .map_or(false, |child| child.is_leaf() && child.log_odds == first)
        });
        if !identical {
            return collapsed;
        }

        for child_index in 0..8 {
            self.nodes.remove(&code.child(child_index));
        }
        self.nodes.insert(code, OctreeNode::leaf(first));

        collapsed + 1
    }
}

pub(crate) struct FoundLeaf {
    pub code: LocationCode,
    pub node: OctreeNode,
}

/// A single stored node: its occupancy in log-odds and which of its eight children exist.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct OctreeNode {
    pub log_odds: f32,
    pub child_bitmask: ChildBitMask,
}

impl OctreeNode {
    pub fn leaf(log_odds: f32) -> Self {
        Self {
            log_odds,
            child_bitmask: 0,
        }
    }

    pub fn branch(log_odds: f32, child_bitmask: ChildBitMask) -> Self {
        Self {
            log_odds,
            child_bitmask,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.child_bitmask == 0
    }

    #[inline]
    pub fn has_child(&self, child_index: u8) -> bool {
        self.child_bitmask & (1 << child_index) != 0
    }
}

pub type ChildBitMask = u8;

const FULL_CHILD_BIT_MASK: ChildBitMask = 0xFF;

/// Uniquely identifies a node in the tree by its path from the root.
///
/// Supports a tree of `TREE_DEPTH = 16` levels below the root.
/// ```text
/// depth 0:
///   loc = 0b1
/// depth 1:
///   loc = 0b1000, 0b1001, 0b1010, 0b1011, 0b1100, 0b1101, 0b1110, 0b1111
/// depth 2:
///   loc = 0b1000000, ...
/// ...
/// depth 16:
///   loc = 0b1 followed by 48 bits
/// ```
#[derive(Clone, Copy, Deserialize, Hash, Eq, PartialEq, Serialize)]
pub(crate) struct LocationCode(u64);

impl std::fmt::Debug for LocationCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocationCode({:#b})", self.0)
    }
}

impl LocationCode {
    pub const ROOT: Self = Self(1);

    fn extend(self) -> Self {
        Self(self.0 << 3)
    }

    fn with_lowest_octant(self, octant: u8) -> Self {
        Self(self.0 | octant as u64)
    }

    pub fn child(self, octant: u8) -> Self {
        self.extend().with_lowest_octant(octant)
    }

    pub fn parent(self) -> Self {
        Self(self.0 >> 3)
    }

    /// Which child of its parent this node is.
    pub fn octant(self) -> u8 {
        (self.0 & 0b111) as u8
    }

    pub fn depth(self) -> u8 {
        ((63 - self.0.leading_zeros()) / 3) as u8
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
