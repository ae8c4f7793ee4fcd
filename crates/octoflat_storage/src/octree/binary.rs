//! Serialization of an `OccupancyOctree`.
//!
//! There are two formats:
//!
//! - The *full* format is the `bincode` encoding of the whole tree, including the log-odds of every node and the sensor
//!   model. It is lossless.
//! - The *binary* format only stores the maximum-likelihood class of each node, so it is lossless only for a tree that has
//!   been `compact`ed. It starts with a root tag byte:
//!
//!   | tag | root |
//!   |-----|------|
//!   | 0   | empty tree |
//!   | 1   | occupied leaf |
//!   | 2   | free leaf |
//!   | 3   | inner node |
//!
//!   followed by every inner node in depth-first pre-order, each as a little-endian `u16`. Bits `2i..2i+2` of the `u16`
//!   describe child `i`: `00` unknown, `01` occupied leaf, `10` free leaf, `11` inner node.

use super::{
    occupancy::{LocationCode, OctreeNode},
    OccupancyOctree, OccupancyParams,
};
use crate::{Result, StorageError};

use octoflat_core::TREE_DEPTH;

const ROOT_EMPTY: u8 = 0;
const ROOT_OCCUPIED: u8 = 1;
const ROOT_FREE: u8 = 2;
const ROOT_INNER: u8 = 3;

const CHILD_UNKNOWN: u16 = 0b00;
const CHILD_OCCUPIED: u16 = 0b01;
const CHILD_FREE: u16 = 0b10;
const CHILD_INNER: u16 = 0b11;

impl OccupancyOctree {
    /// Encode the whole tree, log-odds included.
    pub fn to_full_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_full_bytes(bytes: &[u8]) -> Result<Self> {
        let octree: Self = bincode::deserialize(bytes)?;
        if !(octree.resolution().is_finite() && octree.resolution() > 0.0) {
            return Err(StorageError::InvalidResolution(octree.resolution()));
        }

        Ok(octree)
    }

    /// Encode the maximum-likelihood classes of all nodes, 2 bits per child.
    pub fn write_binary(&self) -> Vec<u8> {
        let root = match self.node(LocationCode::ROOT) {
            Some(root) => *root,
            None => return vec![ROOT_EMPTY],
        };

        let mut bytes = Vec::with_capacity(1 + 2 * (self.num_nodes() - self.num_leaves()));
        if root.is_leaf() {
            bytes.push(if self.params().is_occupied(root.log_odds) {
                ROOT_OCCUPIED
            } else {
                ROOT_FREE
            });
        } else {
            bytes.push(ROOT_INNER);
            self.write_inner(LocationCode::ROOT, root, &mut bytes);
        }

        bytes
    }

    fn write_inner(&self, code: LocationCode, node: OctreeNode, bytes: &mut Vec<u8>) {
        let mut children = [None; 8];
        let mut bits = 0u16;
        for child_index in 0..8 {
            if !node.has_child(child_index) {
                continue;
            }
            let child = match self.node(code.child(child_index)) {
                Some(child) => *child,
                None => continue,
            };
            let class = if !child.is_leaf() {
                children[child_index as usize] = Some(child);
                CHILD_INNER
            } else if self.params().is_occupied(child.log_odds) {
                CHILD_OCCUPIED
            } else {
                CHILD_FREE
            };
            bits |= class << (2 * child_index);
        }
        bytes.extend_from_slice(&bits.to_le_bytes());

        for (child_index, child) in children.iter().enumerate() {
            if let Some(child) = child {
                self.write_inner(code.child(child_index as u8), *child, bytes);
            }
        }
    }

    /// Decode a tree written by `write_binary`. Occupied leaves get the value `clamping_max` of `params` and free leaves get
    /// `clamping_min`.
    pub fn read_binary(bytes: &[u8], resolution: f32, params: OccupancyParams) -> Result<Self> {
        let mut octree = Self::try_with_params(resolution, params)?;

        let (&tag, mut rest) = bytes
            .split_first()
            .ok_or_else(|| StorageError::Decode("missing root tag".to_string()))?;
        match tag {
            ROOT_EMPTY => {}
            ROOT_OCCUPIED => {
                octree.insert_node(LocationCode::ROOT, OctreeNode::leaf(params.clamping_max()))
            }
            ROOT_FREE => {
                octree.insert_node(LocationCode::ROOT, OctreeNode::leaf(params.clamping_min()))
            }
            ROOT_INNER => {
                octree.read_inner(LocationCode::ROOT, &mut rest)?;
                octree.update_inner_occupancy();
            }
            other => return Err(StorageError::Decode(format!("invalid root tag {}", other))),
        }

        if !rest.is_empty() {
            return Err(StorageError::Decode(format!(
                "{} trailing bytes after the last node",
                rest.len()
            )));
        }

        Ok(octree)
    }

    fn read_inner(&mut self, code: LocationCode, bytes: &mut &[u8]) -> Result<()> {
        if code.depth() >= TREE_DEPTH {
            return Err(StorageError::Decode(
                "inner node below the maximum depth".to_string(),
            ));
        }
        if bytes.len() < 2 {
            return Err(StorageError::Decode("truncated node stream".to_string()));
        }
        let bits = u16::from_le_bytes([bytes[0], bytes[1]]);
        *bytes = &bytes[2..];
        if bits == 0 {
            return Err(StorageError::Decode(
                "inner node without children".to_string(),
            ));
        }

        let params = *self.params();
        let mut bitmask = 0;
        for child_index in 0..8u8 {
            let child_code = code.child(child_index);
            match (bits >> (2 * child_index)) & 0b11 {
                CHILD_UNKNOWN => continue,
                CHILD_OCCUPIED => {
                    self.insert_node(child_code, OctreeNode::leaf(params.clamping_max()))
                }
                CHILD_FREE => {
                    self.insert_node(child_code, OctreeNode::leaf(params.clamping_min()))
                }
                class => {
                    debug_assert_eq!(class, CHILD_INNER);
                    self.read_inner(child_code, bytes)?;
                }
            }
            bitmask |= 1 << child_index;
        }
        // The value is fixed up by `update_inner_occupancy` once the whole tree exists.
        self.insert_node(code, OctreeNode::branch(params.clamping_min(), bitmask));

        Ok(())
    }
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

    use octoflat_core::prelude::*;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn random_compacted_tree() -> OccupancyOctree {
        let mut rng = rand::thread_rng();
        let mut octree = OccupancyOctree::new(0.1);
        for _ in 0..300 {
            let p = PointN([
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(0.0..1.0),
            ]);
            octree.update(p, rng.gen_bool(0.7)).unwrap();
        }
        octree.compact();

        octree
    }

    #[test]
    fn empty_tree_is_a_single_tag() {
        let octree = OccupancyOctree::new(0.1);
        let bytes = octree.write_binary();

        assert_eq!(bytes, vec![ROOT_EMPTY]);
        assert_eq!(
            OccupancyOctree::read_binary(&bytes, 0.1, OccupancyParams::default()).unwrap(),
            octree
        );
    }

    #[test]
    fn compacted_tree_round_trips_through_binary() {
        let octree = random_compacted_tree();
        let bytes = octree.write_binary();
        let decoded =
            OccupancyOctree::read_binary(&bytes, octree.resolution(), *octree.params()).unwrap();

        let leaves = |t: &OccupancyOctree| -> Vec<_> {
            t.leaves().map(|v| (v.key, v.depth, v.log_odds)).collect()
        };
        assert_eq!(leaves(&decoded), leaves(&octree));
        assert_eq!(decoded, octree);
    }

    #[test]
    fn tree_round_trips_through_full_bytes() {
        let mut octree = OccupancyOctree::new(0.05);
        octree.update(PointN([0.0, 0.0, 0.0]), true).unwrap();
        octree.update(PointN([0.3, 0.0, 0.0]), false).unwrap();

        let decoded = OccupancyOctree::from_full_bytes(&octree.to_full_bytes().unwrap()).unwrap();

        assert_eq!(decoded, octree);
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let octree = random_compacted_tree();
        let bytes = octree.write_binary();

        let result = OccupancyOctree::read_binary(
            &bytes[..bytes.len() - 1],
            octree.resolution(),
            *octree.params(),
        );
        assert!(matches!(result, Err(StorageError::Decode(_))));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let result =
            OccupancyOctree::read_binary(&[ROOT_OCCUPIED, 0], 0.1, OccupancyParams::default());

        assert!(matches!(result, Err(StorageError::Decode(_))));
    }

    #[test]
    fn invalid_resolution_is_rejected() {
        let result = OccupancyOctree::read_binary(&[ROOT_EMPTY], 0.0, OccupancyParams::default());

        assert!(matches!(result, Err(StorageError::InvalidResolution(_))));
    }
}
