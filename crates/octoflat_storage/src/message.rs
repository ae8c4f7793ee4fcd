//! The message that carries an `OccupancyOctree` between processes.

use crate::{OccupancyOctree, OccupancyParams, Result, StorageError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The only tree type an `OctreeMessage` may carry.
pub const OCTREE_ID: &str = "OcTree";

/// A point in time, as seconds and nanoseconds since the epoch of the data source.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Timestamp {
    pub secs: u32,
    pub nanos: u32,
}

impl Timestamp {
    pub fn new(secs: u32, nanos: u32) -> Self {
        Self { secs, nanos }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// When and in which coordinate frame some data was produced.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Header {
    pub stamp: Timestamp,
    pub frame_id: String,
}

impl Header {
    pub fn new(stamp: Timestamp, frame_id: impl Into<String>) -> Self {
        Self {
            stamp,
            frame_id: frame_id.into(),
        }
    }
}

/// A serialized `OccupancyOctree` plus the metadata needed to decode it.
///
/// If `binary` is set, `data` holds the maximum-likelihood stream of `OccupancyOctree::write_binary`. Otherwise it holds the
/// full encoding of `OccupancyOctree::to_full_bytes`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OctreeMessage {
    pub header: Header,
    pub id: String,
    pub resolution: f64,
    pub binary: bool,
    pub data: Vec<u8>,
}

impl OctreeMessage {
    pub fn from_octree(octree: &OccupancyOctree, header: Header, binary: bool) -> Result<Self> {
        let data = if binary {
            octree.write_binary()
        } else {
            octree.to_full_bytes()?
        };

        Ok(Self {
            header,
            id: OCTREE_ID.to_string(),
            resolution: octree.resolution() as f64,
            binary,
            data,
        })
    }

    /// Decode the carried tree. A binary tree gets the default sensor model.
    pub fn to_octree(&self) -> Result<OccupancyOctree> {
        if self.id != OCTREE_ID {
            return Err(StorageError::UnsupportedTreeType(self.id.clone()));
        }
        let resolution = self.resolution as f32;

        if self.binary {
            OccupancyOctree::read_binary(&self.data, resolution, OccupancyParams::default())
        } else {
            let octree = OccupancyOctree::from_full_bytes(&self.data)?;
            if octree.resolution() != resolution {
                return Err(StorageError::Decode(format!(
                    "message resolution {} does not match tree resolution {}",
                    resolution,
                    octree.resolution()
                )));
            }

            Ok(octree)
        }
    }

    /// Encode the whole message, for example to store it in a file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
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

    fn small_tree() -> OccupancyOctree {
        let mut octree = OccupancyOctree::new(0.05);
        octree.set_occupied(PointN([0.0, 0.0, 0.0]), true).unwrap();
        octree.update(PointN([0.5, 0.5, 0.0]), false).unwrap();
        octree.compact();

        octree
    }

    #[test]
    fn both_encodings_carry_the_same_tree() {
        let octree = small_tree();
        let header = Header::new(Timestamp::new(12, 500), "world");

        for &binary in [false, true].iter() {
            let message = OctreeMessage::from_octree(&octree, header.clone(), binary).unwrap();
            assert_eq!(message.header, header);
            assert_eq!(message.id, OCTREE_ID);
            assert_eq!(message.to_octree().unwrap(), octree);
        }
    }

    #[test]
    fn message_survives_byte_encoding() {
        let message =
            OctreeMessage::from_octree(&small_tree(), Header::default(), true).unwrap();

        assert_eq!(
            OctreeMessage::from_bytes(&message.to_bytes().unwrap()).unwrap(),
            message
        );
    }

    #[test]
    fn other_tree_types_are_rejected() {
        let mut message =
            OctreeMessage::from_octree(&small_tree(), Header::default(), true).unwrap();
        message.id = "ColorOcTree".to_string();

        assert!(matches!(
            message.to_octree(),
            Err(StorageError::UnsupportedTreeType(id)) if id == "ColorOcTree"
        ));
    }

    #[test]
    fn timestamp_display_pads_nanos() {
        assert_eq!(Timestamp::new(3, 42).to_string(), "3.000000042");
    }
}
