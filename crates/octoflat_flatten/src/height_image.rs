use crate::{FlattenError, Result};

use octoflat_storage::{HeightMap, Header};

use serde::{Deserialize, Serialize};

/// The encoding of a `HeightImage`: one unsigned byte per pixel.
pub const MONO8: &str = "mono8";

/// A `HeightMap` packaged as a single-channel image message, as exchanged with the height map service.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HeightImage {
    pub header: Header,
    /// Number of rows.
    pub height: u32,
    /// Number of columns.
    pub width: u32,
    pub encoding: String,
    pub is_bigendian: u8,
    /// Length of a row in bytes.
    pub step: u32,
    pub data: Vec<u8>,
}

impl HeightImage {
    pub fn from_height_map(map: &HeightMap, header: Header) -> Self {
        Self {
            header,
            height: map.height() as u32,
            width: map.width() as u32,
            encoding: MONO8.to_string(),
            is_bigendian: 0,
            step: map.width() as u32,
            data: map.as_slice().to_vec(),
        }
    }

    /// Interpret the image as a height map with cells of `resolution` meters.
    pub fn to_height_map(&self, resolution: f32) -> Result<HeightMap> {
        if self.encoding != MONO8 {
            return Err(FlattenError::InvalidImage(format!(
                "expected {} encoding, got {}",
                MONO8, self.encoding
            )));
        }
        if self.step != self.width {
            return Err(FlattenError::InvalidImage(format!(
                "row padding is not supported (step {} for width {})",
                self.step, self.width
            )));
        }

        HeightMap::from_raw(
            self.width as usize,
            self.height as usize,
            resolution,
            self.data.clone(),
        )
        .ok_or_else(|| {
            FlattenError::InvalidImage(format!(
                "{} bytes of data for a {}x{} image",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
