use serde::{Deserialize, Serialize};

/// A dense 2D grid of heights normalized to one byte per cell, stored in row-major order.
///
/// Cell `(x, y)` lives at index `y * width + x`. The grid always holds exactly `width * height` cells.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HeightMap {
    width: usize,
    height: usize,
    resolution: f32,
    data: Vec<u8>,
}

impl HeightMap {
    /// An all-zero map of `width * height` cells, each `resolution` meters wide.
    pub fn new(width: usize, height: usize, resolution: f32) -> Self {
        Self {
            width,
            height,
            resolution,
            data: vec![0; width * height],
        }
    }

    /// Wrap existing cell data. Returns `None` unless `data.len() == width * height`.
    pub fn from_raw(width: usize, height: usize, resolution: f32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }

        Some(Self {
            width,
            height,
            resolution,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The edge length of a cell in meters.
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Returns `true` iff the map has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// The linear index of cell `(x, y)`, or `None` if the cell is outside of the map.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Raise cell `(x, y)` to `value` if it is lower. Returns `false` if the cell is outside of the map.
    #[inline]
    pub fn raise(&mut self, x: usize, y: usize, value: u8) -> bool {
        match self.index(x, y) {
            Some(i) => {
                let cell = &mut self.data[i];
                *cell = (*cell).max(value);
                true
            }
            None => false,
        }
    }

    /// The highest value in the map, or 0 if the map is empty.
    pub fn max_value(&self) -> u8 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
