use crate::HeightMap;

pub use image;

use image::{GrayImage, Luma};

impl HeightMap {
    /// One gray pixel per cell. Row `y` of the map becomes row `y` of the image.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            Luma([self.get(x as usize, y as usize).unwrap_or(0)])
        })
    }

    pub fn from_image(image: &GrayImage, resolution: f32) -> Self {
        let (width, height) = image.dimensions();
        let mut map = Self::new(width as usize, height as usize, resolution);
        for (x, y, pixel) in image.enumerate_pixels() {
            map.raise(x as usize, y as usize, pixel[0]);
        }

        map
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
