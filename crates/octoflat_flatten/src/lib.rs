//! Ground flattening and height projection of occupancy octrees.
//!
//! The building blocks are:
//!   - `compute_box`: the region of interest in front of a robot pose
//!   - `rasterize`: projection of the occupied voxels in a region onto a `HeightMap`
//!   - `flatten`: the rewrite that moves near-ground occupied voxels onto the ground and compacts the tree
//!
//! `FlattenPass` chains them for every received tree and talks to the outside world through the `PoseProvider`,
//! `HeightMapService` and `FlattenSink` traits.

pub mod config;
pub mod error;
pub mod flatten;
pub mod height_image;
pub mod pass;
pub mod rasterize;
pub mod region;

pub use config::{ConfigHandle, FlattenConfig};
pub use error::{FlattenError, Result};
pub use flatten::{flatten, flatten_onto, ground_level, FlattenReport, GroundLevel};
pub use height_image::{HeightImage, MONO8};
pub use pass::{FlattenPass, FlattenSink, HeightMapService, PassReport, PoseProvider};
pub use rasterize::{grid_shape, normalize_height, rasterize, RasterStats};
pub use region::{compute_box, region_of_interest, BoundingBoxMarker, MARKER_NAMESPACE};

pub mod prelude {
    pub use super::{
        compute_box, flatten, rasterize, BoundingBoxMarker, ConfigHandle, FlattenConfig,
        FlattenError, FlattenPass, FlattenSink, HeightImage, HeightMapService, PoseProvider,
    };
}
