//! One run of the whole pipeline on a received octree.
//!
//! A `FlattenPass` owns the collaborators that connect it to the outside world: a `PoseProvider` to locate the robot, a
//! `HeightMapService` that post-processes height maps, and a `FlattenSink` that receives all outputs. Each call to
//! `FlattenPass::process` runs to completion on its own copy of the tree:
//!
//! 1. decode the tree and take a snapshot of the configuration
//! 2. look up the robot pose at the time of the tree; if that fails the pass is abandoned without any output
//! 3. publish a marker of the region of interest
//! 4. rasterize the region into a height map, publish it and send it to the service
//! 5. flatten the tree onto its ground, unless it is empty
//! 6. publish the tree with the header of the input

use crate::{
    flatten::{flatten_onto, ground_level, FlattenReport},
    rasterize::{rasterize, RasterStats},
    region::{region_of_interest, BoundingBoxMarker},
    ConfigHandle, FlattenError, HeightImage, Result,
};

use octoflat_core::prelude::*;
use octoflat_storage::{OctreeMessage, Timestamp};

/// Resolves where the robot was at some point in time.
pub trait PoseProvider {
    /// The pose of `target` expressed in `reference` at `stamp`. Fails with `FlattenError::TransformUnavailable` if no
    /// transform is known.
    fn lookup_pose(&self, reference: &str, target: &str, stamp: Timestamp) -> Result<Pose>;
}

/// A synchronous request/response service that post-processes height images.
pub trait HeightMapService {
    fn process_height_map(&mut self, image: &HeightImage) -> Result<HeightImage>;
}

/// Receives the outputs of a pass.
pub trait FlattenSink {
    fn publish_marker(&mut self, marker: BoundingBoxMarker);
    fn publish_height_image(&mut self, image: HeightImage);
    fn publish_octree(&mut self, message: OctreeMessage);
}

impl<F> PoseProvider for F
where
    F: Fn(&str, &str, Timestamp) -> Result<Pose>,
{
    fn lookup_pose(&self, reference: &str, target: &str, stamp: Timestamp) -> Result<Pose> {
        (self)(reference, target, stamp)
    }
}

/// What a completed pass did.
#[derive(Clone, Debug, PartialEq)]
pub struct PassReport {
    pub pose: Pose,
    pub region: BoundingBox,
    pub image_width: usize,
    pub image_height: usize,
    pub raster: RasterStats,
    /// The dimensions `(width, height)` of the image returned by the service, if it answered.
    pub service_reply: Option<(u32, u32)>,
    /// `None` if the tree was empty and was published unchanged.
    pub flatten: Option<FlattenReport>,
}

pub struct FlattenPass<P, S, K> {
    config: ConfigHandle,
    poses: P,
    service: S,
    sink: K,
    binary_output: bool,
}

impl<P, S, K> FlattenPass<P, S, K>
where
    P: PoseProvider,
    S: HeightMapService,
    K: FlattenSink,
{
    pub fn new(config: ConfigHandle, poses: P, service: S, sink: K) -> Self {
        Self {
            config,
            poses,
            service,
            sink,
            binary_output: false,
        }
    }

    /// Publish trees in the compact binary format instead of the full format.
    pub fn with_binary_output(mut self, binary_output: bool) -> Self {
        self.binary_output = binary_output;
        self
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Run the pipeline on `message`. `grid_stamp` is the time of the projected grid that arrived together with the tree;
    /// only the tree's own stamp is used for lookups.
    ///
    /// Returns an error, and publishes nothing, if the tree cannot be decoded or the pose is unavailable. A failed service
    /// call or an empty tree does not stop the pass.
    pub fn process(&mut self, message: &OctreeMessage, grid_stamp: Timestamp) -> Result<PassReport> {
        let header = message.header.clone();
        let mut octree = message.to_octree()?;
        let config = self.config.snapshot();
        let resolution = octree.resolution();
        tracing::info!(
            nodes = octree.num_nodes(),
            stamp = %header.stamp,
            grid_stamp = %grid_stamp,
            "received tree"
        );
        if let Some(bounds) = octree.occupied_bounds() {
            tracing::debug!(min = ?bounds.min, max = ?bounds.max, "occupied bounds");
        }

        let ground = match ground_level(&octree) {
            Ok(ground) => {
                tracing::info!(ground_height = ground.height, "found ground");
                Some(ground)
            }
            Err(FlattenError::EmptyTree) => None,
            Err(e) => return Err(e),
        };

        let pose = self
            .poses
            .lookup_pose(&config.world_frame, &config.robot_frame, header.stamp)
            .map_err(|e| {
                tracing::error!("abandoning pass: {}", e);
                e
            })?;

        let region = region_of_interest(&pose, &config);
        tracing::info!(min = ?region.min, max = ?region.max, "bounding box");
        let mut marker_header = header.clone();
        marker_header.frame_id = config.world_frame.clone();
        self.sink.publish_marker(BoundingBoxMarker::new(&region, marker_header));

        let (height_map, raster) = rasterize(&octree, &region, resolution);
        tracing::info!(
            width = height_map.width(),
            height = height_map.height(),
            resolution,
            "height map"
        );
        tracing::info!("visited {} leaves, {} occupied", raster.visited, raster.occupied);

        let image = HeightImage::from_height_map(&height_map, header.clone());
        self.sink.publish_height_image(image.clone());

        let service_reply = match self.service.process_height_map(&image) {
            Ok(reply) => {
                tracing::info!(
                    width = reply.width,
                    height = reply.height,
                    "service returned image"
                );
                Some((reply.width, reply.height))
            }
            Err(e) => {
                tracing::error!("height map service failed: {}", e);
                None
            }
        };

        let flatten = match ground {
            Some(ground) => Some(flatten_onto(&mut octree, ground, config.height_threshold)),
            None => {
                tracing::warn!("{}; publishing the tree without flattening", FlattenError::EmptyTree);
                None
            }
        };

        let output = OctreeMessage::from_octree(&octree, header, self.binary_output)?;
        tracing::info!(nodes = octree.num_nodes(), "publishing tree");
        self.sink.publish_octree(output);

        Ok(PassReport {
            pose,
            region,
            image_width: height_map.width(),
            image_height: height_map.height(),
            raster,
            service_reply,
            flatten,
        })
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

    use octoflat_storage::{Header, OccupancyOctree};

    #[derive(Default)]
    struct Recorder {
        markers: usize,
        images: usize,
        octrees: usize,
    }

    impl FlattenSink for Recorder {
        fn publish_marker(&mut self, _: BoundingBoxMarker) {
            self.markers += 1;
        }
        fn publish_height_image(&mut self, _: HeightImage) {
            self.images += 1;
        }
        fn publish_octree(&mut self, _: OctreeMessage) {
            self.octrees += 1;
        }
    }

    struct Echo;

    impl HeightMapService for Echo {
        fn process_height_map(&mut self, image: &HeightImage) -> Result<HeightImage> {
            Ok(image.clone())
        }
    }

    #[test]
    fn closures_are_pose_providers() {
        let poses = |_: &str, _: &str, _: Timestamp| -> Result<Pose> {
            Ok(Pose::new(PointN([0.0, 0.0, 1.0]), 0.0))
        };
        let mut octree = OccupancyOctree::new(0.1);
        octree.set_occupied(PointN([0.5, 0.0, 0.05]), true).unwrap();
        let message =
            OctreeMessage::from_octree(&octree, Header::default(), false).unwrap();

        let mut pass = FlattenPass::new(ConfigHandle::default(), poses, Echo, Recorder::default());
        let report = pass.process(&message, Timestamp::default()).unwrap();

        assert_eq!(report.raster.occupied, 1);
        assert_eq!(report.service_reply, Some((20, 10)));
        let sink = pass.into_sink();
        assert_eq!((sink.markers, sink.images, sink.octrees), (1, 1, 1));
    }
}
