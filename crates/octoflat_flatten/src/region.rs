//! The region of interest in front of the robot, and its visualization.

use crate::FlattenConfig;

use octoflat_core::prelude::*;
use octoflat_storage::Header;

use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// The axis-aligned box covering a `depth x width` rectangle that starts at `pose.position` and extends forward along the
/// pose's heading. The rectangle is rotated by `pose.yaw` before its horizontal extents are taken, so the box grows when the
/// robot is not aligned with the world axes.
///
/// The vertical extent is exactly `[z_min, z_max]`. The Z bounds are not reordered: if `z_max < z_min` the box contains no
/// point, and `max.z` stays `z_max` for height normalization.
pub fn compute_box(pose: &Pose, width: f32, depth: f32, z_min: f32, z_max: f32) -> BoundingBox {
    let half_width = width / 2.0;
    let forward_offsets = [0.0, depth];
    let left_offsets = [-half_width, half_width];
    let corners = iproduct!(forward_offsets.iter(), left_offsets.iter()).map(|(&forward, &left)| {
        let local: Point2f = PointN([forward, left]);
        let p = pose.position.xy() + local.rotate(pose.yaw);

        PointN([p.x(), p.y(), z_min])
    });

    // There are always four corners.
    let footprint = BoundingBox::bounding(corners).unwrap_or(BoundingBox::from_corners(
        pose.position.with_z(z_min),
        pose.position.with_z(z_min),
    ));

    BoundingBox {
        min: footprint.min.with_z(z_min),
        max: footprint.max.with_z(z_max),
    }
}

/// The box used by a pass: everything in front of the robot from the ground (world height zero) up to the robot's height.
pub fn region_of_interest(pose: &Pose, config: &FlattenConfig) -> BoundingBox {
    compute_box(
        pose,
        config.region_width,
        config.region_depth,
        0.0,
        pose.position.z(),
    )
}

/// The display namespace of the region marker.
pub const MARKER_NAMESPACE: &str = "octomap_flatter vizualization";

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MarkerShape {
    Cube,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MarkerAction {
    Add,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// A translucent green cube showing a `BoundingBox` in a viewer. Purely informational.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BoundingBoxMarker {
    pub header: Header,
    pub namespace: String,
    pub id: i32,
    pub shape: MarkerShape,
    pub action: MarkerAction,
    pub position: Point3f,
    /// Quaternion `[x, y, z, w]`.
    pub orientation: [f32; 4],
    /// Edge lengths of the cube.
    pub scale: Point3f,
    pub color: Rgba,
    /// `None` means the marker never expires.
    pub lifetime_secs: Option<f32>,
}

impl BoundingBoxMarker {
    pub fn new(bounds: &BoundingBox, header: Header) -> Self {
        Self {
            header,
            namespace: MARKER_NAMESPACE.to_string(),
            id: 0,
            shape: MarkerShape::Cube,
            action: MarkerAction::Add,
            position: bounds.center(),
            orientation: [0.0, 0.0, 0.0, 1.0],
            scale: bounds.shape(),
            color: Rgba {
                r: 0.0,
                g: 1.0,
                b: 0.0,
                a: 0.2,
            },
            lifetime_secs: None,
        }
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

    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn assert_close(a: Point3f, b: Point3f) {
        assert!((a - b).norm() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn unrotated_box_extends_forward() {
        let b = compute_box(&Pose::origin(), 1.0, 2.0, 0.0, 0.0);

        assert_close(b.min, PointN([0.0, -0.5, 0.0]));
        assert_close(b.max, PointN([2.0, 0.5, 0.0]));
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let pose = Pose::new(PointN([1.0, 1.0, 0.8]), FRAC_PI_2);
        let b = compute_box(&pose, 1.0, 2.0, 0.0, pose.position.z());

        assert_close(b.min, PointN([0.5, 1.0, 0.0]));
        assert_close(b.max, PointN([1.5, 3.0, 0.8]));
    }

    #[test]
    fn diagonal_heading_contains_all_corners() {
        let pose = Pose::new(PointN([0.0, 0.0, 1.0]), FRAC_PI_4);
        let b = compute_box(&pose, 1.0, 2.0, 0.0, 1.0);

        for &(forward, left) in [(0.0, -0.5), (0.0, 0.5), (2.0, -0.5), (2.0, 0.5)].iter() {
            // Half way between the robot and the ground.
            let corner = pose.transform_point(PointN([forward, left, -0.5]));
            assert!(b.contains(&corner), "{:?} not in {:?}", corner, b);
        }
    }

    #[test]
    fn zero_width_box_is_degenerate() {
        let b = compute_box(&Pose::origin(), 0.0, 2.0, 0.0, 1.0);

        assert!(b.is_degenerate());
    }

    #[test]
    fn region_spans_ground_to_robot_height() {
        let pose = Pose::new(PointN([3.0, -2.0, 0.6]), 0.0);
        let b = region_of_interest(&pose, &FlattenConfig::default());

        assert_eq!(b.min.z(), 0.0);
        assert_eq!(b.max.z(), 0.6);
    }

    #[test]
    fn robot_below_world_zero_keeps_its_height_as_top() {
        let pose = Pose::new(PointN([0.0, 0.0, -0.4]), 0.0);
        let b = region_of_interest(&pose, &FlattenConfig::default());

        assert_eq!(b.min.z(), 0.0);
        assert_eq!(b.max.z(), -0.4);
        assert!(!b.contains(&PointN([1.0, 0.0, -0.2])));
        assert!(!b.contains(&PointN([1.0, 0.0, 0.0])));
    }

    #[test]
    fn marker_matches_box() {
        let b = BoundingBox::from_corners(PointN([0.0, -0.5, 0.0]), PointN([2.0, 0.5, 1.0]));
        let marker = BoundingBoxMarker::new(&b, Header::default());

        assert_eq!(marker.position, PointN([1.0, 0.0, 0.5]));
        assert_eq!(marker.scale, PointN([2.0, 1.0, 1.0]));
        assert_eq!(marker.namespace, MARKER_NAMESPACE);
        assert_eq!(marker.lifetime_secs, None);
    }
}
