use crate::{Point3f, PointN};

use serde::{Deserialize, Serialize};

/// A robot pose reduced to what the ground flattening needs: a position and a heading about the
/// vertical axis. Roll and pitch are discarded.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Pose {
    pub position: Point3f,
    /// Radians, counter-clockwise about +Z.
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Point3f, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Reduce a full rigid transform to a `Pose`. The quaternion is given as `[x, y, z, w]` and need
    /// not be normalized.
    pub fn from_translation_and_quaternion(translation: Point3f, quaternion: [f32; 4]) -> Self {
        let [x, y, z, w] = quaternion;
        let siny_cosp = 2.0 * (w * z + x * y);
        let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);

        Self {
            position: translation,
            yaw: siny_cosp.atan2(cosy_cosp),
        }
    }

    /// Transform a point from the robot's local frame into the world frame, ignoring roll and pitch.
    pub fn transform_point(&self, local: Point3f) -> Point3f {
        self.position + local.rotate_about_z(self.yaw)
    }

    pub fn origin() -> Self {
        Self::new(PointN([0.0; 3]), 0.0)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn yaw_from_pure_z_rotation() {
        let half = FRAC_PI_2 / 2.0;
        let q = [0.0, 0.0, half.sin(), half.cos()];
        let pose = Pose::from_translation_and_quaternion(PointN([1.0, 2.0, 3.0]), q);

        assert!((pose.yaw - FRAC_PI_2).abs() < 1e-5);
        assert_eq!(pose.position, PointN([1.0, 2.0, 3.0]));
    }

    #[test]
    fn identity_quaternion_has_zero_yaw() {
        let pose = Pose::from_translation_and_quaternion(PointN([0.0; 3]), [0.0, 0.0, 0.0, 1.0]);

        assert_eq!(pose.yaw, 0.0);
    }

    #[test]
    fn forward_is_rotated_by_yaw() {
        let pose = Pose::new(PointN([1.0, 1.0, 0.5]), FRAC_PI_2);
        let p = pose.transform_point(PointN([2.0, 0.0, 0.0]));

        assert!((p.x() - 1.0).abs() < 1e-5);
        assert!((p.y() - 3.0).abs() < 1e-5);
        assert_eq!(p.z(), 0.5);
    }
}
