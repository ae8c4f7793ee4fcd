use crate::{Point, Point3f, PointN};

use serde::{Deserialize, Serialize};

/// An axis-aligned box in world coordinates, closed on both ends.
///
/// Unlike a lattice extent, a `BoundingBox` is described by its two corners because it is derived
/// from continuous geometry (a pose and some distances), not from voxel indices.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: Point3f,
    pub max: Point3f,
}

impl BoundingBox {
    /// Construct from two corners. The corners are sorted component-wise, so `min <= max` always holds.
    pub fn from_corners(a: Point3f, b: Point3f) -> Self {
        Self {
            min: a.meet(&b),
            max: a.join(&b),
        }
    }

    /// The smallest box containing all of `points`, or `None` if there are no points.
    pub fn bounding(points: impl IntoIterator<Item = Point3f>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;

        Some(points.fold(Self::from_corners(first, first), |b, p| Self {
            min: b.min.meet(&p),
            max: b.max.join(&p),
        }))
    }

    pub fn shape(&self) -> Point3f {
        self.max - self.min
    }

    pub fn center(&self) -> Point3f {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn contains(&self, p: &Point3f) -> bool {
        self.min <= *p && *p <= self.max
    }

    /// Returns `true` iff the two boxes share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// The cube centered at `center` with edge length `size`.
    pub fn cube(center: Point3f, size: f32) -> Self {
        let half = PointN([size / 2.0; 3]);

        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Returns `true` iff the box has zero extent along X or Y.
    pub fn is_degenerate(&self) -> bool {
        let shape = self.shape();

        shape.x() <= 0.0 || shape.y() <= 0.0
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

    #[test]
    fn corners_are_sorted() {
        let b = BoundingBox::from_corners(PointN([1.0, -1.0, 3.0]), PointN([0.0, 2.0, -3.0]));

        assert_eq!(b.min, PointN([0.0, -1.0, -3.0]));
        assert_eq!(b.max, PointN([1.0, 2.0, 3.0]));
    }

    #[test]
    fn boundary_points_are_contained() {
        let b = BoundingBox::from_corners(PointN([0.0; 3]), PointN([2.0, 1.0, 1.0]));

        assert!(b.contains(&PointN([2.0, 1.0, 0.0])));
        assert!(!b.contains(&PointN([2.0, 1.01, 0.0])));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = BoundingBox::from_corners(PointN([0.0; 3]), PointN([1.0; 3]));
        let b = BoundingBox::from_corners(PointN([1.0; 3]), PointN([2.0; 3]));
        let c = BoundingBox::from_corners(PointN([1.5; 3]), PointN([2.0; 3]));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn bounding_of_nothing_is_none() {
        assert_eq!(BoundingBox::bounding(Vec::new()), None);
    }
}
