use crate::{Bounded, DotProduct, Norm, Point, Point2, PointN, SmallZero};

use core::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::cmp::Ordering;

/// A 3-dimensional point with scalar type `T`.
pub type Point3<T> = PointN<[T; 3]>;
/// A 3-dimensional point with scalar type `f32`. All world coordinates (voxel centers, poses, box
/// corners) use this type.
pub type Point3f = PointN<[f32; 3]>;

impl<T> Point3<T> {
    pub fn x_mut(&mut self) -> &mut T {
        &mut self.0[0]
    }

    pub fn y_mut(&mut self) -> &mut T {
        &mut self.0[1]
    }

    pub fn z_mut(&mut self) -> &mut T {
        &mut self.0[2]
    }
}

impl<T> Point3<T>
where
    T: Copy,
{
    pub fn x(&self) -> T {
        self.0[0]
    }

    pub fn y(&self) -> T {
        self.0[1]
    }

    pub fn z(&self) -> T {
        self.0[2]
    }

    pub fn xy(&self) -> Point2<T> {
        PointN([self.x(), self.y()])
    }

    /// The same point with the Z component replaced.
    pub fn with_z(&self, z: T) -> Self {
        PointN([self.x(), self.y(), z])
    }
}

impl Point3f {
    /// Rotates counter-clockwise by `yaw` radians about the vertical (Z) axis through the origin.
    pub fn rotate_about_z(&self, yaw: f32) -> Self {
        let xy = self.xy().rotate(yaw);

        PointN([xy.x(), xy.y(), self.z()])
    }

    pub fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite() && self.z().is_finite()
    }
}

impl<T> Bounded for Point3<T>
where
    T: Bounded,
{
    const MAX: Self = PointN([T::MAX; 3]);
    const MIN: Self = PointN([T::MIN; 3]);
}

impl Point for Point3f {
    type Scalar = f32;

    #[inline]
    fn abs(&self) -> Self {
        self.map_components(|c| c.abs())
    }

    #[inline]
    fn at(&self, component_index: usize) -> Self::Scalar {
        self.0[component_index]
    }

    fn map_components(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self {
        PointN([f(self.x()), f(self.y()), f(self.z())])
    }

    fn meet(&self, other: &Self) -> Self {
        PointN([
            self.x().min(other.x()),
            self.y().min(other.y()),
            self.z().min(other.z()),
        ])
    }

    fn join(&self, other: &Self) -> Self {
        PointN([
            self.x().max(other.x()),
            self.y().max(other.y()),
            self.z().max(other.z()),
        ])
    }
}

impl<T> SmallZero for Point3<T>
where
    T: SmallZero,
{
    const ZERO: Self = PointN([T::ZERO; 3]);
}

impl<T> DotProduct for Point3<T>
where
    T: Copy + Add<Output = T> + Mul<Output = T>,
{
    type Scalar = T;

    fn dot(&self, other: &Self) -> Self::Scalar {
        self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
    }
}

impl Norm for Point3f {
    fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl<T> Add for PointN<[T; 3]>
where
    T: AddAssign + Copy,
{
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut sum = self;
        *sum.x_mut() += rhs.x();
        *sum.y_mut() += rhs.y();
        *sum.z_mut() += rhs.z();

        sum
    }
}

impl<T> Sub for PointN<[T; 3]>
where
    T: SubAssign + Copy,
{
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut sub = self;
        *sub.x_mut() -= rhs.x();
        *sub.y_mut() -= rhs.y();
        *sub.z_mut() -= rhs.z();

        sub
    }
}

// This particular partial order allows us to say that a `BoundingBox` b contains a `Point3f` p iff
// p is GEQ the minimum of b and p is LEQ the maximum of b.
impl<T> PartialOrd for Point3<T>
where
    T: Copy + PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self < other {
            Some(Ordering::Less)
        } else if self > other {
            Some(Ordering::Greater)
        } else if self.x() == other.x() && self.y() == other.y() && self.z() == other.z() {
            Some(Ordering::Equal)
        } else {
            None
        }
    }

    fn lt(&self, other: &Self) -> bool {
        self.x() < other.x() && self.y() < other.y() && self.z() < other.z()
    }

    fn gt(&self, other: &Self) -> bool {
        self.x() > other.x() && self.y() > other.y() && self.z() > other.z()
    }

    fn le(&self, other: &Self) -> bool {
        self.x() <= other.x() && self.y() <= other.y() && self.z() <= other.z()
    }

    fn ge(&self, other: &Self) -> bool {
        self.x() >= other.x() && self.y() >= other.y() && self.z() >= other.z()
    }
}

impl<T> Mul<T> for Point3<T>
where
    T: Copy + Mul<Output = T>,
{
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        PointN([rhs * self.x(), rhs * self.y(), rhs * self.z()])
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
