use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use num::Zero;
use serde::{Deserialize, Serialize};

/// An N-dimensional point (where N=2 or N=3), which is usually just a primitive array of type `D`.
/// It is most convenient to construct points of any dimension as:
///
/// ```
/// use octoflat_core::PointN;
///
/// let p2 = PointN([1.0, 2.0]); // 2D
/// let p3 = PointN([1.0, 2.0, 3.0]); // 3D
/// ```
///
/// Points support basic linear algebraic operations such as addition, subtraction and scalar
/// multiplication.
///
/// ```
/// use octoflat_core::PointN;
///
/// let p1 = PointN([1.0, 2.0, 0.5]);
/// let p2 = PointN([3.0, 4.0, 0.5]);
///
/// assert_eq!(p1 + p2, PointN([4.0, 6.0, 1.0]));
/// assert_eq!(p1 - p2, PointN([-2.0, -2.0, 0.0]));
/// assert_eq!(p1 * 2.0, PointN([2.0, 4.0, 1.0]));
/// ```
///
/// There is also a partial order defined on points which says that a point A is greater than a
/// point B if and only if all of the components of point A are greater than point B. This is how
/// containment in a `BoundingBox` is decided:
///
/// ```
/// use octoflat_core::PointN;
///
/// let min = PointN([0.0, 0.0, 0.0]);
/// let max = PointN([3.0, 3.0, 3.0]);
///
/// let p = PointN([0.0, 1.0, 3.0]);
/// assert!(min <= p && p <= max);
/// ```
#[derive(Copy, Clone, Debug, Deserialize, Default, Eq, Hash, PartialEq, Serialize)]
pub struct PointN<N>(pub N);

/// A trait that bundles op traits that all `PointN<N>` (and its components) should have.
pub trait Point:
    Add<Output = Self>
    + Bounded
    + Copy
    + Mul<<Self as Point>::Scalar, Output = Self>
    + PartialOrd
    + Sized
    + Sub<Output = Self>
    + Neg
    + Zero
{
    type Scalar: Copy;

    /// Returns a point where each component is the absolute value of the input component.
    fn abs(&self) -> Self;

    /// Returns the component specified by index. I.e. X = 0, Y = 1, Z = 2.
    fn at(&self, component_index: usize) -> Self::Scalar;

    /// Returns the point after applying `f` component-wise.
    fn map_components(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self;

    /// Component-wise minimum.
    fn meet(&self, other: &Self) -> Self;

    /// Component-wise maximum.
    fn join(&self, other: &Self) -> Self;
}

impl<N> Neg for PointN<N>
where
    N: Copy,
    PointN<N>: Sub<Output = Self> + Zero,
{
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::zero() - self
    }
}

impl<N> AddAssign for PointN<N>
where
    N: Copy,
    PointN<N>: Add<Output = Self>,
{
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<N> SubAssign for PointN<N>
where
    N: Copy,
    PointN<N>: Sub<Output = Self>,
{
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<N> Zero for PointN<N>
where
    Self: Point + SmallZero,
{
    fn zero() -> Self {
        Self::ZERO
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

pub trait DotProduct {
    type Scalar: Copy;

    /// The vector dot product.
    fn dot(&self, other: &Self) -> Self::Scalar;
}

pub trait Norm {
    fn norm(&self) -> f32;
}

// `Zero` trait doesn't allow associated constants for zero because of bignums.
pub trait SmallZero: Copy {
    const ZERO: Self;
}

impl SmallZero for f32 {
    const ZERO: f32 = 0.0;
}

pub trait Bounded: Copy {
    const MIN: Self;
    const MAX: Self;
}

impl Bounded for f32 {
    const MIN: Self = std::f32::MIN;
    const MAX: Self = std::f32::MAX;
}
