//! An Axis-Aligned Bounding Box (AABB) represented by its minimum and maximum points.

use std::ops::BitAnd;

use bytemuck::{Pod, Zeroable};
use glam::Vec3A;

use crate::Primitive;

/// An Axis-Aligned Bounding Box (AABB) represented by its minimum and maximum points.
#[derive(Default, Clone, Copy, Debug, PartialEq, Zeroable)]
#[repr(C)]
pub struct Aabb {
    pub min: Vec3A,
    pub max: Vec3A,
}

unsafe impl Pod for Aabb {}

impl Aabb {
    /// An empty AABB with min set to the maximum possible value and max set to
    /// the minimum possible value. This is the identity for `union`.
    pub const EMPTY: Self = Self {
        min: Vec3A::splat(f32::MAX),
        max: Vec3A::splat(f32::MIN),
    };

    /// Creates a new AABB with the given minimum and maximum points.
    #[inline(always)]
    pub fn new(min: Vec3A, max: Vec3A) -> Self {
        Self { min, max }
    }

    /// Creates a new AABB with both min and max set to the given point.
    #[inline(always)]
    pub fn from_point(point: Vec3A) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates an AABB that bounds the given set of points.
    #[inline(always)]
    pub fn from_points(points: &[Vec3A]) -> Self {
        let mut points = points.iter();
        let mut aabb = Aabb::from_point(*points.next().unwrap());
        for point in points {
            aabb.extend(*point);
        }
        aabb
    }

    /// Checks if the AABB contains the given point.
    #[inline(always)]
    pub fn contains_point(&self, point: Vec3A) -> bool {
        (point.cmpge(self.min).bitand(point.cmple(self.max))).all()
    }

    /// Checks if `other` is fully contained in this AABB.
    #[inline(always)]
    pub fn contains_aabb(&self, other: &Self) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    /// Extends the AABB to include the given point.
    #[inline(always)]
    pub fn extend(&mut self, point: Vec3A) -> &mut Self {
        *self = self.union(&Self::from_point(point));
        self
    }

    /// Returns the union of this AABB and another AABB.
    ///
    /// Componentwise min/max, so the result is independent of the fold
    /// direction over the same multiset of boxes.
    #[inline(always)]
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the diagonal vector of the AABB.
    #[inline(always)]
    pub fn diagonal(&self) -> Vec3A {
        self.max - self.min
    }

    /// Returns the center point of the AABB.
    #[inline(always)]
    pub fn center(&self) -> Vec3A {
        (self.max + self.min) * 0.5
    }

    /// Returns the center coordinate of the AABB along a specific axis.
    #[inline(always)]
    pub fn center_axis(&self, axis: usize) -> f32 {
        (self.max[axis] + self.min[axis]) * 0.5
    }

    /// Returns half the surface area of the AABB. 0 when empty.
    #[inline(always)]
    pub fn half_area(&self) -> f32 {
        if !self.valid() {
            return 0.0;
        }
        let d = self.diagonal();
        (d.x + d.y) * d.z + d.x * d.y
    }

    /// Returns the surface area of the AABB: `2 * (dx*dy + dy*dz + dz*dx)`.
    /// 0 when empty.
    #[inline(always)]
    pub fn surface_area(&self) -> f32 {
        2.0 * self.half_area()
    }

    /// Returns an empty AABB.
    #[inline(always)]
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Checks if the AABB is valid (i.e., min <= max on all axes and no NaN).
    pub fn valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }
}

/// An AABB is itself a primitive: the "mesh" input family hands the builder
/// one precomputed box per mesh, which is never split internally.
impl Primitive for Aabb {
    #[inline(always)]
    fn center(&self) -> Vec3A {
        self.center()
    }

    #[inline(always)]
    fn aabb(&self) -> Aabb {
        *self
    }
}
