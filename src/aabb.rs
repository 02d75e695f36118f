//! Axis Aligned Bounding Boxes.

use std::fmt;

use crate::utils::{fast_max, fast_min, max_dim};
use crate::{Point3, Vector3};

/// An axis-aligned bounding box given by its minimum and maximum corners.
///
/// The empty box keeps `+INFINITY` minima and `-INFINITY` maxima, which
/// makes it the neutral element under [`join`] and [`grow`].
///
/// [`join`]: #method.join
/// [`grow`]: #method.grow
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum coordinates.
    pub min: Point3,

    /// Maximum coordinates.
    pub max: Point3,
}

impl Aabb {
    /// Creates a new [`Aabb`] with the given bounds.
    pub fn with_bounds(min: Point3, max: Point3) -> Aabb {
        Aabb { min, max }
    }

    /// Creates a new empty [`Aabb`].
    pub fn empty() -> Aabb {
        Aabb {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Returns true if the [`Point3`] is inside the [`Aabb`]. Border points
    /// count as inside.
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and
    /// `other`.
    pub fn join(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::new(
                fast_min(self.min.x, other.min.x),
                fast_min(self.min.y, other.min.y),
                fast_min(self.min.z, other.min.z),
            ),
            max: Point3::new(
                fast_max(self.max.x, other.max.x),
                fast_max(self.max.y, other.max.y),
                fast_max(self.max.z, other.max.z),
            ),
        }
    }

    /// Joins `other` into this [`Aabb`] in place.
    pub fn join_mut(&mut self, other: &Aabb) {
        *self = self.join(other);
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and
    /// the point `p`.
    pub fn grow(&self, p: &Point3) -> Aabb {
        Aabb {
            min: Point3::new(
                fast_min(self.min.x, p.x),
                fast_min(self.min.y, p.y),
                fast_min(self.min.z, p.z),
            ),
            max: Point3::new(
                fast_max(self.max.x, p.x),
                fast_max(self.max.y, p.y),
                fast_max(self.max.z, p.z),
            ),
        }
    }

    /// Grows this [`Aabb`] in place to contain the point `p`.
    pub fn grow_mut(&mut self, p: &Point3) {
        *self = self.grow(p);
    }

    /// Returns the size of this [`Aabb`] in all three dimensions.
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns the center point of the [`Aabb`].
    pub fn center(&self) -> Point3 {
        self.min + (self.size() / 2.0)
    }

    /// Returns the total surface area of this [`Aabb`]. This is the cost
    /// surrogate the surface area heuristic builds on.
    pub fn surface_area(&self) -> f32 {
        let size = self.size();
        2.0 * (size.x * size.y + size.y * size.z + size.z * size.x)
    }

    /// Returns the index of the axis along which this [`Aabb`] extends the
    /// most.
    pub fn largest_axis(&self) -> usize {
        max_dim(&self.size())
    }

    /// Tests this [`Aabb`] against a ray given by its origin, the
    /// componentwise inverse of its direction, and the current `[tmin, tmax]`
    /// interval. Returns whether the clipped interval is non-empty.
    ///
    /// The caller guarantees that no direction component is exactly zero; an
    /// infinite inverse component is fine as long as the origin does not sit
    /// exactly on a slab plane of that axis.
    pub fn intersects_ray(
        &self,
        origin: &Point3,
        inv_dir: &Vector3,
        mut tmin: f32,
        mut tmax: f32,
    ) -> bool {
        for axis in 0..3 {
            let t1 = (self.min[axis] - origin[axis]) * inv_dir[axis];
            let t2 = (self.max[axis] - origin[axis]) * inv_dir[axis];

            tmin = fast_max(tmin, fast_min(t1, t2));
            tmax = fast_min(tmax, fast_max(t1, t2));
        }
        tmax >= tmin
    }
}

impl Default for Aabb {
    fn default() -> Aabb {
        Aabb::empty()
    }
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Min bound: {}; Max bound: {}", self.min, self.max)
    }
}
