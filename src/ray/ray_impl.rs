//! This module defines the ray and hit contracts of the traverser, plus a
//! plain Möller-Trumbore triangle test for callers and cross-checks.

use crate::{Point3, Vector3, TRIANGLE_INVALID};

/// A ray segment to be traced against a [`Bvh`].
///
/// The direction does not need to be normalized. No direction component may
/// be exactly zero, since traversal divides by each component; callers with
/// axis-parallel rays nudge the offending component by a tiny epsilon.
/// `min_t <= max_t` must hold.
///
/// [`Bvh`]: ../bvh/struct.Bvh.html
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The ray origin.
    pub origin: Point3,

    /// The ray direction, not necessarily of unit length.
    pub direction: Vector3,

    /// Start of the valid hit interval along the ray.
    pub min_t: f32,

    /// End of the valid hit interval along the ray.
    pub max_t: f32,
}

/// A struct which is returned by the triangle intersection methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Parametric distance from the ray origin to the intersection point.
    pub distance: f32,

    /// Barycentric weight of the triangle's second vertex.
    pub v: f32,

    /// Barycentric weight of the triangle's third vertex. The first vertex
    /// carries the remainder `1 - v - w`.
    pub w: f32,
}

/// The per-ray result of a trace.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hit {
    /// The original mesh index of the hit triangle, or [`TRIANGLE_INVALID`]
    /// if the ray hit nothing.
    ///
    /// [`TRIANGLE_INVALID`]: ../constant.TRIANGLE_INVALID.html
    pub triangle: u32,

    /// Barycentric coordinates `(v, w)` of the hit point. Unspecified for
    /// misses and for shadow-mode hits.
    pub barycentric: [f32; 2],
}

impl Hit {
    /// The hit record every ray starts out with.
    pub const fn miss() -> Hit {
        Hit {
            triangle: TRIANGLE_INVALID,
            barycentric: [0.0; 2],
        }
    }

    /// Whether this record still marks a miss.
    pub fn is_miss(&self) -> bool {
        self.triangle == TRIANGLE_INVALID
    }
}

impl Default for Hit {
    fn default() -> Hit {
        Hit::miss()
    }
}

impl Ray {
    /// Creates a new [`Ray`] with the hit interval `[min_t, max_t]`.
    pub fn new(origin: Point3, direction: Vector3, min_t: f32, max_t: f32) -> Ray {
        Ray {
            origin,
            direction,
            min_t,
            max_t,
        }
    }

    /// The componentwise inverse of the direction, as consumed by the slab
    /// test.
    pub fn inv_direction(&self) -> Vector3 {
        self.direction.map(|x| 1.0 / x)
    }

    /// Implementation of the
    /// [Möller-Trumbore triangle/ray intersection algorithm](https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm),
    /// clipped to the ray's `[min_t, max_t]` interval. Both triangle sides
    /// are reported; rays parallel to the triangle plane miss.
    ///
    /// This test is not watertight and is not used by the traverser, which
    /// relies on [`WoopRay`]. It is the straightforward check for callers
    /// that have no transformed ray at hand, and it serves as an independent
    /// reference in the test suite.
    ///
    /// [`WoopRay`]: struct.WoopRay.html
    #[allow(clippy::many_single_char_names)]
    pub fn intersects_triangle(
        &self,
        p0: &Point3,
        p1: &Point3,
        p2: &Point3,
    ) -> Option<Intersection> {
        const EPSILON: f32 = 1.0e-5;

        let edge1 = p1 - p0;
        let edge2 = p2 - p0;

        let h = self.direction.cross(&edge2);
        let a = edge1.dot(&h);

        // The ray lies in the plane of the triangle.
        if a > -EPSILON && a < EPSILON {
            return None;
        }

        let f = 1.0 / a;

        let s = self.origin - p0;
        let v = f * s.dot(&h);
        if !(0.0..=1.0).contains(&v) {
            return None;
        }

        let q = s.cross(&edge1);
        let w = f * self.direction.dot(&q);
        if w < 0.0 || v + w > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t < self.min_t || t > self.max_t {
            return None;
        }

        Some(Intersection {
            distance: t,
            v,
            w,
        })
    }
}
