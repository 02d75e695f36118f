//! Watertight ray/triangle intersection after Woop, Benthin and Wald,
//! "Watertight Ray/Triangle Intersection" (JCGT 2013).

use std::mem;

use crate::ray::{Intersection, Ray};
use crate::utils::max_dim;
use crate::{Point3, Vector3};

/// A ray in the transformed form used for watertight triangle tests.
///
/// The precomputation picks the dominant direction axis `kz`, the two
/// transverse axes `kx`/`ky` (swapped when the dominant component is
/// negative, to keep winding consistent), and three shear/scale factors.
/// Building this once per ray keeps the per-triangle test branch-light.
#[derive(Debug, Clone, Copy)]
pub struct WoopRay {
    org: Point3,
    sx: f32,
    sy: f32,
    sz: f32,
    kx: usize,
    ky: usize,
    kz: usize,
}

impl WoopRay {
    /// Precomputes the transformed form of a ray. No component of
    /// `direction` may be exactly zero.
    pub fn new(origin: &Point3, direction: &Vector3) -> WoopRay {
        let kz = max_dim(direction);
        let mut kx = (kz + 1) % 3;
        let mut ky = (kz + 2) % 3;

        if direction[kz] < 0.0 {
            mem::swap(&mut kx, &mut ky);
        }

        WoopRay {
            org: *origin,
            sx: direction[kx] / direction[kz],
            sy: direction[ky] / direction[kz],
            sz: 1.0 / direction[kz],
            kx,
            ky,
            kz,
        }
    }

    /// Precomputes the transformed form of `ray`, ignoring its interval.
    pub fn from_ray(ray: &Ray) -> WoopRay {
        WoopRay::new(&ray.origin, &ray.direction)
    }

    /// Tests the ray against the triangle `(p0, p1, p2)` within
    /// `[min_t, max_t]`.
    ///
    /// The three scaled edge functions `U`, `V`, `W` decide containment. If
    /// any of them is exactly zero the hit point lies on an edge or vertex,
    /// and all three are recomputed in double precision before the sign
    /// test; this is what keeps shared edges of a closed mesh watertight.
    #[allow(clippy::many_single_char_names)]
    pub fn intersects_triangle(
        &self,
        min_t: f32,
        max_t: f32,
        p0: &Point3,
        p1: &Point3,
        p2: &Point3,
    ) -> Option<Intersection> {
        // Translate the triangle to the ray origin.
        let a = p0 - self.org;
        let b = p1 - self.org;
        let c = p2 - self.org;

        // Shear the vertices into the ray-aligned frame.
        let ax = a[self.kx] - self.sx * a[self.kz];
        let ay = a[self.ky] - self.sy * a[self.kz];
        let bx = b[self.kx] - self.sx * b[self.kz];
        let by = b[self.ky] - self.sy * b[self.kz];
        let cx = c[self.kx] - self.sx * c[self.kz];
        let cy = c[self.ky] - self.sy * c[self.kz];

        let mut u = cx * by - cy * bx;
        let mut v = ax * cy - ay * cx;
        let mut w = bx * ay - by * ax;

        if u == 0.0 || v == 0.0 || w == 0.0 {
            u = (f64::from(cx) * f64::from(by) - f64::from(cy) * f64::from(bx)) as f32;
            v = (f64::from(ax) * f64::from(cy) - f64::from(ay) * f64::from(cx)) as f32;
            w = (f64::from(bx) * f64::from(ay) - f64::from(by) * f64::from(ax)) as f32;
        }

        // The hit point must be on one side of all three edges; zero edge
        // functions count for either side.
        if (u < 0.0 || v < 0.0 || w < 0.0) && (u > 0.0 || v > 0.0 || w > 0.0) {
            return None;
        }

        let det = u + v + w;
        if det == 0.0 {
            return None;
        }

        let az = self.sz * a[self.kz];
        let bz = self.sz * b[self.kz];
        let cz = self.sz * c[self.kz];
        let t_scaled = u * az + v * bz + w * cz;

        let rcp_det = 1.0 / det;
        let t = t_scaled * rcp_det;
        if t < min_t || t > max_t {
            return None;
        }

        Some(Intersection {
            distance: t,
            v: v * rcp_det,
            w: w * rcp_det,
        })
    }
}
