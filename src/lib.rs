//! A crate which exports a compact bounding volume hierarchy over triangle
//! meshes, together with batched, watertight ray traversal.
//!
//! ## About
//!
//! This crate is aimed at applications which intersect large numbers of rays
//! with a static triangle mesh. A BVH reduces the per-ray intersection cost
//! from O(n) to O(log2(n)) at the cost of building the hierarchy once in
//! advance, which is the usual trade in ray and path tracers. Two builders
//! are exported behind one strategy seam: [`MedianSplit`] always cuts the
//! largest centroid extent at its midpoint, while [`BinnedSah`] (the
//! default) picks the split plane with a binned surface area heuristic. Both
//! emit the same depth-first node layout and are served by the same
//! traverser, so the builder choice is made once per build and never per
//! ray.
//!
//! Triangle intersection uses the watertight algorithm of Woop et al., so
//! rays passing through shared edges and vertices of a closed mesh do not
//! leak between triangles.
//!
//! ## Example
//!
//! ```
//! use mesh_bvh::bvh::Bvh;
//! use mesh_bvh::mesh::Mesh;
//! use mesh_bvh::ray::{Hit, Ray};
//! use mesh_bvh::{Point3, Vector3};
//!
//! // A single triangle in the z = 0 plane.
//! let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
//! let indices = [0u32, 1, 2];
//! let mesh = Mesh::new(&positions, &indices);
//!
//! let bvh = Bvh::build(&mesh);
//!
//! let rays = [Ray::new(
//!     Point3::new(0.25, 0.25, 1.0),
//!     Vector3::new(0.0, 0.0, -1.0),
//!     0.0,
//!     10.0,
//! )];
//! let mut hits = [Hit::miss(); 1];
//! bvh.trace(&rays, &mut hits, 0);
//!
//! assert_eq!(hits[0].triangle, 0);
//! ```
//!
//! [`MedianSplit`]: bvh/struct.MedianSplit.html
//! [`BinnedSah`]: bvh/struct.BinnedSah.html

#![deny(missing_docs)]

/// Point math type used by this crate. Type alias for [`nalgebra::Point3`].
pub type Point3 = nalgebra::Point3<f32>;

/// Vector math type used by this crate. Type alias for [`nalgebra::Vector3`].
pub type Vector3 = nalgebra::Vector3<f32>;

/// Sentinel triangle index reported by a [`Hit`] when a ray hit nothing.
///
/// [`Hit`]: ray/struct.Hit.html
pub const TRIANGLE_INVALID: u32 = u32::MAX;

/// Advisory flag hinting that the rays of a batch are spatially coherent.
/// This traverser accepts and ignores it; the semantics of the batch do not
/// change.
pub const TRACE_COHERENT: u32 = 0x0001;

/// Selects any-hit (shadow) mode: each ray terminates on its first accepted
/// intersection, and the reported barycentric coordinates are unspecified.
pub const TRACE_SHADOW: u32 = 0x0002;

pub mod aabb;
pub mod bvh;
pub mod mesh;
pub mod ray;
mod utils;

#[cfg(test)]
mod testbase;
