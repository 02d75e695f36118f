//! Batched ray traversal.

use crate::bvh::Bvh;
use crate::ray::{Hit, Ray, WoopRay};
use crate::TRACE_SHADOW;

impl Bvh {
    /// Traces a batch of rays and writes one [`Hit`] per ray, with
    /// `hits[i]` belonging to `rays[i]`.
    ///
    /// `flags` is a bitmask of [`TRACE_COHERENT`] (accepted, ignored) and
    /// [`TRACE_SHADOW`]. Without [`TRACE_SHADOW`] each ray reports its
    /// closest intersection inside `[min_t, max_t]`; with it, each ray
    /// terminates on the first intersection found and only the hit/miss
    /// distinction is meaningful.
    ///
    /// Traversal reads the hierarchy without mutating it, and the result is
    /// deterministic for identical inputs.
    ///
    /// # Panics
    ///
    /// Panics if `rays` and `hits` differ in length.
    ///
    /// [`Hit`]: ../ray/struct.Hit.html
    /// [`TRACE_COHERENT`]: ../constant.TRACE_COHERENT.html
    /// [`TRACE_SHADOW`]: ../constant.TRACE_SHADOW.html
    pub fn trace(&self, rays: &[Ray], hits: &mut [Hit], flags: u32) {
        assert_eq!(rays.len(), hits.len(), "one hit slot per ray");

        // The lone sentinel node of an empty hierarchy is not rejected by
        // the slab test (its infinite slabs clip nothing), so it never
        // reaches the per-node loop.
        if self.triangles.is_empty() {
            hits.fill(Hit::miss());
            return;
        }

        let mut stack: Vec<u32> = Vec::with_capacity(128);
        for (ray, hit) in rays.iter().zip(hits.iter_mut()) {
            *hit = self.trace_ray(ray, flags, &mut stack);
        }
    }

    /// Traces a batch of rays in parallel. Semantics and output are
    /// identical to [`trace`]; rays are independent, and every worker keeps
    /// its own traversal stack.
    ///
    /// [`trace`]: #method.trace
    #[cfg(feature = "rayon")]
    pub fn trace_par(&self, rays: &[Ray], hits: &mut [Hit], flags: u32) {
        use rayon::prelude::*;

        assert_eq!(rays.len(), hits.len(), "one hit slot per ray");

        if self.triangles.is_empty() {
            hits.fill(Hit::miss());
            return;
        }

        rays.par_iter().zip(hits.par_iter_mut()).for_each_init(
            || Vec::with_capacity(128),
            |stack, (ray, hit)| {
                *hit = self.trace_ray(ray, flags, stack);
            },
        );
    }

    /// Walks the tree for one ray with an explicit stack.
    fn trace_ray(&self, ray: &Ray, flags: u32, stack: &mut Vec<u32>) -> Hit {
        let mut hit = Hit::miss();

        let min_t = ray.min_t;
        let mut max_t = ray.max_t;

        let inv_dir = ray.inv_direction();
        let woop = WoopRay::from_ray(ray);

        stack.clear();
        let mut node_index = 0usize;
        loop {
            let node = &self.nodes[node_index];

            if node.aabb.intersects_ray(&ray.origin, &inv_dir, min_t, max_t) {
                if node.count == 0 {
                    // Descend front to back: visiting the near child first
                    // lets max_t tighten before the far side is tested.
                    let (near, far) = if ray.direction[node.axis as usize] > 0.0 {
                        (node_index + 1, node.offset as usize)
                    } else {
                        (node.offset as usize, node_index + 1)
                    };
                    stack.push(far as u32);
                    node_index = near;
                    continue;
                }

                let first = node.offset as usize;
                let last = first + node.count as usize;
                for triangle in &self.triangles[first..last] {
                    if let Some(intersection) = woop.intersects_triangle(
                        min_t,
                        max_t,
                        &triangle.p0,
                        &triangle.p1,
                        &triangle.p2,
                    ) {
                        hit.triangle = triangle.index;
                        hit.barycentric = [intersection.v, intersection.w];
                        if flags & TRACE_SHADOW != 0 {
                            return hit;
                        }
                        max_t = intersection.distance;
                    }
                }
            }

            match stack.pop() {
                Some(next) => node_index = next as usize,
                None => return hit,
            }
        }
    }
}
