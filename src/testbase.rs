//! Common utilities shared by unit tests.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aabb::Aabb;
use crate::mesh::Mesh;
use crate::ray::{Hit, Ray, WoopRay};
use crate::{Point3, Vector3};

/// A vector represented as a tuple, for proptest strategies.
pub type TupleVec = (f32, f32, f32);

/// Generates a [`TupleVec`] strategy over a range small enough to keep f32
/// arithmetic meaningful.
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
    )
}

/// Converts a [`TupleVec`] to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3 {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// An owned mesh, so fixtures can hand out [`Mesh`] views.
pub struct MeshData {
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Borrows this mesh as the view the builder consumes.
    pub fn view(&self) -> Mesh<'_> {
        Mesh::new(&self.positions, &self.indices)
    }

    fn push_triangle(&mut self, p0: Point3, p1: Point3, p2: Point3) {
        let base = (self.positions.len() / 3) as u32;
        for p in [p0, p1, p2] {
            self.positions.extend_from_slice(&[p.x, p.y, p.z]);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    fn empty() -> MeshData {
        MeshData {
            positions: Vec::new(),
            indices: Vec::new(),
        }
    }
}

/// The unit triangle in the z = 0 plane.
pub fn single_triangle() -> MeshData {
    MeshData {
        positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        indices: vec![0, 1, 2],
    }
}

/// Two identical xy triangles, one at z = 0 and one at z = -1.
pub fn stacked_triangles() -> MeshData {
    MeshData {
        positions: vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, -1.0, //
            1.0, 0.0, -1.0, //
            0.0, 1.0, -1.0,
        ],
        indices: vec![0, 1, 2, 3, 4, 5],
    }
}

/// Two coplanar triangles sharing the diagonal edge of the unit quad.
pub fn shared_edge_quad() -> MeshData {
    MeshData {
        positions: vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            1.0, 1.0, 0.0,
        ],
        indices: vec![0, 1, 2, 1, 3, 2],
    }
}

/// A closed icosahedron centered on the origin.
pub fn icosahedron() -> MeshData {
    // Golden-ratio rectangle corners.
    let p = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let positions = vec![
        -1.0, p, 0.0, //
        1.0, p, 0.0, //
        -1.0, -p, 0.0, //
        1.0, -p, 0.0, //
        0.0, -1.0, p, //
        0.0, 1.0, p, //
        0.0, -1.0, -p, //
        0.0, 1.0, -p, //
        p, 0.0, -1.0, //
        p, 0.0, 1.0, //
        -p, 0.0, -1.0, //
        -p, 0.0, 1.0,
    ];
    let indices = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, //
        1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8, //
        3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, //
        4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
    ];
    MeshData { positions, indices }
}

/// A closed unit-radius cube with every face split into two triangles.
pub fn cube() -> MeshData {
    let positions = vec![
        -1.0, -1.0, -1.0, //
        1.0, -1.0, -1.0, //
        1.0, 1.0, -1.0, //
        -1.0, 1.0, -1.0, //
        -1.0, -1.0, 1.0, //
        1.0, -1.0, 1.0, //
        1.0, 1.0, 1.0, //
        -1.0, 1.0, 1.0,
    ];
    let indices = vec![
        0, 2, 1, 0, 3, 2, // z = -1
        4, 5, 6, 4, 6, 7, // z = +1
        0, 1, 5, 0, 5, 4, // y = -1
        2, 3, 7, 2, 7, 6, // y = +1
        0, 4, 7, 0, 7, 3, // x = -1
        1, 2, 6, 1, 6, 5, // x = +1
    ];
    MeshData { positions, indices }
}

/// `count` concentric equilateral triangles in the z = 0 plane, ring `i`
/// scaled by `i + 1`. All centroids coincide at the origin, so no split
/// plane can separate them.
pub fn collinear_centroids(count: u32) -> MeshData {
    let mut data = MeshData::empty();
    let h = 3.0_f32.sqrt() / 2.0;
    for ring in 0..count {
        let s = (ring + 1) as f32;
        data.push_triangle(
            Point3::new(s, 0.0, 0.0),
            Point3::new(-0.5 * s, h * s, 0.0),
            Point3::new(-0.5 * s, -h * s, 0.0),
        );
    }
    data
}

/// `count` unit quads along the x axis, one at every even offset.
pub fn aligned_quads(count: u32) -> MeshData {
    let mut data = MeshData::empty();
    for i in 0..count {
        let x = 2.0 * i as f32;
        push_quad(&mut data, x);
    }
    data
}

/// Two groups of `count` quads along x, the second shifted by `gap`.
pub fn clustered_quads(count: u32, gap: f32) -> MeshData {
    let mut data = MeshData::empty();
    for i in 0..count {
        push_quad(&mut data, 1.1 * i as f32);
    }
    for i in 0..count {
        push_quad(&mut data, gap + 1.1 * i as f32);
    }
    data
}

fn push_quad(data: &mut MeshData, x: f32) {
    let a = Point3::new(x, 0.0, 0.0);
    let b = Point3::new(x + 1.0, 0.0, 0.0);
    let c = Point3::new(x + 1.0, 1.0, 0.0);
    let d = Point3::new(x, 1.0, 0.0);
    data.push_triangle(a, b, c);
    data.push_triangle(a, c, d);
}

/// `count` random triangles around the origin, deterministic in `seed`.
pub fn random_soup(count: u32, seed: u64) -> MeshData {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = MeshData::empty();
    for _ in 0..count {
        let base = random_point(&mut rng, 10.0);
        let e1 = random_offset(&mut rng, 1.0);
        let e2 = random_offset(&mut rng, 1.0);
        data.push_triangle(base, base + e1, base + e2);
    }
    data
}

/// `count` rays shot from outside the mesh bounds at random interior
/// points, deterministic in `seed`. Direction components are kept non-zero.
pub fn random_rays(data: &MeshData, count: u32, seed: u64) -> Vec<Ray> {
    let mut rng = StdRng::seed_from_u64(seed);

    let view = data.view();
    let mut bounds = Aabb::empty();
    for vertex in 0..view.vertex_count() {
        bounds.grow_mut(&view.position(vertex));
    }

    let center = bounds.center();
    let radius = bounds.size().norm() + 1.0;

    (0..count)
        .map(|_| {
            let origin = center + random_offset(&mut rng, radius);
            let target = center + random_offset(&mut rng, 0.4 * radius);
            let mut direction = target - origin;
            for axis in 0..3 {
                if direction[axis] == 0.0 {
                    direction[axis] = 1.0e-6;
                }
            }
            Ray::new(origin, direction, 0.0, 1.0e6)
        })
        .collect()
}

fn random_point(rng: &mut StdRng, extent: f32) -> Point3 {
    Point3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn random_offset(rng: &mut StdRng, extent: f32) -> Vector3 {
    Vector3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

/// Reference tracer: tests `ray` against every mesh triangle in input
/// order, shrinking the interval exactly like the traverser does. With
/// `shadow` set it stops at the first accepted hit.
pub fn brute_force(data: &MeshData, ray: &Ray, shadow: bool) -> Hit {
    let view = data.view();
    let woop = WoopRay::from_ray(ray);

    let mut hit = Hit::miss();
    let mut max_t = ray.max_t;
    for index in 0..view.triangle_count() {
        let [p0, p1, p2] = view.triangle(index);
        if let Some(intersection) = woop.intersects_triangle(ray.min_t, max_t, &p0, &p1, &p2) {
            hit.triangle = index;
            hit.barycentric = [intersection.v, intersection.w];
            if shadow {
                return hit;
            }
            max_t = intersection.distance;
        }
    }
    hit
}
