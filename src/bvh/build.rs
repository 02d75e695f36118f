//! BVH construction: the shared depth-first emission framework and the
//! strategy seam the two builders plug into.

use log::debug;

use crate::aabb::Aabb;
use crate::bvh::{BinnedSah, BvhNode, Triangle};
use crate::mesh::Mesh;
use crate::Point3;

/// Leaves hold at most this many triangles.
pub const MAX_LEAF_SIZE: u32 = 4;

/// A triangle's build-time record: its bounds, its centroid, and its index
/// in the source mesh. Centroids classify primitives against split planes;
/// the bounds feed the SAH cost estimate.
#[derive(Debug, Clone, Copy)]
pub struct Prim {
    pub(crate) aabb: Aabb,
    pub(crate) centroid: Point3,
    pub(crate) index: u32,
}

/// A pending primitive range `[first, last)` awaiting emission.
struct Volume {
    first: u32,
    last: u32,

    /// Set on right children; the parent's `offset` is patched when this
    /// volume is emitted. Left children need no back-link, their index is
    /// always the parent's plus one.
    parent: Option<u32>,

    /// Bounds of the primitive centroids in the range.
    centroids: Aabb,
}

/// The outcome of a split: the axis, the pivot relative to the volume's
/// range, and the centroid bounds of both sides. A pivot of zero or of the
/// full range length signals that the strategy could not separate the
/// primitives; the framework then cuts the range in half arbitrarily.
pub struct Split {
    pub(crate) axis: usize,
    pub(crate) pivot: usize,
    pub(crate) left_centroids: Aabb,
    pub(crate) right_centroids: Aabb,
}

/// Chooses a split plane for one volume and partitions its primitives in
/// place. Implemented by [`MedianSplit`] and [`BinnedSah`]; the choice is
/// dispatched once per build, never per ray.
///
/// [`MedianSplit`]: struct.MedianSplit.html
/// [`BinnedSah`]: struct.BinnedSah.html
pub trait SplitStrategy {
    /// Partitions `prims` and returns the chosen split. `centroids` bounds
    /// the centroids of `prims`.
    fn split(&mut self, prims: &mut [Prim], centroids: &Aabb) -> Split;
}

/// Strategies may be handed to `build_with` by mutable reference, so one
/// allocation of scratch space can serve several builds.
impl<S: SplitStrategy + ?Sized> SplitStrategy for &mut S {
    fn split(&mut self, prims: &mut [Prim], centroids: &Aabb) -> Split {
        (**self).split(prims, centroids)
    }
}

/// Partitions `prims` around `plane` on `axis` with two pointers, growing
/// each side's centroid bounds along the way. Primitives whose centroid lies
/// below the plane end up in front of the returned pivot.
pub(crate) fn partition(prims: &mut [Prim], axis: usize, plane: f32) -> (usize, Aabb, Aabb) {
    let mut left_centroids = Aabb::empty();
    let mut right_centroids = Aabb::empty();

    let mut l = 0;
    let mut r = prims.len();
    while l < r {
        let centroid = prims[l].centroid;
        if centroid[axis] < plane {
            left_centroids.grow_mut(&centroid);
            l += 1;
        } else {
            right_centroids.grow_mut(&centroid);
            r -= 1;
            prims.swap(l, r);
        }
    }

    (l, left_centroids, right_centroids)
}

/// A bounding volume hierarchy over a triangle mesh.
///
/// Built once from a [`Mesh`] view, then traversed read-only by
/// [`trace`]. The structure owns its node and triangle arrays and keeps no
/// reference to the source mesh.
///
/// [`Mesh`]: ../mesh/struct.Mesh.html
/// [`trace`]: #method.trace
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bvh {
    /// The depth-first node array; index 0 is the root.
    pub nodes: Vec<BvhNode>,

    /// The triangle records owned by the leaves.
    pub triangles: Vec<Triangle>,
}

impl Bvh {
    /// Builds a [`Bvh`] for `mesh` with the binned SAH builder.
    pub fn build(mesh: &Mesh) -> Bvh {
        Bvh::build_with(mesh, BinnedSah::new())
    }

    /// Builds a [`Bvh`] for `mesh` with the given split strategy.
    ///
    /// Identical inputs produce identical output arrays; every tie-break in
    /// the builders is deterministic.
    pub fn build_with<S: SplitStrategy>(mesh: &Mesh, mut strategy: S) -> Bvh {
        let triangle_count = mesh.triangle_count();
        if triangle_count == 0 {
            // A single sentinel node; the traverser special-cases the empty
            // hierarchy.
            return Bvh {
                nodes: vec![BvhNode::default()],
                triangles: Vec::new(),
            };
        }

        // One pass over the mesh settles the per-primitive records and the
        // root volume's centroid bounds.
        let mut prims = Vec::with_capacity(triangle_count as usize);
        let mut root_centroids = Aabb::empty();
        for index in 0..triangle_count {
            let [p0, p1, p2] = mesh.triangle(index);

            let mut aabb = Aabb::empty();
            aabb.grow_mut(&p0);
            aabb.grow_mut(&p1);
            aabb.grow_mut(&p2);

            let centroid = Point3::from((p0.coords + p1.coords + p2.coords) / 3.0);
            root_centroids.grow_mut(&centroid);

            prims.push(Prim {
                aabb,
                centroid,
                index,
            });
        }

        let mut nodes: Vec<BvhNode> = Vec::new();
        let mut triangles: Vec<Triangle> = Vec::with_capacity(triangle_count as usize);
        let mut pending: Vec<Volume> = Vec::new();

        let mut vol = Volume {
            first: 0,
            last: triangle_count,
            parent: None,
            centroids: root_centroids,
        };

        loop {
            let node_index = nodes.len() as u32;
            nodes.push(BvhNode::default());

            // Right children patch their parent; left children sit at
            // parent + 1 by construction.
            if let Some(parent) = vol.parent {
                nodes[parent as usize].offset = node_index;
            }

            let count = vol.last - vol.first;
            if count <= MAX_LEAF_SIZE {
                let node = &mut nodes[node_index as usize];
                node.offset = triangles.len() as u32;
                node.count = count as u16;

                for prim in &prims[vol.first as usize..vol.last as usize] {
                    let [p0, p1, p2] = mesh.triangle(prim.index);
                    node.aabb.grow_mut(&p0);
                    node.aabb.grow_mut(&p1);
                    node.aabb.grow_mut(&p2);
                    triangles.push(Triangle {
                        p0,
                        p1,
                        p2,
                        index: prim.index,
                    });
                }

                match pending.pop() {
                    Some(next) => vol = next,
                    None => break,
                }
            } else {
                let range = &mut prims[vol.first as usize..vol.last as usize];
                let split = strategy.split(range, &vol.centroids);
                nodes[node_index as usize].axis = split.axis as u16;

                let mut pivot = vol.first + split.pivot as u32;
                let mut left_centroids = split.left_centroids;
                let mut right_centroids = split.right_centroids;
                if pivot == vol.first || pivot == vol.last {
                    // The strategy could not separate the range. Cut it in
                    // half and keep the parent's centroid bounds on both
                    // sides.
                    pivot = (vol.first + vol.last) / 2;
                    left_centroids = vol.centroids;
                    right_centroids = vol.centroids;
                }

                pending.push(Volume {
                    first: pivot,
                    last: vol.last,
                    parent: Some(node_index),
                    centroids: right_centroids,
                });
                vol = Volume {
                    first: vol.first,
                    last: pivot,
                    parent: None,
                    centroids: left_centroids,
                };
            }
        }

        // Parents always precede their children in the array, so a single
        // backward pass settles every inner node's bounds from its
        // children's. Leaves got tight bounds on emission.
        for index in (0..nodes.len()).rev() {
            if nodes[index].count == 0 {
                let left = nodes[index + 1].aabb;
                let right = nodes[nodes[index].offset as usize].aabb;
                nodes[index].aabb = left.join(&right);
            }
        }

        debug!(
            "built bvh: {} nodes, {} leaves, {} triangles",
            nodes.len(),
            nodes.iter().filter(|n| n.is_leaf()).count(),
            triangles.len()
        );

        Bvh { nodes, triangles }
    }

    /// Asserts the structural invariants of this [`Bvh`]: subtrees tile the
    /// node array exactly, inner bounds are tight joins of their children's,
    /// leaf bounds contain their triangles, and every triangle record sits
    /// in exactly one leaf.
    ///
    /// Panics with a description of the first violation. Intended for tests
    /// and debugging; a freshly built hierarchy always passes.
    pub fn assert_consistent(&self) {
        assert!(!self.nodes.is_empty(), "a Bvh must have a root node");

        if self.triangles.is_empty() {
            // The empty-mesh hierarchy is a single unreferenced node.
            assert_eq!(self.nodes.len(), 1, "an empty Bvh has exactly one node");
            return;
        }

        let mut seen = vec![false; self.triangles.len()];
        let end = self.assert_consistent_subtree(0, &mut seen);
        assert_eq!(
            end,
            self.nodes.len(),
            "the root subtree must span the whole node array"
        );
        for (record, seen) in seen.iter().enumerate() {
            assert!(*seen, "triangle record {record} is in no leaf");
        }
    }

    /// Checks the subtree rooted at `node_index` and returns the index one
    /// past its end.
    fn assert_consistent_subtree(&self, node_index: usize, seen: &mut [bool]) -> usize {
        let node = &self.nodes[node_index];

        if node.is_leaf() {
            assert!(
                u32::from(node.count) <= MAX_LEAF_SIZE,
                "leaf {node_index} holds {} triangles",
                node.count
            );
            let first = node.offset as usize;
            let last = first + node.count as usize;
            assert!(
                last <= self.triangles.len(),
                "leaf {node_index} references triangle records out of range"
            );
            for (offset, triangle) in self.triangles[first..last].iter().enumerate() {
                assert!(
                    !seen[first + offset],
                    "triangle record {} is in two leaves",
                    first + offset
                );
                seen[first + offset] = true;
                assert!(
                    node.aabb.contains(&triangle.p0)
                        && node.aabb.contains(&triangle.p1)
                        && node.aabb.contains(&triangle.p2),
                    "leaf {node_index} does not contain triangle {}",
                    triangle.index
                );
            }
            node_index + 1
        } else {
            let left = node_index + 1;
            let right = node.offset as usize;
            assert!(
                left < self.nodes.len() && right < self.nodes.len() && right > node_index,
                "inner node {node_index} references children out of range"
            );

            // Joins take componentwise minima and maxima, which involves no
            // rounding, so exact equality is the correct check.
            let joint = self.nodes[left].aabb.join(&self.nodes[right].aabb);
            assert_eq!(
                node.aabb, joint,
                "inner node {node_index} has loose bounds"
            );

            let after_left = self.assert_consistent_subtree(left, seen);
            assert_eq!(
                after_left, right,
                "left subtree of {node_index} must end where the right child begins"
            );
            self.assert_consistent_subtree(right, seen)
        }
    }
}
