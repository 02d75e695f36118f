//! The binned surface area heuristic builder.

use crate::aabb::Aabb;
use crate::bvh::build::{partition, Prim, Split, SplitStrategy};

/// Number of equal-width bins evaluated along the split axis.
pub const BIN_COUNT: usize = 256;

// Widens the binned extent a hair so the largest centroid maps into the last
// bin instead of one past it.
const BIN_EXTENT_SCALE: f32 = 1.00001;

/// Accumulates the primitives falling into one bin: how many there are and
/// the union of their bounds.
#[derive(Debug, Clone, Copy)]
struct Bin {
    count: u32,
    aabb: Aabb,
}

impl Bin {
    fn empty() -> Bin {
        Bin {
            count: 0,
            aabb: Aabb::empty(),
        }
    }

    fn add(&mut self, prim: &Prim) {
        self.count += 1;
        self.aabb.join_mut(&prim.aabb);
    }

    fn accumulate(&mut self, other: &Bin) {
        self.count += other.count;
        self.aabb.join_mut(&other.aabb);
    }
}

/// The surface area heuristic builder.
///
/// Each volume is sliced into [`BIN_COUNT`] equal-width bins along its
/// largest centroid axis. For every boundary between bins the split cost is
/// `left_count * area(left_bounds) + right_count * area(right_bounds)`; the
/// first boundary attaining the minimum wins. Normalizing by the parent area
/// and adding traversal constants would not move the minimum, so neither is
/// done.
///
/// [`BIN_COUNT`]: constant.BIN_COUNT.html
#[derive(Debug, Clone)]
pub struct BinnedSah {
    bins: Vec<Bin>,

    /// Suffix accumulation; `right[i]` covers the bins `[i, BIN_COUNT)`.
    right: Vec<Bin>,
}

impl BinnedSah {
    /// Creates the builder, allocating its bin scratch space once.
    pub fn new() -> BinnedSah {
        BinnedSah {
            bins: vec![Bin::empty(); BIN_COUNT],
            right: vec![Bin::empty(); BIN_COUNT],
        }
    }
}

impl Default for BinnedSah {
    fn default() -> BinnedSah {
        BinnedSah::new()
    }
}

impl SplitStrategy for BinnedSah {
    fn split(&mut self, prims: &mut [Prim], centroids: &Aabb) -> Split {
        let axis = centroids.largest_axis();
        let bin_min = centroids.min[axis];
        let extent = centroids.max[axis] - bin_min;

        if extent <= 0.0 {
            // Every centroid coincides on the widest axis; report the range
            // as unsplittable and let the framework halve it.
            return Split {
                axis,
                pivot: 0,
                left_centroids: *centroids,
                right_centroids: *centroids,
            };
        }

        let bin_scale = BIN_COUNT as f32 / (extent * BIN_EXTENT_SCALE);

        self.bins.fill(Bin::empty());
        for prim in prims.iter() {
            let bin = ((prim.centroid[axis] - bin_min) * bin_scale) as usize;
            self.bins[bin].add(prim);
        }

        // Suffix sums make each candidate's right side a single lookup.
        let mut run = Bin::empty();
        for index in (0..BIN_COUNT).rev() {
            run.accumulate(&self.bins[index]);
            self.right[index] = run;
        }

        // Sweep the boundaries left to right, growing the left side as we
        // go. Candidates with an empty side are no split at all and are
        // skipped, which also keeps the sentinel bounds of empty bins out of
        // the cost.
        let mut left = Bin::empty();
        let mut best = None;
        let mut best_cost = f32::INFINITY;
        for index in 1..BIN_COUNT {
            left.accumulate(&self.bins[index - 1]);

            let right = &self.right[index];
            if left.count == 0 || right.count == 0 {
                continue;
            }

            let cost = left.count as f32 * left.aabb.surface_area()
                + right.count as f32 * right.aabb.surface_area();
            if cost < best_cost {
                best_cost = cost;
                best = Some(index);
            }
        }

        match best {
            Some(boundary) => {
                let plane = bin_min + boundary as f32 / bin_scale;
                let (pivot, left_centroids, right_centroids) = partition(prims, axis, plane);
                Split {
                    axis,
                    pivot,
                    left_centroids,
                    right_centroids,
                }
            }
            // All primitives landed in one bin.
            None => Split {
                axis,
                pivot: 0,
                left_centroids: *centroids,
                right_centroids: *centroids,
            },
        }
    }
}
