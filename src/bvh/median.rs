//! The median split builder.

use crate::aabb::Aabb;
use crate::bvh::build::{partition, Prim, Split, SplitStrategy};

/// The simple builder: every volume is cut at the midpoint of its centroid
/// bounds on the largest axis.
///
/// Cheaper to run than [`BinnedSah`] and adequate for evenly distributed
/// geometry, but it produces noticeably worse trees on scenes with uneven
/// triangle density.
///
/// [`BinnedSah`]: struct.BinnedSah.html
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianSplit;

impl SplitStrategy for MedianSplit {
    fn split(&mut self, prims: &mut [Prim], centroids: &Aabb) -> Split {
        let axis = centroids.largest_axis();
        let plane = 0.5 * (centroids.min[axis] + centroids.max[axis]);

        let (pivot, left_centroids, right_centroids) = partition(prims, axis, plane);
        Split {
            axis,
            pivot,
            left_centroids,
            right_centroids,
        }
    }
}
