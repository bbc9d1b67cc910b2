//! Pure partitioning functions for the sweep builder: bounds over an index
//! range, the full SAH sweep, and the index reshuffle that keeps the three
//! per-axis permutations consistent after a split.

use std::cmp::Ordering;

use crate::{aabb::Aabb, Primitive};

/// The best split found by [`partition_sah`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SahSplit {
    /// Axis the sweep found cheapest (0 = x, 1 = y, 2 = z).
    pub axis: usize,
    /// `area(left) * |left| + area(right) * |right|` at the chosen position.
    pub cost: f32,
    /// First element of the right partition in the chosen axis's permutation,
    /// so both sides are non-empty.
    pub index: usize,
}

/// The bound the builder actually uses for a primitive. A degenerate box
/// (min > max on any axis, or NaN) collapses to the point at the primitive's
/// center and the build proceeds.
#[inline(always)]
pub fn effective_aabb<P: Primitive>(prim: &P) -> Aabb {
    let aabb = prim.aabb();
    if aabb.valid() {
        aabb
    } else {
        Aabb::from_point(prim.center())
    }
}

/// Union of the bounds of `prims[idx[k]]` for every k, folded left to right.
pub fn calculate_bounds<P: Primitive>(prims: &[P], idx: &[u32]) -> Aabb {
    let mut bounds = Aabb::empty();
    for &i in idx {
        bounds = bounds.union(&effective_aabb(&prims[i as usize]));
    }
    bounds
}

/// Full-sweep SAH evaluation over all three axes of `[first, first + count)`.
///
/// For each axis the subrange of `indices[axis]` is already sorted by centroid
/// along that axis. The left sweep stores `area * cardinality` of every left
/// prefix in `sah`; the right sweep accumulates suffix bounds and scores each
/// split position against the stored prefix costs.
///
/// Ties resolve to the lowest index within an axis and to the earliest axis
/// across axes. If no candidate produces a finite cost the median position is
/// returned so recursion still terminates.
pub fn partition_sah<P: Primitive>(
    prims: &[P],
    indices: &[Vec<u32>; 3],
    first: usize,
    count: usize,
    sah: &mut [f32],
) -> SahSplit {
    debug_assert!(count >= 2);

    let mut best = SahSplit {
        axis: 0,
        cost: f32::INFINITY,
        index: first + count / 2,
    };

    for axis in 0..3 {
        let idx = &indices[axis];

        let mut bounds = Aabb::empty();
        for k in first..first + count - 1 {
            bounds = bounds.union(&effective_aabb(&prims[idx[k] as usize]));
            sah[k] = bounds.surface_area() * (k - first + 1) as f32;
        }

        let mut bounds = Aabb::empty();
        let mut axis_cost = f32::INFINITY;
        let mut axis_index = first + count / 2;
        // Scanning high to low with `<=` leaves the lowest index among ties.
        for k in (first + 1..first + count).rev() {
            bounds = bounds.union(&effective_aabb(&prims[idx[k] as usize]));
            let cost = sah[k - 1] + bounds.surface_area() * (first + count - k) as f32;
            if cost <= axis_cost {
                axis_cost = cost;
                axis_index = k;
            }
        }

        if axis_cost < best.cost {
            best = SahSplit {
                axis,
                cost: axis_cost,
                index: axis_index,
            };
        }
    }

    best
}

/// Repartitions the two non-chosen axes' subranges into the same left/right
/// sets as the chosen axis, preserving each subrange's existing sort order.
///
/// Primitives compare their centroid along `axis` against `split_value`; ties
/// (and NaN comparisons) are resolved by membership of the chosen axis's left
/// range, tracked in `in_left`, so the side sizes match the split exactly.
/// `in_left` must be all-false on entry and is restored to all-false before
/// returning. Left and right members stream through `temp` in encounter order
/// and are copied back over the subrange.
#[allow(clippy::too_many_arguments)]
pub fn split_indices<P: Primitive>(
    prims: &[P],
    indices: &mut [Vec<u32>; 3],
    first: usize,
    count: usize,
    temp: &mut [u32],
    in_left: &mut [bool],
    axis: usize,
    split_index: usize,
    split_value: f32,
) {
    let n_left = split_index - first;

    for &prim in &indices[axis][first..split_index] {
        in_left[prim as usize] = true;
    }

    for other in 0..3 {
        if other == axis {
            continue;
        }

        let subrange = &mut indices[other][first..first + count];
        let mut left = 0;
        let mut right = n_left;
        for &prim in subrange.iter() {
            let center = prims[prim as usize].center()[axis];
            let goes_left = match center.partial_cmp(&split_value) {
                Some(Ordering::Less) => true,
                Some(Ordering::Greater) => false,
                _ => in_left[prim as usize],
            };
            if goes_left {
                temp[left] = prim;
                left += 1;
            } else {
                temp[right] = prim;
                right += 1;
            }
        }

        assert_eq!(
            left, n_left,
            "partition size mismatch on axis {other} (split axis {axis}, first {first}, count {count})"
        );
        assert_eq!(
            right, count,
            "partition size mismatch on axis {other} (split axis {axis}, first {first}, count {count})"
        );

        subrange.copy_from_slice(&temp[..count]);
    }

    for &prim in &indices[axis][first..split_index] {
        in_left[prim as usize] = false;
    }
}
