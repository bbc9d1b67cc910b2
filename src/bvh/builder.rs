//! Top-down full-sweep SAH builder.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use bytemuck::Zeroable;

use crate::{triangle::Triangle, Primitive};

use super::{
    node::{BvhNode, PRIM_COUNT_MASK},
    partition, Bvh,
};

/// Transient state for one build: three per-axis index permutations, the SAH
/// scratch, the reshuffle temp, the tie-membership scratch, and the node
/// arena with its monotonic slot allocator.
///
/// Created over a fixed primitive count and consumed by [`build`](Self::build);
/// the arena and the x permutation move into the returned [`Bvh`], everything
/// else is released when the builder drops.
pub struct SweepSahBuilder {
    indices: [Vec<u32>; 3],
    sah: Vec<f32>,
    temp: Vec<u32>,
    in_left: Vec<bool>,
    nodes: Vec<BvhNode>,
    /// Next free child pair. Starts at 2: slot 0 is the root and slot 1 stays
    /// unused so child pairs land on even indices.
    node_index: usize,
}

impl SweepSahBuilder {
    /// Allocates all build state for `prim_count` primitives.
    ///
    /// Fails on an empty input, on a count that does not fit the 30-bit leaf
    /// count field, or on allocation failure (surfaced instead of aborting;
    /// anything already allocated is released on the error path).
    pub fn new(prim_count: usize) -> Result<Self> {
        if prim_count == 0 {
            bail!("cannot build a BVH over zero primitives");
        }
        if prim_count > PRIM_COUNT_MASK as usize {
            bail!("primitive count {prim_count} does not fit the 30 bit leaf count field");
        }

        let mut indices: [Vec<u32>; 3] = [
            try_alloc(prim_count, "x index permutation")?,
            try_alloc(prim_count, "y index permutation")?,
            try_alloc(prim_count, "z index permutation")?,
        ];
        for axis in &mut indices {
            for (i, slot) in axis.iter_mut().enumerate() {
                *slot = i as u32;
            }
        }

        Ok(Self {
            indices,
            sah: try_alloc(prim_count, "SAH scratch")?,
            temp: try_alloc(prim_count, "reshuffle temp")?,
            in_left: try_alloc(prim_count, "membership scratch")?,
            nodes: try_alloc(2 * prim_count, "node arena")?,
            node_index: 2,
        })
    }

    /// Builds the hierarchy over `primitives`, which must have the length the
    /// builder was created with.
    ///
    /// `max_primitives_in_leaf` selects the leaf policy: `u32::MAX` for
    /// triangle-like inputs (split until the SAH cost forbids it), 1 for
    /// mesh-like inputs (every primitive becomes its own leaf).
    pub fn build<P: Primitive>(mut self, primitives: &[P], max_primitives_in_leaf: u32) -> Bvh {
        let prim_count = primitives.len();
        assert_eq!(
            prim_count,
            self.indices[0].len(),
            "builder sized for a different primitive count"
        );

        crate::timeit!["sort centroids",
            crate::scope!("sort_centroids");
            for (axis, idx) in self.indices.iter_mut().enumerate() {
                // Stable sort: equal centroids keep their input order, which
                // makes the whole build deterministic.
                idx.sort_by(|&a, &b| {
                    primitives[a as usize].center()[axis]
                        .total_cmp(&primitives[b as usize].center()[axis])
                });
            }
        ];

        crate::timeit!["build recursive",
            crate::scope!("build_recursive");
            self.build_recursive(primitives, 0, 0, prim_count, max_primitives_in_leaf);
        ];

        assert!(
            self.node_index <= 2 * prim_count,
            "node arena overflow: allocated {} slots for {} primitives",
            self.node_index,
            prim_count
        );

        // A root leaf uses only slot 0; otherwise the arena is dense up to
        // node_index with slot 1 as the single alignment hole.
        let arena_len = if self.nodes[0].is_leaf() {
            1
        } else {
            self.node_index
        };
        self.nodes.truncate(arena_len);

        let [indices_x, _, _] = self.indices;
        Bvh {
            nodes: self.nodes,
            primitive_indices: indices_x,
        }
    }

    fn build_recursive<P: Primitive>(
        &mut self,
        primitives: &[P],
        node_id: usize,
        first: usize,
        count: usize,
        max_primitives_in_leaf: u32,
    ) {
        let aabb = partition::calculate_bounds(primitives, &self.indices[0][first..first + count]);

        if count == 1 {
            self.nodes[node_id] = BvhNode::leaf(aabb, first as u32, 1);
            return;
        }

        let split = partition::partition_sah(primitives, &self.indices, first, count, &mut self.sah);

        if count <= max_primitives_in_leaf as usize {
            // SAH termination: splitting has to beat intersecting every
            // primitive in this node.
            let parent_cost = aabb.surface_area() * count as f32;
            if split.cost >= parent_cost {
                self.nodes[node_id] = BvhNode::leaf(aabb, first as u32, count as u32);
                return;
            }
        }

        // Reserve the child pair only once the node is known to split,
        // keeping the arena dense.
        let left = self.node_index;
        self.node_index += 2;

        let split_value =
            primitives[self.indices[split.axis][split.index] as usize].center()[split.axis];
        partition::split_indices(
            primitives,
            &mut self.indices,
            first,
            count,
            &mut self.temp,
            &mut self.in_left,
            split.axis,
            split.index,
            split_value,
        );

        self.nodes[node_id] = BvhNode::interior(aabb, left as u32, split.axis as u8);

        let n_left = split.index - first;
        self.build_recursive(primitives, left, first, n_left, max_primitives_in_leaf);
        self.build_recursive(
            primitives,
            left + 1,
            split.index,
            count - n_left,
            max_primitives_in_leaf,
        );
    }
}

fn try_alloc<T: Zeroable + Clone>(len: usize, what: &str) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .with_context(|| format!("allocating {what} ({len} elements)"))?;
    buffer.resize(len, T::zeroed());
    Ok(buffer)
}

/// Build a BVH from the given list of Triangles.
///
/// Triangle leaves keep splitting until the SAH cost forbids it, so leaf
/// sizes are decided purely by the cost model.
///
/// # Arguments
/// * `triangles` - A list of Triangles.
/// * `core_build_time` - Accumulates the core build time. Does not include
///   builder allocation or debug validation.
pub fn build_bvh_from_tris(triangles: &[Triangle], core_build_time: &mut Duration) -> Result<Bvh> {
    let builder = SweepSahBuilder::new(triangles.len())?;

    let start_time = Instant::now();
    let bvh = builder.build(triangles, u32::MAX);
    *core_build_time += start_time.elapsed();

    #[cfg(debug_assertions)]
    bvh.validate(triangles);

    Ok(bvh)
}

/// Build a BVH from a list of mesh-like primitives, typically precomputed
/// per-mesh [`Aabb`](crate::aabb::Aabb)s.
///
/// Meshes are opaque bounded blobs that are never split internally, so every
/// leaf holds exactly one of them and the SAH only decides the tree shape.
///
/// # Arguments
/// * `meshes` - A list of primitives implementing [`Primitive`].
/// * `core_build_time` - Accumulates the core build time. Does not include
///   builder allocation or debug validation.
pub fn build_bvh_from_meshes<T: Primitive>(
    meshes: &[T],
    core_build_time: &mut Duration,
) -> Result<Bvh> {
    let builder = SweepSahBuilder::new(meshes.len())?;

    let start_time = Instant::now();
    let bvh = builder.build(meshes, 1);
    *core_build_time += start_time.elapsed();

    #[cfg(debug_assertions)]
    bvh.validate(meshes);

    Ok(bvh)
}
