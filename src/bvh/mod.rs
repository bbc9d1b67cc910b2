//! The flat BVH artifact and its structural validation.

pub mod builder;
pub mod cache;
pub mod node;
pub mod partition;

use std::fmt;

use node::{BvhNode, BvhNodeKind};

use crate::{aabb::Aabb, Primitive};

/// Depth beyond which a tree is considered pathological. A well-formed SAH
/// tree over realistic scenes stays far below this.
pub const EXPECTED_MAX_DEPTH: usize = 96;

/// The immutable output of a build: a packed node array plus the
/// primitive-index permutation the leaves refer into.
///
/// The root is at slot 0. When the root is an interior node, slot 1 is a
/// zeroed hole kept so every child pair `{2k, 2k + 1}` stays 2-aligned; a
/// root-leaf tree is exactly one node. Both arrays are `Pod` data and can be
/// uploaded to device memory verbatim, and the whole artifact may be shared
/// read-only by any number of concurrent traversals.
#[derive(Clone, Debug, PartialEq)]
pub struct Bvh {
    /// The node arena, dense apart from the slot 1 alignment hole.
    pub nodes: Vec<BvhNode>,

    /// A permutation of `[0, N)`. Each leaf's `[first, first + count)` slice
    /// of this array holds the original indices of its primitives; the slices
    /// of all leaves cover the permutation exactly once.
    pub primitive_indices: Vec<u32>,
}

impl Bvh {
    /// Number of reachable nodes in the tree, `1 ..= 2N - 1`.
    #[inline(always)]
    pub fn node_count(&self) -> u32 {
        if self.nodes.len() == 1 {
            1
        } else {
            self.nodes.len() as u32 - 1
        }
    }

    /// Number of primitives the tree was built over.
    #[inline(always)]
    pub fn index_count(&self) -> u32 {
        self.primitive_indices.len() as u32
    }

    /// Get the maximum depth of the BVH from the given node.
    pub fn depth(&self, node_index: usize) -> usize {
        match self.nodes[node_index].kind() {
            BvhNodeKind::Leaf { .. } => 1,
            BvhNodeKind::Interior { left, .. } => {
                1 + self
                    .depth(left as usize)
                    .max(self.depth(left as usize + 1))
            }
        }
    }

    /// Walks the whole tree and asserts every structural invariant: node
    /// count bounds, leaf ranges partitioning `[0, N)`, sibling adjacency and
    /// alignment, children contained in (and tightly filling) their parent,
    /// primitive bounds contained in their leaf, centroid ordering across
    /// every interior node's split plane, and `primitive_indices` being a
    /// permutation.
    ///
    /// Returns tree stats. Panics on any violation.
    pub fn validate<P: Primitive>(&self, primitives: &[P]) -> BvhValidationResult {
        let n = primitives.len();
        assert_eq!(self.primitive_indices.len(), n);
        assert!(!self.nodes.is_empty());
        assert!(self.nodes.len() <= 2 * n);

        let mut seen = vec![false; n];
        for &index in &self.primitive_indices {
            assert!((index as usize) < n, "index {index} out of range");
            assert!(!seen[index as usize], "index {index} appears twice");
            seen[index as usize] = true;
        }

        let mut result = BvhValidationResult::default();
        let mut covered = vec![false; n];
        self.validate_impl(primitives, &mut result, &mut covered, 0, 0);

        assert!(
            covered.iter().all(|&slot| slot),
            "leaf ranges do not cover the whole index permutation"
        );
        assert_eq!(result.prim_count, n);
        assert!(result.node_count >= 1 && result.node_count <= 2 * n - 1);
        assert_eq!(result.node_count, self.node_count() as usize);

        if result.max_depth > EXPECTED_MAX_DEPTH {
            log::warn!(
                "bvh depth is {}, a depth beyond {} may be indicative of something pathological \
                 in the scene that will result in a BVH that is very slow to traverse",
                result.max_depth,
                EXPECTED_MAX_DEPTH
            );
        }

        result
    }

    /// Returns the bounds of all primitive centroids in the subtree, used to
    /// check the split-plane ordering at each interior node.
    fn validate_impl<P: Primitive>(
        &self,
        primitives: &[P],
        result: &mut BvhValidationResult,
        covered: &mut [bool],
        node_index: usize,
        depth: usize,
    ) -> Aabb {
        result.node_count += 1;
        result.max_depth = result.max_depth.max(depth);
        let node = &self.nodes[node_index];

        match node.kind() {
            BvhNodeKind::Leaf { first, count } => {
                result.leaf_count += 1;

                let mut leaf_bounds = Aabb::empty();
                let mut centroid_bounds = Aabb::empty();
                for slot in first..first + count {
                    let slot = slot as usize;
                    assert!(slot < covered.len(), "leaf range exceeds [0, N)");
                    assert!(!covered[slot], "leaf ranges overlap at slot {slot}");
                    covered[slot] = true;
                    result.prim_count += 1;

                    let prim = &primitives[self.primitive_indices[slot] as usize];
                    let prim_aabb = partition::effective_aabb(prim);
                    assert!(
                        node.aabb().contains_aabb(&prim_aabb),
                        "primitive {slot} does not fit in leaf {node_index}:\nprimitive: {:?}\nleaf:      {:?}",
                        prim_aabb,
                        node.aabb()
                    );
                    leaf_bounds = leaf_bounds.union(&prim_aabb);
                    centroid_bounds.extend(prim.center());
                }
                assert_eq!(
                    leaf_bounds,
                    node.aabb(),
                    "primitives do not fit tightly in leaf {node_index}"
                );

                centroid_bounds
            }
            BvhNodeKind::Interior { left, axis } => {
                let left = left as usize;
                assert!(
                    left >= 2 && left % 2 == 0,
                    "child pair of node {node_index} starts at unaligned slot {left}"
                );
                assert!(left + 1 < self.nodes.len());

                let left_aabb = self.nodes[left].aabb();
                let right_aabb = self.nodes[left + 1].aabb();
                assert!(
                    node.aabb().contains_aabb(&left_aabb)
                        && node.aabb().contains_aabb(&right_aabb),
                    "children of node {node_index} are not contained in it"
                );
                assert_eq!(
                    left_aabb.union(&right_aabb),
                    node.aabb(),
                    "children {left} & {} do not fit tightly in parent {node_index}",
                    left + 1
                );

                let left_centroids =
                    self.validate_impl(primitives, result, covered, left, depth + 1);
                let right_centroids =
                    self.validate_impl(primitives, result, covered, left + 1, depth + 1);

                let axis = axis as usize;
                assert!(
                    left_centroids.max[axis] <= right_centroids.min[axis],
                    "node {node_index} does not separate centroids along axis {axis}"
                );

                left_centroids.union(&right_centroids)
            }
        }
    }
}

/// Result of Bvh validation. Contains various bvh stats.
#[derive(Default, Debug)]
pub struct BvhValidationResult {
    /// Total number of nodes discovered through validation traversal.
    pub node_count: usize,
    /// Total number of leaves discovered through validation traversal.
    pub leaf_count: usize,
    /// Total number of primitives discovered through validation traversal.
    pub prim_count: usize,
    /// Maximum hierarchical BVH depth discovered through validation traversal.
    pub max_depth: usize,
}

impl fmt::Display for BvhValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Avg primitives/leaf: {:.3}",
            self.prim_count as f64 / self.leaf_count as f64
        )?;
        writeln!(
            f,
            "\
node_count: {}
prim_count: {}
leaf_count: {}
max_depth:  {}",
            self.node_count, self.prim_count, self.leaf_count, self.max_depth
        )
    }
}
