#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::*;
    use sweep_bvh::{
        aabb::Aabb,
        bvh::{
            builder::{build_bvh_from_meshes, build_bvh_from_tris},
            node::BvhNodeKind,
        },
        test_util::geometry::{random_triangles, unit_triangle_at},
        triangle::Triangle,
        Primitive,
    };

    #[test]
    fn single_triangle() {
        let tris = vec![Triangle::from_positions(
            vec3a(0.0, 0.0, 0.0),
            vec3a(1.0, 0.0, 0.0),
            vec3a(0.0, 1.0, 0.0),
        )];
        let bvh = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();

        assert_eq!(bvh.node_count(), 1);
        assert_eq!(bvh.nodes.len(), 1);
        assert_eq!(bvh.index_count(), 1);
        assert_eq!(
            bvh.nodes[0].kind(),
            BvhNodeKind::Leaf { first: 0, count: 1 }
        );
        assert_eq!(
            bvh.nodes[0].aabb(),
            Aabb::new(Vec3A::ZERO, vec3a(1.0, 1.0, 0.0))
        );
        bvh.validate(&tris);
    }

    #[test]
    fn two_distant_triangles_split_on_x() {
        let tris = vec![
            unit_triangle_at(vec3a(0.0, 0.0, 0.0)),
            unit_triangle_at(vec3a(10.0, 0.0, 0.0)),
        ];
        let bvh = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();

        assert_eq!(bvh.node_count(), 3);
        let BvhNodeKind::Interior { left, axis } = bvh.nodes[0].kind() else {
            panic!("root should be interior");
        };
        assert_eq!(axis, 0);
        assert_eq!(left, 2);
        assert_eq!(bvh.nodes[2].prim_count(), 1);
        assert_eq!(bvh.nodes[3].prim_count(), 1);

        // The left child holds the low-x triangle.
        let first = match bvh.nodes[2].kind() {
            BvhNodeKind::Leaf { first, .. } => first,
            _ => unreachable!(),
        };
        assert_eq!(bvh.primitive_indices[first as usize], 0);

        let root = bvh.nodes[0].aabb();
        assert!(root.contains_point(tris[0].center()));
        assert!(root.contains_point(tris[1].center()));
        bvh.validate(&tris);
    }

    #[test]
    fn three_colinear_triangles() {
        // Centroids at x = 1/3, 4/3, 7/3: any tree shape is fine as long as
        // the leaf ranges still partition the index permutation.
        let tris = vec![
            unit_triangle_at(vec3a(0.0, 0.0, 0.0)),
            unit_triangle_at(vec3a(1.0, 0.0, 0.0)),
            unit_triangle_at(vec3a(2.0, 0.0, 0.0)),
        ];
        let bvh = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();

        let stats = bvh.validate(&tris);
        assert_eq!(stats.prim_count, 3);
        assert_eq!(stats.leaf_count, 3);
        assert_eq!(stats.node_count, 5);
    }

    #[test]
    fn eight_triangles_on_a_grid() {
        // One flat triangle per cell of a 2x2x2 grid of unit cubes. The SAH
        // drives this to the full binary tree over 8 singleton leaves.
        let mut tris = Vec::new();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    tris.push(unit_triangle_at(vec3a(x as f32, y as f32, z as f32)));
                }
            }
        }
        let bvh = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();

        let stats = bvh.validate(&tris);
        assert_eq!(stats.node_count, 15);
        assert_eq!(stats.leaf_count, 8);

        // The triangles are flat in z, so the z split is strictly cheapest at
        // the root; below it x and y tie and the earliest axis wins.
        for (node_index, node) in bvh.nodes.iter().enumerate() {
            if node_index == 1 || node.is_leaf() {
                continue;
            }
            let expected = if node_index == 0 { 2 } else { 0 };
            assert_eq!(node.split_axis(), expected, "node {node_index}");
        }
    }

    #[test]
    fn hundred_random_triangles() {
        let tris = random_triangles(100, 10.0, 42);
        let bvh = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();

        // validate() asserts the permutation and leaf coverage invariants.
        let stats = bvh.validate(&tris);
        assert_eq!(stats.prim_count, 100);

        let root = bvh.nodes[0].aabb();
        for tri in &tris {
            assert!(root.contains_point(tri.center()));
        }
    }

    #[test]
    fn building_twice_is_byte_identical() {
        let tris = random_triangles(200, 25.0, 9);

        let a = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();
        let b = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();

        let a_bytes: &[u8] = bytemuck::cast_slice(&a.nodes);
        let b_bytes: &[u8] = bytemuck::cast_slice(&b.nodes);
        assert_eq!(a_bytes, b_bytes);
        assert_eq!(a.primitive_indices, b.primitive_indices);
    }

    #[test]
    fn input_order_does_not_change_the_tree_bounds() {
        // Centroids are distinct permuted integers on every axis, so no sort
        // ties can leak the input order into the tree.
        let tris: Vec<Triangle> = (0..100)
            .map(|i| {
                let c = vec3a(i as f32, (i * 37 % 100) as f32, (i * 61 % 100) as f32);
                Triangle::from_positions(
                    c + vec3a(-0.3, -0.3, 0.0),
                    c + vec3a(0.3, -0.3, 0.0),
                    c + vec3a(0.0, 0.6, 0.0),
                )
            })
            .collect();
        let mut rotated = tris.clone();
        rotated.rotate_left(13);

        let a = build_bvh_from_tris(&tris, &mut Duration::default()).unwrap();
        let b = build_bvh_from_tris(&rotated, &mut Duration::default()).unwrap();

        assert_eq!(a.nodes[0].aabb(), b.nodes[0].aabb());

        // Leaves hold the same original triangles in both trees.
        let leaf_sets = |bvh: &sweep_bvh::bvh::Bvh, orig: &dyn Fn(u32) -> u32| {
            let mut sets = Vec::new();
            for node in &bvh.nodes {
                if let BvhNodeKind::Leaf { first, count } = node.kind() {
                    let mut set: Vec<u32> = (first..first + count)
                        .map(|slot| orig(bvh.primitive_indices[slot as usize]))
                        .collect();
                    set.sort_unstable();
                    sets.push(set);
                }
            }
            sets.sort();
            sets
        };

        let n = tris.len() as u32;
        let a_sets = leaf_sets(&a, &|i| i);
        let b_sets = leaf_sets(&b, &|i| (i + 13) % n);
        assert_eq!(a_sets, b_sets);
    }

    #[test]
    fn mesh_mode_always_makes_singleton_leaves() {
        let boxes: Vec<Aabb> = random_triangles(64, 8.0, 5)
            .iter()
            .map(|tri| tri.aabb())
            .collect();
        let bvh = build_bvh_from_meshes(&boxes, &mut Duration::default()).unwrap();

        let stats = bvh.validate(&boxes);
        assert_eq!(stats.leaf_count, 64);
        for node in &bvh.nodes {
            if let BvhNodeKind::Leaf { count, .. } = node.kind() {
                assert_eq!(count, 1);
            }
        }
    }

    #[test]
    fn two_overlapping_meshes() {
        let meshes = vec![
            Aabb::new(Vec3A::ZERO, Vec3A::splat(2.0)),
            Aabb::new(Vec3A::ONE, Vec3A::splat(4.0)),
        ];
        let bvh = build_bvh_from_meshes(&meshes, &mut Duration::default()).unwrap();

        assert_eq!(bvh.node_count(), 3);
        let stats = bvh.validate(&meshes);
        assert_eq!(stats.leaf_count, 2);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(build_bvh_from_tris(&[], &mut Duration::default()).is_err());
        let no_meshes: Vec<Aabb> = Vec::new();
        assert!(build_bvh_from_meshes(&no_meshes, &mut Duration::default()).is_err());
    }
}
