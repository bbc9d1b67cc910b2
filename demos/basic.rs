use std::time::Duration;

use sweep_bvh::{
    bvh::{builder::build_bvh_from_tris, node::BvhNodeKind},
    test_util::geometry::random_triangles,
    PrettyDuration,
};

fn main() {
    // A seeded triangle soup stands in for a real scene.
    let tris = random_triangles(4096, 50.0, 0);

    let mut build_time = Duration::default();
    let bvh = build_bvh_from_tris(&tris, &mut build_time).expect("bvh build");

    println!(
        "built {} nodes over {} primitives in {}",
        bvh.node_count(),
        bvh.index_count(),
        PrettyDuration(build_time)
    );

    match bvh.nodes[0].kind() {
        BvhNodeKind::Leaf { first, count } => {
            println!("root is a leaf over indices [{first}, {})", first + count)
        }
        BvhNodeKind::Interior { left, axis } => {
            println!(
                "root splits on axis {axis} with children at {left} and {}",
                left + 1
            )
        }
    }

    let stats = bvh.validate(&tris);
    print!("{stats}");
}
