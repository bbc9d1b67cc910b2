//! Deterministic generators and sampling helpers for tests, demos and
//! benchmarks. No `rand` dependency: everything is hash based and seeded.

pub mod sampling {
    use glam::UVec2;

    #[inline(always)]
    pub fn uhash(x: u32) -> u32 {
        // from https://nullprogram.com/blog/2018/07/31/
        let mut x = x ^ (x >> 16);
        x = x.overflowing_mul(0x7feb352d).0;
        x = x ^ (x >> 15);
        x = x.overflowing_mul(0x846ca68b).0;
        x = x ^ (x >> 16);
        x
    }

    #[inline(always)]
    pub fn uhash2(a: u32, b: u32) -> u32 {
        uhash((a.overflowing_mul(1597334673).0) ^ (b.overflowing_mul(3812015801).0))
    }

    #[inline(always)]
    pub fn unormf(n: u32) -> f32 {
        n as f32 * (1.0 / 0xffffffffu32 as f32)
    }

    /// Deterministic noise in `0.0..=1.0` for a grid coordinate and frame.
    #[inline(always)]
    pub fn hash_noise(coord: UVec2, frame: u32) -> f32 {
        let urnd = uhash2(coord.x, (coord.y << 11) + frame);
        unormf(urnd)
    }
}

pub mod geometry {
    use glam::{uvec2, vec3a, Vec3A};

    use crate::test_util::sampling::hash_noise;
    use crate::triangle::Triangle;

    /// Right triangle with unit legs along x and y, min corner at `origin`.
    pub fn unit_triangle_at(origin: Vec3A) -> Triangle {
        Triangle::from_positions(origin, origin + Vec3A::X, origin + Vec3A::Y)
    }

    /// Seeded triangle soup: `count` triangles with centers in
    /// `[-scale, scale]^3` and edges about a tenth of that.
    pub fn random_triangles(count: usize, scale: f32, seed: u32) -> Vec<Triangle> {
        (0..count as u32)
            .map(|i| {
                let sample = |v: u32| -> Vec3A {
                    vec3a(
                        hash_noise(uvec2(i, v), seed),
                        hash_noise(uvec2(i, v), seed + 1),
                        hash_noise(uvec2(i, v), seed + 2),
                    ) * 2.0
                        - Vec3A::ONE
                };
                let base = sample(0) * scale;
                Triangle::from_positions(
                    base + sample(1) * 0.1 * scale,
                    base + sample(2) * 0.1 * scale,
                    base + sample(3) * 0.1 * scale,
                )
            })
            .collect()
    }
}
