//! Triangle representation in 3D space, carrying the per-vertex attributes the
//! shading kernels consume.

use glam::{Vec2, Vec3A};

use crate::{aabb::Aabb, Primitive};

/// A triangle with per-vertex shading normals and texture coordinates.
///
/// The builder only looks at the positions (through [`Primitive`]); the
/// remaining attributes ride along for the renderer.
#[derive(Clone, Copy, Default, Debug)]
pub struct Triangle {
    pub positions: [Vec3A; 3],
    pub normals: [Vec3A; 3],
    pub tex_coords: [Vec2; 3],
}

const NORMAL_LENGTH_EPSILON: f32 = 1.0e-6;

impl Triangle {
    /// Creates a triangle from full vertex data.
    ///
    /// Any shading normal with (approximately) zero length is replaced by the
    /// geometric normal. If all three shading normals then disagree with the
    /// geometric normal the winding order is reversed; if only some of them
    /// disagree the mesh is inconsistent and a warning is logged.
    pub fn new(positions: [Vec3A; 3], normals: [Vec3A; 3], tex_coords: [Vec2; 3]) -> Self {
        let mut tri = Self {
            positions,
            normals,
            tex_coords,
        };

        let geometric_normal = tri.compute_normal();
        for normal in &mut tri.normals {
            if normal.length() < NORMAL_LENGTH_EPSILON {
                *normal = geometric_normal;
            }
        }

        tri.fix_winding_order_if_needed(geometric_normal);
        tri
    }

    /// Creates a triangle from positions only, synthesizing the geometric
    /// normal for all three vertices and zeroed texture coordinates.
    pub fn from_positions(v0: Vec3A, v1: Vec3A, v2: Vec3A) -> Self {
        let mut tri = Self {
            positions: [v0, v1, v2],
            ..Default::default()
        };
        let normal = tri.compute_normal();
        tri.normals = [normal; 3];
        tri
    }

    /// Compute the normal of the triangle geometry.
    #[inline(always)]
    pub fn compute_normal(&self) -> Vec3A {
        let e1 = self.positions[1] - self.positions[0];
        let e2 = self.positions[2] - self.positions[0];
        e1.cross(e2).normalize_or_zero()
    }

    fn fix_winding_order_if_needed(&mut self, geometric_normal: Vec3A) {
        let wrong = [
            geometric_normal.dot(self.normals[0]) < 0.0,
            geometric_normal.dot(self.normals[1]) < 0.0,
            geometric_normal.dot(self.normals[2]) < 0.0,
        ];
        let all_normals_have_wrong_orientation = wrong[0] && wrong[1] && wrong[2];
        let some_normals_have_wrong_orientation = wrong[0] || wrong[1] || wrong[2];

        if all_normals_have_wrong_orientation {
            // Reverse winding order
            self.positions.swap(1, 2);
            self.normals.swap(1, 2);
            self.tex_coords.swap(1, 2);
        } else if some_normals_have_wrong_orientation {
            log::warn!("triangle has shading normals on both sides of its geometric normal");
        }
    }
}

impl Primitive for Triangle {
    /// The centroid of the three vertices, used as the SAH sort key.
    #[inline(always)]
    fn center(&self) -> Vec3A {
        (self.positions[0] + self.positions[1] + self.positions[2]) / 3.0
    }

    /// Compute the bounding box of the triangle.
    #[inline(always)]
    fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}
