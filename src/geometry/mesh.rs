//! Render mesh: a flat-shaded triangle soup with one UV atlas cell per face.

use cgmath::{InnerSpace, Vector3};

use super::polyhedra::{polygon_centroid, polygon_normal, Solid};

/// Fraction of an atlas cell a face polygon may cover; the rest is margin so
/// texture filtering never bleeds between neighbouring labels.
const UV_FILL: f32 = 0.9;

/// Non-indexed triangle soup. Every triangle owns its three vertices so each
/// face keeps its own normal and its own UV region.
#[derive(Clone, Debug, Default)]
pub struct DieMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Logical face of each triangle (`positions.len() / 3` entries).
    pub triangle_faces: Vec<u32>,
    /// Atlas grid the UVs refer to, as (columns, rows).
    pub atlas: (u32, u32),
}

impl DieMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_faces.len()
    }

    /// Fan-triangulate every face of `solid`.
    pub fn from_solid(solid: &Solid) -> Self {
        let face_count = solid.faces.len() as u32;
        let cols = (face_count as f32).sqrt().ceil().max(1.0) as u32;
        let rows = (face_count + cols - 1) / cols;

        let mut mesh = DieMesh {
            atlas: (cols, rows),
            ..Default::default()
        };

        for (f, face) in solid.faces.iter().enumerate() {
            let pts: Vec<Vector3<f32>> = face.iter().map(|&i| solid.vertices[i]).collect();
            let normal = polygon_normal(&pts);
            let uvs = face_uvs(&pts, normal, f as u32, cols, rows);

            for i in 1..pts.len() - 1 {
                for &k in &[0, i, i + 1] {
                    mesh.positions.push(pts[k].into());
                    mesh.normals.push(normal.into());
                    mesh.uvs.push(uvs[k]);
                }
                mesh.triangle_faces.push(f as u32);
            }
        }
        mesh
    }

    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flatten().copied().collect()
    }

    pub fn flat_normals(&self) -> Vec<f32> {
        self.normals.iter().flatten().copied().collect()
    }

    pub fn flat_uvs(&self) -> Vec<f32> {
        self.uvs.iter().flatten().copied().collect()
    }
}

/// Map a face polygon into its own atlas cell, centered, upright along the
/// direction from the centroid to the first corner.
fn face_uvs(pts: &[Vector3<f32>], normal: Vector3<f32>, face: u32, cols: u32, rows: u32) -> Vec<[f32; 2]> {
    let center = polygon_centroid(pts);
    let radius = pts
        .iter()
        .map(|p| (*p - center).magnitude())
        .fold(0.0f32, f32::max)
        .max(f32::EPSILON);
    let up = (pts[0] - center).normalize();
    let right = up.cross(normal);

    let cell_w = 1.0 / cols as f32;
    let cell_h = 1.0 / rows as f32;
    let origin_u = (face % cols) as f32 * cell_w;
    let origin_v = (face / cols) as f32 * cell_h;

    pts.iter()
        .map(|p| {
            let d = *p - center;
            let x = d.dot(right) / radius;
            let y = d.dot(up) / radius;
            [
                origin_u + cell_w * (0.5 + 0.5 * UV_FILL * x),
                // Image rows grow downward.
                origin_v + cell_h * (0.5 - 0.5 * UV_FILL * y),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DieType;
    use crate::geometry::polyhedra::base_solid;

    #[test]
    fn render_vertex_counts_follow_face_shape() {
        // d10 kites: 2 triangles = 6 render vertices; d12 pentagons: 3 = 9.
        let d10 = DieMesh::from_solid(&base_solid(DieType::D10));
        assert_eq!(d10.vertex_count(), 10 * 6);
        assert_eq!(d10.triangle_count(), 20);

        let d12 = DieMesh::from_solid(&base_solid(DieType::D12));
        assert_eq!(d12.vertex_count(), 12 * 9);

        let d20 = DieMesh::from_solid(&base_solid(DieType::D20));
        assert_eq!(d20.vertex_count(), 20 * 3);
    }

    #[test]
    fn face_uvs_stay_inside_their_own_cell() {
        for die in DieType::ALL {
            let mesh = DieMesh::from_solid(&base_solid(die));
            let (cols, rows) = mesh.atlas;
            for (t, &face) in mesh.triangle_faces.iter().enumerate() {
                let u0 = (face % cols) as f32 / cols as f32;
                let v0 = (face / cols) as f32 / rows as f32;
                for uv in &mesh.uvs[t * 3..t * 3 + 3] {
                    assert!(uv[0] > u0 && uv[0] < u0 + 1.0 / cols as f32, "{die} face {face}");
                    assert!(uv[1] > v0 && uv[1] < v0 + 1.0 / rows as f32, "{die} face {face}");
                }
            }
        }
    }

    #[test]
    fn atlas_has_a_cell_for_every_face() {
        let mesh = DieMesh::from_solid(&base_solid(DieType::D20));
        assert_eq!(mesh.atlas, (5, 4));
        let mesh = DieMesh::from_solid(&base_solid(DieType::D6));
        assert_eq!(mesh.atlas, (3, 2));
    }
}
