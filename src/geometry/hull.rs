//! Collision shapes derived from render meshes.

use std::collections::HashMap;

use cgmath::{InnerSpace, Vector3};

use super::mesh::DieMesh;
use super::polyhedra::polygon_normal;

/// Positions closer than this are the same hull vertex.
pub const WELD_TOLERANCE: f32 = 1e-4;
const PARALLEL_EPS: f32 = 1e-3;

/// Convex polyhedron in body-local space, centered on the center of mass.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHull {
    pub vertices: Vec<Vector3<f32>>,
    /// One counter-clockwise loop per logical face.
    pub faces: Vec<Vec<usize>>,
    /// Outward unit normal per face.
    pub normals: Vec<Vector3<f32>>,
    /// Unique undirected edges as vertex index pairs.
    pub edges: Vec<(usize, usize)>,
    /// Edge directions with parallel (and anti-parallel) duplicates removed.
    pub edge_dirs: Vec<Vector3<f32>>,
    pub radius: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CollisionShape {
    Cuboid { half_extents: Vector3<f32> },
    ConvexHull(ConvexHull),
}

impl CollisionShape {
    /// Narrow phase works on hulls only; a cuboid is an 8-vertex hull.
    pub fn to_hull(&self) -> ConvexHull {
        match self {
            CollisionShape::Cuboid { half_extents } => ConvexHull::cuboid(*half_extents),
            CollisionShape::ConvexHull(hull) => hull.clone(),
        }
    }

    pub fn bounding_radius(&self) -> f32 {
        match self {
            CollisionShape::Cuboid { half_extents } => half_extents.magnitude(),
            CollisionShape::ConvexHull(hull) => hull.radius,
        }
    }
}

impl ConvexHull {
    pub fn new(vertices: Vec<Vector3<f32>>, faces: Vec<Vec<usize>>) -> Self {
        let normals = faces
            .iter()
            .map(|f| {
                let pts: Vec<Vector3<f32>> = f.iter().map(|&i| vertices[i]).collect();
                polygon_normal(&pts)
            })
            .collect();

        let mut edges: Vec<(usize, usize)> = Vec::new();
        for face in &faces {
            for i in 0..face.len() {
                let a = face[i];
                let b = face[(i + 1) % face.len()];
                let key = (a.min(b), a.max(b));
                if !edges.contains(&key) {
                    edges.push(key);
                }
            }
        }

        let mut edge_dirs: Vec<Vector3<f32>> = Vec::new();
        for &(a, b) in &edges {
            let d = (vertices[b] - vertices[a]).normalize();
            if !edge_dirs.iter().any(|e| e.cross(d).magnitude2() < PARALLEL_EPS * PARALLEL_EPS) {
                edge_dirs.push(d);
            }
        }

        let radius = vertices.iter().map(|v| v.magnitude()).fold(0.0f32, f32::max);

        Self {
            vertices,
            faces,
            normals,
            edges,
            edge_dirs,
            radius,
        }
    }

    /// Box with the given half extents, faces ordered +X, -X, +Y, -Y, +Z, -Z.
    pub fn cuboid(half: Vector3<f32>) -> Self {
        // Vertex index bits: x = 4, y = 2, z = 1 (bit set = positive side).
        let mut vertices = Vec::with_capacity(8);
        for &x in &[-half.x, half.x] {
            for &y in &[-half.y, half.y] {
                for &z in &[-half.z, half.z] {
                    vertices.push(Vector3::new(x, y, z));
                }
            }
        }
        let faces = vec![
            vec![4, 6, 7, 5],
            vec![0, 1, 3, 2],
            vec![2, 3, 7, 6],
            vec![0, 4, 5, 1],
            vec![1, 5, 7, 3],
            vec![0, 2, 6, 4],
        ];
        Self::new(vertices, faces)
    }

    /// Rebuild the polyhedron behind a triangle soup.
    ///
    /// Positions are welded, triangles are grouped by their logical face and
    /// each group's outline is chained from the directed edges that have no
    /// reverse inside the group. Hull face `f` is logical face `f`.
    pub fn from_mesh(mesh: &DieMesh) -> Self {
        let mut vertices: Vec<Vector3<f32>> = Vec::new();
        let welded: Vec<usize> = mesh
            .positions
            .iter()
            .map(|p| {
                let p = Vector3::new(p[0], p[1], p[2]);
                match vertices
                    .iter()
                    .position(|v| (*v - p).magnitude2() < WELD_TOLERANCE * WELD_TOLERANCE)
                {
                    Some(i) => i,
                    None => {
                        vertices.push(p);
                        vertices.len() - 1
                    }
                }
            })
            .collect();

        let face_count = mesh.triangle_faces.iter().map(|&f| f as usize + 1).max().unwrap_or(0);
        let mut directed: Vec<Vec<(usize, usize)>> = vec![Vec::new(); face_count];
        for (t, &face) in mesh.triangle_faces.iter().enumerate() {
            let tri = [welded[t * 3], welded[t * 3 + 1], welded[t * 3 + 2]];
            for i in 0..3 {
                directed[face as usize].push((tri[i], tri[(i + 1) % 3]));
            }
        }

        let faces = directed.iter().map(|edges| chain_boundary(edges)).collect();
        Self::new(vertices, faces)
    }

    pub fn support(&self, dir: Vector3<f32>) -> usize {
        let mut best = 0;
        let mut best_dot = f32::NEG_INFINITY;
        for (i, v) in self.vertices.iter().enumerate() {
            let d = v.dot(dir);
            if d > best_dot {
                best_dot = d;
                best = i;
            }
        }
        best
    }

    pub fn face_points(&self, face: usize) -> Vec<Vector3<f32>> {
        self.faces[face].iter().map(|&i| self.vertices[i]).collect()
    }
}

fn chain_boundary(edges: &[(usize, usize)]) -> Vec<usize> {
    let next: HashMap<usize, usize> = edges
        .iter()
        .filter(|&&(a, b)| !edges.contains(&(b, a)))
        .copied()
        .collect();

    let Some(&start) = next.keys().min() else {
        return Vec::new();
    };
    let mut outline = vec![start];
    let mut cur = start;
    while let Some(&n) = next.get(&cur) {
        if n == start || outline.len() > next.len() {
            break;
        }
        outline.push(n);
        cur = n;
    }
    outline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DieType;
    use crate::geometry::polyhedra::{base_solid, polygon_centroid};

    fn hull_for(die: DieType) -> ConvexHull {
        ConvexHull::from_mesh(&DieMesh::from_solid(&base_solid(die)))
    }

    #[test]
    fn hull_merges_fan_triangles_back_into_faces() {
        let d10 = hull_for(DieType::D10);
        assert_eq!(d10.vertices.len(), 12);
        assert_eq!(d10.faces.len(), 10);
        assert!(d10.faces.iter().all(|f| f.len() == 4));

        let d12 = hull_for(DieType::D12);
        assert_eq!(d12.vertices.len(), 20);
        assert_eq!(d12.faces.len(), 12);
        assert!(d12.faces.iter().all(|f| f.len() == 5));
        assert_eq!(d12.edges.len(), 30);
    }

    #[test]
    fn hull_faces_keep_outward_winding() {
        for die in DieType::ALL {
            let hull = hull_for(die);
            for f in 0..hull.faces.len() {
                let c = polygon_centroid(&hull.face_points(f));
                assert!(hull.normals[f].dot(c) > 0.0, "{die} face {f}");
                for v in &hull.vertices {
                    assert!(hull.normals[f].dot(*v - c) < 1e-4, "{die} face {f} not supporting");
                }
            }
        }
    }

    #[test]
    fn cuboid_normals_follow_axis_order() {
        let hull = ConvexHull::cuboid(Vector3::new(1.0, 2.0, 3.0));
        let expect = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, -1.0),
        ];
        for (n, e) in hull.normals.iter().zip(expect.iter()) {
            assert!((*n - *e).magnitude() < 1e-6);
        }
        assert_eq!(hull.edges.len(), 12);
        assert_eq!(hull.edge_dirs.len(), 3);
    }

    #[test]
    fn support_picks_the_extreme_vertex() {
        let hull = ConvexHull::cuboid(Vector3::new(1.0, 1.0, 1.0));
        let i = hull.support(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(hull.vertices[i], Vector3::new(1.0, 1.0, 1.0));
    }
}
