//! Base solids for the six dice.
//!
//! Platonic solids are built from their vertex list plus the vertex list of
//! their dual: every dual vertex direction `n` picks out one face, namely the
//! vertices with maximal `n · v`. That keeps the tables short and the face
//! lists correct by construction. The d10 is not Platonic and is spelled out.

use cgmath::{InnerSpace, Vector3};

use crate::domain::DieType;

const PHI: f32 = 1.618_034;
const COPLANAR_EPS: f32 = 1e-4;

/// A convex polyhedron centered at the origin.
#[derive(Clone, Debug)]
pub struct Solid {
    pub vertices: Vec<Vector3<f32>>,
    /// Index loops into `vertices`, counter-clockwise seen from outside.
    pub faces: Vec<Vec<usize>>,
}

impl Solid {
    pub fn scaled(mut self, factor: f32) -> Self {
        for v in self.vertices.iter_mut() {
            *v *= factor;
        }
        self
    }

    pub fn face_normal(&self, face: usize) -> Vector3<f32> {
        let loop_pts: Vec<Vector3<f32>> = self.faces[face].iter().map(|&i| self.vertices[i]).collect();
        polygon_normal(&loop_pts)
    }

    pub fn face_normals(&self) -> Vec<Vector3<f32>> {
        (0..self.faces.len()).map(|f| self.face_normal(f)).collect()
    }
}

/// Unit-circumradius base solid for a die type.
pub fn base_solid(die: DieType) -> Solid {
    match die {
        DieType::D4 => tetrahedron(),
        DieType::D6 => cube(),
        DieType::D8 => octahedron(),
        DieType::D10 => trapezohedron(),
        DieType::D12 => dodecahedron(),
        DieType::D20 => icosahedron(),
    }
}

/// Circumradius per die so the dice read as roughly the same size on the
/// table (a tetrahedron with the cube's circumradius looks tiny).
pub fn circumradius(die: DieType) -> f32 {
    match die {
        DieType::D4 => 1.3,
        DieType::D6 => 1.15,
        DieType::D8 => 1.1,
        DieType::D10 => 1.05,
        DieType::D12 => 1.05,
        DieType::D20 => 1.1,
    }
}

/// Newell's method; robust for slightly non-planar loops.
pub fn polygon_normal(points: &[Vector3<f32>]) -> Vector3<f32> {
    let mut n = Vector3::new(0.0, 0.0, 0.0);
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.normalize()
}

pub fn polygon_centroid(points: &[Vector3<f32>]) -> Vector3<f32> {
    let sum = points.iter().fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + *p);
    sum / points.len() as f32
}

fn unit(points: &[[f32; 3]]) -> Vec<Vector3<f32>> {
    points
        .iter()
        .map(|p| Vector3::new(p[0], p[1], p[2]).normalize())
        .collect()
}

/// One face per dual direction, wound counter-clockwise around it.
fn from_dual(vertices: Vec<Vector3<f32>>, face_dirs: &[Vector3<f32>]) -> Solid {
    let faces = face_dirs
        .iter()
        .map(|&dir| {
            let best = vertices
                .iter()
                .map(|v| v.dot(dir))
                .fold(f32::NEG_INFINITY, f32::max);
            let members: Vec<usize> = (0..vertices.len())
                .filter(|&i| vertices[i].dot(dir) > best - COPLANAR_EPS)
                .collect();
            wind_around(&vertices, members, dir)
        })
        .collect();
    Solid { vertices, faces }
}

/// Sort a face's vertices by angle around `axis` (counter-clockwise when
/// looking down the axis from outside).
fn wind_around(vertices: &[Vector3<f32>], mut members: Vec<usize>, axis: Vector3<f32>) -> Vec<usize> {
    let pts: Vec<Vector3<f32>> = members.iter().map(|&i| vertices[i]).collect();
    let center = polygon_centroid(&pts);
    let u = (vertices[members[0]] - center).normalize();
    let w = axis.normalize().cross(u);
    let angle = |i: usize| {
        let d = vertices[i] - center;
        d.dot(w).atan2(d.dot(u))
    };
    members.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
    members
}

fn tetrahedron() -> Solid {
    let vertices = unit(&[
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ]);
    // Face i lies opposite vertex i.
    let dirs: Vec<Vector3<f32>> = vertices.iter().map(|v| -*v).collect();
    from_dual(vertices, &dirs)
}

fn cube() -> Solid {
    let mut corners = Vec::with_capacity(8);
    for &x in &[-1.0, 1.0] {
        for &y in &[-1.0, 1.0] {
            for &z in &[-1.0, 1.0] {
                corners.push([x, y, z]);
            }
        }
    }
    let dirs = unit(&[
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ]);
    from_dual(unit(&corners), &dirs)
}

fn octahedron() -> Solid {
    let vertices = unit(&[
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ]);
    let mut dirs = Vec::with_capacity(8);
    for &x in &[1.0, -1.0] {
        for &y in &[1.0, -1.0] {
            for &z in &[1.0, -1.0] {
                dirs.push([x, y, z]);
            }
        }
    }
    from_dual(vertices, &unit(&dirs))
}

/// Cyclic permutations of (0, ±1, ±φ).
fn icosahedron_points() -> Vec<[f32; 3]> {
    let mut pts = Vec::with_capacity(12);
    for &a in &[1.0, -1.0] {
        for &b in &[PHI, -PHI] {
            pts.push([0.0, a, b]);
            pts.push([a, b, 0.0]);
            pts.push([b, 0.0, a]);
        }
    }
    pts
}

fn dodecahedron_points() -> Vec<[f32; 3]> {
    let inv = 1.0 / PHI;
    let mut pts = Vec::with_capacity(20);
    for &x in &[1.0, -1.0] {
        for &y in &[1.0, -1.0] {
            for &z in &[1.0, -1.0] {
                pts.push([x, y, z]);
            }
        }
    }
    // Rotated to match the icosahedron above: its face centers are these
    // vertices, and the other way round.
    for &a in &[inv, -inv] {
        for &b in &[PHI, -PHI] {
            pts.push([a, 0.0, b]);
            pts.push([0.0, b, a]);
            pts.push([b, a, 0.0]);
        }
    }
    pts
}

fn dodecahedron() -> Solid {
    from_dual(unit(&dodecahedron_points()), &unit(&icosahedron_points()))
}

fn icosahedron() -> Solid {
    from_dual(unit(&icosahedron_points()), &unit(&dodecahedron_points()))
}

/// Pentagonal trapezohedron: apexes at ±1, rings at ±e with the lower ring
/// rotated by 36°. `e` is chosen so every kite is planar.
fn trapezohedron() -> Solid {
    let c36 = 36f32.to_radians().cos();
    let e = (1.0 - c36) / (1.0 + c36);

    let mut vertices = vec![Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0)];
    for k in 0..5 {
        let a = (72.0 * k as f32).to_radians();
        vertices.push(Vector3::new(a.cos(), e, a.sin()));
    }
    for k in 0..5 {
        let a = (72.0 * k as f32 + 36.0).to_radians();
        vertices.push(Vector3::new(a.cos(), -e, a.sin()));
    }
    let upper = |k: usize| 2 + k % 5;
    let lower = |k: usize| 7 + k % 5;

    let mut faces = Vec::with_capacity(10);
    for k in 0..5 {
        faces.push(vec![0, upper(k), lower(k), upper(k + 1)]);
    }
    for k in 0..5 {
        faces.push(vec![1, lower(k), upper(k + 1), lower(k + 1)]);
    }

    // Scale to unit circumradius (ring vertices sit at sqrt(1 + e²)).
    let r = (1.0 + e * e).sqrt();
    let mut solid = Solid { vertices, faces }.scaled(1.0 / r);
    orient_outward(&mut solid);
    solid
}

/// Flip any loop whose winding points inward.
fn orient_outward(solid: &mut Solid) {
    for f in 0..solid.faces.len() {
        let pts: Vec<Vector3<f32>> = solid.faces[f].iter().map(|&i| solid.vertices[i]).collect();
        if polygon_normal(&pts).dot(polygon_centroid(&pts)) < 0.0 {
            solid.faces[f].reverse();
        }
    }
}
