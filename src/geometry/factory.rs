//! DieFactory - builds and memoizes everything a die type needs.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{InnerSpace, Vector3};
use serde::Serialize;

use crate::domain::DieType;
use crate::systems::rigid_body::MassProperties;

use super::hull::{CollisionShape, ConvexHull};
use super::mesh::DieMesh;
use super::polyhedra::{base_solid, circumradius, Solid};

/// What decides a die's value once it rests.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueGeometry {
    /// Outward unit normals, index-aligned with the printed values.
    Faces { normals: Vec<Vector3<f32>>, values: Vec<u32> },
    /// Local vertex positions; the value of the highest vertex wins (d4).
    Vertices { positions: Vec<Vector3<f32>>, values: Vec<u32> },
}

impl ValueGeometry {
    pub fn values(&self) -> &[u32] {
        match self {
            ValueGeometry::Faces { values, .. } | ValueGeometry::Vertices { values, .. } => values,
        }
    }
}

/// What a face's atlas cell shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceLabel {
    Value(u32),
    /// Tetrahedron faces print the value of each of their corners.
    Corners([u32; 3]),
}

/// Immutable, shared data for one die type.
#[derive(Debug)]
pub struct BuiltDie {
    pub die_type: DieType,
    pub mesh: DieMesh,
    /// One label per logical face, in face order.
    pub labels: Vec<FaceLabel>,
    pub geometry: ValueGeometry,
    pub shape: Arc<CollisionShape>,
    pub mass: MassProperties,
}

impl BuiltDie {
    pub fn labels_json(&self) -> String {
        serde_json::to_string(&self.labels).unwrap_or_else(|_| "[]".to_string())
    }
}

pub struct DieFactory {
    scale: f32,
    density: f32,
    cache: HashMap<DieType, Arc<BuiltDie>>,
}

impl DieFactory {
    pub fn new(scale: f32, density: f32) -> Self {
        Self {
            scale,
            density,
            cache: HashMap::new(),
        }
    }

    /// First call per type builds; later calls hand out the same `Arc`.
    pub fn build_die(&mut self, die: DieType) -> Arc<BuiltDie> {
        if let Some(built) = self.cache.get(&die) {
            return Arc::clone(built);
        }
        let built = Arc::new(build(die, self.scale, self.density));
        log::debug!(
            "built {}: {} faces, {} render vertices",
            die,
            built.labels.len(),
            built.mesh.vertex_count()
        );
        self.cache.insert(die, Arc::clone(&built));
        built
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn build(die: DieType, scale: f32, density: f32) -> BuiltDie {
    let solid = base_solid(die).scaled(circumradius(die) * scale);
    let mesh = DieMesh::from_solid(&solid);
    let normals = solid.face_normals();

    let (geometry, labels) = match die {
        DieType::D4 => {
            let values: Vec<u32> = (1..=4).collect();
            let labels = solid
                .faces
                .iter()
                .map(|f| FaceLabel::Corners([values[f[0]], values[f[1]], values[f[2]]]))
                .collect();
            let geometry = ValueGeometry::Vertices {
                positions: solid.vertices.clone(),
                values,
            };
            (geometry, labels)
        }
        DieType::D6 => {
            let values: Vec<u32> = normals.iter().map(|n| d6_value(*n)).collect();
            face_geometry(normals, values)
        }
        DieType::D8 | DieType::D10 | DieType::D12 | DieType::D20 => {
            let values = opposite_pair_values(&normals, die.sides());
            face_geometry(normals, values)
        }
    };

    let shape = match die {
        DieType::D6 => CollisionShape::Cuboid {
            half_extents: cuboid_half_extents(&solid),
        },
        _ => CollisionShape::ConvexHull(ConvexHull::from_mesh(&mesh)),
    };
    let mass = MassProperties::from_shape(&shape, density);

    BuiltDie {
        die_type: die,
        mesh,
        labels,
        geometry,
        shape: Arc::new(shape),
        mass,
    }
}

fn face_geometry(normals: Vec<Vector3<f32>>, values: Vec<u32>) -> (ValueGeometry, Vec<FaceLabel>) {
    let labels = values.iter().map(|&v| FaceLabel::Value(v)).collect();
    (ValueGeometry::Faces { normals, values }, labels)
}

/// +Y=1, -Y=6, +X=2, -X=5, +Z=3, -Z=4.
fn d6_value(n: Vector3<f32>) -> u32 {
    let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
    if ay >= ax && ay >= az {
        if n.y > 0.0 { 1 } else { 6 }
    } else if ax >= az {
        if n.x > 0.0 { 2 } else { 5 }
    } else if n.z > 0.0 {
        3
    } else {
        4
    }
}

/// Walk faces in order; each unassigned face takes the next value and its
/// opposite face takes `sides + 1 - value`.
fn opposite_pair_values(normals: &[Vector3<f32>], sides: u32) -> Vec<u32> {
    let mut values = vec![0u32; normals.len()];
    let mut next = 1;
    for i in 0..normals.len() {
        if values[i] != 0 {
            continue;
        }
        values[i] = next;
        let opposite = (0..normals.len())
            .filter(|&j| j != i && values[j] == 0)
            .min_by(|&a, &b| {
                (normals[a] + normals[i])
                    .magnitude2()
                    .total_cmp(&(normals[b] + normals[i]).magnitude2())
            });
        if let Some(j) = opposite {
            values[j] = sides + 1 - next;
        }
        next += 1;
    }
    values
}

fn cuboid_half_extents(solid: &Solid) -> Vector3<f32> {
    solid.vertices.iter().fold(Vector3::new(0.0, 0.0, 0.0), |acc, v| {
        Vector3::new(acc.x.max(v.x.abs()), acc.y.max(v.y.abs()), acc.z.max(v.z.abs()))
    })
}
