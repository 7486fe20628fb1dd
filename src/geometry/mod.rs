//! Procedural die geometry: base solids, render meshes, collision shapes.

pub mod factory;
pub mod hull;
pub mod mesh;
pub mod polyhedra;

pub use factory::{BuiltDie, DieFactory, FaceLabel, ValueGeometry};
pub use hull::{CollisionShape, ConvexHull};
pub use mesh::DieMesh;
