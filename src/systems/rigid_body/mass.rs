use cgmath::{InnerSpace, Matrix3, SquareMatrix, Vector3, Zero};

use crate::geometry::{CollisionShape, ConvexHull};

/// Mass and body-local inertia of a uniform-density solid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassProperties {
    pub mass: f32,
    pub inv_mass: f32,
    pub inertia: Matrix3<f32>,
    pub inv_inertia: Matrix3<f32>,
}

impl MassProperties {
    pub fn from_shape(shape: &CollisionShape, density: f32) -> Self {
        match shape {
            CollisionShape::Cuboid { half_extents } => Self::cuboid(*half_extents, density),
            CollisionShape::ConvexHull(hull) => Self::hull(hull, density),
        }
    }

    pub fn cuboid(half: Vector3<f32>, density: f32) -> Self {
        let mass = density * 8.0 * half.x * half.y * half.z;
        let (x2, y2, z2) = (half.x * half.x, half.y * half.y, half.z * half.z);
        let k = mass / 3.0;
        let inertia = Matrix3::from_diagonal(Vector3::new(k * (y2 + z2), k * (x2 + z2), k * (x2 + y2)));
        Self::from_parts(mass, inertia)
    }

    /// Tetrahedral decomposition from the origin, which must be the centroid
    /// (true for every die solid).
    pub fn hull(hull: &ConvexHull, density: f32) -> Self {
        let mut volume = 0.0f32;
        let mut cov = Matrix3::zero();
        for face in &hull.faces {
            let a = hull.vertices[face[0]];
            for i in 1..face.len().saturating_sub(1) {
                let b = hull.vertices[face[i]];
                let c = hull.vertices[face[i + 1]];
                let det = a.dot(b.cross(c));
                volume += det / 6.0;
                let s = a + b + c;
                cov += (outer(a) + outer(b) + outer(c) + outer(s)) * (det / 120.0);
            }
        }
        let trace = cov.x.x + cov.y.y + cov.z.z;
        let inertia = (Matrix3::from_value(trace) - cov) * density;
        Self::from_parts(density * volume, inertia)
    }

    fn from_parts(mass: f32, inertia: Matrix3<f32>) -> Self {
        let inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        let inv_inertia = inertia.invert().unwrap_or_else(Matrix3::zero);
        Self {
            mass,
            inv_mass,
            inertia,
            inv_inertia,
        }
    }
}

fn outer(v: Vector3<f32>) -> Matrix3<f32> {
    Matrix3::from_cols(v * v.x, v * v.y, v * v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-4 * b.abs().max(1.0)
    }

    #[test]
    fn hull_of_a_box_matches_the_closed_form() {
        let half = Vector3::new(1.0, 0.5, 2.0);
        let exact = MassProperties::cuboid(half, 2.0);
        let fan = MassProperties::hull(&ConvexHull::cuboid(half), 2.0);
        assert!(close(fan.mass, exact.mass));
        assert!(close(fan.inertia.x.x, exact.inertia.x.x));
        assert!(close(fan.inertia.y.y, exact.inertia.y.y));
        assert!(close(fan.inertia.z.z, exact.inertia.z.z));
        assert!(fan.inertia.x.y.abs() < 1e-4);
    }

    #[test]
    fn unit_cube_mass_and_inverse() {
        let m = MassProperties::cuboid(Vector3::new(0.5, 0.5, 0.5), 1.0);
        assert!(close(m.mass, 1.0));
        assert!(close(m.inertia.x.x, 1.0 / 6.0));
        assert!(close(m.inv_inertia.y.y, 6.0));
    }
}
