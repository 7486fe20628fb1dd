//! Reads the value a resting die shows.

use cgmath::{InnerSpace, Quaternion, Rotation, Vector3};

use crate::geometry::{BuiltDie, ValueGeometry};

/// Candidates closer than this count as tied; the lower index wins.
const TIE_EPS: f32 = 1e-6;

/// Value shown by `die` at `orientation`.
///
/// Face dice read the face whose normal points most nearly up; the d4 reads
/// the vertex that sits highest.
pub fn resolve(orientation: Quaternion<f32>, die: &BuiltDie) -> u32 {
    resolve_geometry(orientation, &die.geometry)
}

pub fn resolve_geometry(orientation: Quaternion<f32>, geometry: &ValueGeometry) -> u32 {
    let up = Vector3::new(0.0, 1.0, 0.0);
    let (points, values) = match geometry {
        ValueGeometry::Faces { normals, values } => (normals, values),
        ValueGeometry::Vertices { positions, values } => (positions, values),
    };

    let mut best = 0;
    let mut best_height = f32::NEG_INFINITY;
    for (i, p) in points.iter().enumerate() {
        let h = orientation.rotate_vector(*p).dot(up);
        if h > best_height + TIE_EPS {
            best = i;
            best_height = h;
        }
    }
    values.get(best).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Rotation3};

    use super::*;
    use crate::domain::DieType;
    use crate::geometry::DieFactory;

    fn identity() -> Quaternion<f32> {
        Quaternion::new(1.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn identity_d6_shows_one() {
        let d6 = DieFactory::new(1.0, 1.0).build_die(DieType::D6);
        assert_eq!(resolve(identity(), &d6), 1);
    }

    #[test]
    fn quarter_turns_of_the_d6() {
        let d6 = DieFactory::new(1.0, 1.0).build_die(DieType::D6);
        // Rolling +X up: rotate +90° about Z takes +X to +Y.
        assert_eq!(resolve(Quaternion::from_angle_z(Deg(90.0)), &d6), 2);
        assert_eq!(resolve(Quaternion::from_angle_z(Deg(-90.0)), &d6), 5);
        assert_eq!(resolve(Quaternion::from_angle_x(Deg(180.0)), &d6), 6);
        // +Z to +Y is -90° about X.
        assert_eq!(resolve(Quaternion::from_angle_x(Deg(-90.0)), &d6), 3);
    }

    #[test]
    fn tetrahedron_reads_its_highest_vertex() {
        let d4 = DieFactory::new(1.0, 1.0).build_die(DieType::D4);
        let ValueGeometry::Vertices { positions, values } = &d4.geometry else {
            panic!("d4 must use vertex geometry");
        };
        // Rotate vertex 2 onto +Y.
        let target = positions[2].normalize();
        let q = Quaternion::from_arc(target, Vector3::new(0.0, 1.0, 0.0), None);
        assert_eq!(resolve(q, &d4), values[2]);
    }

    #[test]
    fn every_face_can_come_up() {
        let mut factory = DieFactory::new(1.0, 1.0);
        for die in [DieType::D8, DieType::D10, DieType::D12, DieType::D20] {
            let built = factory.build_die(die);
            let ValueGeometry::Faces { normals, values } = &built.geometry else {
                panic!("{die} must use face geometry");
            };
            for (n, v) in normals.iter().zip(values) {
                let q = Quaternion::from_arc(*n, Vector3::new(0.0, 1.0, 0.0), None);
                assert_eq!(resolve(q, &built), *v, "{die}");
            }
        }
    }

    #[test]
    fn ties_keep_the_lower_index() {
        let geometry = ValueGeometry::Faces {
            normals: vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0)],
            values: vec![7, 9],
        };
        assert_eq!(resolve_geometry(identity(), &geometry), 7);
    }

    #[test]
    fn resolve_is_pure() {
        let d20 = DieFactory::new(1.0, 1.0).build_die(DieType::D20);
        let q = Quaternion::from_angle_y(Deg(33.0)) * Quaternion::from_angle_x(Deg(71.0));
        assert_eq!(resolve(q, &d20), resolve(q, &d20));
    }
}
