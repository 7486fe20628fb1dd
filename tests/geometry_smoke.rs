use std::collections::BTreeSet;

use cgmath::InnerSpace;
use dicebox_engine::geometry::{DieFactory, ValueGeometry};
use dicebox_engine::DieType;

#[test]
fn every_die_prints_one_through_sides() {
    let mut factory = DieFactory::new(1.0, 1.0);
    for die in DieType::ALL {
        let built = factory.build_die(die);
        let values: BTreeSet<u32> = built.geometry.values().iter().copied().collect();
        let expected: BTreeSet<u32> = (1..=die.sides()).collect();
        assert_eq!(values, expected, "{die}");
        assert_eq!(built.labels.len() as u32, die.sides(), "{die}");
    }
}

#[test]
fn opposite_faces_sum_to_sides_plus_one() {
    let mut factory = DieFactory::new(1.0, 1.0);
    for die in [DieType::D6, DieType::D8, DieType::D10, DieType::D12, DieType::D20] {
        let built = factory.build_die(die);
        let ValueGeometry::Faces { normals, values } = &built.geometry else {
            panic!("{die} must use face geometry");
        };
        for (i, n) in normals.iter().enumerate() {
            let j = normals
                .iter()
                .position(|m| n.dot(*m) < -0.999)
                .unwrap_or_else(|| panic!("{die} face {i} has no opposite"));
            assert_eq!(values[i] + values[j], die.sides() + 1, "{die} faces {i}/{j}");
        }
    }
}

#[test]
fn hulls_have_the_solid_counts() {
    let mut factory = DieFactory::new(1.0, 1.0);
    let expected = [
        (DieType::D4, 4, 4),
        (DieType::D6, 8, 6),
        (DieType::D8, 6, 8),
        (DieType::D10, 12, 10),
        (DieType::D12, 20, 12),
        (DieType::D20, 12, 20),
    ];
    for (die, vertices, faces) in expected {
        let hull = factory.build_die(die).shape.to_hull();
        assert_eq!(hull.vertices.len(), vertices, "{die}");
        assert_eq!(hull.faces.len(), faces, "{die}");
        // Euler: V - E + F = 2
        assert_eq!(vertices + faces, hull.edges.len() + 2, "{die}");
    }
}

#[test]
fn scale_grows_every_die() {
    let mut small = DieFactory::new(1.0, 1.0);
    let mut large = DieFactory::new(2.0, 1.0);
    for die in DieType::ALL {
        let a = small.build_die(die);
        let b = large.build_die(die);
        let ratio = b.shape.bounding_radius() / a.shape.bounding_radius();
        assert!((ratio - 2.0).abs() < 1e-3, "{die}: {ratio}");
        assert!(b.mass.mass > a.mass.mass);
    }
}
