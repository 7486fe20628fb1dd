//! Sequential-impulse contact solver.

use cgmath::{InnerSpace, Matrix3, Vector3, Zero};

use crate::domain::config::{ContactMaterial, PhysicsConfig};
use crate::rigid_body::RigidBody;

use super::collision::Contact;

struct Row {
    a: Option<usize>,
    b: usize,
    ra: Vector3<f32>,
    rb: Vector3<f32>,
    normal: Vector3<f32>,
    tangents: [Vector3<f32>; 2],
    normal_mass: f32,
    tangent_mass: [f32; 2],
    bias: f32,
    friction: f32,
    jn: f32,
    jt: [f32; 2],
}

/// Two unit vectors spanning the plane orthogonal to `n`.
fn orthonormal_basis(n: Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let helper = if n.x.abs() < 0.57 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    let t1 = n.cross(helper).normalize();
    let t2 = n.cross(t1);
    (t1, t2)
}

fn inverse_mass_along(inv_mass: f32, inv_inertia: &Matrix3<f32>, r: Vector3<f32>, dir: Vector3<f32>) -> f32 {
    let rn = r.cross(dir);
    inv_mass + dir.dot((inv_inertia * rn).cross(r))
}

fn relative_velocity(bodies: &[RigidBody], row: &Row) -> Vector3<f32> {
    let vb = bodies[row.b].point_velocity(row.rb);
    let va = row.a.map_or(Vector3::zero(), |a| bodies[a].point_velocity(row.ra));
    vb - va
}

fn apply(bodies: &mut [RigidBody], row: &Row, impulse: Vector3<f32>) {
    if let Some(a) = row.a {
        bodies[a].apply_impulse(-impulse, row.ra);
    }
    bodies[row.b].apply_impulse(impulse, row.rb);
}

/// Solve all contacts for one substep of length `dt`.
pub(super) fn solve_contacts(
    bodies: &mut [RigidBody],
    contacts: &[Contact],
    config: &PhysicsConfig,
    room_material: ContactMaterial,
    die_material: ContactMaterial,
    dt: f32,
) {
    let mut rows: Vec<Row> = Vec::with_capacity(contacts.len());
    for c in contacts {
        let material = if c.a.is_some() { die_material } else { room_material };
        let body_b = &bodies[c.b];
        let rb = c.point - body_b.pos;
        let ra = c.a.map_or(Vector3::zero(), |a| c.point - bodies[a].pos);

        let mass_along = |dir: Vector3<f32>| {
            let mut k = inverse_mass_along(body_b.mass.inv_mass, &body_b.inv_inertia_world, rb, dir);
            if let Some(a) = c.a {
                let body_a = &bodies[a];
                k += inverse_mass_along(body_a.mass.inv_mass, &body_a.inv_inertia_world, ra, dir);
            }
            if k > 0.0 { 1.0 / k } else { 0.0 }
        };

        let (t1, t2) = orthonormal_basis(c.normal);
        let mut row = Row {
            a: c.a,
            b: c.b,
            ra,
            rb,
            normal: c.normal,
            tangents: [t1, t2],
            normal_mass: mass_along(c.normal),
            tangent_mass: [mass_along(t1), mass_along(t2)],
            bias: 0.0,
            friction: material.friction,
            jn: 0.0,
            jt: [0.0, 0.0],
        };

        let vn = relative_velocity(bodies, &row).dot(c.normal);
        let bounce = if vn < -config.restitution_threshold {
            -material.restitution * vn
        } else {
            0.0
        };
        let push = config.baumgarte / dt * (c.depth - config.slop).max(0.0);
        row.bias = bounce.max(push);
        rows.push(row);
    }

    for _ in 0..config.solver_iterations {
        for row in rows.iter_mut() {
            // Friction first, bounded by the current normal impulse.
            for k in 0..2 {
                let t = row.tangents[k];
                let vt = relative_velocity(bodies, row).dot(t);
                let limit = row.friction * row.jn;
                let old = row.jt[k];
                row.jt[k] = (old - vt * row.tangent_mass[k]).clamp(-limit, limit);
                let delta = row.jt[k] - old;
                apply(bodies, row, t * delta);
            }

            let vn = relative_velocity(bodies, row).dot(row.normal);
            let old = row.jn;
            row.jn = (old + (row.bias - vn) * row.normal_mass).max(0.0);
            let delta = row.jn - old;
            apply(bodies, row, row.normal * delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cgmath::Quaternion;

    use super::*;
    use crate::geometry::ConvexHull;
    use crate::rigid_body::MassProperties;

    fn cube(pos: Vector3<f32>) -> RigidBody {
        let half = Vector3::new(0.5, 0.5, 0.5);
        RigidBody::new(
            1,
            Arc::new(ConvexHull::cuboid(half)),
            MassProperties::cuboid(half, 1.0),
            pos,
            Quaternion::new(1.0, 0.0, 0.0, 0.0),
        )
    }

    fn floor_contacts(body: &RigidBody) -> Vec<Contact> {
        body.world_vertices
            .iter()
            .filter(|v| v.y < 0.0)
            .map(|&v| Contact {
                a: None,
                b: 0,
                point: v,
                normal: Vector3::new(0.0, 1.0, 0.0),
                depth: -v.y,
            })
            .collect()
    }

    #[test]
    fn basis_is_orthonormal() {
        for n in [
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.3, -0.4, 0.866).normalize(),
        ] {
            let (t1, t2) = orthonormal_basis(n);
            assert!(t1.dot(n).abs() < 1e-5 && t2.dot(n).abs() < 1e-5 && t1.dot(t2).abs() < 1e-5);
            assert!((t1.magnitude() - 1.0).abs() < 1e-5 && (t2.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn slow_landing_stops_without_bouncing() {
        let mut bodies = vec![cube(Vector3::new(0.0, 0.499, 0.0))];
        bodies[0].velocity = Vector3::new(0.0, -0.5, 0.0);
        let contacts = floor_contacts(&bodies[0]);
        assert_eq!(contacts.len(), 4);
        let config = PhysicsConfig::default();
        let room = ContactMaterial { friction: 0.6, restitution: 0.3 };
        solve_contacts(&mut bodies, &contacts, &config, room, room, 1.0 / 60.0);
        assert!(bodies[0].velocity.y.abs() < 1e-3);
        assert!(bodies[0].angular_vel.magnitude() < 1e-3);
    }

    #[test]
    fn fast_landing_bounces_with_restitution() {
        let mut bodies = vec![cube(Vector3::new(0.0, 0.499, 0.0))];
        bodies[0].velocity = Vector3::new(0.0, -10.0, 0.0);
        let contacts = floor_contacts(&bodies[0]);
        let config = PhysicsConfig::default();
        let room = ContactMaterial { friction: 0.6, restitution: 0.5 };
        solve_contacts(&mut bodies, &contacts, &config, room, room, 1.0 / 60.0);
        assert!((bodies[0].velocity.y - 5.0).abs() < 0.1);
    }

    #[test]
    fn friction_slows_sliding() {
        let mut bodies = vec![cube(Vector3::new(0.0, 0.49, 0.0))];
        bodies[0].velocity = Vector3::new(3.0, -2.0, 0.0);
        let contacts = floor_contacts(&bodies[0]);
        let config = PhysicsConfig::default();
        let room = ContactMaterial { friction: 0.6, restitution: 0.0 };
        solve_contacts(&mut bodies, &contacts, &config, room, room, 1.0 / 60.0);
        assert!(bodies[0].velocity.x < 3.0);
        assert!(bodies[0].velocity.x >= 0.0);
    }
}
