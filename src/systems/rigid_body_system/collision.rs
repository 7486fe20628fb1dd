//! Contact generation: die vs room planes, die vs die (SAT).

use cgmath::{InnerSpace, Vector3};

use crate::rigid_body::RigidBody;

use super::room::Room;

/// Vertices this close outside a face still count as inside.
const INSIDE_TOL: f32 = 1e-3;
const EDGE_AXIS_EPS: f32 = 1e-6;

/// Single contact point. `normal` points from `a` to `b`; `a` is `None`
/// for the room.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub a: Option<usize>,
    pub b: usize,
    pub point: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub depth: f32,
}

/// Every hull vertex behind a room plane is a contact.
pub(super) fn room_contacts(room: &Room, index: usize, body: &RigidBody, out: &mut Vec<Contact>) {
    for plane in &room.planes {
        for &v in &body.world_vertices {
            let depth = plane.depth(v);
            if depth > 0.0 {
                out.push(Contact {
                    a: None,
                    b: index,
                    point: v,
                    normal: plane.normal,
                    depth,
                });
            }
        }
    }
}

fn project(points: &[Vector3<f32>], axis: Vector3<f32>) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Gap between A and B along `axis` (oriented A → B); negative = overlap.
fn separation(a: &RigidBody, b: &RigidBody, axis: Vector3<f32>) -> f32 {
    let (_, a_max) = project(&a.world_vertices, axis);
    let (b_min, _) = project(&b.world_vertices, axis);
    b_min - a_max
}

/// Axis of least penetration, or `None` when a separating axis exists.
fn least_penetration_axis(a: &RigidBody, b: &RigidBody) -> Option<(Vector3<f32>, f32)> {
    let center = b.pos - a.pos;
    let mut best: Option<(Vector3<f32>, f32)> = None;

    let mut consider = |axis: Vector3<f32>| -> bool {
        let axis = if axis.dot(center) < 0.0 { -axis } else { axis };
        let sep = separation(a, b, axis);
        if sep > 0.0 {
            return false;
        }
        if best.map_or(true, |(_, s)| sep > s) {
            best = Some((axis, sep));
        }
        true
    };

    for n in &a.hull.normals {
        if !consider(a.rotate(*n)) {
            return None;
        }
    }
    for n in &b.hull.normals {
        if !consider(b.rotate(*n)) {
            return None;
        }
    }
    for ea in &a.hull.edge_dirs {
        let ea = a.rotate(*ea);
        for eb in &b.hull.edge_dirs {
            let axis = ea.cross(b.rotate(*eb));
            if axis.magnitude2() < EDGE_AXIS_EPS {
                continue;
            }
            if !consider(axis.normalize()) {
                return None;
            }
        }
    }
    best
}

fn inside(body: &RigidBody, p: Vector3<f32>) -> bool {
    body.hull.faces.iter().zip(&body.hull.normals).all(|(face, n)| {
        let n = body.rotate(*n);
        n.dot(p - body.world_vertices[face[0]]) <= INSIDE_TOL
    })
}

/// Die vs die. Vertices of either hull inside the other become contacts;
/// edge-on-edge overlaps fall back to the midpoint of the two support points.
pub(super) fn hull_contacts(ia: usize, a: &RigidBody, ib: usize, b: &RigidBody, out: &mut Vec<Contact>) -> bool {
    let reach = a.hull.radius + b.hull.radius;
    if (b.pos - a.pos).magnitude2() > reach * reach {
        return false;
    }
    let Some((normal, sep)) = least_penetration_axis(a, b) else {
        return false;
    };

    let (_, a_max) = project(&a.world_vertices, normal);
    let (b_min, _) = project(&b.world_vertices, normal);
    let before = out.len();

    for &v in &b.world_vertices {
        let depth = a_max - v.dot(normal);
        if depth > 0.0 && inside(a, v) {
            out.push(Contact { a: Some(ia), b: ib, point: v, normal, depth });
        }
    }
    for &v in &a.world_vertices {
        let depth = v.dot(normal) - b_min;
        if depth > 0.0 && inside(b, v) {
            out.push(Contact { a: Some(ia), b: ib, point: v, normal, depth });
        }
    }

    if out.len() == before {
        let pa = a.world_vertices[a.hull.support(a.to_local(normal))];
        let pb = b.world_vertices[b.hull.support(b.to_local(-normal))];
        out.push(Contact {
            a: Some(ia),
            b: ib,
            point: (pa + pb) * 0.5,
            normal,
            depth: -sep,
        });
    }
    true
}
