use crate::rigid_body_system::Simulation;

use super::EngineCore;

/// f32s per die record: `[die_index, color_seed, px, py, pz, qx, qy, qz, qw]`.
pub const INSTANCE_STRIDE: usize = 9;

pub(super) fn extract_instances<S: Simulation>(engine: &mut EngineCore<S>) -> usize {
    engine.instance_buffer.clear();

    for inst in engine.session.instances() {
        let Some(state) = engine.sim.body_state(inst.handle) else {
            continue;
        };
        let p = state.position;
        let q = state.orientation;
        engine.instance_buffer.extend_from_slice(&[
            inst.die.die_type.index() as f32,
            inst.color_seed as f32,
            p.x,
            p.y,
            p.z,
            q.v.x,
            q.v.y,
            q.v.z,
            q.s,
        ]);
    }

    engine.instance_buffer.len() / INSTANCE_STRIDE
}

pub(super) fn instances_ptr<S: Simulation>(engine: &EngineCore<S>) -> *const f32 {
    engine.instance_buffer.as_ptr()
}
