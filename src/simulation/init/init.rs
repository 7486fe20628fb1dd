use crate::core::RollRng;
use crate::domain::EngineConfig;
use crate::geometry::DieFactory;
use crate::rigid_body_system::{PhysicsWorld, Simulation};

use super::perf_stats::PerfStats;
use super::session::RollSession;
use super::render_extract::INSTANCE_STRIDE;
use super::EngineCore;

/// Typical tray size; the buffer grows past it on demand.
const INITIAL_INSTANCE_CAPACITY: usize = 8;

pub(super) fn create_engine_core(width: u32, height: u32, config: EngineConfig) -> EngineCore<PhysicsWorld> {
    let sim = PhysicsWorld::new(
        width,
        height,
        config.physics.clone(),
        config.materials.clone(),
        &config.room,
    );
    create_engine_core_with(sim, config)
}

pub(super) fn create_engine_core_with<S: Simulation>(sim: S, config: EngineConfig) -> EngineCore<S> {
    let rng = match config.seed {
        Some(seed) => RollRng::from_seed(seed),
        None => RollRng::from_entropy_source(),
    };
    let room = sim.room();
    log::info!(
        "dice engine created: room {:.1} x {:.1} x {:.1}",
        room.half_width * 2.0,
        room.height,
        room.half_depth * 2.0
    );

    EngineCore {
        factory: DieFactory::new(config.dice.scale, config.dice.density),
        sim,
        session: RollSession::new(),
        rng,
        disposed: false,
        instance_buffer: Vec::with_capacity(INITIAL_INSTANCE_CAPACITY * INSTANCE_STRIDE),
        perf_enabled: false,
        perf_stats: PerfStats::default(),
        config,
    }
}
