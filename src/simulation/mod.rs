//! Engine - the dice tray driven by a host render loop
//!
//! EngineCore only orchestrates:
//! - geometry comes from the DieFactory (memoized per die type)
//! - bodies live in a Simulation (PhysicsWorld unless a test swaps it)
//! - the RollSession spawns, watches settle and reports results
//!
//! The host calls `step` once per frame with elapsed seconds; nothing here
//! owns a clock or a timer.

use std::sync::Arc;

use crate::core::{EngineError, RollRng};
use crate::domain::{DieType, EngineConfig, RollResult};
use crate::geometry::{BuiltDie, DieFactory};
use crate::rigid_body_system::{PhysicsWorld, Room, Simulation};

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "session/session.rs"]
mod session;
#[path = "render/render_extract.rs"]
mod render_extract;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::{DieMeshData, Engine};
pub use perf_stats::PerfStats;
pub use render_extract::INSTANCE_STRIDE;
pub use session::{DieInstance, RollSession, SettleCallback};

use perf_timer::PerfTimer;

/// The dice engine, generic over its physics backend
pub struct EngineCore<S: Simulation = PhysicsWorld> {
    config: EngineConfig,
    factory: DieFactory,
    sim: S,
    session: RollSession,
    rng: RollRng,
    disposed: bool,

    // Render transfer buffer (see render_extract.rs)
    instance_buffer: Vec<f32>,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl EngineCore<PhysicsWorld> {
    /// Engine with default tuning for a `width` x `height` render target
    pub fn new(width: u32, height: u32) -> Self {
        init::create_engine_core(width, height, EngineConfig::default())
    }

    pub fn with_config(width: u32, height: u32, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(init::create_engine_core(width, height, config))
    }

    pub fn from_config_json(width: u32, height: u32, json: &str) -> Result<Self, EngineError> {
        Self::with_config(width, height, EngineConfig::from_json(json)?)
    }
}

impl<S: Simulation> EngineCore<S> {
    /// Engine over a caller-provided backend (tests use a stub). Spawning
    /// uses the backend's room.
    pub fn with_simulation(sim: S, config: EngineConfig) -> Self {
        init::create_engine_core_with(sim, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn room(&self) -> &Room {
        self.sim.room()
    }

    pub fn simulation(&self) -> &S {
        &self.sim
    }

    pub fn is_rolling(&self) -> bool {
        self.session.is_rolling()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn instances(&self) -> &[DieInstance] {
        self.session.instances()
    }

    /// Shared geometry for a die type (built on first use)
    pub fn die(&mut self, die_type: DieType) -> Arc<BuiltDie> {
        self.factory.build_die(die_type)
    }

    /// Start a roll. Any roll in flight is cancelled first and its callback
    /// is dropped. An empty tray does nothing at all. Returns whether a roll
    /// started.
    pub fn roll_dice<F>(&mut self, tray: &[DieType], on_settle: F) -> bool
    where
        F: FnOnce(Vec<RollResult>) + 'static,
    {
        if self.disposed {
            log::warn!("roll_dice on a disposed engine ignored");
            return false;
        }
        if tray.is_empty() {
            log::debug!("roll_dice with an empty tray ignored");
            return false;
        }
        let room = self.sim.room().clone();
        self.session.start(
            &mut self.sim,
            &mut self.factory,
            &mut self.rng,
            &room,
            &self.config.spawn,
            tray,
            Box::new(on_settle),
        )
    }

    /// Parse tokens first; an unknown token fails before any roll state changes.
    pub fn roll_tokens<T, F>(&mut self, tokens: &[T], on_settle: F) -> Result<bool, EngineError>
    where
        T: AsRef<str>,
        F: FnOnce(Vec<RollResult>) + 'static,
    {
        let tray = DieType::parse_tray(tokens)?;
        Ok(self.roll_dice(&tray, on_settle))
    }

    /// Advance physics and the settle clock by `real_dt` seconds of host time.
    pub fn step(&mut self, real_dt: f32) {
        if self.disposed {
            return;
        }
        let timer = self.perf_enabled.then(PerfTimer::start);

        let physics_timer = self.perf_enabled.then(PerfTimer::start);
        let stats = self.sim.step(real_dt);
        let physics_ms = physics_timer.map_or(0.0, |t| t.elapsed_ms());

        let settle_timer = self.perf_enabled.then(PerfTimer::start);
        let settled = self.session.advance(&self.sim, real_dt, &self.config.settle);
        let settle_ms = settle_timer.map_or(0.0, |t| t.elapsed_ms());

        if let Some((callback, results)) = settled {
            callback(results);
        }

        if let Some(timer) = timer {
            self.perf_stats.reset();
            self.perf_stats.step_ms = timer.elapsed_ms();
            self.perf_stats.physics_ms = physics_ms;
            self.perf_stats.settle_ms = settle_ms;
            self.perf_stats.substeps = stats.substeps;
            self.perf_stats.contacts = stats.contacts;
            self.perf_stats.bodies = self.sim.body_count() as u32;
            self.perf_stats.settle_checks = self.session.checks();
        }
    }

    /// Remove every die and drop any pending callback. Safe to call twice.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.session.cancel(&mut self.sim);
        self.instance_buffer.clear();
        self.disposed = true;
        log::info!("engine disposed");
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Get last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    pub fn config_json(&self) -> String {
        settings::config_json(self)
    }

    /// Write one record per die into the transfer buffer; returns the count.
    pub fn extract_instances(&mut self) -> usize {
        render_extract::extract_instances(self)
    }

    /// Pointer to the transfer buffer (for JS rendering)
    pub fn instances_ptr(&self) -> *const f32 {
        render_extract::instances_ptr(self)
    }

    pub fn instance_buffer(&self) -> &[f32] {
        &self.instance_buffer
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
