//! RollSession - one roll from spawn to settle.

use std::sync::Arc;

use cgmath::{InnerSpace, Quaternion, Vector3};

use crate::core::RollRng;
use crate::domain::config::{SettleConfig, SpawnConfig};
use crate::domain::{DieType, RollResult};
use crate::geometry::{BuiltDie, DieFactory};
use crate::resolver::resolve;
use crate::rigid_body_system::{BodyDesc, BodyHandle, Room, Simulation};

/// Receives the results of a roll, in tray order, exactly once.
pub type SettleCallback = Box<dyn FnOnce(Vec<RollResult>)>;

/// Spawned dice keep this clearance from the ceiling and the walls.
const SPAWN_MARGIN: f32 = 0.1;

/// One die of the current roll.
pub struct DieInstance {
    pub die: Arc<BuiltDie>,
    pub handle: BodyHandle,
    /// Per-roll appearance variation for the host renderer.
    pub color_seed: u8,
}

struct PendingSettle {
    callback: SettleCallback,
    clock_ms: f32,
    checks: u32,
}

/// Owns the dice of the latest roll and its pending callback.
///
/// Dice stay in the world after settling so the host keeps drawing them;
/// the next roll or `cancel` removes them.
#[derive(Default)]
pub struct RollSession {
    instances: Vec<DieInstance>,
    pending: Option<PendingSettle>,
    last_checks: u32,
}

impl RollSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[DieInstance] {
        &self.instances
    }

    pub fn is_rolling(&self) -> bool {
        self.pending.is_some()
    }

    /// Settle checks run so far by the current (or last) roll.
    pub fn checks(&self) -> u32 {
        self.pending.as_ref().map_or(self.last_checks, |p| p.checks)
    }

    /// Remove the current dice and drop any pending callback uncalled.
    pub fn cancel<S: Simulation>(&mut self, sim: &mut S) {
        if self.pending.take().is_some() {
            log::info!("roll of {} dice cancelled before settling", self.instances.len());
        }
        for inst in self.instances.drain(..) {
            sim.remove_body(inst.handle);
        }
        self.last_checks = 0;
    }

    /// Replace the current roll with a fresh one. Returns `false` (and leaves
    /// everything untouched) for an empty tray.
    #[allow(clippy::too_many_arguments)]
    pub fn start<S: Simulation>(
        &mut self,
        sim: &mut S,
        factory: &mut DieFactory,
        rng: &mut RollRng,
        room: &Room,
        spawn: &SpawnConfig,
        tray: &[DieType],
        callback: SettleCallback,
    ) -> bool {
        if tray.is_empty() {
            return false;
        }
        self.cancel(sim);

        let dice: Vec<Arc<BuiltDie>> = tray.iter().map(|&d| factory.build_die(d)).collect();
        let radii: Vec<f32> = dice.iter().map(|d| d.shape.bounding_radius()).collect();
        let points = spawn_points(&radii, rng, room, spawn);

        for (die, position) in dice.into_iter().zip(points) {
            let desc = spawn_desc(&die, position, rng, spawn);
            let handle = sim.add_body(desc);
            self.instances.push(DieInstance {
                die,
                handle,
                color_seed: rng.byte(),
            });
        }
        self.pending = Some(PendingSettle {
            callback,
            clock_ms: 0.0,
            checks: 0,
        });
        log::info!("roll started: {:?}", tray);
        true
    }

    /// Advance the settle clock by host time. At most one check runs per
    /// call; once the roll settles (or is forced to) the callback and the
    /// ordered results are handed back for the caller to invoke.
    pub fn advance<S: Simulation>(
        &mut self,
        sim: &S,
        real_dt: f32,
        settle: &SettleConfig,
    ) -> Option<(SettleCallback, Vec<RollResult>)> {
        let pending = self.pending.as_mut()?;
        if real_dt.is_finite() && real_dt > 0.0 {
            pending.clock_ms += real_dt * 1000.0;
        }
        if pending.clock_ms < settle.interval_ms {
            return None;
        }
        pending.clock_ms = (pending.clock_ms - settle.interval_ms).min(settle.interval_ms);
        pending.checks += 1;

        let at_rest = self.instances.iter().all(|inst| {
            sim.body_state(inst.handle).map_or(true, |s| {
                s.velocity.magnitude2() < settle.linear_threshold
                    && s.angular_velocity.magnitude2() < settle.angular_threshold
            })
        });
        let forced = pending.checks > settle.max_checks;
        if !at_rest && !forced {
            return None;
        }
        if forced && !at_rest {
            log::info!("roll forced to settle after {} checks", pending.checks);
        }

        let pending = self.pending.take()?;
        self.last_checks = pending.checks;
        let results = self.results(sim);
        log::info!("roll settled: {:?}", results);
        Some((pending.callback, results))
    }

    /// Current value of every die, in tray order.
    pub fn results<S: Simulation>(&self, sim: &S) -> Vec<RollResult> {
        self.instances
            .iter()
            .map(|inst| {
                let orientation = sim
                    .body_state(inst.handle)
                    .map_or(Quaternion::new(1.0, 0.0, 0.0, 0.0), |s| s.orientation);
                RollResult {
                    die_type: inst.die.die_type,
                    value: resolve(orientation, &inst.die),
                }
            })
            .collect()
    }
}

/// Drop points for a whole tray, in tray order.
///
/// Dice stack upward from `drop_height`, at least one die diameter apart.
/// Once a column reaches the ceiling the next die starts a new column; columns
/// sit far enough apart that jittered neighbours cannot touch.
fn spawn_points(radii: &[f32], rng: &mut RollRng, room: &Room, spawn: &SpawnConfig) -> Vec<Vector3<f32>> {
    let r = radii.iter().copied().fold(0.0, f32::max) + SPAWN_MARGIN;
    let top = (room.height - r).max(r);
    let base = spawn.drop_height.clamp(r, top);
    let rise = spawn.stagger.max(2.0 * r);
    let per_column = ((top - base) / rise).floor() as usize + 1;
    let columns = radii.len().div_ceil(per_column);

    let x_room = (room.half_width - r).max(0.0);
    let z_room = (room.half_depth - r).max(0.0);
    let (cells, jitter) = column_cells(columns, x_room, z_room, 2.0 * r, spawn.jitter);

    (0..radii.len())
        .map(|i| {
            let (cx, cz) = cells[(i / per_column) % cells.len()];
            let y = base + (i % per_column) as f32 * rise;
            let x = (cx + rng.symmetric(jitter)).clamp(-x_room, x_room);
            let z = (cz + rng.symmetric(jitter)).clamp(-z_room, z_room);
            Vector3::new(x, y, z)
        })
        .collect()
}

/// Column centers for `count` columns and the jitter they leave room for.
/// Jitter is given up before columns are.
fn column_cells(count: usize, x_room: f32, z_room: f32, diameter: f32, jitter: f32) -> (Vec<(f32, f32)>, f32) {
    if count <= 1 {
        return (vec![(0.0, 0.0)], jitter);
    }
    for j in [jitter, 0.0] {
        let cells = grid_cells(x_room, z_room, diameter + 2.0 * j);
        if cells.len() >= count {
            return (cells, j);
        }
    }
    let cells = grid_cells(x_room, z_room, diameter);
    log::warn!("tray needs {} spawn columns, room fits {}; dice may start touching", count, cells.len());
    (cells, 0.0)
}

/// Square grid of column centers, nearest to the room center first.
fn grid_cells(x_room: f32, z_room: f32, spacing: f32) -> Vec<(f32, f32)> {
    let nx = (2.0 * x_room / spacing).floor() as usize + 1;
    let nz = (2.0 * z_room / spacing).floor() as usize + 1;
    let mut cells = Vec::with_capacity(nx * nz);
    for ix in 0..nx {
        for iz in 0..nz {
            cells.push((
                (ix as f32 - (nx - 1) as f32 / 2.0) * spacing,
                (iz as f32 - (nz - 1) as f32 / 2.0) * spacing,
            ));
        }
    }
    cells.sort_by(|a, b| (a.0 * a.0 + a.1 * a.1).total_cmp(&(b.0 * b.0 + b.1 * b.1)));
    cells
}

/// Orientation and throw for a die dropped at `position`.
fn spawn_desc(die: &BuiltDie, position: Vector3<f32>, rng: &mut RollRng, spawn: &SpawnConfig) -> BodyDesc {
    let orientation = rng.orientation();
    let throw = rng.horizontal_direction() * rng.range(spawn.speed_min, spawn.speed_max);
    let velocity = throw - Vector3::new(0.0, spawn.down_bias, 0.0);
    let angular_velocity = Vector3::new(
        rng.symmetric(spawn.angular_range),
        rng.symmetric(spawn.angular_range),
        rng.symmetric(spawn.angular_range),
    );

    BodyDesc {
        shape: Arc::clone(&die.shape),
        mass: die.mass,
        position,
        orientation,
        velocity,
        angular_velocity,
    }
}
