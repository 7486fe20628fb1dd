use crate::rigid_body_system::Simulation;

use super::perf_stats::PerfStats;
use super::EngineCore;

pub(super) fn enable_perf_metrics<S: Simulation>(engine: &mut EngineCore<S>, enabled: bool) {
    engine.perf_enabled = enabled;
    if !enabled {
        engine.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats<S: Simulation>(engine: &EngineCore<S>) -> PerfStats {
    engine.perf_stats.clone()
}

pub(super) fn config_json<S: Simulation>(engine: &EngineCore<S>) -> String {
    engine.config.to_json()
}
