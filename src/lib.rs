//! Dicebox Engine - 3D dice rolling in WASM
//!
//! Architecture:
//! - core/        - errors, seeded randomness
//! - domain/      - die types, results, tuning bundle
//! - geometry/    - procedural solids, render meshes, collision hulls
//! - systems/     - rigid bodies, physics world, face resolver
//! - simulation/  - EngineCore orchestration and the JS facade

pub mod core;
pub mod domain;
pub mod geometry;
pub mod systems;
pub mod simulation;

// Short paths used across the crate
pub use systems::resolver;
pub use systems::rigid_body;
pub use systems::rigid_body_system;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine (panic hook and console logging)
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    // A second init keeps the first logger.
    #[cfg(target_arch = "wasm32")]
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("Dicebox WASM engine initialized");
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Tokens accepted by `rollDice`, smallest die first
#[wasm_bindgen(js_name = dieTokens)]
pub fn die_tokens() -> js_sys::Array {
    domain::DieType::ALL
        .iter()
        .map(|d| JsValue::from_str(d.token()))
        .collect()
}

// Re-export main types
pub use crate::core::EngineError;
pub use domain::{DieType, EngineConfig, RollResult};
pub use simulation::{Engine, EngineCore, PerfStats};
