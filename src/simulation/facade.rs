use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::domain::{DieType, RollResult};

use super::perf_stats::PerfStats;
use super::render_extract::INSTANCE_STRIDE;
use super::EngineCore;

/// Render data for one die type, copied out for the host's GPU buffers.
#[wasm_bindgen]
pub struct DieMeshData {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
    face_ids: Vec<u32>,
    atlas_cols: u32,
    atlas_rows: u32,
    labels_json: String,
}

#[wasm_bindgen]
impl DieMeshData {
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> Vec<f32> { self.positions.clone() }
    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> Vec<f32> { self.normals.clone() }
    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> Vec<f32> { self.uvs.clone() }
    /// Logical face per triangle
    #[wasm_bindgen(getter)]
    pub fn face_ids(&self) -> Vec<u32> { self.face_ids.clone() }
    #[wasm_bindgen(getter)]
    pub fn atlas_cols(&self) -> u32 { self.atlas_cols }
    #[wasm_bindgen(getter)]
    pub fn atlas_rows(&self) -> u32 { self.atlas_rows }
    /// `[{"value": n} | {"corners": [a, b, c]}, ...]` in face order
    #[wasm_bindgen(getter)]
    pub fn labels_json(&self) -> String { self.labels_json.clone() }
}

#[wasm_bindgen]
pub struct Engine {
    core: EngineCore,
    /// Bumped by every started roll and by `dispose`; a queued `onSettle`
    /// only runs if it still matches.
    roll_generation: Rc<Cell<u64>>,
}

#[wasm_bindgen]
impl Engine {
    /// Create an engine for a render target of the given size
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            core: EngineCore::new(width, height),
            roll_generation: Rc::new(Cell::new(0)),
        }
    }

    /// Create an engine from a JSON tuning bundle (missing keys use defaults)
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(width: u32, height: u32, json: &str) -> Result<Engine, JsValue> {
        let core = EngineCore::from_config_json(width, height, json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            core,
            roll_generation: Rc::new(Cell::new(0)),
        })
    }

    /// Start a roll. Throws on an unknown token without touching the roll in
    /// flight; `onSettle` receives `[{type, value}, ...]` in tray order.
    #[wasm_bindgen(js_name = rollDice)]
    pub fn roll_dice(&mut self, tokens: js_sys::Array, on_settle: js_sys::Function) -> Result<(), JsValue> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_string().unwrap_or_default()).collect();
        let generation = self.roll_generation.get().wrapping_add(1);
        let current = Rc::clone(&self.roll_generation);
        let started = self
            .core
            .roll_tokens(&tokens, move |results| deliver(on_settle, &results, current, generation))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if started {
            self.roll_generation.set(generation);
        }
        Ok(())
    }

    /// Advance by `dt` seconds of host time (call once per animation frame)
    pub fn step(&mut self, dt: f32) {
        self.core.step(dt);
    }

    pub fn dispose(&mut self) {
        self.roll_generation.set(self.roll_generation.get().wrapping_add(1));
        self.core.dispose();
    }

    #[wasm_bindgen(getter, js_name = isRolling)]
    pub fn is_rolling(&self) -> bool { self.core.is_rolling() }

    #[wasm_bindgen(getter, js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool { self.core.is_disposed() }

    #[wasm_bindgen(js_name = dieMesh)]
    pub fn die_mesh(&mut self, token: &str) -> Result<DieMeshData, JsValue> {
        let die_type = token.parse::<DieType>().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let die = self.core.die(die_type);
        Ok(DieMeshData {
            positions: die.mesh.flat_positions(),
            normals: die.mesh.flat_normals(),
            uvs: die.mesh.flat_uvs(),
            face_ids: die.mesh.triangle_faces.clone(),
            atlas_cols: die.mesh.atlas.0,
            atlas_rows: die.mesh.atlas.1,
            labels_json: die.labels_json(),
        })
    }

    /// Fill the instance buffer; returns the number of dice written
    #[wasm_bindgen(js_name = extractInstances)]
    pub fn extract_instances(&mut self) -> u32 {
        self.core.extract_instances() as u32
    }

    /// Get pointer to the instance buffer (valid until the next extract)
    #[wasm_bindgen(js_name = instancesPtr)]
    pub fn instances_ptr(&self) -> u32 {
        self.core.instances_ptr() as usize as u32
    }

    #[wasm_bindgen(js_name = instanceStride)]
    pub fn instance_stride(&self) -> u32 {
        INSTANCE_STRIDE as u32
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    #[wasm_bindgen(js_name = enablePerfMetrics)]
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last step perf snapshot (zeros when perf disabled)
    #[wasm_bindgen(js_name = getPerfStats)]
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }

    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> String {
        self.core.config_json()
    }
}

#[wasm_bindgen]
extern "C" {
    /// Global `queueMicrotask` (pages, workers and Node alike)
    #[wasm_bindgen(js_name = queueMicrotask)]
    fn queue_microtask(task: &js_sys::Function);
}

/// Queue `callback(results)` as a microtask so it can call back into the
/// engine (e.g. start the next roll) after `step` has returned. A roll or
/// `dispose` before the microtask runs cancels the delivery.
fn deliver(callback: js_sys::Function, results: &[RollResult], current: Rc<Cell<u64>>, generation: u64) {
    let json = serde_json::to_string(results).unwrap_or_else(|_| "[]".to_string());
    let payload = js_sys::JSON::parse(&json).unwrap_or_else(|_| js_sys::Array::new().into());

    let task = Closure::once_into_js(move || {
        if current.get() != generation {
            log::debug!("onSettle of a superseded roll dropped");
            return;
        }
        if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
            log::error!("onSettle threw: {:?}", err);
        }
    });
    queue_microtask(task.unchecked_ref());
}
