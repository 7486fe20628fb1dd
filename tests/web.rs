#![cfg(target_arch = "wasm32")]

use dicebox_engine::{die_tokens, version, Engine};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

/// Settles on the second `step`: every step is a check and the second is forced.
const QUICK_SETTLE: &str = r#"{"seed": 1, "settle": {"interval_ms": 1.0, "max_checks": 1}}"#;

/// JS callback that bumps `globalThis[name]` once per call.
fn counter(name: &str) -> js_sys::Function {
    js_sys::Function::new_with_args(
        "results",
        &format!("globalThis.{name} = (globalThis.{name} || 0) + 1;"),
    )
}

fn count(name: &str) -> u32 {
    js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as u32
}

/// Let every microtask queued so far run.
async fn drain_microtasks() {
    JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL)).await.unwrap();
}

fn tray(tokens: &[&str]) -> js_sys::Array {
    tokens.iter().map(|t| JsValue::from_str(t)).collect()
}

#[wasm_bindgen_test]
fn exposes_version_and_tokens() {
    assert!(!version().is_empty());
    let tokens = die_tokens();
    assert_eq!(tokens.length(), 6);
    assert_eq!(tokens.get(0).as_string().as_deref(), Some("d4"));
}

#[wasm_bindgen_test]
fn unknown_token_throws() {
    let mut engine = Engine::new(800, 600);
    let tray = js_sys::Array::of2(&JsValue::from_str("d6"), &JsValue::from_str("d3"));
    let cb = js_sys::Function::new_no_args("");
    assert!(engine.roll_dice(tray, cb).is_err());
    assert!(!engine.is_rolling());
}

#[wasm_bindgen_test]
fn mesh_data_matches_the_atlas() {
    let mut engine = Engine::new(800, 600);
    let mesh = engine.die_mesh("d20").unwrap();
    assert_eq!(mesh.atlas_cols(), 5);
    assert_eq!(mesh.atlas_rows(), 4);
    assert_eq!(mesh.face_ids().len(), 20);
    assert_eq!(mesh.positions().len(), mesh.normals().len());
}

#[wasm_bindgen_test]
fn instances_are_written_per_die() {
    let mut engine = Engine::new(800, 600);
    let tray = js_sys::Array::of2(&JsValue::from_str("d8"), &JsValue::from_str("d12"));
    engine.roll_dice(tray, js_sys::Function::new_no_args("")).unwrap();
    engine.step(1.0 / 60.0);
    assert_eq!(engine.extract_instances(), 2);
    assert_ne!(engine.instances_ptr(), 0);
    engine.dispose();
    engine.dispose();
    assert!(engine.is_disposed());
}

#[wasm_bindgen_test]
async fn settled_roll_is_delivered_after_step() {
    let mut engine = Engine::with_config(800, 600, QUICK_SETTLE).unwrap();
    engine.roll_dice(tray(&["d6"]), counter("deliveredOnce")).unwrap();
    engine.step(0.016);
    engine.step(0.016);
    assert!(!engine.is_rolling());
    assert_eq!(count("deliveredOnce"), 0);

    drain_microtasks().await;
    assert_eq!(count("deliveredOnce"), 1);
}

#[wasm_bindgen_test]
async fn roll_in_the_same_task_drops_the_queued_callback() {
    let mut engine = Engine::with_config(800, 600, QUICK_SETTLE).unwrap();
    engine.roll_dice(tray(&["d6", "d20"]), counter("firstRoll")).unwrap();
    engine.step(0.016);
    engine.step(0.016);
    assert!(!engine.is_rolling());
    engine.roll_dice(tray(&["d8"]), counter("secondRoll")).unwrap();

    drain_microtasks().await;
    assert_eq!(count("firstRoll"), 0);

    engine.step(0.016);
    engine.step(0.016);
    drain_microtasks().await;
    assert_eq!(count("secondRoll"), 1);
}

#[wasm_bindgen_test]
async fn empty_or_bad_tray_keeps_the_queued_callback() {
    let mut engine = Engine::with_config(800, 600, QUICK_SETTLE).unwrap();
    engine.roll_dice(tray(&["d12"]), counter("keptRoll")).unwrap();
    engine.step(0.016);
    engine.step(0.016);
    engine.roll_dice(tray(&[]), counter("emptyRoll")).unwrap();
    assert!(engine.roll_dice(tray(&["d9"]), counter("badRoll")).is_err());

    drain_microtasks().await;
    assert_eq!(count("keptRoll"), 1);
    assert_eq!(count("emptyRoll"), 0);
}

#[wasm_bindgen_test]
async fn dispose_drops_the_queued_callback() {
    let mut engine = Engine::with_config(800, 600, QUICK_SETTLE).unwrap();
    engine.roll_dice(tray(&["d4"]), counter("disposedRoll")).unwrap();
    engine.step(0.016);
    engine.step(0.016);
    engine.dispose();

    drain_microtasks().await;
    assert_eq!(count("disposedRoll"), 0);
}
