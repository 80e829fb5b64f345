use std::sync::OnceLock;

use wasm_bindgen::prelude::*;

use crate::audio::AudioLoader;
use crate::engine::Engine;
use crate::FingerprintConfig;

fn engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| Engine::new(FingerprintConfig::default()).expect("default config is valid"))
}

#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Registers a WAV clip (raw bytes) under `name` and returns its recording id.
#[wasm_bindgen]
pub fn register_recording_wasm(wav_bytes: &[u8], name: &str) -> Result<u32, JsValue> {
    let (audio, sample_rate) = AudioLoader::load_from_wav_bytes(wav_bytes)
        .map_err(|e| JsValue::from_str(&format!("decode error: {}", e)))?;
    engine()
        .register(&audio, sample_rate, name, &[])
        .map(|id| id.0)
        .map_err(|e| JsValue::from_str(&format!("register error: {}", e)))
}

/// Identifies a WAV clip against the registered corpus, returning the
/// `MatchResult` serialized via `serde-wasm-bindgen`, or `undefined` on no
/// match.
#[wasm_bindgen]
pub fn identify_recording_wasm(wav_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let (audio, sample_rate) = AudioLoader::load_from_wav_bytes(wav_bytes)
        .map_err(|e| JsValue::from_str(&format!("decode error: {}", e)))?;

    let result = engine()
        .identify(&audio, sample_rate)
        .map_err(|e| JsValue::from_str(&format!("identify error: {}", e)))?;

    match result {
        Some(m) => serde_wasm_bindgen::to_value(&m)
            .map_err(|e| JsValue::from_str(&format!("serialization error: {}", e))),
        None => Ok(JsValue::UNDEFINED),
    }
}

#[wasm_bindgen]
pub fn clear_index_wasm() {
    engine().clear();
}
