use std::sync::OnceLock;

use jni::objects::{JByteArray, JClass, JString};
use jni::sys::{jbyteArray, jstring};
use jni::JNIEnv;

use crate::audio::AudioLoader;
use crate::engine::Engine;
use crate::FingerprintConfig;

/// Process-wide engine backing the JNI surface. The Android embedding calls
/// these functions from a single fingerprinting service instance, so one
/// shared `Engine` (its own internals are already lock-guarded) is
/// sufficient, with no extra locking needed at the JNI boundary itself.
fn engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| Engine::new(FingerprintConfig::default()).expect("default config is valid"))
}

#[no_mangle]
pub extern "system" fn Java_com_alakazam_backend_1spring_fingerprinter_Fingerprinter_loadAudioFromWav(
    mut env: JNIEnv,
    _class: JClass,
    file_path: JString,
) -> jstring {
    let file_path_str: String = match env.get_string(&file_path) {
        Ok(java_str) => java_str.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    let (audio_data, sample_rate) = match AudioLoader::load_from_wav(&file_path_str) {
        Ok(data) => data,
        Err(e) => {
            log::error!("failed to load audio from {}: {}", file_path_str, e);
            return std::ptr::null_mut();
        }
    };

    let json = serde_json::json!({
        "sample_rate": sample_rate,
        "sample_count": audio_data.len(),
        "duration_seconds": audio_data.len() as f32 / sample_rate as f32,
    });

    match env.new_string(json.to_string()) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Registers a WAV clip as a recording and returns `{"recording_id": N}` as
/// JSON, or a `{"error": "..."}` object on failure.
#[no_mangle]
pub extern "system" fn Java_com_alakazam_backend_1spring_fingerprinter_Fingerprinter_registerRecording(
    mut env: JNIEnv,
    _class: JClass,
    wav_bytes: jbyteArray,
    name: JString,
) -> jstring {
    let result = register_impl(&mut env, wav_bytes, name);
    let json = match result {
        Ok(id) => serde_json::json!({ "recording_id": id }),
        Err(e) => serde_json::json!({ "error": e }),
    };
    match env.new_string(json.to_string()) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn register_impl(env: &mut JNIEnv, wav_bytes: jbyteArray, name: JString) -> Result<u32, String> {
    let java_bytes = unsafe { JByteArray::from_raw(wav_bytes) };
    let bytes = env
        .convert_byte_array(java_bytes)
        .map_err(|e| format!("byte array conversion failed: {:?}", e))?;
    let name: String = env
        .get_string(&name)
        .map_err(|e| format!("name conversion failed: {:?}", e))?
        .into();

    let (audio, sample_rate) =
        AudioLoader::load_from_wav_bytes(&bytes).map_err(|e| e.to_string())?;
    let id = engine()
        .register(&audio, sample_rate, &name, &[])
        .map_err(|e| e.to_string())?;
    Ok(id.0)
}

/// Identifies a WAV clip against the registered corpus. Returns
/// `{"recording_id": N, "score": S, "offset_frames": O}` on a match,
/// `{"recording_id": null}` on no match, or `{"error": "..."}` on failure.
#[no_mangle]
pub extern "system" fn Java_com_alakazam_backend_1spring_fingerprinter_Fingerprinter_identifyRecording(
    mut env: JNIEnv,
    _class: JClass,
    wav_bytes: jbyteArray,
) -> jstring {
    let java_bytes = unsafe { JByteArray::from_raw(wav_bytes) };
    let json = match env.convert_byte_array(java_bytes) {
        Ok(bytes) => match AudioLoader::load_from_wav_bytes(&bytes) {
            Ok((audio, sample_rate)) => match engine().identify(&audio, sample_rate) {
                Ok(Some(m)) => serde_json::json!({
                    "recording_id": m.recording_id.0,
                    "score": m.score,
                    "offset_frames": m.offset_frames,
                }),
                Ok(None) => serde_json::json!({ "recording_id": null }),
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            },
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        },
        Err(e) => serde_json::json!({ "error": format!("{:?}", e) }),
    };

    match env.new_string(json.to_string()) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_alakazam_backend_1spring_fingerprinter_Fingerprinter_clearIndex(
    _env: JNIEnv,
    _class: JClass,
) {
    engine().clear();
}

#[no_mangle]
pub extern "system" fn Java_com_alakazam_backend_1spring_fingerprinter_Fingerprinter_testFunc(
    env: JNIEnv,
    _class: JClass,
) -> jstring {
    match env.new_string("success") {
        Ok(jstr) => jstr.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}
