pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod fingerprint;
pub mod framer;
pub mod index;
pub mod matcher;
pub mod melbank;
pub mod models;
pub mod peaks;
pub mod stft;

#[cfg(feature = "jni")]
pub mod jni;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use audio::AudioLoader;
pub use config::{FingerprintConfig, WindowType};
pub use engine::Engine;
pub use error::{Error, Result};
pub use models::{FingerprintToken, Hash80, MatchResult, Recording, RecordingId};
