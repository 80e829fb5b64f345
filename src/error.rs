use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// Each variant is fatal to the call that raised it, never to the process,
/// and none are swallowed internally, callers always see them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Construction-time configuration violates a precondition (bad sample
    /// rate, non-positive FFT size, unknown window type, `fmax` above
    /// Nyquist, ...).
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The PCM signal handed to the extractor is empty or shorter than one
    /// analysis frame.
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    /// Extraction succeeded structurally but produced zero fingerprint
    /// tokens (silence, pure tones, or a clip too short to pair any peaks).
    #[error("no fingerprints could be extracted from this audio")]
    EmptyFingerprint,

    /// `add_fingerprints` referenced a `recording_id` that isn't present in
    /// the index.
    #[error("unknown recording id {0}")]
    UnknownRecording(u32),

    /// A recording registration collided with an existing `(name, artists)`
    /// pair under a caller policy that treats that as fatal rather than
    /// idempotent (the default `Engine` policy returns the existing id
    /// instead of raising this).
    #[error("recording already registered")]
    Conflict,

    /// A durable index backend failed after its retry budget was spent.
    #[error("index I/O failed: {0}")]
    IndexIo(String),

    /// Audio decoding (e.g. malformed WAV) failed at the boundary.
    #[error("failed to decode audio: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
