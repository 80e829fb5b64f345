use serde::{Deserialize, Serialize};
use std::fmt;

/// A frame index, counted from the start of a track. Frame `m` has
/// absolute sample offset `m * hop_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Frame(pub u32);

impl Frame {
    pub fn as_seconds(self, sample_rate: u32, hop_size: usize) -> f64 {
        (self.0 as f64 * hop_size as f64) / sample_rate as f64
    }
}

/// A mel-band index in `[0, n_mels)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MelBand(pub u16);

/// A time-frequency landmark surviving the peak picker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub time: Frame,
    pub band: MelBand,
    pub amplitude_db: f32,
}

/// Fixed-width 80-bit hash: the first 20 hex characters of a SHA-1 digest,
/// preserved for bitwise corpus compatibility. Stored as raw bytes rather
/// than a `String` so it stays cheaply `Copy`, hashable, and ordered.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash80([u8; 10]);

impl Hash80 {
    pub(crate) fn from_digest_prefix(digest: &[u8; 20]) -> Self {
        let mut bytes = [0u8; 10];
        bytes.copy_from_slice(&digest[..10]);
        Hash80(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 10] {
        &self.0
    }
}

impl fmt::Display for Hash80 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hash80 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash80({})", self)
    }
}

impl Serialize for Hash80 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash80 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() != 20 {
            return Err(serde::de::Error::custom("hash must be 20 hex characters"));
        }
        let mut bytes = [0u8; 10];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex = std::str::from_utf8(chunk).map_err(serde::de::Error::custom)?;
            bytes[i] = u8::from_str_radix(hex, 16).map_err(serde::de::Error::custom)?;
        }
        Ok(Hash80(bytes))
    }
}

/// A `(hash, anchor_time)` token emitted by the fingerprinter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerprintToken {
    pub hash: Hash80,
    pub anchor_time: Frame,
}

/// Identifies a registered recording. Auto-assigned, non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordingId(pub u32);

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for a registered recording. Names and artists are opaque to the
/// matcher, participating in no matching logic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: RecordingId,
    pub name: String,
    pub artists: Vec<String>,
}

/// An entry `(recording_id, anchor_time)` stored under a hash in the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Posting {
    pub recording_id: RecordingId,
    pub anchor_time: Frame,
}

/// The result of a successful `identify` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub recording_id: RecordingId,
    pub score: usize,
    /// Frames elapsed between the recording's anchor time and the query's
    /// anchor time at the winning offset (the mode of the histogram).
    pub offset_frames: i64,
}
