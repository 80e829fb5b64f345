use crate::config::FingerprintConfig;
use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::index::FingerprintIndex;
use crate::matcher::Matcher;
use crate::models::{MatchResult, RecordingId};

/// Top-level driver combining extraction, storage, and matching behind
/// three operations: `register`, `identify`, `clear`.
pub struct Engine {
    extractor: Extractor,
    index: FingerprintIndex,
    matcher: Matcher,
}

impl Engine {
    pub fn new(config: FingerprintConfig) -> Result<Self> {
        config.validate()?;
        Ok(Engine {
            matcher: Matcher::new(&config),
            extractor: Extractor::new(config)?,
            index: FingerprintIndex::new(),
        })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(FingerprintConfig::default())
    }

    pub fn config(&self) -> &FingerprintConfig {
        self.extractor.config()
    }

    /// Extracts and stores fingerprints for a recording. `name`/`artists`
    /// are opaque metadata. If extraction produces zero tokens the newly
    /// added recording is rolled back and `Error::EmptyFingerprint` is
    /// returned rather than leaving an unmatched, fingerprint-less entry
    /// in the index.
    pub fn register(
        &self,
        audio: &[f32],
        sample_rate: u32,
        name: &str,
        artists: &[String],
    ) -> Result<RecordingId> {
        let tokens = self.extractor.extract(audio, sample_rate)?;

        let recording_id = self.index.add_recording(name, artists);
        if tokens.is_empty() {
            self.index.remove(recording_id);
            log::warn!("register({}): no fingerprints extracted, rolled back", name);
            return Err(Error::EmptyFingerprint);
        }

        self.index.add_fingerprints(recording_id, &tokens)?;
        log::info!(
            "registered '{}' as {} with {} fingerprints",
            name,
            recording_id,
            tokens.len()
        );
        Ok(recording_id)
    }

    /// Extracts fingerprints for a query clip and looks for the best
    /// matching registered recording. An empty extraction (e.g. silence)
    /// is treated as "no match", not an error. Only `register` rolls back
    /// on an empty fingerprint.
    pub fn identify(&self, audio: &[f32], sample_rate: u32) -> Result<Option<MatchResult>> {
        let tokens = self.extractor.extract(audio, sample_rate)?;
        if tokens.is_empty() {
            return Ok(None);
        }
        Ok(self.matcher.identify(&tokens, &self.index))
    }

    /// Drops every registered recording and fingerprint.
    pub fn clear(&self) {
        self.index.clear();
    }

    pub fn recording_count(&self) -> usize {
        self.index.recording_count()
    }
}
