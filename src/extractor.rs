use std::sync::Arc;

use crate::config::FingerprintConfig;
use crate::error::{Error, Result};
use crate::fingerprint::Fingerprinter;
use crate::melbank::MelFilterBank;
use crate::models::FingerprintToken;
use crate::peaks::PeakPicker;
use crate::stft::Stft;

/// Orchestrates Framer → STFT → Mel → PeakPicker → Fingerprinter for both
/// the ingest and query paths, sharing the exact same code path, which is
/// what makes "query is a substring of a registered recording" a
/// meaningful property to test.
pub struct Extractor {
    config: FingerprintConfig,
    stft: Stft,
    mel_filterbank: Arc<MelFilterBank>,
    peak_picker: PeakPicker,
    fingerprinter: Fingerprinter,
}

impl Extractor {
    pub fn new(config: FingerprintConfig) -> Result<Self> {
        config.validate()?;
        let stft = Stft::new(&config)?;
        let mel_filterbank = MelFilterBank::get_or_build(
            config.sample_rate,
            config.fft_size,
            config.n_mels,
            config.fmin,
            config.fmax,
        )?;
        let peak_picker = PeakPicker::new(&config);
        let fingerprinter = Fingerprinter::new(&config);

        Ok(Extractor {
            config,
            stft,
            mel_filterbank,
            peak_picker,
            fingerprinter,
        })
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Runs the full pipeline on mono PCM at `sample_rate`. `sample_rate`
    /// must match the extractor's configured sample rate, since a mismatch
    /// would silently skew every hash this extractor produces.
    pub fn extract(&self, audio: &[f32], sample_rate: u32) -> Result<Vec<FingerprintToken>> {
        if sample_rate != self.config.sample_rate {
            return Err(Error::InvalidParams(format!(
                "audio sample rate {} does not match configured sample rate {}",
                sample_rate, self.config.sample_rate
            )));
        }

        let power_spectrum = self.stft.power_spectrum(audio)?;

        // mel_spec[band][frame] = 10*log10(max(eps, sum_k M[band,k]*P[frame,k]))
        const EPS: f32 = 1e-10;
        let n_mels = self.mel_filterbank.n_mels();
        let n_frames = power_spectrum.len();
        let mut mel_spec_db = vec![vec![0.0f32; n_frames]; n_mels];
        for (frame_idx, frame_power) in power_spectrum.iter().enumerate() {
            let projected = self.mel_filterbank.project(frame_power);
            for (band, energy) in projected.into_iter().enumerate() {
                mel_spec_db[band][frame_idx] = 10.0 * energy.max(EPS).log10();
            }
        }

        let peaks = self.peak_picker.find_peaks(&mel_spec_db);
        Ok(self.fingerprinter.generate(&peaks))
    }
}
