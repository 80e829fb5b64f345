use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Window taper applied to each frame before the FFT.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Hann,
    Hamming,
    Rect,
}

impl Default for WindowType {
    fn default() -> Self {
        WindowType::Hann
    }
}

/// Every tunable knob for the fingerprinting pipeline, with the documented
/// defaults. Changing any field that feeds the hash content (`sample_rate`,
/// `fft_size`, `hop_size`, `n_mels`, `fmin`, `fmax`, `t_min`/`t_max`,
/// `f_range`) invalidates an existing corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    pub sample_rate: u32,
    pub fft_size: usize,
    pub hop_size: usize,
    pub window_type: WindowType,

    pub n_mels: usize,
    pub fmin: f32,
    pub fmax: f32,

    /// Local-maximum neighborhood, `(freq_bins, time_frames)`.
    pub neighborhood: (usize, usize),
    /// Median-filter background neighborhood, `(freq_bins, time_frames)`.
    pub median_filter: (usize, usize),
    pub offset_db: f32,
    pub peaks_per_band: usize,
    pub bands_split: usize,
    pub time_window: usize,
    pub max_peaks_per_second: usize,

    pub fanout_size: usize,
    pub t_min: i64,
    pub t_max: i64,
    pub f_range: i64,

    pub min_match_score: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        FingerprintConfig {
            sample_rate: 44_100,
            fft_size: 2048,
            hop_size: 512,
            window_type: WindowType::Hann,

            n_mels: 128,
            fmin: 0.0,
            fmax: 22_050.0,

            neighborhood: (15, 7),
            median_filter: (41, 21),
            offset_db: 7.0,
            peaks_per_band: 30,
            bands_split: 6,
            time_window: 60,
            max_peaks_per_second: 35,

            fanout_size: 5,
            t_min: 3,
            t_max: 100,
            f_range: 20,

            min_match_score: 20,
        }
    }
}

impl FingerprintConfig {
    /// Validates the preconditions for framing and mel projection: positive
    /// sample rate, FFT size, and mel count, and `fmax` not past Nyquist.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidParams("sample_rate must be positive".into()));
        }
        if self.fft_size == 0 {
            return Err(Error::InvalidParams("fft_size must be positive".into()));
        }
        if self.n_mels == 0 {
            return Err(Error::InvalidParams("n_mels must be positive".into()));
        }
        if self.hop_size == 0 {
            return Err(Error::InvalidParams("hop_size must be positive".into()));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        if self.fmax > nyquist {
            return Err(Error::InvalidParams(format!(
                "fmax ({}) cannot exceed Nyquist frequency ({})",
                self.fmax, nyquist
            )));
        }
        if self.t_min > self.t_max {
            return Err(Error::InvalidParams(format!(
                "t_min ({}) must not exceed t_max ({})",
                self.t_min, self.t_max
            )));
        }
        Ok(())
    }
}
