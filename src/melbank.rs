use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Parameters that uniquely determine a mel filterbank matrix. Construction
/// is a pure function of this tuple, so results are cached for the process
/// lifetime keyed on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    sample_rate: u32,
    fft_size: usize,
    n_mels: usize,
    fmin_bits: u32,
    fmax_bits: u32,
}

/// Triangular mel filterbank `M`, shape `(n_mels, fft_size/2 + 1)`.
///
/// Filter `b` is triangular over `[hz(mel_b-1), hz(mel_b+1)]`, peaking at
/// `hz(mel_b)`, rising linearly 0→1 and falling 1→0. Mel boundaries are
/// equally spaced in mel-scale between `fmin` and `fmax`. Hz↔mel uses the
/// HTK form. Bin centers map to FFT bins via `floor((fft_size+1)*hz/sr)`,
/// the common convention.
pub struct MelFilterBank {
    n_mels: usize,
    n_bins: usize,
    filters: Vec<f32>, // row-major, n_mels x n_bins
}

impl MelFilterBank {
    /// Builds (or fetches from cache) the filterbank for the given
    /// parameters. Fails with `InvalidParams` if `sample_rate`, `fft_size`,
    /// or `n_mels` are non-positive, or `fmax` exceeds Nyquist.
    pub fn get_or_build(
        sample_rate: u32,
        fft_size: usize,
        n_mels: usize,
        fmin: f32,
        fmax: f32,
    ) -> Result<Arc<MelFilterBank>> {
        if sample_rate == 0 {
            return Err(Error::InvalidParams("sample rate must be positive".into()));
        }
        if fft_size == 0 {
            return Err(Error::InvalidParams("fft_size must be positive".into()));
        }
        if n_mels == 0 {
            return Err(Error::InvalidParams("n_mels must be positive".into()));
        }
        if fmax > sample_rate as f32 / 2.0 {
            return Err(Error::InvalidParams(
                "fmax cannot exceed Nyquist frequency (sr/2)".into(),
            ));
        }

        let key = CacheKey {
            sample_rate,
            fft_size,
            n_mels,
            fmin_bits: fmin.to_bits(),
            fmax_bits: fmax.to_bits(),
        };

        let cache = cache();
        if let Some(existing) = cache.lock().get(&key) {
            return Ok(existing.clone());
        }

        let built = Arc::new(Self::build(sample_rate, fft_size, n_mels, fmin, fmax));
        cache.lock().insert(key, built.clone());
        Ok(built)
    }

    fn build(sample_rate: u32, fft_size: usize, n_mels: usize, fmin: f32, fmax: f32) -> Self {
        log::info!(
            "creating mel filter bank: sr={}, n_fft={}, n_mels={}, fmin={}, fmax={}",
            sample_rate,
            fft_size,
            n_mels,
            fmin,
            fmax
        );

        let n_bins = fft_size / 2 + 1;
        let mel_min = hz_to_mel(fmin);
        let mel_max = hz_to_mel(fmax);

        let mel_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32)
            .collect();
        let hz_points: Vec<f32> = mel_points.iter().map(|&m| mel_to_hz(m)).collect();
        let bin_points: Vec<usize> = hz_points
            .iter()
            .map(|&hz| (((fft_size + 1) as f32 * hz / sample_rate as f32).floor() as isize).max(0) as usize)
            .collect();

        let mut filters = vec![0.0f32; n_mels * n_bins];
        for m in 1..=n_mels {
            let f_minus = bin_points[m - 1];
            let f_mid = bin_points[m];
            let f_plus = bin_points[m + 1];
            let row = m - 1;

            for k in f_minus..f_mid.min(n_bins) {
                if f_mid > f_minus {
                    filters[row * n_bins + k] = (k - f_minus) as f32 / (f_mid - f_minus) as f32;
                }
            }
            for k in f_mid..f_plus.min(n_bins) {
                if f_plus > f_mid {
                    filters[row * n_bins + k] = (f_plus - k) as f32 / (f_plus - f_mid) as f32;
                }
            }
        }

        log::info!("mel filter bank created successfully");
        MelFilterBank {
            n_mels,
            n_bins,
            filters,
        }
    }

    pub fn n_mels(&self) -> usize {
        self.n_mels
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Projects a power spectrum frame (`n_bins` values) onto the mel
    /// bands, returning `n_mels` energies.
    pub fn project(&self, power_spectrum_frame: &[f32]) -> Vec<f32> {
        debug_assert_eq!(power_spectrum_frame.len(), self.n_bins);
        (0..self.n_mels)
            .map(|b| {
                let row = &self.filters[b * self.n_bins..(b + 1) * self.n_bins];
                row.iter()
                    .zip(power_spectrum_frame)
                    .map(|(&w, &p)| w * p)
                    .sum()
            })
            .collect()
    }
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

fn cache() -> &'static Mutex<HashMap<CacheKey, Arc<MelFilterBank>>> {
    static CACHE: OnceLock<Mutex<HashMap<CacheKey, Arc<MelFilterBank>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}
