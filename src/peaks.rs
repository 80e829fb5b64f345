use std::collections::HashMap;

use crate::config::FingerprintConfig;
use crate::models::{Frame, MelBand, Peak};

/// Finds a sparse set of time-frequency landmarks in a log-mel
/// spectrogram via local-max detection, an adaptive median-filter
/// threshold, edge exclusion, and two stages of quota limiting.
///
/// Ported from the reference implementation's `PeakPicker`: same three
/// tests applied in the same order, same two-stage quota. No fatal errors
/// are raised for shape degeneracy: degenerate inputs (silence, a
/// spectrogram smaller than the neighborhood) simply yield no peaks.
pub struct PeakPicker {
    neighborhood: (usize, usize),
    median_filter: (usize, usize),
    offset_db: f32,
    peaks_per_band: usize,
    bands_split: usize,
    time_window: usize,
    max_peaks_per_second: usize,
    sample_rate: u32,
    hop_size: usize,
}

impl PeakPicker {
    pub fn new(config: &FingerprintConfig) -> Self {
        if config.neighborhood.0 % 2 == 0 || config.neighborhood.1 % 2 == 0 {
            log::warn!(
                "neighborhood {:?} should have odd dimensions for symmetry",
                config.neighborhood
            );
        }
        if config.median_filter.0 % 2 == 0 || config.median_filter.1 % 2 == 0 {
            log::warn!(
                "median_filter {:?} should have odd dimensions for symmetry",
                config.median_filter
            );
        }
        PeakPicker {
            neighborhood: config.neighborhood,
            median_filter: config.median_filter,
            offset_db: config.offset_db,
            peaks_per_band: config.peaks_per_band,
            bands_split: config.bands_split,
            time_window: config.time_window,
            max_peaks_per_second: config.max_peaks_per_second,
            sample_rate: config.sample_rate,
            hop_size: config.hop_size,
        }
    }

    /// `spec[band][frame]` is the log-mel spectrogram in dB, shape
    /// `(n_mels, n_frames)`.
    pub fn find_peaks(&self, spec: &[Vec<f32>]) -> Vec<Peak> {
        let n_bands = spec.len();
        if n_bands == 0 {
            return Vec::new();
        }
        let n_frames = spec[0].len();
        if n_frames == 0 {
            return Vec::new();
        }

        let overall_max = spec
            .iter()
            .flat_map(|row| row.iter())
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max);
        if overall_max <= 0.0 {
            log::warn!("spectrogram has zero or negative energy, no peaks found");
            return Vec::new();
        }

        if n_bands < self.neighborhood.0 || n_frames < self.neighborhood.1 {
            return Vec::new();
        }

        log::info!(
            "running peak picking: neighborhood={:?}, offset_db={}, time_window={}, max_peaks_per_second={}",
            self.neighborhood, self.offset_db, self.time_window, self.max_peaks_per_second
        );

        let local_max = windowed_stat(spec, self.neighborhood, Stat::Max);
        let background = windowed_stat(spec, self.median_filter, Stat::Median);

        let f_half = self.neighborhood.0 / 2;
        let t_half = self.neighborhood.1 / 2;

        let mut candidates = Vec::new();
        for band in 0..n_bands {
            if band < f_half || band >= n_bands.saturating_sub(f_half) {
                continue;
            }
            for frame in 0..n_frames {
                if frame < t_half || frame >= n_frames.saturating_sub(t_half) {
                    continue;
                }
                let value = spec[band][frame];
                let is_local_max = value == local_max[band][frame];
                let passes_threshold = value > background[band][frame] + self.offset_db;
                if is_local_max && passes_threshold {
                    candidates.push(Peak {
                        time: Frame(frame as u32),
                        band: MelBand(band as u16),
                        amplitude_db: value,
                    });
                }
            }
        }

        if candidates.is_empty() {
            log::warn!("no peaks found after filtering");
            return Vec::new();
        }

        let band_limited = self.apply_band_time_quota(&candidates, n_bands);
        let final_peaks = self.apply_per_second_cap(band_limited);

        log::info!(
            "found {} peaks after band+time+per-second limiting",
            final_peaks.len()
        );
        final_peaks
    }

    fn apply_band_time_quota(&self, peaks: &[Peak], n_bands: usize) -> Vec<Peak> {
        let band_step = if self.bands_split > 0 {
            (n_bands / self.bands_split).max(1)
        } else {
            n_bands
        };

        let mut result = Vec::new();
        let mut start = 0usize;
        while start < n_bands {
            let end = (start + band_step).min(n_bands);
            let band_peaks: Vec<&Peak> = peaks
                .iter()
                .filter(|p| (p.band.0 as usize) >= start && (p.band.0 as usize) < end)
                .collect();

            if !band_peaks.is_empty() {
                let max_time = band_peaks.iter().map(|p| p.time.0).max().unwrap() as usize + 1;
                let mut t0 = 0usize;
                while t0 < max_time {
                    let t1 = t0 + self.time_window;
                    let mut slice: Vec<&Peak> = band_peaks
                        .iter()
                        .filter(|p| (p.time.0 as usize) >= t0 && (p.time.0 as usize) < t1)
                        .cloned()
                        .collect();
                    if !slice.is_empty() {
                        slice.sort_by(|a, b| b.amplitude_db.partial_cmp(&a.amplitude_db).unwrap());
                        result.extend(slice.into_iter().take(self.peaks_per_band).cloned());
                    }
                    t0 += self.time_window;
                }
            }
            start += band_step;
        }
        result
    }

    fn apply_per_second_cap(&self, peaks: Vec<Peak>) -> Vec<Peak> {
        if peaks.is_empty() {
            return peaks;
        }
        let mut by_second: HashMap<i64, Vec<Peak>> = HashMap::new();
        for p in peaks {
            let sec = (p.time.as_seconds(self.sample_rate, self.hop_size)).floor() as i64;
            by_second.entry(sec).or_default().push(p);
        }

        let mut result = Vec::new();
        for (_, mut group) in by_second {
            if group.len() > self.max_peaks_per_second {
                group.sort_by(|a, b| b.amplitude_db.partial_cmp(&a.amplitude_db).unwrap());
                group.truncate(self.max_peaks_per_second);
            }
            result.extend(group);
        }
        result
    }
}

#[derive(Clone, Copy)]
enum Stat {
    Max,
    Median,
}

/// Applies a 2D maximum or median filter over `spec` with a symmetric
/// window `(wf, wt)` centered on each cell, zero-padding beyond the edges
/// (matching the reference implementation's `mode='constant'`).
fn windowed_stat(spec: &[Vec<f32>], window: (usize, usize), stat: Stat) -> Vec<Vec<f32>> {
    let n_bands = spec.len();
    let n_frames = spec[0].len();
    let half_f = (window.0 / 2) as isize;
    let half_t = (window.1 / 2) as isize;

    let mut out = vec![vec![0.0f32; n_frames]; n_bands];
    let mut buf: Vec<f32> = Vec::with_capacity(window.0.max(1) * window.1.max(1));

    for band in 0..n_bands {
        for frame in 0..n_frames {
            buf.clear();
            for df in -half_f..=half_f {
                let bi = band as isize + df;
                for dt in -half_t..=half_t {
                    let fj = frame as isize + dt;
                    let value = if bi >= 0 && (bi as usize) < n_bands && fj >= 0 && (fj as usize) < n_frames
                    {
                        spec[bi as usize][fj as usize]
                    } else {
                        0.0
                    };
                    buf.push(value);
                }
            }
            out[band][frame] = match stat {
                Stat::Max => buf.iter().cloned().fold(f32::NEG_INFINITY, f32::max),
                Stat::Median => {
                    buf.sort_by(|a, b| a.partial_cmp(b).unwrap());
                    buf[buf.len() / 2]
                }
            };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_spec(bands: usize, frames: usize, value: f32) -> Vec<Vec<f32>> {
        vec![vec![value; frames]; bands]
    }

    #[test]
    fn silence_yields_no_peaks() {
        let cfg = FingerprintConfig::default();
        let picker = PeakPicker::new(&cfg);
        let spec = flat_spec(128, 100, -10.0);
        assert!(picker.find_peaks(&spec).is_empty());
    }

    #[test]
    fn spectrogram_smaller_than_neighborhood_yields_no_peaks() {
        let cfg = FingerprintConfig::default();
        let picker = PeakPicker::new(&cfg);
        let spec = flat_spec(3, 3, 5.0);
        assert!(picker.find_peaks(&spec).is_empty());
    }

    #[test]
    fn single_sharp_spike_is_detected() {
        let cfg = FingerprintConfig {
            neighborhood: (5, 5),
            median_filter: (9, 9),
            offset_db: 3.0,
            bands_split: 2,
            peaks_per_band: 10,
            time_window: 60,
            max_peaks_per_second: 35,
            ..FingerprintConfig::default()
        };
        let picker = PeakPicker::new(&cfg);
        let mut spec = flat_spec(40, 40, -20.0);
        spec[20][20] = 10.0;
        let peaks = picker.find_peaks(&spec);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].band.0, 20);
        assert_eq!(peaks[0].time.0, 20);
    }

    #[test]
    fn band_time_quota_is_respected() {
        let cfg = FingerprintConfig {
            neighborhood: (3, 3),
            median_filter: (5, 5),
            offset_db: 0.5,
            bands_split: 1,
            peaks_per_band: 2,
            time_window: 1000,
            max_peaks_per_second: 1000,
            ..FingerprintConfig::default()
        };
        let picker = PeakPicker::new(&cfg);
        // a grid of well-separated spikes within one band/time cell
        let mut spec = flat_spec(20, 100, -50.0);
        for t in (5..95).step_by(10) {
            spec[10][t] = 10.0 + t as f32 * 0.01;
        }
        let peaks = picker.find_peaks(&spec);
        assert!(peaks.len() <= 2, "expected quota to cap peaks, got {}", peaks.len());
    }
}
