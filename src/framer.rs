use crate::config::WindowType;
use crate::error::{Error, Result};

/// Produces overlapping, windowed frames from a PCM stream.
///
/// Frame `m` begins at sample offset `m * hop_size` and covers
/// `[m*hop_size, m*hop_size + fft_size)`. The window is precomputed once at
/// construction and reused for every frame.
pub struct Framer {
    fft_size: usize,
    hop_size: usize,
    window: Vec<f32>,
}

impl Framer {
    pub fn new(fft_size: usize, hop_size: usize, window_type: WindowType) -> Result<Self> {
        if fft_size == 0 {
            return Err(Error::InvalidParams("fft_size must be positive".into()));
        }
        if hop_size == 0 {
            return Err(Error::InvalidParams("hop_size must be positive".into()));
        }
        Ok(Framer {
            fft_size,
            hop_size,
            window: window_coefficients(window_type, fft_size),
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of frames that fit in a signal of the given length, per
    /// `N_FRAMES = 1 + floor((L - FFT_SIZE) / HOP_SIZE)` when `L >=
    /// FFT_SIZE`, else 0.
    pub fn frame_count(&self, signal_len: usize) -> usize {
        if signal_len < self.fft_size {
            0
        } else {
            1 + (signal_len - self.fft_size) / self.hop_size
        }
    }

    /// Returns the windowed samples for frame `index`. Panics if the frame
    /// would read past the end of `signal`; callers are expected to only
    /// request indices `< frame_count(signal.len())`.
    pub fn frame(&self, signal: &[f32], index: usize) -> Vec<f32> {
        let start = index * self.hop_size;
        let end = start + self.fft_size;
        signal[start..end]
            .iter()
            .zip(&self.window)
            .map(|(&x, &w)| x * w)
            .collect()
    }
}

fn window_coefficients(window_type: WindowType, n: usize) -> Vec<f32> {
    match window_type {
        WindowType::Hann => (0..n)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32).cos())
            })
            .collect(),
        WindowType::Hamming => (0..n)
            .map(|i| {
                0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32).cos()
            })
            .collect(),
        WindowType::Rect => vec![1.0; n],
    }
}
