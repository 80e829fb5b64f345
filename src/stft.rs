use std::sync::Arc;

use rustfft::{num_complex::Complex, FftPlanner};

use crate::config::FingerprintConfig;
use crate::error::{Error, Result};
use crate::framer::Framer;

/// Block-wise FFT with overlap: frames each in turn, windows, and computes
/// the power spectrum (magnitude squared of the non-negative-frequency
/// bins of the real FFT).
pub struct Stft {
    framer: Framer,
    fft: Arc<dyn rustfft::Fft<f32>>,
}

impl Stft {
    pub fn new(config: &FingerprintConfig) -> Result<Self> {
        let framer = Framer::new(config.fft_size, config.hop_size, config.window_type)?;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        Ok(Stft { framer, fft })
    }

    pub fn n_bins(&self) -> usize {
        self.framer.fft_size() / 2 + 1
    }

    /// Computes the power spectrum of `signal`, one row per frame, each row
    /// holding `fft_size/2 + 1` bins. Returns `Error::InvalidSignal` if the
    /// signal is shorter than one frame.
    pub fn power_spectrum(&self, signal: &[f32]) -> Result<Vec<Vec<f32>>> {
        let n_frames = self.framer.frame_count(signal.len());
        if n_frames == 0 {
            return Err(Error::InvalidSignal(format!(
                "signal has {} samples, need at least {}",
                signal.len(),
                self.framer.fft_size()
            )));
        }

        let compute_row = |m: usize| -> Vec<f32> {
            let windowed = self.framer.frame(signal, m);
            let mut buffer: Vec<Complex<f32>> =
                windowed.iter().map(|&x| Complex::new(x, 0.0)).collect();
            self.fft.process(&mut buffer);
            buffer[..self.n_bins()].iter().map(|c| c.norm_sqr()).collect()
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            Ok((0..n_frames).into_par_iter().map(compute_row).collect())
        }
        #[cfg(not(feature = "parallel"))]
        {
            Ok((0..n_frames).map(compute_row).collect())
        }
    }
}
