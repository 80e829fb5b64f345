use crate::error::{Error, Result};

/// Loads audio from WAV files and converts them into the mono PCM contract
/// the rest of the pipeline expects: a `Vec<f32>` normalized to `[-1, 1]`
/// plus the sample rate, with multi-channel input averaged down to mono.
pub struct AudioLoader;

impl AudioLoader {
    /// Loads a WAV file from disk and returns normalized mono samples and
    /// the sample rate.
    pub fn load_from_wav(file_path: &str) -> Result<(Vec<f32>, u32)> {
        log::info!("loading audio from: {}", file_path);

        let reader = hound::WavReader::open(file_path)
            .map_err(|e| Error::Decode(format!("failed to open {}: {}", file_path, e)))?;

        Self::decode(reader)
    }

    /// Decodes WAV bytes already held in memory (used by the FFI/WASM
    /// shims, which receive raw buffers rather than file paths).
    pub fn load_from_wav_bytes(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
        let cursor = std::io::Cursor::new(bytes);
        let reader = hound::WavReader::new(cursor)
            .map_err(|e| Error::Decode(format!("failed to parse WAV bytes: {}", e)))?;
        Self::decode(reader)
    }

    fn decode<R: std::io::Read>(mut reader: hound::WavReader<R>) -> Result<(Vec<f32>, u32)> {
        let spec = reader.spec();
        log::info!(
            "Audio specs - Sample rate: {}Hz, channels: {}, bits: {}",
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample
        );

        let samples: std::result::Result<Vec<f32>, hound::Error> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect(),
            hound::SampleFormat::Int => match spec.bits_per_sample {
                16 => reader
                    .samples::<i16>()
                    .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
                    .collect(),
                24 => reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / (1 << 23) as f32))
                    .collect(),
                32 => reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / i32::MAX as f32))
                    .collect(),
                other => {
                    return Err(Error::Decode(format!("unsupported bit depth: {}", other)));
                }
            },
        };
        let samples = samples.map_err(|e| Error::Decode(e.to_string()))?;

        let mono = downmix_to_mono(&samples, spec.channels as usize);

        if mono.is_empty() {
            return Err(Error::InvalidSignal("audio file contains no data".into()));
        }

        log::info!(
            "loaded {} samples ({:.2} seconds)",
            mono.len(),
            mono.len() as f32 / spec.sample_rate as f32
        );

        Ok((mono, spec.sample_rate))
    }
}

/// Averages interleaved multi-channel samples down to a single mono
/// channel. A channel count of 1 is returned unchanged.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
    }

    #[test]
    fn stereo_averaged() {
        let samples = vec![1.0, -1.0, 0.5, 0.5];
        assert_eq!(downmix_to_mono(&samples, 2), vec![0.0, 0.5]);
    }
}
