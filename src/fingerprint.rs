use sha1::{Digest, Sha1};

use crate::config::FingerprintConfig;
use crate::models::{FingerprintToken, Hash80, Peak};

/// Pairs anchor peaks with targets in a time-frequency zone and emits
/// `(hash, anchor_time)` tokens, the Shazam-style "combinatorial hashing"
/// step.
///
/// Peaks are sorted by time (ties by band) once up front; for each anchor,
/// scanning forward stops as soon as `Δt > t_max`, which is what makes the
/// whole pass `O(n * fanout)` rather than quadratic in the peak count.
pub struct Fingerprinter {
    fanout_size: usize,
    t_min: i64,
    t_max: i64,
    f_range: i64,
}

impl Fingerprinter {
    pub fn new(config: &FingerprintConfig) -> Self {
        Fingerprinter {
            fanout_size: config.fanout_size,
            t_min: config.t_min,
            t_max: config.t_max,
            f_range: config.f_range,
        }
    }

    /// Generates fingerprint tokens from an unordered peak set. Every
    /// emitted token satisfies `t_anchor < t_target` and
    /// `t_min <= Δt <= t_max`, and at most `fanout_size` tokens are emitted
    /// per anchor.
    pub fn generate(&self, peaks: &[Peak]) -> Vec<FingerprintToken> {
        if peaks.len() < 2 {
            log::warn!("not enough peaks to generate fingerprints");
            return Vec::new();
        }

        let mut sorted: Vec<&Peak> = peaks.iter().collect();
        sorted.sort_by(|a, b| a.time.0.cmp(&b.time.0).then(a.band.0.cmp(&b.band.0)));
        log::info!("generating fingerprints from {} peaks", sorted.len());

        let mut tokens = Vec::new();
        for i in 0..sorted.len() {
            let anchor = sorted[i];
            let mut targets_found = 0usize;

            for target in &sorted[i + 1..] {
                let dt = target.time.0 as i64 - anchor.time.0 as i64;
                if dt > self.t_max {
                    break;
                }
                if dt < self.t_min {
                    continue;
                }
                let df = (target.band.0 as i64 - anchor.band.0 as i64).abs();
                if df > self.f_range {
                    continue;
                }

                let hash = hash_pair(anchor.band.0, target.band.0, dt);
                tokens.push(FingerprintToken {
                    hash,
                    anchor_time: anchor.time,
                });

                targets_found += 1;
                if targets_found >= self.fanout_size {
                    break;
                }
            }
        }

        log::info!("generated {} fingerprints total", tokens.len());
        tokens
    }
}

/// `H = firstHex20(SHA1(utf8("{f_anchor}|{f_target}|{dt}")))`. The 20-hex
/// (80-bit) truncation is preserved for bitwise corpus compatibility.
fn hash_pair(anchor_band: u16, target_band: u16, dt: i64) -> Hash80 {
    let input = format!("{}|{}|{}", anchor_band, target_band, dt);
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    let digest: [u8; 20] = hasher.finalize().into();
    Hash80::from_digest_prefix(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frame, MelBand};

    fn peak(time: u32, band: u16, amp: f32) -> Peak {
        Peak {
            time: Frame(time),
            band: MelBand(band),
            amplitude_db: amp,
        }
    }

    #[test]
    fn fewer_than_two_peaks_yields_no_tokens() {
        let fp = Fingerprinter::new(&FingerprintConfig::default());
        assert!(fp.generate(&[peak(0, 10, 1.0)]).is_empty());
    }

    #[test]
    fn emits_token_for_valid_pair() {
        let fp = Fingerprinter::new(&FingerprintConfig::default());
        let peaks = vec![peak(0, 40, 1.0), peak(10, 45, 1.0)];
        let tokens = fp.generate(&peaks);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].anchor_time, Frame(0));
    }

    #[test]
    fn rejects_pairs_outside_t_min_t_max() {
        let cfg = FingerprintConfig {
            t_min: 3,
            t_max: 100,
            ..FingerprintConfig::default()
        };
        let fp = Fingerprinter::new(&cfg);
        // dt = 1, below t_min
        let peaks = vec![peak(0, 40, 1.0), peak(1, 45, 1.0)];
        assert!(fp.generate(&peaks).is_empty());

        // dt = 200, above t_max
        let peaks = vec![peak(0, 40, 1.0), peak(200, 45, 1.0)];
        assert!(fp.generate(&peaks).is_empty());
    }

    #[test]
    fn rejects_pairs_outside_f_range() {
        let cfg = FingerprintConfig {
            f_range: 20,
            ..FingerprintConfig::default()
        };
        let fp = Fingerprinter::new(&cfg);
        let peaks = vec![peak(0, 0, 1.0), peak(10, 100, 1.0)];
        assert!(fp.generate(&peaks).is_empty());
    }

    #[test]
    fn fanout_is_bounded() {
        let cfg = FingerprintConfig {
            fanout_size: 3,
            t_min: 1,
            t_max: 100,
            f_range: 1000,
            ..FingerprintConfig::default()
        };
        let fp = Fingerprinter::new(&cfg);
        let mut peaks = vec![peak(0, 0, 1.0)];
        for t in 1..20 {
            peaks.push(peak(t, 0, 1.0));
        }
        let tokens = fp.generate(&peaks);
        let from_first_anchor = tokens.iter().filter(|t| t.anchor_time == Frame(0)).count();
        assert_eq!(from_first_anchor, 3);
    }

    #[test]
    fn hash_is_stable_for_fixed_inputs() {
        let a = hash_pair(40, 45, 10);
        let b = hash_pair(40, 45, 10);
        assert_eq!(a, b);
        assert_eq!(a.to_string().len(), 20);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = hash_pair(40, 45, 10);
        let b = hash_pair(40, 46, 10);
        assert_ne!(a, b);
    }
}
