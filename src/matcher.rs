use std::collections::{HashMap, HashSet};

use crate::config::FingerprintConfig;
use crate::index::FingerprintIndex;
use crate::models::{FingerprintToken, MatchResult, RecordingId};

/// Scores candidate recordings against a query's fingerprint tokens by
/// offset-histogram consensus.
///
/// A genuine match produces many query/DB hash pairs sharing one offset
/// (the alignment time); mismatched recordings scatter offsets roughly
/// uniformly. The histogram maximum is a robust statistic under partial
/// occlusion and additive noise. A gap-comparison alternative to this
/// offset-histogram scorer was considered and dropped: it produced
/// unreliable scores and added complexity without improving accuracy.
pub struct Matcher {
    min_match_score: usize,
}

impl Matcher {
    pub fn new(config: &FingerprintConfig) -> Self {
        Matcher {
            min_match_score: config.min_match_score,
        }
    }

    /// Looks up the query's hashes with a single batched call, tallies an
    /// offset histogram per candidate recording, and returns the winner, or
    /// `None` if the best score is below `min_match_score`. Ties are broken
    /// by lower `recording_id`.
    pub fn identify(&self, query: &[FingerprintToken], index: &FingerprintIndex) -> Option<MatchResult> {
        if query.is_empty() {
            return None;
        }

        let query_hashes: HashSet<_> = query.iter().map(|t| t.hash).collect();
        let postings_by_hash = index.postings_for(&query_hashes);

        let mut histograms: HashMap<RecordingId, HashMap<i64, usize>> = HashMap::new();
        for token in query {
            if let Some(postings) = postings_by_hash.get(&token.hash) {
                for posting in postings {
                    let offset = posting.anchor_time.0 as i64 - token.anchor_time.0 as i64;
                    *histograms
                        .entry(posting.recording_id)
                        .or_default()
                        .entry(offset)
                        .or_default() += 1;
                }
            }
        }

        let mut best: Option<(RecordingId, usize, i64)> = None;
        for (recording_id, hist) in &histograms {
            let (&offset, &score) = hist
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .unwrap();

            let is_better = match best {
                None => true,
                Some((best_id, best_score, _)) => {
                    score > best_score || (score == best_score && *recording_id < best_id)
                }
            };
            if is_better {
                best = Some((*recording_id, score, offset));
            }
        }

        best.and_then(|(recording_id, score, offset)| {
            if score < self.min_match_score {
                None
            } else {
                Some(MatchResult {
                    recording_id,
                    score,
                    offset_frames: offset,
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frame, Hash80};
    use sha1::{Digest, Sha1};

    fn hash(seed: u8) -> Hash80 {
        let mut hasher = Sha1::new();
        hasher.update([seed]);
        let digest: [u8; 20] = hasher.finalize().into();
        Hash80::from_digest_prefix(&digest)
    }

    fn token(seed: u8, t: u32) -> FingerprintToken {
        FingerprintToken {
            hash: hash(seed),
            anchor_time: Frame(t),
        }
    }

    #[test]
    fn empty_query_is_no_match() {
        let index = FingerprintIndex::new();
        let matcher = Matcher::new(&FingerprintConfig::default());
        assert!(matcher.identify(&[], &index).is_none());
    }

    #[test]
    fn below_threshold_is_no_match() {
        let index = FingerprintIndex::new();
        let id = index.add_recording("Song", &[]);
        index.add_fingerprints(id, &[token(1, 100)]).unwrap();

        let cfg = FingerprintConfig {
            min_match_score: 5,
            ..FingerprintConfig::default()
        };
        let matcher = Matcher::new(&cfg);
        let query = vec![token(1, 0)];
        assert!(matcher.identify(&query, &index).is_none());
    }

    #[test]
    fn consistent_offset_wins() {
        let index = FingerprintIndex::new();
        let id = index.add_recording("Song", &[]);
        // DB anchors all at absolute offset 100 + query time, i.e. offset=100
        let db_tokens: Vec<_> = (0..30).map(|i| token(i, 100 + i as u32)).collect();
        index.add_fingerprints(id, &db_tokens).unwrap();

        let cfg = FingerprintConfig {
            min_match_score: 20,
            ..FingerprintConfig::default()
        };
        let matcher = Matcher::new(&cfg);
        let query: Vec<_> = (0..30).map(|i| token(i, i as u32)).collect();

        let result = matcher.identify(&query, &index).unwrap();
        assert_eq!(result.recording_id, id);
        assert_eq!(result.offset_frames, 100);
        assert_eq!(result.score, 30);
    }

    #[test]
    fn ties_broken_by_lower_recording_id() {
        let index = FingerprintIndex::new();
        let a = index.add_recording("A", &[]);
        let b = index.add_recording("B", &[]);
        let tokens: Vec<_> = (0..25).map(|i| token(i, 50)).collect();
        index.add_fingerprints(a, &tokens).unwrap();
        index.add_fingerprints(b, &tokens).unwrap();

        let cfg = FingerprintConfig {
            min_match_score: 20,
            ..FingerprintConfig::default()
        };
        let matcher = Matcher::new(&cfg);
        let query: Vec<_> = (0..25).map(|i| token(i, 50)).collect();
        let result = matcher.identify(&query, &index).unwrap();
        assert_eq!(result.recording_id, a.min(b));
    }
}
