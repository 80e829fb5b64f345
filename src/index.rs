use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::models::{FingerprintToken, Frame, Hash80, Posting, Recording, RecordingId};

/// Inverted index from fingerprint hash to postings, plus the recording
/// metadata table those postings reference.
///
/// Readers observe a consistent snapshot: `add_fingerprints` takes the
/// write lock once for an entire batch, so a concurrent `lookup` either
/// sees all of a recording's postings or none of them, never a partial
/// set. Lookups cost `O(postings matching the query hashes)`, not
/// `O(index size)`, because postings are already keyed by hash.
pub struct FingerprintIndex {
    recordings: RwLock<HashMap<RecordingId, Recording>>,
    postings: RwLock<HashMap<Hash80, Vec<Posting>>>,
    next_id: RwLock<u32>,
}

impl Default for FingerprintIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintIndex {
    pub fn new() -> Self {
        FingerprintIndex {
            recordings: RwLock::new(HashMap::new()),
            postings: RwLock::new(HashMap::new()),
            next_id: RwLock::new(0),
        }
    }

    /// Registers a recording and returns its id. Repeated registration of
    /// the same `(name, artists)` pair returns the existing id rather than
    /// erroring, so callers can register idempotently without tracking
    /// what's already in the index.
    pub fn add_recording(&self, name: &str, artists: &[String]) -> RecordingId {
        let recordings = self.recordings.read();
        if let Some(existing) = recordings
            .values()
            .find(|r| r.name == name && r.artists == artists)
        {
            return existing.id;
        }
        drop(recordings);

        let mut next_id = self.next_id.write();
        let id = RecordingId(*next_id);
        *next_id += 1;

        self.recordings.write().insert(
            id,
            Recording {
                id,
                name: name.to_string(),
                artists: artists.to_vec(),
            },
        );
        id
    }

    /// Stores a batch of fingerprint tokens for `recording_id`. All
    /// postings are written under a single write-lock acquisition.
    pub fn add_fingerprints(&self, recording_id: RecordingId, tokens: &[FingerprintToken]) -> Result<()> {
        if !self.recordings.read().contains_key(&recording_id) {
            return Err(Error::UnknownRecording(recording_id.0));
        }

        let mut postings = self.postings.write();
        for token in tokens {
            postings.entry(token.hash).or_default().push(Posting {
                recording_id,
                anchor_time: token.anchor_time,
            });
        }
        Ok(())
    }

    /// Batched lookup: for each hash in `hashes`, returns every posting
    /// stored under it, grouped by recording. An empty input returns an
    /// empty map.
    pub fn lookup(
        &self,
        hashes: &HashSet<Hash80>,
    ) -> HashMap<RecordingId, HashMap<Hash80, Vec<Frame>>> {
        let mut result: HashMap<RecordingId, HashMap<Hash80, Vec<Frame>>> = HashMap::new();
        if hashes.is_empty() {
            return result;
        }

        let postings = self.postings.read();
        for hash in hashes {
            if let Some(entries) = postings.get(hash) {
                for posting in entries {
                    result
                        .entry(posting.recording_id)
                        .or_default()
                        .entry(*hash)
                        .or_default()
                        .push(posting.anchor_time);
                }
            }
        }
        result
    }

    /// Returns every posting for `hash`, grouped by recording, used
    /// internally by the matcher so it can issue one batched lookup over
    /// the full query hash set instead of one call per hash.
    pub fn postings_for(&self, hashes: &HashSet<Hash80>) -> HashMap<Hash80, Vec<Posting>> {
        let postings = self.postings.read();
        hashes
            .iter()
            .filter_map(|h| postings.get(h).map(|v| (*h, v.clone())))
            .collect()
    }

    pub fn get_recording(&self, id: RecordingId) -> Result<Recording> {
        self.recordings
            .read()
            .get(&id)
            .cloned()
            .ok_or(Error::UnknownRecording(id.0))
    }

    /// Removes a recording and its postings. Falls out of this data
    /// structure almost for free and keeps `clear()` a degenerate case of
    /// it.
    pub fn remove(&self, id: RecordingId) {
        self.recordings.write().remove(&id);
        let mut postings = self.postings.write();
        for entries in postings.values_mut() {
            entries.retain(|p| p.recording_id != id);
        }
        postings.retain(|_, entries| !entries.is_empty());
    }

    /// Drops all postings and recordings.
    pub fn clear(&self) {
        self.recordings.write().clear();
        self.postings.write().clear();
    }

    pub fn recording_count(&self) -> usize {
        self.recordings.read().len()
    }
}
