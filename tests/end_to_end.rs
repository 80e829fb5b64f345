use audiodna::{Engine, FingerprintConfig};

fn sine_sweep(duration_s: f32, sample_rate: u32, f0: f32, f1: f32) -> Vec<f32> {
    let n = (duration_s * sample_rate as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let freq = f0 + (f1 - f0) * t / duration_s;
            (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect()
}

fn tone(duration_s: f32, sample_rate: u32, freq: f32) -> Vec<f32> {
    let n = (duration_s * sample_rate as f32) as usize;
    (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Scenario 1 (spec.md §8): registering and re-querying the exact same
/// sweep recovers it with offset 0.
#[test]
fn sine_sweep_self_match() {
    let engine = Engine::with_default_config().unwrap();
    let clip = sine_sweep(12.0, 44_100, 150.0, 9_000.0);
    let id = engine.register(&clip, 44_100, "Sweep", &[]).unwrap();

    let result = engine.identify(&clip, 44_100).unwrap().unwrap();
    assert_eq!(result.recording_id, id);
    assert_eq!(result.offset_frames, 0);
}

/// Scenario 2: a short excerpt from the middle of one recording, among a
/// small corpus of three, is correctly attributed to its source with the
/// expected non-zero offset.
#[test]
fn excerpt_from_corpus_slice_identifies_source_with_offset() {
    let engine = Engine::with_default_config().unwrap();

    let a = sine_sweep(10.0, 44_100, 100.0, 5_000.0);
    let b = sine_sweep(10.0, 44_100, 300.0, 7_000.0);
    let c = sine_sweep(10.0, 44_100, 500.0, 9_000.0);

    let id_a = engine.register(&a, 44_100, "A", &[]).unwrap();
    let id_b = engine.register(&b, 44_100, "B", &[]).unwrap();
    let id_c = engine.register(&c, 44_100, "C", &[]).unwrap();

    let excerpt_start_s = 3.0;
    let excerpt = b[(excerpt_start_s * 44_100.0) as usize..(8.0 * 44_100.0) as usize].to_vec();

    let result = engine.identify(&excerpt, 44_100).unwrap().unwrap();
    assert_eq!(result.recording_id, id_b);
    assert_ne!(result.recording_id, id_a);
    assert_ne!(result.recording_id, id_c);

    let hop_size = engine.config().hop_size;
    let expected_offset_frames = (excerpt_start_s * 44_100.0 / hop_size as f32).round() as i64;
    let tolerance = 5;
    assert!(
        (result.offset_frames - expected_offset_frames).abs() <= tolerance,
        "expected offset near {} frames, got {}",
        expected_offset_frames,
        result.offset_frames
    );
}

/// Scenario 3: a silent query against a populated corpus returns no match.
#[test]
fn silence_against_populated_corpus_is_no_match() {
    let engine = Engine::with_default_config().unwrap();
    let clip = sine_sweep(10.0, 44_100, 100.0, 8_000.0);
    engine.register(&clip, 44_100, "Sweep", &[]).unwrap();

    let silence = vec![0.0f32; 44_100 * 4];
    assert!(engine.identify(&silence, 44_100).unwrap().is_none());
}

/// Scenario 4: registering the same (name, artists) pair twice is
/// idempotent rather than producing a duplicate recording.
#[test]
fn duplicate_registration_does_not_duplicate_recordings() {
    let engine = Engine::with_default_config().unwrap();
    let clip = sine_sweep(8.0, 44_100, 200.0, 6_000.0);
    let artists = vec!["Someone".to_string()];

    let first = engine.register(&clip, 44_100, "Track", &artists).unwrap();
    let second = engine.register(&clip, 44_100, "Track", &artists).unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.recording_count(), 1);
}

/// Scenario 5: clearing the index makes a previously-matching query miss.
#[test]
fn clear_makes_previous_match_disappear() {
    let engine = Engine::with_default_config().unwrap();
    let clip = sine_sweep(8.0, 44_100, 200.0, 6_000.0);
    engine.register(&clip, 44_100, "Track", &[]).unwrap();
    assert!(engine.identify(&clip, 44_100).unwrap().is_some());

    engine.clear();
    assert!(engine.identify(&clip, 44_100).unwrap().is_none());
}

/// Scenario 6: extracting fingerprints from the same audio twice produces
/// identical identify results (determinism, P8).
#[test]
fn repeated_identification_is_deterministic() {
    let engine = Engine::with_default_config().unwrap();
    let clip = sine_sweep(10.0, 44_100, 100.0, 8_000.0);
    engine.register(&clip, 44_100, "Sweep", &[]).unwrap();

    let first = engine.identify(&clip, 44_100).unwrap();
    let second = engine.identify(&clip, 44_100).unwrap();
    assert_eq!(first, second);
}

/// P9 (added): additive low-amplitude white noise on the query clip still
/// identifies the correct recording, evidencing graceful degradation under
/// noise rather than collapse.
#[test]
fn noisy_query_still_matches() {
    use rand::{Rng, SeedableRng};
    let engine = Engine::with_default_config().unwrap();
    let clip = sine_sweep(12.0, 44_100, 150.0, 9_000.0);
    let id = engine.register(&clip, 44_100, "Sweep", &[]).unwrap();

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let noisy: Vec<f32> = clip
        .iter()
        .map(|&s| s + rng.gen_range(-0.02..0.02))
        .collect();

    let result = engine.identify(&noisy, 44_100).unwrap();
    assert_eq!(result.map(|m| m.recording_id), Some(id));
}

/// Distinct single-frequency tones produce disjoint recordings with no
/// cross-matching, a minimal sanity check of (de)correlation across
/// unrelated clips.
#[test]
fn unrelated_tones_do_not_cross_match() {
    let engine = Engine::with_default_config().unwrap();
    let low = tone(6.0, 44_100, 440.0);
    let high = tone(6.0, 44_100, 6_000.0);

    let id_low = engine.register(&low, 44_100, "Low", &[]).unwrap();
    engine.register(&high, 44_100, "High", &[]).unwrap();

    let result = engine.identify(&low, 44_100).unwrap();
    assert_eq!(result.map(|m| m.recording_id), Some(id_low));
}

#[test]
fn custom_config_round_trips_through_json() {
    let config = FingerprintConfig {
        min_match_score: 10,
        ..FingerprintConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: FingerprintConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, back);
}
