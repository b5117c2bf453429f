//! Audio segmentation and WAV encoding tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;

use standin::voice::{SAMPLE_RATE, SegmenterState, UtteranceSegmenter, samples_to_wav};

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

#[test]
fn segmenter_starts_idle() {
    let segmenter = UtteranceSegmenter::new();
    assert_eq!(segmenter.state(), SegmenterState::Idle);
}

#[test]
fn silence_does_not_start_a_segment() {
    let mut segmenter = UtteranceSegmenter::new();

    let silence = generate_silence(0.5);
    assert!(segmenter.push(&silence).is_none());
    assert_eq!(segmenter.state(), SegmenterState::Idle);
}

#[test]
fn speech_enters_speech_state() {
    let mut segmenter = UtteranceSegmenter::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    assert!(segmenter.push(&speech).is_none());
    assert_eq!(segmenter.state(), SegmenterState::Speech);
}

#[test]
fn utterance_completes_after_silence_tail() {
    let mut segmenter = UtteranceSegmenter::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    assert!(segmenter.push(&speech).is_none());

    let silence = generate_silence(0.6);
    let segment = segmenter.push(&silence).expect("utterance should complete");

    // Segment holds everything accumulated since speech started
    assert_eq!(segment.len(), speech.len() + silence.len());
    assert_eq!(segmenter.state(), SegmenterState::Idle);
}

#[test]
fn short_blip_is_dropped() {
    let mut segmenter = UtteranceSegmenter::new();

    // 0.1s of speech is below the minimum utterance length
    let blip = generate_sine_samples(440.0, 0.1, 0.3);
    assert!(segmenter.push(&blip).is_none());

    let silence = generate_silence(0.6);
    assert!(segmenter.push(&silence).is_none());
    assert_eq!(segmenter.state(), SegmenterState::Idle);
}

#[test]
fn interleaved_speech_keeps_accumulating() {
    let mut segmenter = UtteranceSegmenter::new();

    let speech = generate_sine_samples(440.0, 0.3, 0.3);
    assert!(segmenter.push(&speech).is_none());

    // A short pause does not end the utterance
    let pause = generate_silence(0.2);
    assert!(segmenter.push(&pause).is_none());
    assert_eq!(segmenter.state(), SegmenterState::Speech);

    let more_speech = generate_sine_samples(440.0, 0.3, 0.3);
    assert!(segmenter.push(&more_speech).is_none());

    let silence = generate_silence(0.6);
    let segment = segmenter.push(&silence).expect("utterance should complete");
    assert_eq!(
        segment.len(),
        speech.len() + pause.len() + more_speech.len() + silence.len()
    );
}

#[test]
fn reset_discards_accumulated_speech() {
    let mut segmenter = UtteranceSegmenter::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    segmenter.push(&speech);
    assert_eq!(segmenter.state(), SegmenterState::Speech);

    segmenter.reset();
    assert_eq!(segmenter.state(), SegmenterState::Idle);

    // Nothing left over: a fresh silence tail completes nothing
    let silence = generate_silence(0.6);
    assert!(segmenter.push(&silence).is_none());
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    // Check WAV header magic
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");

    // WAV should have reasonable size
    assert!(wav_data.len() > 44); // WAV header is 44 bytes
}

#[test]
fn test_wav_roundtrip() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    // Read WAV back
    let cursor = Cursor::new(wav_data);
    let mut reader = hound::WavReader::new(cursor).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);

    // Read samples back
    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), original_samples.len());
}
