//! Utterance segmentation
//!
//! Splits the capture stream into discrete utterances using RMS energy:
//! speech starts when energy crosses the threshold, and the segment is cut
//! after a sustained silence tail. An optional calibration pass rebaselines
//! the threshold from measured ambient noise.

/// Default minimum audio energy to consider speech
const DEFAULT_ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum duration of speech for a usable segment (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence duration that ends an utterance (in samples)
const SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// Headroom multiplier applied to the measured noise floor
const CALIBRATION_FACTOR: f32 = 4.0;

/// State of the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Waiting for speech
    Idle,
    /// Accumulating a speech segment
    Speech,
}

/// Segments captured audio into utterances
pub struct UtteranceSegmenter {
    energy_threshold: f32,
    state: SegmenterState,
    speech_buffer: Vec<f32>,
    silence_counter: usize,
}

impl UtteranceSegmenter {
    /// Create a segmenter with the default energy threshold
    #[must_use]
    pub const fn new() -> Self {
        Self {
            energy_threshold: DEFAULT_ENERGY_THRESHOLD,
            state: SegmenterState::Idle,
            speech_buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Rebaseline the energy threshold from a sample of ambient noise
    ///
    /// The default threshold acts as a floor so a dead-silent room doesn't
    /// make the segmenter trigger on noise-level wobble.
    pub fn calibrate(&mut self, ambient: &[f32]) {
        let noise_floor = rms_energy(ambient);
        self.energy_threshold = (noise_floor * CALIBRATION_FACTOR).max(DEFAULT_ENERGY_THRESHOLD);

        tracing::info!(
            noise_floor,
            threshold = self.energy_threshold,
            "calibrated for ambient noise"
        );
    }

    /// Feed captured samples into the segmenter
    ///
    /// Returns a completed utterance once speech has been followed by a
    /// sustained silence tail. Segments with too little speech are dropped.
    pub fn push(&mut self, samples: &[f32]) -> Option<Vec<f32>> {
        let energy = rms_energy(samples);
        let is_speech = energy > self.energy_threshold;

        match self.state {
            SegmenterState::Idle => {
                if is_speech {
                    self.state = SegmenterState::Speech;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech detected");
                }
            }
            SegmenterState::Speech => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.silence_counter > SILENCE_SAMPLES {
                    let speech_len = self.speech_buffer.len() - self.silence_counter;
                    let segment = std::mem::take(&mut self.speech_buffer);
                    self.reset();

                    if speech_len >= MIN_SPEECH_SAMPLES {
                        tracing::debug!(samples = segment.len(), "utterance complete");
                        return Some(segment);
                    }

                    tracing::trace!(samples = speech_len, "segment too short, dropping");
                }
            }
        }

        None
    }

    /// Reset to idle, discarding any accumulated speech
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.speech_buffer.clear();
        self.silence_counter = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> SegmenterState {
        self.state
    }

    /// Get the active energy threshold
    #[must_use]
    pub const fn energy_threshold(&self) -> f32 {
        self.energy_threshold
    }
}

impl Default for UtteranceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
