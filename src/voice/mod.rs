//! Audio capture, utterance segmentation, and playback
//!
//! Device I/O goes through cpal; the speech services only ever see WAV bytes.

mod capture;
mod playback;
mod segmenter;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use playback::AudioPlayback;
pub use segmenter::{SegmenterState, UtteranceSegmenter};
