//! standin - voice-activated stand-in bot
//!
//! Listens on a microphone, transcribes speech through a cloud STT service,
//! classifies the transcript with a Wit.ai-style NLU service, and plays a
//! pre-recorded response when a supported intent addresses one of the
//! configured names.
//!
//! # Architecture
//!
//! ```text
//! microphone ──▶ capture ──▶ segmenter ──▶ transcriber ──▶ classifier
//!                                                              │
//!              speaker ◀── audio sink ◀── decision engine ◀────┘
//! ```
//!
//! The decision engine is the core: an ordered gate chain (text presence,
//! intent presence, confidence, intent dispatch, contact-name matching) that
//! either plays one clip or logs why it didn't. Everything around it is a
//! thin wrapper over cpal and the two HTTP services.

pub mod config;
pub mod engine;
pub mod error;
pub mod listener;
pub mod nlu;
pub mod preprocess;
pub mod responses;
pub mod stt;
pub mod voice;

pub use config::Config;
pub use engine::{DecisionEngine, ResponsePlayer};
pub use error::{Error, Result};
pub use listener::{Listener, StopHandle, stop_channel};
pub use nlu::{CONTACT_ENTITY_KEY, ClassificationResult, EntityMatch, Intent, IntentClassifier};
pub use preprocess::FilePreprocessor;
pub use responses::{AudioSink, ResponseLibrary};
pub use stt::{SpeechTranscriber, TranscribeError};
