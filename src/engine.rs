//! Intent decision engine
//!
//! Applies an ordered gate chain to one classification result and plays a
//! pre-recorded response when a supported intent addresses one of the
//! configured names. Every discarded utterance is a logged, recoverable
//! outcome; errors are reserved for record-append and playback failures.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::nlu::ClassificationResult;
use crate::{Error, Result};

/// Intent names the engine acts on. Anything else is dropped.
const SUPPORTED_INTENTS: [&str; 2] = ["presence_check", "question_asked"];

/// Plays one response clip from a named category
pub trait ResponsePlayer {
    /// Play a random clip from `category`
    ///
    /// # Errors
    ///
    /// Returns error if no clip can be selected or playback fails
    fn play(&mut self, category: &str) -> Result<()>;
}

/// Decides whether an utterance warrants a spoken response
pub struct DecisionEngine<P> {
    player: P,
    names: Vec<String>,
    confidence_threshold: f32,
    unrecognized_log: PathBuf,
}

impl<P: ResponsePlayer> DecisionEngine<P> {
    /// Create a new decision engine
    ///
    /// # Errors
    ///
    /// Returns error if the names list is empty or the confidence threshold
    /// is not a valid fraction
    pub fn new(
        player: P,
        names: Vec<String>,
        confidence_threshold: f32,
        unrecognized_log: impl Into<PathBuf>,
    ) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::Config(
                "names list must contain at least one name".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence threshold must be between 0.0 and 1.0, got {confidence_threshold}"
            )));
        }

        Ok(Self {
            player,
            names,
            confidence_threshold,
            unrecognized_log: unrecognized_log.into(),
        })
    }

    /// Run the gate chain for one utterance
    ///
    /// At most one clip plays per utterance: the first contact entity that
    /// is both a configured name and confident enough wins.
    ///
    /// # Errors
    ///
    /// Returns error only if appending to the unrecognized record or playing
    /// the response fails
    pub fn handle(&mut self, classification: &ClassificationResult) -> Result<()> {
        if classification.text.is_empty() {
            tracing::info!("classification carried no text, ignoring");
            return Ok(());
        }

        let Some(intent) = classification.intents.first() else {
            tracing::warn!(
                text = %classification.text,
                "no intent detected, recording unrecognized text"
            );
            return append_line(&self.unrecognized_log, &classification.text);
        };

        tracing::debug!(
            intent = %intent.name,
            confidence = intent.confidence,
            "candidate intent"
        );

        if intent.confidence < self.confidence_threshold {
            tracing::info!(
                intent = %intent.name,
                confidence = intent.confidence,
                threshold = self.confidence_threshold,
                "intent below confidence threshold, ignoring"
            );
            return Ok(());
        }

        if !SUPPORTED_INTENTS.contains(&intent.name.as_str()) {
            tracing::warn!(intent = %intent.name, "unsupported intent, ignoring");
            return Ok(());
        }

        if classification.entities.is_empty() {
            tracing::info!(intent = %intent.name, "no entities in classification, ignoring");
            return Ok(());
        }

        let contacts = classification.contacts();
        if contacts.is_empty() {
            tracing::info!(intent = %intent.name, "no contact entities in classification, ignoring");
            return Ok(());
        }

        for contact in contacts {
            if !self.names.iter().any(|name| name == &contact.body) {
                tracing::info!(contact = %contact.body, "name not found in addressee list, skipping");
                continue;
            }

            if contact.confidence < self.confidence_threshold {
                tracing::info!(
                    contact = %contact.body,
                    confidence = intent.confidence,
                    threshold = self.confidence_threshold,
                    "contact below confidence threshold, skipping"
                );
                continue;
            }

            tracing::info!(intent = %intent.name, contact = %contact.body, "playing response");
            return self.player.play(&intent.name);
        }

        Ok(())
    }

    /// Access the response player
    pub fn player(&self) -> &P {
        &self.player
    }
}

/// Append one utterance to the unrecognized-text record
///
/// The record is append-only: previously written lines are never touched.
fn append_line(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{text}")?;
    Ok(())
}
