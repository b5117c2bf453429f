//! Background listener loop
//!
//! Owns the capture stream and drives each completed utterance through
//! transcription, classification, and the decision engine. Exactly one
//! utterance is in flight at a time: a slow network call or a long playback
//! delays the next segment rather than overlapping it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::Result;
use crate::engine::{DecisionEngine, ResponsePlayer};
use crate::nlu::IntentClassifier;
use crate::stt::{SpeechTranscriber, TranscribeError};
use crate::voice::{AudioCapture, SAMPLE_RATE, UtteranceSegmenter, samples_to_wav};

/// Capture poll interval
const TICK: Duration = Duration::from_millis(100);

/// Ambient-noise calibration sample length
const CALIBRATION: Duration = Duration::from_secs(1);

/// Stops a running [`Listener`] without terminating the process
#[derive(Clone)]
pub struct StopHandle {
    tx: mpsc::Sender<()>,
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Signal the listener to stop
    ///
    /// Idempotent: stopping a listener that was already stopped (or never
    /// started) logs and no-ops.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            tracing::info!("listener already stopped, nothing to do");
            return;
        }

        if self.tx.try_send(()).is_err() {
            tracing::info!("listener not running, nothing to stop");
        }
    }
}

/// Create a stop handle and the receiver a [`Listener`] runs against
#[must_use]
pub fn stop_channel() -> (StopHandle, mpsc::Receiver<()>) {
    let (tx, rx) = mpsc::channel(1);
    (
        StopHandle {
            tx,
            stopped: Arc::new(AtomicBool::new(false)),
        },
        rx,
    )
}

/// Continuously captures audio and feeds utterances to the decision engine
pub struct Listener<P> {
    capture: AudioCapture,
    segmenter: UtteranceSegmenter,
    transcriber: SpeechTranscriber,
    classifier: IntentClassifier,
    engine: DecisionEngine<P>,
    adjust_for_ambient_noise: bool,
}

impl<P: ResponsePlayer> Listener<P> {
    /// Assemble the pipeline
    pub fn new(
        capture: AudioCapture,
        segmenter: UtteranceSegmenter,
        transcriber: SpeechTranscriber,
        classifier: IntentClassifier,
        engine: DecisionEngine<P>,
        adjust_for_ambient_noise: bool,
    ) -> Self {
        Self {
            capture,
            segmenter,
            transcriber,
            classifier,
            engine,
            adjust_for_ambient_noise,
        }
    }

    /// Run until the stop handle fires
    ///
    /// cpal streams are not `Send`, so the loop stays on the task that
    /// created the capture.
    ///
    /// # Errors
    ///
    /// Returns error if calibration or capture startup fails; per-utterance
    /// failures are logged and the loop keeps listening
    pub async fn run(&mut self, shutdown: &mut mpsc::Receiver<()>) -> Result<()> {
        if self.adjust_for_ambient_noise {
            self.calibrate().await?;
        }

        self.capture.start()?;
        tracing::info!("listening");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("stop requested");
                    break;
                }
                () = tokio::time::sleep(TICK) => {
                    let samples = self.capture.take_buffer();
                    if samples.is_empty() {
                        continue;
                    }

                    if let Some(segment) = self.segmenter.push(&samples) {
                        if let Err(e) = self.process_segment(&segment).await {
                            tracing::error!(error = %e, "utterance processing error");
                        }

                        // Whatever was captured during a long pipeline run is
                        // stale by now; the next utterance starts fresh.
                        self.capture.clear_buffer();
                        self.segmenter.reset();
                    }
                }
            }
        }

        self.capture.stop();
        Ok(())
    }

    /// Measure the ambient noise floor and rebaseline the segmenter
    ///
    /// Runs once, before listening starts.
    async fn calibrate(&mut self) -> Result<()> {
        tracing::info!("sampling ambient noise");

        self.capture.start()?;
        tokio::time::sleep(CALIBRATION).await;
        let ambient = self.capture.take_buffer();
        self.capture.stop();

        self.segmenter.calibrate(&ambient);
        Ok(())
    }

    /// Transcribe, classify, and decide for one utterance
    async fn process_segment(&mut self, segment: &[f32]) -> Result<()> {
        tracing::info!(samples = segment.len(), "processing utterance");

        let wav = samples_to_wav(segment, SAMPLE_RATE)?;

        let text = match self.transcriber.transcribe(&wav).await {
            Ok(text) => text,
            Err(TranscribeError::Unintelligible) => {
                tracing::warn!("could not understand audio, dropping segment");
                return Ok(());
            }
            Err(e @ TranscribeError::ServiceUnavailable(_)) => {
                tracing::error!(error = %e, "dropping segment");
                return Ok(());
            }
        };

        let classification = match self.classifier.classify(&text).await {
            Ok(classification) => classification,
            Err(e) => {
                tracing::error!(error = %e, "classification failed, dropping segment");
                return Ok(());
            }
        };

        self.engine.handle(&classification)
    }
}
