//! Speech-to-text client
//!
//! Thin wrapper over an OpenAI-compatible transcription endpoint. The service
//! is a black box: WAV bytes and a language tag go in, text comes out.

use thiserror::Error;

/// Transcription failure kinds
///
/// Both are per-utterance and non-fatal: the listener drops the segment and
/// keeps capturing.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// The audio contained no recognizable speech
    #[error("no recognizable speech in audio")]
    Unintelligible,

    /// The transcription service could not be reached or returned an error
    #[error("transcription service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Response from the transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcribes captured audio segments
pub struct SpeechTranscriber {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    language: String,
}

impl SpeechTranscriber {
    /// Create a new transcriber
    #[must_use]
    pub fn new(url: String, api_key: Option<String>, model: String, language: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
            model,
            language,
        }
    }

    /// Transcribe one WAV segment to text
    ///
    /// # Errors
    ///
    /// Returns [`TranscribeError::Unintelligible`] when the service found no
    /// speech, [`TranscribeError::ServiceUnavailable`] on transport or API
    /// failures.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscribeError> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| TranscribeError::ServiceUnavailable(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "transcription request failed");
            TranscribeError::ServiceUnavailable(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(TranscribeError::ServiceUnavailable(format!(
                "transcription API error {status}: {body}"
            )));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::ServiceUnavailable(e.to_string()))?;

        let text = result.text.trim();
        if text.is_empty() {
            return Err(TranscribeError::Unintelligible);
        }

        tracing::info!(transcript = %text, "transcription complete");
        Ok(text.to_string())
    }
}
