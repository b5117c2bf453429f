//! Configuration management for standin

pub mod file;

use std::path::PathBuf;

use crate::{Error, Result};

/// Default root of the response clip library
pub const DEFAULT_RESPONSES_DIR: &str = "resources/responses";

/// Default minimum confidence for intents and entities
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.90;

/// Default recognition language tag
const DEFAULT_LANGUAGE: &str = "en-US";

/// Default transcription endpoint
const DEFAULT_STT_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Default transcription model
const DEFAULT_STT_MODEL: &str = "whisper-1";

/// Default NLU endpoint
const DEFAULT_NLU_URL: &str = "https://api.wit.ai/message";

/// standin configuration
///
/// Assembled once at startup (env > config file > default) and shared for
/// the process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input device index (`None` = system default)
    pub input_device: Option<usize>,

    /// Output device index (`None` = system default)
    pub output_device: Option<usize>,

    /// Rebaseline the noise threshold before listening starts
    pub adjust_for_ambient_noise: bool,

    /// Recognition language tag passed to the transcription service
    pub language: String,

    /// Transcription endpoint URL
    pub stt_url: String,

    /// Transcription model
    pub stt_model: String,

    /// Transcription API key (optional; a local gateway may need none)
    pub stt_api_key: Option<String>,

    /// NLU endpoint URL
    pub nlu_url: String,

    /// NLU access token
    pub nlu_token: String,

    /// Minimum confidence for intents and entities
    pub confidence_threshold: f32,

    /// Addressee names the bot answers to
    pub names: Vec<String>,

    /// Root of the response clip library
    pub responses_dir: PathBuf,

    /// Append-only unrecognized-utterance record
    pub unrecognized_log: PathBuf,

    /// Startup preprocessing behavior
    pub preprocess: PreprocessConfig,
}

/// Startup preprocessing behavior
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Convert response clips before listening starts
    pub enabled: bool,

    /// Keep originals after conversion
    pub keep_originals: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keep_originals: true,
        }
    }
}

impl Config {
    /// Load configuration from env vars, the TOML config file, and defaults
    ///
    /// # Errors
    ///
    /// Returns error if the NLU access token is missing, the names list is
    /// missing or empty, or the confidence threshold is not a valid fraction.
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();

        let nlu_token = std::env::var("WIT_ACCESS_TOKEN")
            .ok()
            .or(fc.nlu.access_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "NLU access token required (set WIT_ACCESS_TOKEN or nlu.access_token)"
                        .to_string(),
                )
            })?;

        let names_raw = std::env::var("STANDIN_NAMES")
            .ok()
            .or(fc.nlu.names)
            .ok_or_else(|| {
                Error::Config(
                    "addressee names required (set STANDIN_NAMES or nlu.names)".to_string(),
                )
            })?;
        let names = parse_names(&names_raw)?;

        let confidence_threshold = match std::env::var("STANDIN_CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(fc.nlu.confidence_threshold)
        {
            Some(t) => validate_threshold(t)?,
            None => DEFAULT_CONFIDENCE_THRESHOLD,
        };

        let unrecognized_log = std::env::var("STANDIN_UNRECOGNIZED_LOG")
            .ok()
            .or(fc.responses.unrecognized_log)
            .map_or_else(
                || data_dir().join("unrecognized-text.txt"),
                PathBuf::from,
            );

        Ok(Self {
            input_device: env_index("STANDIN_INPUT_DEVICE").or(fc.audio.input_device),
            output_device: env_index("STANDIN_OUTPUT_DEVICE").or(fc.audio.output_device),
            adjust_for_ambient_noise: env_flag("STANDIN_ADJUST_FOR_AMBIENT_NOISE")
                .or(fc.recognition.adjust_for_ambient_noise)
                .unwrap_or(false),
            language: std::env::var("STANDIN_LANGUAGE")
                .ok()
                .or(fc.recognition.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            stt_url: std::env::var("STANDIN_STT_URL")
                .ok()
                .or(fc.recognition.stt_url)
                .unwrap_or_else(|| DEFAULT_STT_URL.to_string()),
            stt_model: std::env::var("STANDIN_STT_MODEL")
                .ok()
                .or(fc.recognition.stt_model)
                .unwrap_or_else(|| DEFAULT_STT_MODEL.to_string()),
            stt_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .or(fc.recognition.stt_api_key),
            nlu_url: std::env::var("STANDIN_NLU_URL")
                .ok()
                .or(fc.nlu.url)
                .unwrap_or_else(|| DEFAULT_NLU_URL.to_string()),
            nlu_token,
            confidence_threshold,
            names,
            responses_dir: std::env::var("STANDIN_RESPONSES_DIR")
                .ok()
                .or(fc.responses.dir)
                .map_or_else(|| PathBuf::from(DEFAULT_RESPONSES_DIR), PathBuf::from),
            unrecognized_log,
            preprocess: PreprocessConfig {
                enabled: env_flag("STANDIN_PREPROCESS")
                    .or(fc.preprocess.enabled)
                    .unwrap_or(true),
                keep_originals: env_flag("STANDIN_KEEP_ORIGINALS")
                    .or(fc.preprocess.keep_originals)
                    .unwrap_or(true),
            },
        })
    }
}

/// Return the data directory (`~/.local/share/standin` on Linux), creating it if needed
pub fn data_dir() -> PathBuf {
    let dir = directories::BaseDirs::new().map_or_else(
        || PathBuf::from("."),
        |d| d.data_dir().join("standin"),
    );

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %e, "failed to create data directory");
    }

    dir
}

/// Parse a comma-separated names list, trimming whitespace and dropping empty segments
fn parse_names(raw: &str) -> Result<Vec<String>> {
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    if names.is_empty() {
        return Err(Error::Config(
            "names list must contain at least one name".to_string(),
        ));
    }

    Ok(names)
}

/// Validate that a confidence threshold is a fraction in [0.0, 1.0]
fn validate_threshold(threshold: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(Error::Config(format!(
            "confidence threshold must be between 0.0 and 1.0, got {threshold}"
        )))
    }
}

fn env_index(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_trims_and_drops_empty_segments() {
        let names = parse_names("alex, sam ,,").unwrap();
        assert_eq!(names, vec!["alex", "sam"]);
    }

    #[test]
    fn parse_names_rejects_empty_list() {
        assert!(parse_names("").is_err());
        assert!(parse_names(" , ,").is_err());
    }

    #[test]
    fn threshold_bounds() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(0.9).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(1.5).is_err());
    }
}
