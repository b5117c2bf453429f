//! TOML configuration file loading
//!
//! Supports `~/.config/standin/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct StandinConfigFile {
    /// Audio device configuration
    #[serde(default)]
    pub audio: AudioFileConfig,

    /// Speech recognition configuration
    #[serde(default)]
    pub recognition: RecognitionFileConfig,

    /// NLU service configuration
    #[serde(default)]
    pub nlu: NluFileConfig,

    /// Response library configuration
    #[serde(default)]
    pub responses: ResponsesFileConfig,

    /// Clip preprocessing configuration
    #[serde(default)]
    pub preprocess: PreprocessFileConfig,
}

/// Audio device selection
#[derive(Debug, Default, Deserialize)]
pub struct AudioFileConfig {
    /// Input device index (omit for the system default)
    pub input_device: Option<usize>,

    /// Output device index (omit for the system default)
    pub output_device: Option<usize>,
}

/// Speech recognition configuration
#[derive(Debug, Default, Deserialize)]
pub struct RecognitionFileConfig {
    /// Rebaseline the noise threshold before listening starts
    pub adjust_for_ambient_noise: Option<bool>,

    /// Recognition language tag (e.g. "en-US")
    pub language: Option<String>,

    /// Transcription endpoint URL
    pub stt_url: Option<String>,

    /// Transcription model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Transcription API key
    pub stt_api_key: Option<String>,
}

/// NLU service configuration
#[derive(Debug, Default, Deserialize)]
pub struct NluFileConfig {
    /// Access token for the NLU service
    pub access_token: Option<String>,

    /// NLU endpoint URL
    pub url: Option<String>,

    /// Minimum confidence for intents and entities (0.0 to 1.0)
    pub confidence_threshold: Option<f32>,

    /// Comma-separated addressee names the bot answers to
    pub names: Option<String>,
}

/// Response library configuration
#[derive(Debug, Default, Deserialize)]
pub struct ResponsesFileConfig {
    /// Root directory of the response categories
    pub dir: Option<String>,

    /// Path of the unrecognized-utterance record
    pub unrecognized_log: Option<String>,
}

/// Clip preprocessing configuration
#[derive(Debug, Default, Deserialize)]
pub struct PreprocessFileConfig {
    /// Convert response clips at startup
    pub enabled: Option<bool>,

    /// Keep originals after conversion
    pub keep_originals: Option<bool>,
}

/// Load the TOML config file from the standard path
///
/// Returns `StandinConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> StandinConfigFile {
    let Some(path) = config_file_path() else {
        return StandinConfigFile::default();
    };

    if !path.exists() {
        return StandinConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                StandinConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            StandinConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/standin/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("standin").join("config.toml"))
}
