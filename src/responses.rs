//! On-disk response library and audio sink
//!
//! Responses live in one directory per category: `<root>/<category>/<clip>`,
//! one category per supported intent name, clips in the canonical WAV format.

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;

use crate::engine::ResponsePlayer;
use crate::voice::AudioPlayback;
use crate::{Error, Result};

/// Canonical clip extension — everything in the library plays as WAV
pub const CANONICAL_EXTENSION: &str = "wav";

/// A directory tree of response categories
pub struct ResponseLibrary {
    root: PathBuf,
}

impl ResponseLibrary {
    /// Create a library rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the library
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List the category directories
    ///
    /// # Errors
    ///
    /// Returns error if the library root cannot be read
    pub fn categories(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }

    /// Playable clips in one category
    ///
    /// # Errors
    ///
    /// Returns error if the category directory cannot be read
    pub fn clips(&self, category: &str) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(category);
        let mut clips = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() || is_hidden(&path) {
                continue;
            }
            if path
                .extension()
                .is_some_and(|ext| ext == CANONICAL_EXTENSION)
            {
                clips.push(path);
            }
        }
        Ok(clips)
    }

    /// Pick one clip uniformly at random from a category
    ///
    /// # Errors
    ///
    /// Returns error if the category cannot be read or holds no playable clips
    pub fn choose(&self, category: &str) -> Result<PathBuf> {
        let clips = self.clips(category)?;
        clips
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| Error::Responses(format!("no playable clips in category {category}")))
    }
}

/// Whether a path's file name starts with a dot (e.g. `.gitkeep`)
pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Plays response clips on the output device
pub struct AudioSink {
    library: ResponseLibrary,
    playback: AudioPlayback,
}

impl AudioSink {
    /// Create a sink over a library and an output device
    #[must_use]
    pub fn new(library: ResponseLibrary, playback: AudioPlayback) -> Self {
        Self { library, playback }
    }
}

impl ResponsePlayer for AudioSink {
    fn play(&mut self, category: &str) -> Result<()> {
        let clip = self.library.choose(category)?;
        tracing::debug!(clip = %clip.display(), "playing response clip");

        let (samples, sample_rate) = decode_wav(&clip)?;
        self.playback.play(samples, sample_rate)
    }
}

/// Decode a WAV clip into mono f32 samples plus its sample rate
fn decode_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| Error::Audio(format!("{}: {e}", path.display())))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(e.to_string()))?,
        hound::SampleFormat::Int => {
            #[allow(clippy::cast_precision_loss)]
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Audio(e.to_string()))?
        }
    };

    let mono = match spec.channels {
        1 => samples,
        2 => samples
            .chunks(2)
            .map(|pair| f32::midpoint(pair[0], pair.get(1).copied().unwrap_or(pair[0])))
            .collect(),
        n => {
            return Err(Error::Audio(format!(
                "unsupported channel count {n} in {}",
                path.display()
            )));
        }
    };

    Ok((mono, spec.sample_rate))
}
