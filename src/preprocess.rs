//! Response library preprocessing
//!
//! Converts response clips to the canonical WAV format ahead of time so
//! playback never has to decode anything else. Already-canonical files are
//! left untouched; a clip that fails to convert is logged and skipped without
//! affecting the rest of the library.

use std::path::Path;

use crate::responses::{CANONICAL_EXTENSION, ResponseLibrary, is_hidden};
use crate::{Error, Result};

/// Converts response clips to the canonical on-disk format
pub struct FilePreprocessor {
    keep_originals: bool,
}

impl FilePreprocessor {
    /// Create a preprocessor
    ///
    /// With `keep_originals` unset, source files are deleted after a
    /// successful conversion.
    #[must_use]
    pub const fn new(keep_originals: bool) -> Self {
        Self { keep_originals }
    }

    /// Convert every non-canonical clip in every category
    ///
    /// # Errors
    ///
    /// Returns error if the library root or a category directory cannot be
    /// read; individual clip failures are logged and skipped
    pub fn run(&self, library: &ResponseLibrary) -> Result<()> {
        tracing::info!(root = %library.root().display(), "preprocessing response clips");

        for category in library.categories()? {
            tracing::debug!(category = %category.display(), "processing category");

            for entry in std::fs::read_dir(&category)? {
                let path = entry?.path();
                if !path.is_file() || is_hidden(&path) {
                    continue;
                }

                match process_file(&path) {
                    Ok(true) if !self.keep_originals => {
                        if let Err(e) = std::fs::remove_file(&path) {
                            tracing::warn!(
                                file = %path.display(),
                                error = %e,
                                "failed to remove original after conversion"
                            );
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(
                            file = %path.display(),
                            error = %e,
                            "conversion failed, leaving file untouched"
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

/// Convert one file if needed; returns whether a conversion happened
fn process_file(path: &Path) -> Result<bool> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        CANONICAL_EXTENSION => {
            tracing::trace!(file = %path.display(), "already canonical, not processing");
            Ok(false)
        }
        "mp3" => {
            convert_mp3(path)?;
            Ok(true)
        }
        _ => {
            tracing::warn!(file = %path.display(), "unsupported format, skipping");
            Ok(false)
        }
    }
}

/// Decode an MP3 clip and write the canonical WAV sibling
fn convert_mp3(path: &Path) -> Result<()> {
    let data = std::fs::read(path)?;
    let (samples, sample_rate, channels) = decode_mp3(&data)?;

    let target = path.with_extension(CANONICAL_EXTENSION);
    if let Err(e) = write_wav(&target, &samples, sample_rate, channels) {
        // Don't leave a truncated clip behind
        let _ = std::fs::remove_file(&target);
        return Err(e);
    }

    tracing::debug!(from = %path.display(), to = %target.display(), "converted clip");
    Ok(())
}

/// Decode MP3 bytes to interleaved i16 samples
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn decode_mp3(data: &[u8]) -> Result<(Vec<i16>, u32, u16)> {
    let mut decoder = minimp3::Decoder::new(std::io::Cursor::new(data));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;
    let mut channels = 0u16;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate = frame.sample_rate as u32;
                channels = frame.channels as u16;
                samples.extend_from_slice(&frame.data);
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    if samples.is_empty() {
        return Err(Error::Audio("MP3 contained no audio frames".to_string()));
    }

    Ok((samples, sample_rate, channels))
}

/// Write interleaved i16 samples as a WAV file
fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| Error::Audio(e.to_string()))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| Error::Audio(e.to_string()))?;
    }

    writer.finalize().map_err(|e| Error::Audio(e.to_string()))
}
