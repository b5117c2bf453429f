//! Response preprocessing tests
//!
//! Exercises the conversion pass against temporary category trees.

use std::path::{Path, PathBuf};

use standin::{FilePreprocessor, ResponseLibrary};
use tempfile::TempDir;

/// Write a small valid WAV clip
fn write_wav_clip(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..1600_i32 {
        writer.write_sample((i % 128) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// List the files in a category, sorted by name
fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

#[test]
fn canonical_clips_are_left_untouched() {
    let root = TempDir::new().unwrap();
    let category = root.path().join("presence_check");
    std::fs::create_dir(&category).unwrap();

    let clip = category.join("hello.wav");
    write_wav_clip(&clip);
    let before = std::fs::read(&clip).unwrap();

    let library = ResponseLibrary::new(root.path());
    FilePreprocessor::new(true).run(&library).unwrap();

    assert_eq!(std::fs::read(&clip).unwrap(), before);
    assert_eq!(files_in(&category), [clip]);
}

#[test]
fn rerunning_on_canonical_library_is_a_no_op() {
    let root = TempDir::new().unwrap();
    let category = root.path().join("question_asked");
    std::fs::create_dir(&category).unwrap();
    write_wav_clip(&category.join("sure.wav"));

    let library = ResponseLibrary::new(root.path());
    let preprocessor = FilePreprocessor::new(false);

    preprocessor.run(&library).unwrap();
    let after_first = files_in(&category);

    preprocessor.run(&library).unwrap();
    assert_eq!(files_in(&category), after_first);
}

#[test]
fn failed_conversion_leaves_source_intact() {
    let root = TempDir::new().unwrap();
    let category = root.path().join("presence_check");
    std::fs::create_dir(&category).unwrap();

    // Not actually MP3 data
    let broken = category.join("garbage.mp3");
    std::fs::write(&broken, b"this is not an mp3").unwrap();

    let library = ResponseLibrary::new(root.path());
    // Even with deletion requested, a failed conversion must not remove the source
    FilePreprocessor::new(false).run(&library).unwrap();

    assert_eq!(
        std::fs::read(&broken).unwrap(),
        b"this is not an mp3".as_slice()
    );
    assert!(!category.join("garbage.wav").exists());
}

#[test]
fn one_bad_file_does_not_stop_the_rest() {
    let root = TempDir::new().unwrap();
    let category = root.path().join("presence_check");
    std::fs::create_dir(&category).unwrap();

    std::fs::write(category.join("broken.mp3"), b"nope").unwrap();
    let good = category.join("ok.wav");
    write_wav_clip(&good);

    let library = ResponseLibrary::new(root.path());
    FilePreprocessor::new(true).run(&library).unwrap();

    // The run finishes and the good clip is still playable
    assert!(good.exists());
    assert_eq!(library.clips("presence_check").unwrap(), [good]);
}

#[test]
fn unsupported_formats_are_skipped() {
    let root = TempDir::new().unwrap();
    let category = root.path().join("presence_check");
    std::fs::create_dir(&category).unwrap();

    let odd = category.join("note.ogg");
    std::fs::write(&odd, b"not convertible here").unwrap();

    let library = ResponseLibrary::new(root.path());
    FilePreprocessor::new(false).run(&library).unwrap();

    assert!(odd.exists());
    assert!(!category.join("note.wav").exists());
}

#[test]
fn dotfiles_are_ignored() {
    let root = TempDir::new().unwrap();
    let category = root.path().join("presence_check");
    std::fs::create_dir(&category).unwrap();

    std::fs::write(category.join(".gitkeep"), b"").unwrap();

    let library = ResponseLibrary::new(root.path());
    FilePreprocessor::new(true).run(&library).unwrap();

    assert!(category.join(".gitkeep").exists());
    assert!(library.clips("presence_check").unwrap().is_empty());
}

#[test]
fn clips_are_chosen_from_the_requested_category() {
    let root = TempDir::new().unwrap();
    for category in ["presence_check", "question_asked"] {
        let dir = root.path().join(category);
        std::fs::create_dir(&dir).unwrap();
        write_wav_clip(&dir.join("only.wav"));
    }

    let library = ResponseLibrary::new(root.path());
    let chosen = library.choose("question_asked").unwrap();
    assert_eq!(chosen, root.path().join("question_asked").join("only.wav"));
}

#[test]
fn empty_category_yields_an_error() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("presence_check")).unwrap();

    let library = ResponseLibrary::new(root.path());
    assert!(library.choose("presence_check").is_err());
}
