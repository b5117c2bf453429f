use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use standin::voice::{AudioCapture, AudioPlayback, UtteranceSegmenter};
use standin::{
    AudioSink, Config, DecisionEngine, FilePreprocessor, IntentClassifier, Listener,
    ResponseLibrary, SpeechTranscriber, stop_channel,
};

/// standin - voice-activated stand-in that answers when you're called
#[derive(Parser)]
#[command(name = "standin", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Skip response clip preprocessing at startup
    #[arg(long, env = "STANDIN_NO_PREPROCESS")]
    no_preprocess: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert response clips to the canonical format and exit
    Preprocess {
        /// Delete originals after conversion
        #[arg(long)]
        delete_originals: bool,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,standin=info",
        1 => "info,standin=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Preprocess { delete_originals } => cmd_preprocess(delete_originals),
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker(),
        };
    }

    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let library = ResponseLibrary::new(&config.responses_dir);
    if config.preprocess.enabled && !cli.no_preprocess {
        let preprocessor = FilePreprocessor::new(config.preprocess.keep_originals);
        if let Err(e) = preprocessor.run(&library) {
            tracing::error!(error = %e, "preprocessing failed, continuing with existing clips");
        }
    }

    let playback = AudioPlayback::new(config.output_device)?;
    let sink = AudioSink::new(library, playback);
    let engine = DecisionEngine::new(
        sink,
        config.names.clone(),
        config.confidence_threshold,
        config.unrecognized_log.clone(),
    )?;

    let capture = AudioCapture::new(config.input_device)?;
    let transcriber = SpeechTranscriber::new(
        config.stt_url.clone(),
        config.stt_api_key.clone(),
        config.stt_model.clone(),
        config.language.clone(),
    );
    let classifier = IntentClassifier::new(config.nlu_url.clone(), config.nlu_token.clone());

    let mut listener = Listener::new(
        capture,
        UtteranceSegmenter::new(),
        transcriber,
        classifier,
        engine,
        config.adjust_for_ambient_noise,
    );

    let (handle, mut shutdown) = stop_channel();

    // ctrl-c stops the listener and lets the process exit cleanly
    let ctrlc_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            ctrlc_handle.stop();
        }
    });

    tracing::info!(names = ?config.names, "standin ready");
    listener.run(&mut shutdown).await?;

    Ok(())
}

/// Convert response clips without starting the listener
fn cmd_preprocess(delete_originals: bool) -> anyhow::Result<()> {
    let fc = standin::config::file::load_config_file();
    let dir = std::env::var("STANDIN_RESPONSES_DIR")
        .ok()
        .or(fc.responses.dir)
        .unwrap_or_else(|| standin::config::DEFAULT_RESPONSES_DIR.to_string());

    let library = ResponseLibrary::new(dir);
    FilePreprocessor::new(!delete_originals).run(&library)?;

    println!("Preprocessing complete");
    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new(None)?;
    capture.start()?;

    let sample_rate = capture.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        // Clear buffer each second
        capture.clear_buffer();
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");
    println!("  4. Try: pavucontrol (to check levels)");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::new(None)?;

    // Generate 2 seconds of 440Hz sine wave at 44.1kHz sample rate
    let sample_rate = 44_100_u32;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);

    playback.play(samples, sample_rate)?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");
    println!("  3. Try: pavucontrol (to check output levels)");

    Ok(())
}
