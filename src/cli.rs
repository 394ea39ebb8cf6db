use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wavscope::audio::{self, AnalysisTask, AudioError, ExecutionMode, Readiness, WavFile};
use wavscope::{config, display};

/// WAV oscilloscope and fundamental frequency estimator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input WAV file
    #[arg(required = true)]
    wav_file: PathBuf,

    /// Configuration file to read
    #[arg(long, default_value = config::CONFIG_FILE, value_name = "FILE")]
    config: PathBuf,

    /// Run the spectral analysis on the main thread instead of in the background
    #[arg(long)]
    inline: bool,

    /// Number of samples per analysis window (default: half a second)
    #[arg(long)]
    window_size: Option<usize>,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config_from(&args.config)?;

    let mut analysis_config = config.analysis.to_analysis_config();
    if args.inline {
        analysis_config.mode = ExecutionMode::Inline;
    }
    if args.window_size.is_some() {
        analysis_config.window_size = args.window_size;
    }

    // Decoding and normalization finish before analysis starts
    let wav = WavFile::open(&args.wav_file)?;
    let normalized = audio::normalize_samples(&wav)?;
    let sample_rate = wav.header().sample_rate;

    println!("{}", display::window_title(&args.wav_file));
    println!("{}", wav.readable_header());
    println!("Samples: {}", wav.sample_size());

    let window_size = analysis_config.checked_window_size(sample_rate)?;
    let window = audio::raw_window(&wav, window_size);
    let mut task = AnalysisTask::launch(window, sample_rate, analysis_config)?;

    let columns = display::oscilloscope_columns(&normalized, &config.display);
    tracing::debug!(columns = columns.len(), "laid out oscilloscope view");

    // Headless stand-in for the render loop: one bounded poll per frame
    let mut frames: u64 = 0;
    while task.poll() == Readiness::Pending {
        if task.is_lost() {
            return Err("analysis worker exited without a result".into());
        }
        frames += 1;
    }
    tracing::debug!(frames, "analysis ready");

    let result = task
        .take()
        .map_err(|_| "analysis reported ready without a result")?;
    println!("{}", display::frequency_label(&result));

    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
        match err.downcast_ref::<AudioError>() {
            Some(AudioError::FileOpen { .. }) | Some(AudioError::InvalidContainer(_)) => {
                eprintln!(
                    "Cannot open '{}' its not a valid wav file!! ({})",
                    args.wav_file.display(),
                    err
                );
            }
            Some(AudioError::UnsupportedBitDepth(_)) => {
                eprintln!(
                    "Unknown bitrate!! Cannot interpret '{}' ({})",
                    args.wav_file.display(),
                    err
                );
            }
            _ => eprintln!("\nERROR: {}\n", err),
        }
        process::exit(1);
    }
}
