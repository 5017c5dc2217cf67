//! focus-eeg - run the attention telemetry pipeline from the command line
//!
//! Commands:
//! - run: drive the pipeline and publish sealed records
//! - check-config: load, validate and summarize the effective configuration
//! - print-config: print the effective configuration as TOML (keys redacted)
//! - decode: read framed messages from stdin and print the decrypted records

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use focus_eeg_core::config::{CameraBackend, ConfigLoader, SinkKind, SystemConfig};
use focus_eeg_core::error::{FocusResult, IntoFocusError};
use focus_eeg_core::pipeline::{FocusPipeline, StopToken};
use focus_eeg_core::telemetry::{open_message, AesCbcEnvelope};
use focus_eeg_core::VERSION;

/// Webcam attention cues to encrypted synthetic EEG telemetry
#[derive(Parser)]
#[command(name = "focus-eeg")]
#[command(version = VERSION)]
#[command(about = "Synthesize EEG band-power telemetry from webcam attention cues", long_about = None)]
struct Cli {
    /// Explicit configuration file (highest-precedence file layer)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Preset applied before any configuration file
    #[arg(long, global = true, default_value = "classic")]
    variant: Variant,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the pipeline until interrupted or the frame limit is reached
    Run {
        /// Stop after this many processed frames
        #[arg(long)]
        max_frames: Option<u64>,

        /// Override the configured sink
        #[arg(long)]
        sink: Option<SinkArg>,

        /// Override the configured camera backend
        #[arg(long)]
        camera: Option<CameraArg>,

        /// Camera index or stream URL for the OpenCV backend
        #[arg(long)]
        source: Option<String>,

        /// Seed for the simulated subject and synthesis noise
        #[arg(long)]
        seed: Option<u64>,

        /// Show the annotated debug window (needs the opencv feature)
        #[arg(long)]
        show: bool,
    },

    /// Load and validate the configuration, then print a summary
    CheckConfig,

    /// Print the effective configuration as TOML with key material redacted
    PrintConfig,

    /// Decrypt framed messages read line by line from stdin
    Decode,
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    /// Gaze threshold 0.4 with head-velocity tracking
    Classic,
    /// Gaze threshold 0.5, no head-velocity modelling
    Adhd,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkArg {
    Stdout,
    Redis,
    Zmq,
}

#[derive(Clone, Copy, ValueEnum)]
enum CameraArg {
    Simulated,
    Opencv,
}

fn main() -> ExitCode {
    // Records go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "focus-eeg failed");
            ExitCode::FAILURE
        }
    }
}

fn loader_for(cli: &Cli) -> ConfigLoader {
    let base = match cli.variant {
        Variant::Classic => SystemConfig::classic(),
        Variant::Adhd => SystemConfig::adhd(),
    };
    let loader = ConfigLoader::new().with_base(base);
    match &cli.config {
        Some(path) => loader.with_file(path),
        None => loader,
    }
}

fn run(cli: Cli) -> FocusResult<()> {
    let mut loader = loader_for(&cli);

    match cli.command {
        Commands::Run {
            max_frames,
            sink,
            camera,
            source,
            seed,
            show,
        } => {
            let mut config = loader.load_system_config()?;
            if max_frames.is_some() {
                config.run.max_frames = max_frames;
            }
            if let Some(sink) = sink {
                config.telemetry.sink = match sink {
                    SinkArg::Stdout => SinkKind::Stdout,
                    SinkArg::Redis => SinkKind::Redis,
                    SinkArg::Zmq => SinkKind::Zmq,
                };
            }
            if let Some(camera) = camera {
                config.camera.backend = match camera {
                    CameraArg::Simulated => CameraBackend::Simulated,
                    CameraArg::Opencv => CameraBackend::Opencv,
                };
            }
            if let Some(source) = source {
                config.camera.source = source;
            }
            if seed.is_some() {
                config.synthesis.seed = seed;
            }
            config.run.show_debug_window |= show;
            cmd_run(&config)
        }
        Commands::CheckConfig => {
            let config = loader.load_system_config()?;
            println!("configuration OK\n{}", config.get_summary());
            Ok(())
        }
        Commands::PrintConfig => {
            let config = loader.load_system_config()?;
            let text = toml::to_string_pretty(&config.redacted()).focus_err("config", "serialize")?;
            print!("{}", text);
            Ok(())
        }
        Commands::Decode => {
            let config = loader.load_system_config()?;
            cmd_decode(&config)
        }
    }
}

fn cmd_run(config: &SystemConfig) -> FocusResult<()> {
    info!("\n{}", config.get_summary());
    let mut pipeline = FocusPipeline::from_config(config)?;
    let summary = pipeline.run(&StopToken::new());

    let report = serde_json::to_string(&summary).focus_err("report", "serialize")?;
    eprintln!("{}", report);
    Ok(())
}

fn cmd_decode(config: &SystemConfig) -> FocusResult<()> {
    let envelope = AesCbcEnvelope::from_hex(&config.telemetry.key_hex, &config.telemetry.iv_hex)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line.focus_err("decode", "read_stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match open_message(&envelope, &line) {
            Ok((topic, json, _)) => {
                writeln!(stdout, "{} {}", topic, json).focus_err("decode", "write_stdout")?;
            }
            Err(e) => warn!(line = line_no + 1, error = %e, "could not decode message"),
        }
    }
    Ok(())
}
