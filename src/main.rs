// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use pinch_sketch::Config;
use pinch_sketch::constants::{APP_DIR_NAME, DEFAULT_FPS};
use pinch_sketch::gesture::{MappingPolicy, ThresholdUnit};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "pinch-sketch")]
#[command(about = "Draw with pinch gestures from hand-landmark detections")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/pinch-sketch/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How detector frames are fitted into the drawing surface
    #[arg(long, global = true)]
    mapping: Option<MappingArg>,

    /// Unit of the pinch threshold
    #[arg(long, global = true)]
    threshold_unit: Option<UnitArg>,

    /// Pinch threshold in the selected unit
    #[arg(long, global = true)]
    threshold: Option<f32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum MappingArg {
    Stretch,
    Letterbox,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    /// Display pixels
    Pixels,
    /// Fraction of the hand span
    Span,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive sketch pad in the terminal (mouse drives a synthetic hand)
    Terminal {
        /// Record the synthesized detection frames as a replayable trace
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Run a recorded detection trace (JSON lines) and save the sketch
    Replay {
        /// Trace file
        trace: PathBuf,

        /// Output PNG path or directory (default: ~/Pictures/pinch-sketch/)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame rate for realtime playback
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: u32,

        /// Publish frames on a clock instead of processing each one
        #[arg(long)]
        realtime: bool,

        /// Learn the pinch threshold from grabs
        #[arg(long)]
        adaptive: bool,

        /// Classify the finished sketch
        #[arg(long)]
        classify: bool,
    },

    /// Sketch from a detector process printing JSON lines, until it exits
    Detect {
        /// Output PNG path or directory (default: ~/Pictures/pinch-sketch/)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame loop rate
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: u32,

        /// Learn the pinch threshold from grabs
        #[arg(long)]
        adaptive: bool,

        /// Classify the finished sketch
        #[arg(long)]
        classify: bool,

        /// Detector command and arguments
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Classify an existing image with the configured classifier
    Classify {
        /// Image file
        image: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=pinch_sketch=debug, RUST_LOG=info
    init_logging(matches!(cli.command, Commands::Terminal { .. }))?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(mapping) = cli.mapping {
        config.mapping_policy = match mapping {
            MappingArg::Stretch => MappingPolicy::Stretch,
            MappingArg::Letterbox => MappingPolicy::Letterbox,
        };
    }
    if let Some(unit) = cli.threshold_unit {
        config.threshold_unit = match unit {
            UnitArg::Pixels => ThresholdUnit::DisplayPixels,
            UnitArg::Span => ThresholdUnit::HandSpan,
        };
    }
    if cli.threshold.is_some() {
        config.pinch_threshold = cli.threshold;
    }
    let mut config = config.validated();

    match cli.command {
        Commands::Terminal { record } => pinch_sketch::terminal::run(config, record)?,
        Commands::Replay {
            trace,
            output,
            fps,
            realtime,
            adaptive,
            classify,
        } => {
            config.adaptive_threshold |= adaptive;
            let options = cli::RunOptions {
                output,
                fps,
                classify,
            };
            cli::replay_trace(config, trace, options, realtime)?;
        }
        Commands::Detect {
            output,
            fps,
            adaptive,
            classify,
            command,
        } => {
            config.adaptive_threshold |= adaptive;
            let options = cli::RunOptions {
                output,
                fps,
                classify,
            };
            cli::run_detector(config, command, options)?;
        }
        Commands::Classify { image } => cli::classify_image(config, image)?,
    }

    Ok(())
}

/// Log to stderr, or to a file in the cache directory for the terminal UI
fn init_logging(to_file: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    if to_file {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME);
        std::fs::create_dir_all(&dir)?;
        let file = std::fs::File::create(dir.join("terminal.log"))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
