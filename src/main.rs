mod audio;
mod background;
mod celebration;
mod colors;
mod config;
mod creatures;
mod driver;
mod entities;
mod error;
mod font;
mod help;
mod input;
mod raster;
mod scene;
mod sequence;
mod settings;
mod sprites;
mod terminal;
mod tree;

use clap::{Parser, Subcommand};
use settings::Settings;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "goldenrain")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "A golden rain tree in your terminal: type, click and swipe to make things happen", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive scene (default)
    Play {
        /// Frames per second
        #[arg(short, long)]
        fps: Option<u32>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// No sound at all
        #[arg(short, long)]
        mute: bool,

        /// Sound effects but no background music
        #[arg(long)]
        no_music: bool,
    },
    /// Print a single frame to stdout
    Print {
        /// Width in columns (defaults to the terminal width)
        #[arg(short = 'W', long)]
        width: Option<u16>,

        /// Height in rows (defaults to the terminal height)
        #[arg(short = 'H', long)]
        height: Option<u16>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Frames to simulate before printing
        #[arg(short, long, default_value = "120")]
        ticks: u32,
    },
}

fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("goldenrain")
        .join("goldenrain.log")
}

/// Log to a file; stdout belongs to the scene. Logging is best effort.
fn init_logging() {
    let path = log_path();
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let Ok(file) = File::create(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("GOLDENRAIN_LOG").unwrap_or_else(|_| EnvFilter::new("goldenrain=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command.unwrap_or(Commands::Play {
        fps: None,
        seed: None,
        mute: false,
        no_music: false,
    }) {
        Commands::Play {
            fps,
            seed,
            mute,
            no_music,
        } => {
            let mut config = Settings::load().scene_config();
            if let Some(fps) = fps {
                config.fps = fps.clamp(1, 240);
            }
            if seed.is_some() {
                config.seed = seed;
            }
            config.audio &= !mute;
            config.music &= !no_music;
            driver::run(config)?;
        }
        Commands::Print {
            width,
            height,
            seed,
            ticks,
        } => {
            let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
            driver::print(width.unwrap_or(cols).max(1), height.unwrap_or(rows).max(1), seed, ticks)?;
        }
    }

    Ok(())
}
