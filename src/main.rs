mod branch;
mod canvas;
mod colors;
mod config;
mod forest;
mod garden;
mod growth;
mod season;
mod settings;
mod surface;
mod terminal;
mod tree;

use clap::{Parser, Subcommand};
use config::{frame_delay, ForestConfig, GardenConfig, MinMax, Variant};
use settings::Settings;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{warn, Level};

#[derive(Parser)]
#[command(name = "seasonwood")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "seasonwood: trees that grow toward the sun while the seasons turn", long_about = None)]
struct Cli {
    /// Write log events to this file
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow a forest
    Grow {
        /// Growth behavior
        #[arg(short, long, value_enum)]
        variant: Option<Variant>,

        /// Number of trees (default: random 1-5)
        #[arg(short = 'n', long)]
        trees: Option<u32>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Animation step delay in seconds
        #[arg(short, long, default_value = "0.03")]
        time: f32,

        /// Print one frame to stdout (no interactive display)
        #[arg(short, long)]
        print: bool,

        /// Frames to simulate before printing
        #[arg(short, long, default_value = "300")]
        frames: u32,

        /// Print width in columns (default: terminal width)
        #[arg(long)]
        width: Option<u16>,

        /// Print height in rows (default: terminal height)
        #[arg(long)]
        height: Option<u16>,

        /// Show season and branch counts
        #[arg(short = 'i', long)]
        hud: bool,
    },

    /// Show the settings file location and the effective settings
    Config {
        /// Show built-in defaults instead of the settings file
        #[arg(short, long)]
        default: bool,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let loaded = Settings::load();
    let log_file = cli
        .log
        .clone()
        .or_else(|| loaded.as_ref().ok().and_then(|s| s.log_file.clone()));
    if let Some(path) = &log_file {
        init_logging(path, cli.log_level)?;
    }

    let settings = loaded.unwrap_or_else(|err| {
        warn!(%err, "ignoring settings file");
        eprintln!("warning: {}", err);
        Settings::default()
    });

    match cli.command {
        Commands::Grow {
            variant,
            trees,
            seed,
            time,
            print,
            frames,
            width,
            height,
            hud,
        } => {
            let mut forest = effective_config(&settings);
            if let Some(variant) = variant {
                forest.set_variant(variant);
            }
            if let Some(n) = trees {
                forest.trees = MinMax::fixed(n);
            }
            let config = GardenConfig {
                print,
                time_step: frame_delay(time),
                frames,
                width,
                height,
                hud,
                seed,
                forest,
            };
            garden::run(config)?;
        }
        Commands::Config { default } => {
            println!("# {}", Settings::config_path().display());
            let shown = if default {
                Settings::describe(&ForestConfig::new(Variant::Sprout, 0), None)
            } else {
                Settings::describe(&effective_config(&settings), settings.log_file.clone())
            };
            let text = shown
                .to_toml()
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            print!("{}", text);
        }
    }

    Ok(())
}

/// Built-in defaults with the settings file laid over them
fn effective_config(settings: &Settings) -> ForestConfig {
    let mut config = ForestConfig::new(Variant::Sprout, 0);
    if let Err(err) = settings.apply(&mut config) {
        warn!(%err, "ignoring settings file");
        eprintln!("warning: {}", err);
    }
    config
}

fn init_logging(path: &Path, level: Level) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}
