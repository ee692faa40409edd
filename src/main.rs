//! CLI entry point: analyse a trajectory CSV, print its labels and save results.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use mpal_rs::analysis::Analysis;
use mpal_rs::labels::Axis;
use mpal_rs::{analyze, export, input, load_config, AnalysisConfig, LabelThresholds, Level};

/// Motion pattern analysis CLI
#[derive(Parser, Debug)]
#[command(name = "mpal", about = "Hierarchical direction labeling of 3D trajectories.")]
pub struct Cli {
    /// Path to a TOML config file (overrides defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyse a trajectory and print the labels of one level
    Analyze {
        /// Trajectory CSV
        input: PathBuf,
        /// Processing level to print (1, 2 or 3)
        #[arg(short, long, default_value_t = 3, value_parser = parse_level)]
        level: u8,
        /// Save the full analysis as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Save the level-3 hash table as CSV
        #[arg(long)]
        hash_csv: Option<PathBuf>,
        /// Save the processed points as CSV
        #[arg(long)]
        points_csv: Option<PathBuf>,
    },
    /// Analyse, then relabel with new thresholds and print level 3
    Rerun {
        /// Trajectory CSV
        input: PathBuf,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long)]
        z: f64,
        /// Main-direction threshold in steps
        #[arg(long)]
        main: usize,
    },
}

fn parse_level(s: &str) -> Result<u8, String> {
    let value: u8 = s.parse().map_err(|_| format!("'{}' is not a level number", s))?;
    Level::try_from(value).map(|_| value)
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => {
            let path = path.to_str().ok_or("Config path is not valid UTF-8")?;
            tracing::info!("Loading configuration from: {}", path);
            load_config(path)?
        }
        None => AnalysisConfig::default(),
    };

    match &cli.command {
        Commands::Analyze { input, level, json, hash_csv, points_csv } => {
            let analysis = load_and_analyze(input, &config)?;
            print_level(&analysis, Level::try_from(*level)?);
            if let Some(path) = json {
                export::write_json(&analysis, path)?;
            }
            if let Some(path) = hash_csv {
                export::write_hash_csv(&analysis, path)?;
            }
            if let Some(path) = points_csv {
                export::write_points_csv(&analysis, path)?;
            }
        }
        Commands::Rerun { input, x, y, z, main } => {
            let analysis = load_and_analyze(input, &config)?;
            let thresholds = LabelThresholds::new(*x, *y, *z, *main)?;
            print_level(&analysis.rerun(thresholds), Level::Three);
        }
    }
    Ok(())
}

fn load_and_analyze(path: &Path, config: &AnalysisConfig) -> Result<Analysis, Box<dyn std::error::Error>> {
    let points = input::read_points(path, &config.input)?;
    Ok(analyze(&points, config)?)
}

fn print_level(analysis: &Analysis, level: Level) {
    match level {
        Level::One => {
            for axis in Axis::ALL {
                println!("{}: {}", axis, analysis.level1().axis_symbols(axis));
            }
        }
        Level::Two => {
            for axis in Axis::ALL {
                println!("{}: {}", axis, analysis.level2().axis_symbols(axis));
            }
            println!("boundaries: {:?}", analysis.level2().boundaries());
        }
        Level::Three => {
            let level3 = analysis.level3();
            for ((hash, frame), idx) in level3.hashes().iter().zip(level3.boundaries()).zip(analysis.pre_post_index()) {
                println!("{}\t{}\t{}", hash, frame, idx);
            }
        }
    }
}
