//! Rigid CLI: benchmarking, offline deformation and validation.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rigid")]
#[command(version, about = "Rigid: as-rigid-as-possible surface deformation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (translate_triangle, grid_bend, strip_twist, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,

        /// Solver config (TOML) replacing each scenario's own.
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Deform a scenario and write the final positions as JSON.
    Deform {
        /// Scenario to deform.
        #[arg(short, long, default_value = "grid_bend")]
        scenario: String,

        /// Number of frames (defaults to the scenario's own).
        #[arg(short, long)]
        frames: Option<u32>,

        /// Output JSON file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<String>,

        /// Solver config (TOML).
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a solver config (.toml) or mesh (.json).
    Validate {
        /// Path to mesh or config file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Benchmark {
            scenario,
            output,
            config,
        } => commands::benchmark(&scenario, output.as_deref(), config.as_deref()),
        Commands::Deform {
            scenario,
            frames,
            output,
            config,
        } => commands::deform(&scenario, frames, output.as_deref(), config.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
