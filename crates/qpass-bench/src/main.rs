//! qpass benchmark command-line interface
//!
//! ```text
//! qpass-bench compare --topology star --qubits 5 --circuits 100
//! qpass-bench transpile --config pipeline.json --qft 5
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{compare, transpile};

/// Compare routers and inspect transpilation results
#[derive(Parser)]
#[command(name = "qpass-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Device coupling graphs selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Topology {
    Star,
    Line,
    Cycle,
    Complete,
    Grid,
    Iqm20,
}

/// SABRE heuristics selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Heuristic {
    Basic,
    Lookahead,
    Decay,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare shortest-path and SABRE routing on seeded random circuits
    Compare {
        /// Device coupling graph
        #[arg(short, long, value_enum, default_value = "star")]
        topology: Topology,

        /// Number of device qubits (ignored for iqm20)
        #[arg(short, long, default_value = "5")]
        qubits: u32,

        /// Grid rows; the grid has qubits / rows columns
        #[arg(long, default_value = "2")]
        rows: u32,

        /// Width of the random circuits (defaults to the device size)
        #[arg(long)]
        circuit_qubits: Option<u32>,

        /// Controlled gates per circuit
        #[arg(short, long, default_value = "20")]
        gates: usize,

        /// Number of random circuits
        #[arg(short = 'n', long, default_value = "100")]
        circuits: usize,

        /// Seed of the first circuit
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Generate CX instead of CZ
        #[arg(long)]
        cx: bool,

        /// SABRE scoring heuristic
        #[arg(long, value_enum, default_value = "decay")]
        heuristic: Heuristic,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Transpile a fixture circuit with a JSON pipeline configuration
    Transpile {
        /// Pipeline configuration file
        #[arg(short, long)]
        config: String,

        /// Use a QFT on this many qubits
        #[arg(long, conflicts_with = "random")]
        qft: Option<u32>,

        /// Use this many random CZ gates over the device
        #[arg(long)]
        random: Option<usize>,

        /// Seed of the random circuit
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Print the transpiled circuit as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Compare {
            topology,
            qubits,
            rows,
            circuit_qubits,
            gates,
            circuits,
            seed,
            cx,
            heuristic,
            json,
            output,
        } => compare::execute(
            compare::Options {
                topology,
                qubits,
                rows,
                circuit_qubits,
                gates,
                circuits,
                seed,
                cx,
                heuristic,
            },
            json,
            output.as_deref(),
        ),

        Commands::Transpile {
            config,
            qft,
            random,
            seed,
            json,
        } => transpile::execute(&config, qft, random, seed, json),
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
