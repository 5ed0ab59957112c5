//! Compare command implementation.

use anyhow::{Context, Result, bail};
use console::style;
use std::fs;

use qpass_bench::{ComparisonConfig, ComparisonReport, RouterStats, compare_routers};
use qpass_compile::ConnectivityConfig;
use qpass_compile::passes::SabreHeuristic;

use crate::{Heuristic, Topology};

/// Command-line settings of a comparison.
pub struct Options {
    pub topology: Topology,
    pub qubits: u32,
    pub rows: u32,
    pub circuit_qubits: Option<u32>,
    pub gates: usize,
    pub circuits: usize,
    pub seed: u64,
    pub cx: bool,
    pub heuristic: Heuristic,
}

fn connectivity(options: &Options) -> Result<ConnectivityConfig> {
    let num_qubits = options.qubits;
    Ok(match options.topology {
        Topology::Star => ConnectivityConfig::Star { num_qubits },
        Topology::Line => ConnectivityConfig::Line { num_qubits },
        Topology::Cycle => ConnectivityConfig::Cycle { num_qubits },
        Topology::Complete => ConnectivityConfig::Complete { num_qubits },
        Topology::Grid => {
            let rows = options.rows;
            if rows == 0 || num_qubits % rows != 0 {
                bail!("{num_qubits} qubits do not form a grid with {rows} rows");
            }
            ConnectivityConfig::Grid {
                rows,
                cols: num_qubits / rows,
            }
        }
        Topology::Iqm20 => ConnectivityConfig::Iqm20,
    })
}

/// Execute the compare command.
pub fn execute(options: Options, json: bool, output: Option<&str>) -> Result<()> {
    let config = ComparisonConfig {
        connectivity: connectivity(&options)?,
        circuit_qubits: options.circuit_qubits,
        num_gates: options.gates,
        use_cx: options.cx,
        num_circuits: options.circuits,
        seed: options.seed,
        heuristic: match options.heuristic {
            Heuristic::Basic => SabreHeuristic::Basic,
            Heuristic::Lookahead => SabreHeuristic::Lookahead,
            Heuristic::Decay => SabreHeuristic::Decay,
        },
    };

    if !json {
        println!(
            "{} Comparing routers on {} random circuits ({} gates each)",
            style("→").cyan().bold(),
            style(config.num_circuits).yellow(),
            config.num_gates
        );
    }

    let report = compare_routers(&config).context("router comparison failed")?;

    if let Some(path) = output {
        fs::write(path, report.to_json()?)
            .with_context(|| format!("failed to write report to {path}"))?;
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
        if let Some(path) = output {
            println!("  Report: {}", style(path).green());
        }
    }

    Ok(())
}

fn print_stats(stats: &RouterStats) {
    println!(
        "  {:<14} {:>8.2} {:>8.2} {:>6} {:>6} {:>8.1} {:>10}",
        stats.router,
        stats.mean_swaps,
        stats.std_swaps,
        stats.min_swaps,
        stats.max_swaps,
        stats.mean_cz,
        format!("{:.1?}", stats.duration)
    );
}

fn print_report(report: &ComparisonReport) {
    println!("{} Comparison complete", style("✓").green().bold());
    println!();
    println!(
        "  {:<14} {:>8} {:>8} {:>6} {:>6} {:>8} {:>10}",
        style("router").bold(),
        style("mean").bold(),
        style("std").bold(),
        style("min").bold(),
        style("max").bold(),
        style("cz").bold(),
        style("time").bold()
    );
    print_stats(&report.shortest_path);
    print_stats(&report.sabre);
    println!();
    println!(
        "  SABRE fewer SWAPs on {}, equal on {}, more on {}",
        style(report.sabre_wins).green(),
        report.ties,
        style(report.shortest_path_wins).red()
    );

    let ratio = report.swap_ratio();
    let ratio = if ratio <= 1.0 {
        style(format!("{ratio:.3}")).green()
    } else {
        style(format!("{ratio:.3}")).red()
    };
    println!("  Mean SWAP ratio (sabre / shortest-path): {ratio}");
}
