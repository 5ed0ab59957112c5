//! Transpile command implementation.

use anyhow::{Context, Result, bail};
use console::style;
use std::fs;
use std::path::Path;

use qpass_bench::{count_cz, count_gates, count_swaps, qft, random_control_circuit};
use qpass_compile::TranspileConfig;
use qpass_ir::Circuit;

/// Load a pipeline configuration file.
fn load_config(path: &str) -> Result<TranspileConfig> {
    if !Path::new(path).exists() {
        bail!("Config file not found: {path}");
    }
    let json = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    TranspileConfig::from_json(&json).with_context(|| format!("invalid configuration in {path}"))
}

/// Execute the transpile command.
pub fn execute(
    config_path: &str,
    qft_qubits: Option<u32>,
    random_gates: Option<usize>,
    seed: u64,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let pipeline = config.build()?;
    let device_qubits = pipeline.target().num_qubits();

    let circuit: Circuit = match (qft_qubits, random_gates) {
        (Some(n), _) => qft(n)?,
        (None, Some(gates)) => random_control_circuit(device_qubits, gates, false, seed)?,
        (None, None) => bail!("pass --qft or --random to choose a circuit"),
    };

    if !json {
        println!(
            "{} Transpiling {} for {} qubits",
            style("→").cyan().bold(),
            style(circuit.name()).green(),
            style(device_qubits).yellow()
        );
        println!(
            "  Loaded: {} qubits, depth {}, {} ops",
            circuit.num_qubits(),
            circuit.depth(),
            count_gates(&circuit)
        );
        println!("  Running {} passes", pipeline.len());
    }

    let transpiled = pipeline.run(&circuit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transpiled.circuit)?);
        return Ok(());
    }

    let out = &transpiled.circuit;
    println!("{} Transpilation complete", style("✓").green().bold());
    println!(
        "  Result: depth {}, {} ops, {} CZ, {} SWAPs inserted",
        out.depth(),
        count_gates(out),
        count_cz(out),
        transpiled.swaps_inserted
    );
    if count_swaps(out) > 0 {
        println!("  {} SWAPs left unrolled", count_swaps(out));
    }
    println!(
        "  Initial layout: {:?}",
        transpiled.initial_layout.as_permutation()
    );
    println!(
        "  Final layout:   {:?}",
        transpiled.final_layout.as_permutation()
    );

    Ok(())
}
