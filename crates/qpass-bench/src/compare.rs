//! SABRE against shortest-path routing.
//!
//! Every circuit is routed twice from the trivial layout, once per router,
//! inside the standard pipeline (preprocessing, trivial placement, routing,
//! unrolling). Circuit `i` is generated with seed `seed + i`, and SABRE
//! uses the same seed for its tie-breaks.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use qpass_compile::passes::{SabreHeuristic, SabreRouter, ShortestPathRouter, TrivialPlacer};
use qpass_compile::{
    CompileError, CompileResult, ConnectivityConfig, NativeGates, Pipeline, Router, Target,
    Transpiled,
};
use qpass_ir::Circuit;

use crate::circuits::random_control_circuit;
use crate::counts::{count_cz, count_gates};

/// Configuration for a router comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Device coupling graph.
    pub connectivity: ConnectivityConfig,
    /// Width of the random circuits; the device size if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_qubits: Option<u32>,
    /// Controlled gates per circuit.
    pub num_gates: usize,
    /// CX instead of CZ.
    pub use_cx: bool,
    /// Number of random circuits.
    pub num_circuits: usize,
    /// Seed of the first circuit.
    pub seed: u64,
    /// SABRE scoring heuristic.
    pub heuristic: SabreHeuristic,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            connectivity: ConnectivityConfig::Star { num_qubits: 5 },
            circuit_qubits: None,
            num_gates: 20,
            use_cx: false,
            num_circuits: 100,
            seed: 0,
            heuristic: SabreHeuristic::default(),
        }
    }
}

/// Results of one router over every circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterStats {
    /// Name of the router.
    pub router: String,
    /// SWAPs inserted, per circuit.
    pub swaps: Vec<usize>,
    /// Mean of `swaps`.
    pub mean_swaps: f64,
    /// Population standard deviation of `swaps`.
    pub std_swaps: f64,
    /// Fewest SWAPs on any circuit.
    pub min_swaps: usize,
    /// Most SWAPs on any circuit.
    pub max_swaps: usize,
    /// Mean CZ count after unrolling.
    pub mean_cz: f64,
    /// Mean instruction count after unrolling.
    pub mean_gates: f64,
    /// Total time spent in the pipeline.
    pub duration: Duration,
}

fn mean(values: impl Iterator<Item = usize>, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        values.sum::<usize>() as f64 / count as f64
    }
}

impl RouterStats {
    fn new(router: &str, runs: &[Transpiled], duration: Duration) -> Self {
        let swaps: Vec<usize> = runs.iter().map(|r| r.swaps_inserted).collect();
        let n = swaps.len();
        let mean_swaps = mean(swaps.iter().copied(), n);
        let variance = if n == 0 {
            0.0
        } else {
            swaps
                .iter()
                .map(|&s| (s as f64 - mean_swaps).powi(2))
                .sum::<f64>()
                / n as f64
        };

        Self {
            router: router.to_string(),
            mean_swaps,
            std_swaps: variance.sqrt(),
            min_swaps: swaps.iter().copied().min().unwrap_or(0),
            max_swaps: swaps.iter().copied().max().unwrap_or(0),
            mean_cz: mean(runs.iter().map(|r| count_cz(&r.circuit)), n),
            mean_gates: mean(runs.iter().map(|r| count_gates(&r.circuit)), n),
            duration,
            swaps,
        }
    }
}

/// Outcome of [`compare_routers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// The configuration that produced this report.
    pub config: ComparisonConfig,
    /// Shortest-path router results.
    pub shortest_path: RouterStats,
    /// SABRE router results.
    pub sabre: RouterStats,
    /// Circuits where SABRE inserted fewer SWAPs.
    pub sabre_wins: usize,
    /// Circuits where both inserted the same number.
    pub ties: usize,
    /// Circuits where shortest-path inserted fewer SWAPs.
    pub shortest_path_wins: usize,
}

impl ComparisonReport {
    /// SABRE's mean SWAP count over shortest-path's.
    ///
    /// Equals 1 when neither router inserted any SWAP.
    pub fn swap_ratio(&self) -> f64 {
        let (sabre, shortest) = (self.sabre.mean_swaps, self.shortest_path.mean_swaps);
        if shortest == 0.0 {
            if sabre == 0.0 { 1.0 } else { f64::INFINITY }
        } else {
            sabre / shortest
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> CompileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn run_standard(
    target: &Target,
    router: impl Router + 'static,
    circuit: &Circuit,
) -> CompileResult<Transpiled> {
    Pipeline::standard(target.clone(), TrivialPlacer, router)?.run(circuit)
}

/// Route `config.num_circuits` seeded random circuits with both routers.
#[instrument(skip(config), fields(circuits = config.num_circuits))]
pub fn compare_routers(config: &ComparisonConfig) -> CompileResult<ComparisonReport> {
    let connectivity = config.connectivity.build()?;
    let device_qubits = connectivity.num_qubits();
    let width = config.circuit_qubits.unwrap_or(device_qubits);
    if width > device_qubits {
        return Err(CompileError::CircuitTooLarge {
            required: width as usize,
            available: device_qubits,
        });
    }
    let target = Target::new(connectivity, NativeGates::default());

    info!(
        "Comparing routers on {} circuits of {} gates over {} qubits",
        config.num_circuits, config.num_gates, device_qubits
    );

    let mut shortest_runs = Vec::with_capacity(config.num_circuits);
    let mut sabre_runs = Vec::with_capacity(config.num_circuits);
    let mut shortest_time = Duration::ZERO;
    let mut sabre_time = Duration::ZERO;

    for i in 0..config.num_circuits {
        let seed = config.seed.wrapping_add(i as u64);
        let circuit = random_control_circuit(width, config.num_gates, config.use_cx, seed)?;

        let start = Instant::now();
        let shortest = run_standard(&target, ShortestPathRouter, &circuit)?;
        shortest_time += start.elapsed();

        let start = Instant::now();
        let sabre = run_standard(
            &target,
            SabreRouter::new(seed).with_heuristic(config.heuristic),
            &circuit,
        )?;
        sabre_time += start.elapsed();

        debug!(
            "Circuit {}: shortest-path {} swaps, sabre {} swaps",
            i, shortest.swaps_inserted, sabre.swaps_inserted
        );
        shortest_runs.push(shortest);
        sabre_runs.push(sabre);
    }

    let (mut sabre_wins, mut ties, mut shortest_path_wins) = (0, 0, 0);
    for (sp, sabre) in shortest_runs.iter().zip(&sabre_runs) {
        match sabre.swaps_inserted.cmp(&sp.swaps_inserted) {
            std::cmp::Ordering::Less => sabre_wins += 1,
            std::cmp::Ordering::Equal => ties += 1,
            std::cmp::Ordering::Greater => shortest_path_wins += 1,
        }
    }

    let report = ComparisonReport {
        config: config.clone(),
        shortest_path: RouterStats::new("shortest_path", &shortest_runs, shortest_time),
        sabre: RouterStats::new("sabre", &sabre_runs, sabre_time),
        sabre_wins,
        ties,
        shortest_path_wins,
    };
    info!(
        "Mean swaps: shortest-path {:.2}, sabre {:.2}",
        report.shortest_path.mean_swaps, report.sabre.mean_swaps
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ComparisonConfig {
        ComparisonConfig {
            num_circuits: 8,
            num_gates: 10,
            ..ComparisonConfig::default()
        }
    }

    #[test]
    fn test_report_shape() {
        let report = compare_routers(&small()).unwrap();
        assert_eq!(report.shortest_path.swaps.len(), 8);
        assert_eq!(report.sabre.swaps.len(), 8);
        assert_eq!(report.sabre_wins + report.ties + report.shortest_path_wins, 8);
        assert!(report.sabre.min_swaps as f64 <= report.sabre.mean_swaps);
        assert!(report.sabre.mean_swaps <= report.sabre.max_swaps as f64);
        // Every routed and unrolled gate is a CZ or single-qubit.
        assert!(report.sabre.mean_cz >= 10.0);
    }

    #[test]
    fn test_complete_graph_needs_no_swaps() {
        let config = ComparisonConfig {
            connectivity: ConnectivityConfig::Complete { num_qubits: 5 },
            ..small()
        };
        let report = compare_routers(&config).unwrap();
        assert_eq!(report.sabre.max_swaps, 0);
        assert_eq!(report.shortest_path.max_swaps, 0);
        assert_eq!(report.ties, 8);
        assert_eq!(report.swap_ratio(), 1.0);
    }

    #[test]
    fn test_too_wide_rejected() {
        let config = ComparisonConfig {
            circuit_qubits: Some(6),
            ..small()
        };
        assert!(matches!(
            compare_routers(&config),
            Err(CompileError::CircuitTooLarge {
                required: 6,
                available: 5
            })
        ));
    }

    #[test]
    fn test_config_json_defaults() {
        let config: ComparisonConfig =
            serde_json::from_str(r#"{ "num_circuits": 3, "heuristic": "basic" }"#).unwrap();
        assert_eq!(config.num_circuits, 3);
        assert_eq!(config.heuristic, SabreHeuristic::Basic);
        assert_eq!(config.connectivity, ConnectivityConfig::Star { num_qubits: 5 });
        assert_eq!(config.num_gates, 20);
    }
}
