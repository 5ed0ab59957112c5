//! SABRE SWAP-based heuristic routing.
//!
//! The router walks the circuit's [`DependencyDag`] keeping a *front layer*
//! of instructions whose predecessors have all been emitted. Front gates on
//! coupled qubits (and every non-two-qubit instruction) run immediately.
//! When every front gate is blocked, each SWAP on an edge touching a front
//! qubit is scored and the cheapest one is applied.
//!
//! Scoring is pluggable through [`SwapScore`]. The built-in
//! [`SabreHeuristic`]s follow Li, Ding and Xie, *Tackling the Qubit Mapping
//! Problem for NISQ-Era Quantum Devices* (ASPLOS 2019):
//!
//! - `Basic`: sum of front-layer distances after the SWAP
//! - `Lookahead`: normalized front cost plus a weighted, normalized cost
//!   over the *extended set* (the next [`EXTENDED_SET_SIZE`] two-qubit gates)
//! - `Decay`: lookahead scaled by the larger decay of the two swapped qubits,
//!   which discourages serial SWAPs on the same qubits
//!
//! If routing stalls for more than `10 * n` SWAPs, the stalled SWAPs are
//! undone and the closest front gate is routed greedily, moving both of its
//! qubits toward the middle of a shortest path.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qpass_ir::{Circuit, DependencyDag, Instruction, QubitId};

use super::{RoutingState, is_blocked};
use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::{Routed, Router};

/// Number of upcoming two-qubit gates in the extended set.
pub const EXTENDED_SET_SIZE: usize = 20;
/// Weight of the extended set relative to the front layer.
pub const EXTENDED_SET_WEIGHT: f64 = 0.5;
/// Decay added to both qubits of each chosen SWAP.
pub const DECAY_RATE: f64 = 0.001;
/// Search steps between decay resets.
pub const DECAY_RESET_INTERVAL: usize = 5;

/// Scores within this margin of the best count as ties.
const SCORE_TOLERANCE: f64 = 1e-10;

/// Built-in SWAP scoring heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SabreHeuristic {
    /// Sum of front-layer distances.
    Basic,
    /// Front layer plus weighted extended set, both normalized.
    Lookahead,
    /// Lookahead scaled by qubit decay.
    #[default]
    Decay,
}

/// Everything a [`SwapScore`] may look at when scoring one candidate SWAP.
///
/// Pairs are logical qubits; `layout` is the layout *before* the SWAP.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    /// Logical qubit pairs of the blocked front-layer gates.
    pub front_layer: &'a [[QubitId; 2]],
    /// Logical qubit pairs of upcoming two-qubit gates.
    pub extended_set: &'a [[QubitId; 2]],
    /// Current layout.
    pub layout: &'a Layout,
    /// Device connectivity.
    pub connectivity: &'a Connectivity,
    /// The candidate SWAP, as two coupled physical qubits.
    pub swap: (u32, u32),
    /// Decay per physical qubit.
    pub decay: &'a [f64],
    /// Weight of the extended set.
    pub extended_set_weight: f64,
}

impl ScoreContext<'_> {
    /// Physical qubit of `logical` once the candidate SWAP is applied.
    pub fn physical_after_swap(&self, logical: QubitId) -> u32 {
        let p = self.layout.physical(logical.0);
        if p == self.swap.0 {
            self.swap.1
        } else if p == self.swap.1 {
            self.swap.0
        } else {
            p
        }
    }

    /// Distance between the qubits of `pair` after the SWAP. Unreachable
    /// pairs cost the device size.
    pub fn distance_after_swap(&self, pair: &[QubitId; 2]) -> f64 {
        let d = self
            .connectivity
            .distance(
                self.physical_after_swap(pair[0]),
                self.physical_after_swap(pair[1]),
            )
            .unwrap_or(self.connectivity.num_qubits());
        f64::from(d)
    }

    /// Summed distance over `layer` after the SWAP.
    pub fn layer_cost(&self, layer: &[[QubitId; 2]]) -> f64 {
        layer.iter().map(|pair| self.distance_after_swap(pair)).sum()
    }

    /// Summed front-layer distance after the SWAP.
    pub fn front_cost(&self) -> f64 {
        self.layer_cost(self.front_layer)
    }

    /// Normalized front cost plus the weighted, normalized extended cost.
    pub fn lookahead_cost(&self) -> f64 {
        let front = self.front_cost() / self.front_layer.len().max(1) as f64;
        if self.extended_set.is_empty() {
            return front;
        }
        let extended = self.layer_cost(self.extended_set) / self.extended_set.len() as f64;
        front + self.extended_set_weight * extended
    }

    /// The larger decay of the two swapped qubits.
    pub fn swap_decay(&self) -> f64 {
        let (a, b) = self.swap;
        self.decay[a as usize].max(self.decay[b as usize])
    }
}

/// Cost of a candidate SWAP; the router applies the lowest.
///
/// Implemented by [`SabreHeuristic`] and by any closure
/// `Fn(&ScoreContext<'_>) -> f64`, which makes calibration-aware costs easy
/// to plug in.
pub trait SwapScore: Send + Sync {
    /// Score one candidate.
    fn score(&self, ctx: &ScoreContext<'_>) -> f64;
}

impl SwapScore for SabreHeuristic {
    fn score(&self, ctx: &ScoreContext<'_>) -> f64 {
        match self {
            SabreHeuristic::Basic => ctx.front_cost(),
            SabreHeuristic::Lookahead => ctx.lookahead_cost(),
            SabreHeuristic::Decay => ctx.swap_decay() * ctx.lookahead_cost(),
        }
    }
}

impl<F> SwapScore for F
where
    F: Fn(&ScoreContext<'_>) -> f64 + Send + Sync,
{
    fn score(&self, ctx: &ScoreContext<'_>) -> f64 {
        self(ctx)
    }
}

/// SABRE router.
pub struct SabreRouter {
    scorer: Box<dyn SwapScore>,
    scorer_name: String,
    seed: u64,
    /// Total search steps before every stall takes the release valve.
    iteration_cap: Option<usize>,
}

impl std::fmt::Debug for SabreRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SabreRouter")
            .field("scorer", &self.scorer_name)
            .field("seed", &self.seed)
            .field("iteration_cap", &self.iteration_cap)
            .finish()
    }
}

impl SabreRouter {
    /// Create a router with the decay heuristic and the given tie-break seed.
    pub fn new(seed: u64) -> Self {
        Self {
            scorer: Box::new(SabreHeuristic::Decay),
            scorer_name: "decay".into(),
            seed,
            iteration_cap: None,
        }
    }

    /// Use a built-in heuristic.
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: SabreHeuristic) -> Self {
        self.scorer = Box::new(heuristic);
        self.scorer_name = format!("{heuristic:?}").to_lowercase();
        self
    }

    /// Use a custom SWAP cost.
    #[must_use]
    pub fn with_scorer(mut self, scorer: impl SwapScore + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self.scorer_name = "custom".into();
        self
    }

    /// Cap the total number of scored search steps.
    #[must_use]
    pub fn with_iteration_cap(mut self, steps: usize) -> Self {
        self.iteration_cap = Some(steps);
        self
    }

    /// The tie-break seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// The two qubits of a two-qubit instruction.
fn qubit_pair(inst: &Instruction) -> [QubitId; 2] {
    [inst.qubits[0], inst.qubits[1]]
}

/// Look ahead from `front` through the DAG, collecting the qubit pairs of
/// two-qubit gates as they become ready, until about `limit` are found.
fn extended_set(
    dag: &DependencyDag,
    instructions: &[Instruction],
    front: &[usize],
    remaining: &[usize],
    limit: usize,
) -> Vec<[QubitId; 2]> {
    let mut counts = remaining.to_vec();
    let mut extended = Vec::new();
    let mut layer = front.to_vec();

    'search: while !layer.is_empty() {
        let mut next = Vec::new();
        for &index in &layer {
            for succ in dag.successors(DependencyDag::node(index)) {
                let s = dag.instruction_index(succ);
                counts[s] -= 1;
                if counts[s] == 0 {
                    next.push(s);
                    if instructions[s].is_two_qubit_gate() {
                        extended.push(qubit_pair(&instructions[s]));
                    }
                }
            }
            if extended.len() >= limit {
                break 'search;
            }
        }
        layer = next;
    }
    extended
}

/// Route the closest blocked pair along a shortest path, moving both ends
/// toward the middle.
fn release_valve(
    front: &[[QubitId; 2]],
    state: &mut RoutingState,
    connectivity: &Connectivity,
) -> CompileResult<()> {
    let Some((start, goal)) = front
        .iter()
        .map(|[a, b]| (state.physical(*a), state.physical(*b)))
        .min_by_key(|&(p, q)| connectivity.distance(p, q).unwrap_or(u32::MAX))
    else {
        return Ok(());
    };
    let path = connectivity
        .shortest_path(start, goal)
        .ok_or(CompileError::RoutingFailed {
            qubit1: start,
            qubit2: goal,
        })?;
    debug!("Release valve routing along {:?}", path);

    let split = path.len() / 2;
    for k in 1..split {
        state.swap(path[k - 1], path[k]);
    }
    for k in (split..path.len() - 1).rev() {
        state.swap(path[k + 1], path[k]);
    }
    Ok(())
}

impl Router for SabreRouter {
    fn name(&self) -> &'static str {
        "SabreRouter"
    }

    #[instrument(skip(self, circuit, layout, connectivity), fields(circuit = circuit.name(), seed = self.seed))]
    fn route(
        &self,
        circuit: &Circuit,
        layout: &Layout,
        connectivity: &Connectivity,
    ) -> CompileResult<Routed> {
        let mut state = RoutingState::new(circuit, layout, connectivity)?;
        let instructions = circuit.instructions();
        let dag = DependencyDag::from_circuit(circuit);
        let num_physical = connectivity.num_qubits() as usize;

        let mut remaining = dag.predecessor_counts();
        let mut front: Vec<usize> = dag
            .front_layer()
            .into_iter()
            .map(|node| dag.instruction_index(node))
            .collect();
        front.sort_unstable();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut decay = vec![1.0; num_physical];
        let max_stalled_swaps = 10 * num_physical;
        let mut stalled_swaps = 0usize;
        let mut search_steps = 0usize;
        let mut extended: Option<Vec<[QubitId; 2]>> = None;

        while !front.is_empty() {
            let (ready, blocked): (Vec<usize>, Vec<usize>) = front
                .iter()
                .copied()
                .partition(|&i| !is_blocked(&instructions[i], &state, connectivity));
            front = blocked;

            if !ready.is_empty() {
                for index in ready {
                    state.emit(&instructions[index]);
                    for succ in dag.successors(DependencyDag::node(index)) {
                        let s = dag.instruction_index(succ);
                        remaining[s] -= 1;
                        if remaining[s] == 0 {
                            front.push(s);
                        }
                    }
                }
                front.sort_unstable();
                decay.fill(1.0);
                stalled_swaps = 0;
                extended = None;
                continue;
            }

            let front_pairs: Vec<[QubitId; 2]> = front
                .iter()
                .map(|&i| qubit_pair(&instructions[i]))
                .collect();
            for [a, b] in &front_pairs {
                let (pa, pb) = (state.physical(*a), state.physical(*b));
                if connectivity.distance(pa, pb).is_none() {
                    return Err(CompileError::RoutingFailed {
                        qubit1: pa,
                        qubit2: pb,
                    });
                }
            }

            let capped = self.iteration_cap.is_some_and(|cap| search_steps >= cap);
            if stalled_swaps > max_stalled_swaps || capped {
                state.undo_swaps(stalled_swaps);
                stalled_swaps = 0;
                release_valve(&front_pairs, &mut state, connectivity)?;
                continue;
            }

            let ext: &[[QubitId; 2]] = extended.get_or_insert_with(|| {
                extended_set(&dag, instructions, &front, &remaining, EXTENDED_SET_SIZE)
            });

            let mut candidates = Vec::new();
            for pair in &front_pairs {
                for q in pair {
                    let p = state.physical(*q);
                    for &nb in connectivity.neighbors(p) {
                        candidates.push((p.min(nb), p.max(nb)));
                    }
                }
            }
            candidates.sort_unstable();
            candidates.dedup();

            let scores: Vec<f64> = candidates
                .iter()
                .map(|&swap| {
                    self.scorer.score(&ScoreContext {
                        front_layer: &front_pairs,
                        extended_set: ext,
                        layout: state.layout(),
                        connectivity,
                        swap,
                        decay: &decay,
                        extended_set_weight: EXTENDED_SET_WEIGHT,
                    })
                })
                .collect();
            let best = scores.iter().copied().fold(f64::INFINITY, f64::min);
            let ties: Vec<(u32, u32)> = candidates
                .iter()
                .zip(&scores)
                .filter(|&(_, score)| *score <= best + SCORE_TOLERANCE)
                .map(|(swap, _)| *swap)
                .collect();
            let &(s0, s1) = ties.choose(&mut rng).ok_or_else(|| {
                let [a, b] = front_pairs[0];
                CompileError::RoutingFailed {
                    qubit1: state.physical(a),
                    qubit2: state.physical(b),
                }
            })?;

            debug!("SWAP ({}, {}) scored {:.4} among {} ties", s0, s1, best, ties.len());
            state.swap(s0, s1);
            stalled_swaps += 1;
            search_steps += 1;
            if search_steps % DECAY_RESET_INTERVAL == 0 {
                decay.fill(1.0);
            } else {
                decay[s0 as usize] += DECAY_RATE;
                decay[s1 as usize] += DECAY_RATE;
            }
        }

        state.finish()
    }
}
