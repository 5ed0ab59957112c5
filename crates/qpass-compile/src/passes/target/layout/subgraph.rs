//! Placement by embedding the circuit's interaction graph.

use rustc_hash::FxHashSet;
use tracing::debug;

use qpass_ir::Circuit;

use super::{TrivialPlacer, check_fits};
use crate::connectivity::Connectivity;
use crate::error::CompileResult;
use crate::layout::Layout;
use crate::pass::Placer;

/// Default number of candidate assignments tried before giving up.
pub const DEFAULT_STEP_BUDGET: usize = 100_000;

/// Places qubits so that every interacting pair lands on a coupled pair.
///
/// Searches for a monomorphism of the interaction graph (one edge per pair
/// of logical qubits sharing a two-qubit gate) into the connectivity graph.
/// If none exists, the search exceeds its step budget, or the circuit has
/// no two-qubit gates, placement is delegated to the fallback placer.
pub struct SubgraphPlacer {
    fallback: Box<dyn Placer>,
    step_budget: usize,
}

impl SubgraphPlacer {
    /// Create a placer falling back to [`TrivialPlacer`].
    pub fn new() -> Self {
        Self {
            fallback: Box::new(TrivialPlacer),
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }

    /// Use `fallback` when no embedding is found.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Placer + 'static) -> Self {
        self.fallback = Box::new(fallback);
        self
    }

    /// Limit the number of candidate assignments tried.
    #[must_use]
    pub fn with_step_budget(mut self, steps: usize) -> Self {
        self.step_budget = steps;
        self
    }
}

impl Default for SubgraphPlacer {
    fn default() -> Self {
        Self::new()
    }
}

/// Undirected interaction graph over logical qubits.
fn interaction_graph(circuit: &Circuit) -> Vec<Vec<u32>> {
    let mut seen = FxHashSet::default();
    let mut adjacency = vec![Vec::new(); circuit.num_qubits() as usize];
    for inst in circuit.instructions() {
        if inst.is_two_qubit_gate() {
            let (a, b) = (inst.qubits[0].0, inst.qubits[1].0);
            if seen.insert((a.min(b), a.max(b))) {
                adjacency[a as usize].push(b);
                adjacency[b as usize].push(a);
            }
        }
    }
    adjacency
}

/// Search order: each next qubit has the most already-ordered neighbors,
/// then the highest degree, then the lowest index.
fn search_order(adjacency: &[Vec<u32>]) -> Vec<u32> {
    let active: Vec<u32> = (0..adjacency.len() as u32)
        .filter(|&q| !adjacency[q as usize].is_empty())
        .collect();
    let mut ordered = vec![false; adjacency.len()];
    let mut order = Vec::with_capacity(active.len());

    while order.len() < active.len() {
        let mut best: Option<(usize, usize, u32)> = None;
        for &q in &active {
            if ordered[q as usize] {
                continue;
            }
            let links = adjacency[q as usize]
                .iter()
                .filter(|&&n| ordered[n as usize])
                .count();
            let key = (links, adjacency[q as usize].len(), q);
            let better = match best {
                None => true,
                Some((l, d, _)) => (links, key.1) > (l, d),
            };
            if better {
                best = Some(key);
            }
        }
        if let Some((_, _, q)) = best {
            ordered[q as usize] = true;
            order.push(q);
        }
    }
    order
}

/// Backtracking monomorphism search.
struct Matcher<'a> {
    adjacency: &'a [Vec<u32>],
    connectivity: &'a Connectivity,
    order: Vec<u32>,
    assignment: Vec<Option<u32>>,
    used: Vec<bool>,
    steps: usize,
    budget: usize,
}

impl Matcher<'_> {
    /// `Some(true)` on success, `Some(false)` if exhausted, `None` if the
    /// budget ran out.
    fn search(&mut self, depth: usize) -> Option<bool> {
        let Some(&logical) = self.order.get(depth) else {
            return Some(true);
        };
        let adjacency = self.adjacency;
        let neighbors = &adjacency[logical as usize];
        let anchor = neighbors
            .iter()
            .find_map(|&n| self.assignment[n as usize]);
        let candidates: Vec<u32> = match anchor {
            Some(p) => self.connectivity.neighbors(p).to_vec(),
            None => (0..self.connectivity.num_qubits()).collect(),
        };

        for physical in candidates {
            if self.used[physical as usize]
                || self.connectivity.degree(physical) < neighbors.len()
            {
                continue;
            }
            let consistent = neighbors.iter().all(|&n| {
                self.assignment[n as usize]
                    .is_none_or(|p| self.connectivity.is_connected(physical, p))
            });
            if !consistent {
                continue;
            }

            self.steps += 1;
            if self.steps > self.budget {
                return None;
            }
            self.assignment[logical as usize] = Some(physical);
            self.used[physical as usize] = true;
            if self.search(depth + 1)? {
                return Some(true);
            }
            self.assignment[logical as usize] = None;
            self.used[physical as usize] = false;
        }
        Some(false)
    }
}

impl SubgraphPlacer {
    /// An embedding of the interaction graph, if one is found in budget.
    fn embed(&self, circuit: &Circuit, connectivity: &Connectivity) -> Option<Layout> {
        let adjacency = interaction_graph(circuit);
        let order = search_order(&adjacency);
        if order.is_empty() {
            return None;
        }

        let n = connectivity.num_qubits() as usize;
        let mut matcher = Matcher {
            adjacency: &adjacency,
            connectivity,
            order,
            assignment: vec![None; n],
            used: vec![false; n],
            steps: 0,
            budget: self.step_budget,
        };
        match matcher.search(0) {
            Some(true) => {}
            Some(false) => {
                debug!("No embedding of the interaction graph exists");
                return None;
            }
            None => {
                debug!("Embedding search exceeded {} steps", self.step_budget);
                return None;
            }
        }

        // Idle logical qubits take the free physical qubits in order.
        let mut free = (0..n as u32).filter(|&p| !matcher.used[p as usize]);
        let physical = matcher
            .assignment
            .iter()
            .map(|slot| slot.or_else(|| free.next()))
            .collect::<Option<Vec<u32>>>()?;
        Layout::from_physical(physical).ok()
    }
}

impl Placer for SubgraphPlacer {
    fn name(&self) -> &'static str {
        "SubgraphPlacer"
    }

    fn place(&self, circuit: &Circuit, connectivity: &Connectivity) -> CompileResult<Layout> {
        check_fits(circuit, connectivity)?;
        match self.embed(circuit, connectivity) {
            Some(layout) => Ok(layout),
            None => {
                debug!("Falling back to {}", self.fallback.name());
                self.fallback.place(circuit, connectivity)
            }
        }
    }
}
