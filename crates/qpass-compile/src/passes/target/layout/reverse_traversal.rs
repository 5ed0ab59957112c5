//! Placement by repeated forward and backward routing.

use tracing::debug;

use qpass_ir::{Circuit, QubitId};

use super::check_fits;
use crate::connectivity::Connectivity;
use crate::error::CompileResult;
use crate::layout::Layout;
use crate::pass::{Placer, Router};

/// Reverse-traversal placement.
///
/// Starting from the trivial layout, routes the circuit's two-qubit
/// skeleton (every two-qubit gate as a CZ, in order) forward and then
/// reversed with the given router. Each traversal's final layout seeds the
/// next one, so qubits drift toward positions that suit the start of the
/// circuit. Deterministic for a deterministic router.
pub struct ReverseTraversalPlacer {
    router: Box<dyn Router>,
    iterations: usize,
    /// Only the first `depth` two-qubit gates are traversed.
    depth: Option<usize>,
}

impl ReverseTraversalPlacer {
    /// Create a placer running `iterations` forward-backward rounds.
    pub fn new(router: impl Router + 'static, iterations: usize) -> Self {
        Self {
            router: Box::new(router),
            iterations,
            depth: None,
        }
    }

    /// Traverse only the first `gates` two-qubit gates.
    #[must_use]
    pub fn with_depth(mut self, gates: usize) -> Self {
        self.depth = Some(gates);
        self
    }

    /// The two-qubit skeleton of `circuit`, forward and reversed.
    fn skeletons(&self, circuit: &Circuit) -> CompileResult<(Circuit, Circuit)> {
        let pairs: Vec<(QubitId, QubitId)> = circuit
            .instructions()
            .iter()
            .filter(|i| i.is_two_qubit_gate())
            .take(self.depth.unwrap_or(usize::MAX))
            .map(|i| (i.qubits[0], i.qubits[1]))
            .collect();

        let name = format!("{}_skeleton", circuit.name());
        let mut forward = Circuit::new(name.clone(), circuit.num_qubits());
        let mut backward = Circuit::new(name, circuit.num_qubits());
        for &(a, b) in &pairs {
            forward.cz(a, b)?;
        }
        for &(a, b) in pairs.iter().rev() {
            backward.cz(a, b)?;
        }
        Ok((forward, backward))
    }
}

impl Placer for ReverseTraversalPlacer {
    fn name(&self) -> &'static str {
        "ReverseTraversalPlacer"
    }

    fn place(&self, circuit: &Circuit, connectivity: &Connectivity) -> CompileResult<Layout> {
        check_fits(circuit, connectivity)?;
        let (forward, backward) = self.skeletons(circuit)?;
        let mut layout = Layout::trivial(connectivity.num_qubits());

        for round in 0..self.iterations {
            layout = self.router.route(&forward, &layout, connectivity)?.layout;
            layout = self.router.route(&backward, &layout, connectivity)?.layout;
            debug!(
                "Reverse traversal round {} with {}: {:?}",
                round,
                self.router.name(),
                layout.as_permutation()
            );
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::target::routing::{SabreRouter, ShortestPathRouter};

    fn swaps_needed(circuit: &Circuit, layout: &Layout, connectivity: &Connectivity) -> usize {
        ShortestPathRouter
            .route(circuit, layout, connectivity)
            .unwrap()
            .num_swaps
    }

    #[test]
    fn test_zero_iterations_is_trivial() {
        let circuit = Circuit::ghz(4).unwrap();
        let layout = ReverseTraversalPlacer::new(ShortestPathRouter, 0)
            .place(&circuit, &Connectivity::line(4))
            .unwrap();
        assert!(layout.is_trivial());
    }

    #[test]
    fn test_deterministic_with_seeded_router() {
        let mut circuit = Circuit::new("test", 5);
        for (a, b) in [(0, 4), (1, 3), (0, 2), (4, 2), (1, 4)] {
            circuit.cz(QubitId(a), QubitId(b)).unwrap();
        }
        let grid = Connectivity::grid(2, 3);
        let a = ReverseTraversalPlacer::new(SabreRouter::new(1), 3)
            .place(&circuit, &grid)
            .unwrap();
        let b = ReverseTraversalPlacer::new(SabreRouter::new(1), 3)
            .place(&circuit, &grid)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_single_distant_gate_becomes_local() {
        // After one round the endpoints of the only gate are adjacent.
        let mut circuit = Circuit::new("test", 4);
        circuit.cz(QubitId(0), QubitId(3)).unwrap();
        let line = Connectivity::line(4);

        let layout = ReverseTraversalPlacer::new(ShortestPathRouter, 1)
            .place(&circuit, &line)
            .unwrap();
        assert_eq!(swaps_needed(&circuit, &layout, &line), 0);
    }

    #[test]
    fn test_depth_limits_skeleton() {
        let mut circuit = Circuit::new("test", 3);
        circuit.cz(QubitId(0), QubitId(1)).unwrap();
        circuit.cz(QubitId(0), QubitId(2)).unwrap();
        let placer = ReverseTraversalPlacer::new(ShortestPathRouter, 1).with_depth(1);
        let (forward, backward) = placer.skeletons(&circuit).unwrap();
        assert_eq!(forward.len(), 1);
        assert_eq!(backward.len(), 1);
    }
}
