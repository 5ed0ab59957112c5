//! Greedy shortest-path routing.

use tracing::{debug, instrument};

use qpass_ir::Circuit;

use super::RoutingState;
use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::{Routed, Router};

/// Shortest-path router.
///
/// For each two-qubit gate on uncoupled qubits, SWAPs the first qubit along
/// a BFS shortest path until it is adjacent to the second. Paths break ties
/// toward the lowest physical index. Simple and fast, but blind to upcoming
/// gates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestPathRouter;

impl Router for ShortestPathRouter {
    fn name(&self) -> &'static str {
        "ShortestPathRouter"
    }

    #[instrument(skip(self, circuit, layout, connectivity), fields(circuit = circuit.name()))]
    fn route(
        &self,
        circuit: &Circuit,
        layout: &Layout,
        connectivity: &Connectivity,
    ) -> CompileResult<Routed> {
        let mut state = RoutingState::new(circuit, layout, connectivity)?;

        for inst in circuit.instructions() {
            if inst.is_two_qubit_gate() {
                let p0 = state.physical(inst.qubits[0]);
                let p1 = state.physical(inst.qubits[1]);
                if !connectivity.is_connected(p0, p1) {
                    let path = connectivity
                        .shortest_path(p0, p1)
                        .ok_or(CompileError::RoutingFailed {
                            qubit1: p0,
                            qubit2: p1,
                        })?;
                    debug!("Routing {} along {:?}", inst.name(), path);
                    // Stop one short of the last edge, which hosts the gate.
                    for hop in path.windows(2).take(path.len() - 2) {
                        state.swap(hop[0], hop[1]);
                    }
                }
            }
            state.emit(inst);
        }

        state.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpass_ir::QubitId;

    #[test]
    fn test_adjacent_gate_needs_no_swap() {
        let mut circuit = Circuit::new("test", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let routed = ShortestPathRouter
            .route(&circuit, &Layout::trivial(5), &Connectivity::line(5))
            .unwrap();

        assert_eq!(routed.num_swaps, 0);
        assert_eq!(routed.circuit.len(), 2);
        assert_eq!(routed.circuit.num_qubits(), 5);
        assert!(routed.layout.is_trivial());
    }

    #[test]
    fn test_distant_gate_moves_first_qubit() {
        let mut circuit = Circuit::new("test", 4);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();

        let routed = ShortestPathRouter
            .route(&circuit, &Layout::trivial(4), &Connectivity::line(4))
            .unwrap();

        assert_eq!(routed.num_swaps, 2);
        let inst = &routed.circuit.instructions()[2];
        assert_eq!(inst.name(), "cx");
        assert_eq!(inst.qubits, vec![QubitId(2), QubitId(3)]);
        assert_eq!(routed.layout.physical(0), 2);
        assert_eq!(routed.layout.physical(3), 3);
    }

    #[test]
    fn test_disconnected_fails() {
        let mut circuit = Circuit::new("test", 4);
        circuit.cz(QubitId(0), QubitId(3)).unwrap();
        let split = Connectivity::from_edges(4, [(0, 1), (2, 3)]).unwrap();

        let err = ShortestPathRouter
            .route(&circuit, &Layout::trivial(4), &split)
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::RoutingFailed {
                qubit1: 0,
                qubit2: 3
            }
        ));
    }
}
