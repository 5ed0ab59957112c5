//! Greedy routing for star-shaped devices.

use tracing::{debug, instrument};

use qpass_ir::{Circuit, QubitId};

use super::RoutingState;
use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::{Routed, Router};

/// Router for a device whose only couplers join one center qubit to every
/// other qubit.
///
/// A gate between two outer qubits moves one of them to the center. The
/// router looks ahead for the next two-qubit gate that touches exactly one
/// of the pair and moves that qubit, so it can stay put for the next gate.
/// Without such a gate the first qubit moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarRouter {
    /// Maximum number of later two-qubit gates inspected, unbounded if `None`.
    lookahead: Option<usize>,
}

impl StarRouter {
    /// Create a router with unbounded lookahead.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect at most `gates` later two-qubit gates.
    #[must_use]
    pub fn with_lookahead(mut self, gates: usize) -> Self {
        self.lookahead = Some(gates);
        self
    }

    /// The logical qubit of `(q1, q2)` to move to the center, given the
    /// two-qubit gates that follow.
    fn choose<'a>(
        &self,
        q1: QubitId,
        q2: QubitId,
        upcoming: impl Iterator<Item = &'a [QubitId]>,
    ) -> QubitId {
        let limit = self.lookahead.unwrap_or(usize::MAX);
        for qubits in upcoming.take(limit) {
            let has_q1 = qubits.contains(&q1);
            let has_q2 = qubits.contains(&q2);
            if has_q1 != has_q2 {
                return if has_q1 { q1 } else { q2 };
            }
        }
        q1
    }
}

impl Router for StarRouter {
    fn name(&self) -> &'static str {
        "StarRouter"
    }

    #[instrument(skip(self, circuit, layout, connectivity), fields(circuit = circuit.name()))]
    fn route(
        &self,
        circuit: &Circuit,
        layout: &Layout,
        connectivity: &Connectivity,
    ) -> CompileResult<Routed> {
        let center = connectivity.center().ok_or_else(|| {
            CompileError::InvalidConnectivity("star router requires a star graph".into())
        })?;
        let mut state = RoutingState::new(circuit, layout, connectivity)?;
        let instructions = circuit.instructions();

        for (index, inst) in instructions.iter().enumerate() {
            if inst.is_two_qubit_gate() {
                let (q1, q2) = (inst.qubits[0], inst.qubits[1]);
                if state.physical(q1) != center && state.physical(q2) != center {
                    let upcoming = instructions[index + 1..]
                        .iter()
                        .filter(|i| i.is_two_qubit_gate())
                        .map(|i| i.qubits.as_slice());
                    let moved = self.choose(q1, q2, upcoming);
                    debug!("Moving {} to center {}", moved, center);
                    state.swap(center, state.physical(moved));
                }
            }
            state.emit(inst);
        }

        state.finish()
    }
}
