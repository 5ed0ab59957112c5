//! Routing passes for inserting SWAP gates.
//!
//! Every router consumes a logical circuit and an initial [`Layout`] and
//! emits a physical circuit sized to the device. The three strategies share
//! [`RoutingState`], which relabels instructions through the current layout
//! and records inserted SWAPs.

pub mod sabre;
pub mod shortest_path;
pub mod star;

pub use sabre::{SabreHeuristic, SabreRouter, ScoreContext, SwapScore};
pub use shortest_path::ShortestPathRouter;
pub use star::StarRouter;

use qpass_ir::{Circuit, CircuitLevel, Instruction, QubitId, StandardGate};

use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::Routed;

/// Check that `circuit` and `layout` fit `connectivity`.
pub(crate) fn check_routing_input(
    circuit: &Circuit,
    layout: &Layout,
    connectivity: &Connectivity,
) -> CompileResult<()> {
    let available = connectivity.num_qubits();
    if circuit.num_qubits() > available {
        return Err(CompileError::CircuitTooLarge {
            required: circuit.num_qubits() as usize,
            available,
        });
    }
    if layout.len() != available as usize {
        return Err(CompileError::InvalidLayout(format!(
            "layout covers {} qubits, device has {available}",
            layout.len()
        )));
    }
    Ok(())
}

/// Output buffer and current layout of a routing run.
pub(crate) struct RoutingState {
    name: String,
    num_physical: u32,
    layout: Layout,
    instructions: Vec<Instruction>,
    num_swaps: usize,
}

impl RoutingState {
    pub(crate) fn new(
        circuit: &Circuit,
        layout: &Layout,
        connectivity: &Connectivity,
    ) -> CompileResult<Self> {
        check_routing_input(circuit, layout, connectivity)?;
        Ok(Self {
            name: circuit.name().to_string(),
            num_physical: connectivity.num_qubits(),
            layout: layout.clone(),
            instructions: Vec::with_capacity(circuit.len()),
            num_swaps: 0,
        })
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Physical qubit currently holding `logical`.
    #[inline]
    pub(crate) fn physical(&self, logical: QubitId) -> u32 {
        self.layout.physical(logical.0)
    }

    /// Emit `inst` relabelled through the current layout.
    pub(crate) fn emit(&mut self, inst: &Instruction) {
        let layout = &self.layout;
        self.instructions
            .push(inst.remapped(|q| QubitId(layout.physical(q.0))));
    }

    /// Emit a SWAP on two physical qubits and update the layout.
    pub(crate) fn swap(&mut self, p1: u32, p2: u32) {
        self.instructions.push(Instruction::two_qubit_gate(
            StandardGate::Swap,
            QubitId(p1),
            QubitId(p2),
        ));
        self.layout.swap_physical(p1, p2);
        self.num_swaps += 1;
    }

    /// Remove the last `count` SWAPs, which must be the last `count`
    /// instructions, and restore the layout they changed.
    pub(crate) fn undo_swaps(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(inst) = self.instructions.pop() {
                self.layout
                    .swap_physical(inst.qubits[0].0, inst.qubits[1].0);
                self.num_swaps -= 1;
            }
        }
    }

    pub(crate) fn finish(self) -> CompileResult<Routed> {
        let circuit = Circuit::from_instructions(
            self.name,
            self.num_physical,
            CircuitLevel::Physical,
            self.instructions,
        )?;
        Ok(Routed {
            circuit,
            layout: self.layout,
            num_swaps: self.num_swaps,
        })
    }
}

/// True if `inst` is a two-qubit gate whose current physical qubits are
/// not coupled.
pub(crate) fn is_blocked(
    inst: &Instruction,
    state: &RoutingState,
    connectivity: &Connectivity,
) -> bool {
    inst.is_two_qubit_gate()
        && !connectivity.is_connected(state.physical(inst.qubits[0]), state.physical(inst.qubits[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_routing_input() {
        let circuit = Circuit::new("test", 4);
        let line = Connectivity::line(3);
        assert!(matches!(
            check_routing_input(&circuit, &Layout::trivial(3), &line),
            Err(CompileError::CircuitTooLarge {
                required: 4,
                available: 3
            })
        ));

        let small = Circuit::new("test", 2);
        assert!(matches!(
            check_routing_input(&small, &Layout::trivial(2), &line),
            Err(CompileError::InvalidLayout(_))
        ));
        assert!(check_routing_input(&small, &Layout::trivial(3), &line).is_ok());
    }

    #[test]
    fn test_state_undo_swaps() {
        let mut circuit = Circuit::new("test", 3);
        circuit.h(QubitId(0)).unwrap();
        let line = Connectivity::line(3);
        let mut state = RoutingState::new(&circuit, &Layout::trivial(3), &line).unwrap();

        state.emit(&circuit.instructions()[0]);
        state.swap(0, 1);
        state.swap(1, 2);
        assert_eq!(state.physical(QubitId(0)), 2);

        state.undo_swaps(2);
        assert!(state.layout().is_trivial());

        let routed = state.finish().unwrap();
        assert_eq!(routed.num_swaps, 0);
        assert_eq!(routed.circuit.len(), 1);
        assert!(routed.circuit.is_physical());
        assert_eq!(routed.circuit.num_qubits(), 3);
    }
}
