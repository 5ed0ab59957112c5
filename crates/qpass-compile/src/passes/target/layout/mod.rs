//! Placement passes for mapping logical qubits to physical qubits.
//!
//! | Placer | Strategy |
//! |--------|----------|
//! | [`TrivialPlacer`] | logical `i` on physical `i` |
//! | [`StarPlacer`] | busiest logical qubit on the star center |
//! | [`RandomPlacer`] | seeded uniform permutation |
//! | [`SubgraphPlacer`] | embeds the interaction graph, else falls back |
//! | [`ReverseTraversalPlacer`] | forward/backward routing of the two-qubit skeleton |

pub mod random;
pub mod reverse_traversal;
pub mod star;
pub mod subgraph;
pub mod trivial;

pub use random::RandomPlacer;
pub use reverse_traversal::ReverseTraversalPlacer;
pub use star::StarPlacer;
pub use subgraph::SubgraphPlacer;
pub use trivial::TrivialPlacer;

use qpass_ir::Circuit;

use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};

/// Fail with `CircuitTooLarge` if `circuit` does not fit the device.
pub(crate) fn check_fits(circuit: &Circuit, connectivity: &Connectivity) -> CompileResult<()> {
    if circuit.num_qubits() > connectivity.num_qubits() {
        return Err(CompileError::CircuitTooLarge {
            required: circuit.num_qubits() as usize,
            available: connectivity.num_qubits(),
        });
    }
    Ok(())
}

/// Number of two-qubit gates touching each logical qubit.
pub(crate) fn two_qubit_degrees(circuit: &Circuit) -> Vec<usize> {
    let mut degrees = vec![0; circuit.num_qubits() as usize];
    for inst in circuit.instructions() {
        if inst.is_two_qubit_gate() {
            for q in &inst.qubits {
                degrees[q.index()] += 1;
            }
        }
    }
    degrees
}
