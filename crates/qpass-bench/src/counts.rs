//! Gate counters used by the comparison report.

use qpass_ir::{Circuit, count_gates_of_type};

/// Number of SWAP gates.
pub fn count_swaps(circuit: &Circuit) -> usize {
    count_gates_of_type(circuit, "swap")
}

/// Number of CZ gates.
pub fn count_cz(circuit: &Circuit) -> usize {
    count_gates_of_type(circuit, "cz")
}

/// Number of instructions, measurements and barriers included.
pub fn count_gates(circuit: &Circuit) -> usize {
    circuit.len()
}
