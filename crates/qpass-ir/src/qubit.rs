//! Qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit within a circuit.
///
/// The same type addresses logical and physical qubits; which namespace an
/// index belongs to is carried by the circuit's [`CircuitLevel`](crate::CircuitLevel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The index as a `usize`, for addressing vectors.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<QubitId> for u32 {
    fn from(id: QubitId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(0)), "q0");
        assert_eq!(format!("{}", QubitId(17)), "q17");
    }

    #[test]
    fn test_qubit_ordering() {
        let mut qubits = vec![QubitId(3), QubitId(1), QubitId(2)];
        qubits.sort();
        assert_eq!(qubits, vec![QubitId(1), QubitId(2), QubitId(3)]);
        assert_eq!(QubitId(4).index(), 4);
    }
}
