//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index is not below the circuit's qubit count.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit circuit{}", format_gate_context(.gate_name))]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Declared qubit count of the circuit.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Custom gate matrix has the wrong shape or is not unitary.
    #[error("Invalid matrix for gate '{gate_name}': {reason}")]
    InvalidMatrix {
        /// Name of the gate.
        gate_name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Only one- and two-qubit gates are supported.
    #[error("Gate '{gate_name}' acts on {num_qubits} qubits; only 1 and 2 are supported")]
    UnsupportedArity {
        /// Name of the gate.
        gate_name: String,
        /// Number of qubits requested.
        num_qubits: u32,
    },

    /// Operation requires a purely unitary circuit.
    #[error("Instruction '{0}' is not unitary")]
    NonUnitary(String),

    /// Shrinking a circuit would drop qubits still in use.
    #[error("Cannot resize circuit to {requested} qubits: qubit {in_use} is in use")]
    ResizeInUse {
        /// Requested qubit count.
        requested: u32,
        /// Highest qubit index still referenced.
        in_use: QubitId,
    },

    /// Invalid DAG structure.
    #[error("Invalid DAG structure: {0}")]
    InvalidDag(String),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
