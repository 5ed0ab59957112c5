//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced by statevector simulation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// An instruction references a qubit outside the state.
    #[error("Qubit {qubit} out of range for {n_qubits}-qubit state")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Number of qubits in the state.
        n_qubits: u32,
    },

    /// The state would not fit in memory.
    #[error("Cannot simulate {requested} qubits (limit is {max})")]
    TooManyQubits {
        /// Requested qubit count.
        requested: u32,
        /// Largest supported qubit count.
        max: u32,
    },

    /// Two states, or a state and a circuit, disagree on size.
    #[error("Dimension mismatch: {left} vs {right} qubits")]
    DimensionMismatch {
        /// Qubit count of the left operand.
        left: u32,
        /// Qubit count of the right operand.
        right: u32,
    },

    /// The amplitude vector length is not a power of two.
    #[error("Amplitude vector of length {0} is not a power of two")]
    InvalidLength(usize),

    /// A gate without a known matrix was applied.
    #[error("Gate '{0}' has no matrix")]
    MissingMatrix(String),

    /// A qubit permutation is not a bijection.
    #[error("Invalid qubit permutation: {0}")]
    InvalidPermutation(String),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
