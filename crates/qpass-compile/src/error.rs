//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] qpass_ir::IrError),

    /// Error from the simulator used for verification.
    #[error("Simulation error: {0}")]
    Sim(#[from] qpass_sim::SimError),

    /// Configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The pass list violates the ordering rules.
    #[error("Invalid pipeline structure: {0}")]
    PipelineStructure(String),

    /// Routing failed because qubits are not connected.
    #[error("Routing failed: qubits {qubit1} and {qubit2} not connected")]
    RoutingFailed { qubit1: u32, qubit2: u32 },

    /// Circuit too large for target.
    #[error("Circuit requires {required} qubits but target only has {available}")]
    CircuitTooLarge { required: usize, available: u32 },

    /// The connectivity graph does not suit the requested pass.
    #[error("Invalid connectivity: {0}")]
    InvalidConnectivity(String),

    /// A layout is not a bijection or does not match the device.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// A gate cannot be expressed in the native gate set.
    #[error("Cannot decompose '{gate}': {reason}")]
    Decomposition { gate: String, reason: String },

    /// A numeric self-check exceeded its tolerance.
    #[error("{context}: deviation {deviation:.3e} exceeds tolerance {tolerance:.1e}")]
    NumericTolerance {
        context: String,
        deviation: f64,
        tolerance: f64,
    },

    /// Invalid pass configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
