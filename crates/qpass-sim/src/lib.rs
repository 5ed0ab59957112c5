//! Statevector simulator for qpass.
//!
//! Small, exact simulation used to confirm that a transpiled circuit still
//! implements the original one. Qubit `q` is bit `q` of a basis state index.
//!
//! ```rust
//! use qpass_ir::{Circuit, QubitId};
//! use qpass_sim::simulate;
//!
//! let mut circuit = Circuit::new("bell", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let state = simulate(&circuit).unwrap();
//! assert!((state.probabilities()[0b11] - 0.5).abs() < 1e-12);
//! ```

pub mod error;
pub mod statevector;

pub use error::{SimError, SimResult};
pub use statevector::{MAX_QUBITS, Statevector, simulate};
