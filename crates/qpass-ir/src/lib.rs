//! qpass Circuit Intermediate Representation
//!
//! This crate provides the data structures the qpass transpiler works on:
//! circuits, gates with their matrices, and the dependency graph routers
//! use to find executable gates.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] addresses logical or physical qubits; a circuit's
//!   [`CircuitLevel`] says which
//! - **Gates**: [`StandardGate`] for the built-in gate set and [`CustomGate`]
//!   for gates given by an explicit unitary
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`], a validated instruction list with a builder API
//! - **DAG**: [`DependencyDag`], instruction dependencies over shared qubits
//! - **Unitaries**: [`Unitary2x2`] and [`Unitary4x4`]
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qpass_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::new("bell_state", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H`, `S`, `Sdg`, `T`, `Tdg`, `SX`, `SXdg` | 1 | Clifford+T gates |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CY`, `CZ`, `CH` | 2 | Controlled gates |
//! | `CRx`, `CRy`, `CRz`, `CP` | 2 | Controlled rotations |
//! | `Swap`, `ISwap` | 2 | Exchange gates |
//! | `RXX`, `RYY`, `RZZ` | 2 | Ising interactions |
//! | custom | 1, 2 | Any unitary matrix |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;
pub mod unitary;

pub use circuit::{Circuit, CircuitLevel, count_gates_of_type};
pub use dag::{DagEdge, DependencyDag, NodeIndex};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::QubitId;
pub use unitary::{EPSILON, Unitary2x2, Unitary4x4};
