//! qpass Compilation Framework
//!
//! This crate turns a logical circuit into one a device can execute: every
//! two-qubit gate acts on a coupled pair and every gate is native. The
//! result equals the input up to a global phase and an explicit final
//! permutation of qubits.
//!
//! # Overview
//!
//! A [`Pipeline`] runs an ordered list of [`Pass`]es:
//! 1. **Optimizers**: rewrite the circuit ([`passes::Preprocessing`], [`passes::Rearrange`])
//! 2. **Placer** (at most one): choose the initial [`Layout`]
//! 3. **Routers**: insert SWAPs so the circuit respects the [`Connectivity`]
//! 4. **Unroller**: decompose into the [`NativeGates`], using [`kak`] for two-qubit unitaries
//!
//! ```text
//! Logical circuit
//!       │
//!       ▼
//! ┌──────────┐
//! │ Pipeline │ ◄── Target (connectivity, native gates)
//! └──────────┘
//!       │
//!       ├── Preprocessing / Rearrange
//!       ├── Trivial / Star / Random / Subgraph / ReverseTraversal placer
//!       ├── Star / ShortestPath / Sabre router
//!       └── Unroller (ZYZ + KAK)
//!       │
//!       ▼
//! Physical circuit + final layout
//! ```
//!
//! # Example
//!
//! ```rust
//! use qpass_compile::passes::{SabreRouter, TrivialPlacer};
//! use qpass_compile::{NativeGates, Pass, star_connectivity, transpile};
//! use qpass_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::new("example", 3);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(2)).unwrap();
//!
//! let passes = vec![
//!     Pass::placer(TrivialPlacer),
//!     Pass::router(SabreRouter::new(42)),
//!     Pass::unroller(),
//! ];
//! let (physical, layout) =
//!     transpile(&circuit, passes, &star_connectivity(5), &NativeGates::default()).unwrap();
//!
//! assert!(physical.is_physical());
//! assert_eq!(layout.len(), 5);
//! ```
//!
//! # Pass ordering
//!
//! At most one placer may appear and every router must follow it. Without
//! a placer the trivial layout is used and routers may appear anywhere.
//! Violations fail with [`CompileError::PipelineStructure`] before any pass
//! runs.
//!
//! # Custom passes
//!
//! Implement [`Optimizer`], [`Placer`] or [`Router`]. SABRE also accepts a
//! custom [`passes::SwapScore`], including any closure over
//! [`passes::ScoreContext`].

pub mod config;
pub mod connectivity;
pub mod error;
pub mod kak;
pub mod layout;
pub mod pass;
pub mod pipeline;
pub mod property;

// Built-in passes
pub mod passes;

pub use config::{ConnectivityConfig, OptimizerConfig, PlacerConfig, RouterConfig, TranspileConfig};
pub use connectivity::{Connectivity, star_connectivity};
pub use error::{CompileError, CompileResult};
pub use kak::TwoQubitKak;
pub use layout::Layout;
pub use pass::{Optimizer, Pass, PassKind, Placer, Routed, Router};
pub use pipeline::{Pipeline, PipelineBuilder, Transpiled, Verification, transpile, validate_structure};
pub use property::{NativeGates, Target};
