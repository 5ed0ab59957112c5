//! Target properties shared by the passes of a pipeline.
//!
//! A [`Target`] bundles everything a pass may need to know about the device:
//!
//! | Property | Type | Description |
//! |----------|------|-------------|
//! | `connectivity` | [`Connectivity`] | Device coupling graph |
//! | `natives` | [`NativeGates`] | Gate names the device executes |
//!
//! Both are fixed for the duration of a run and only ever borrowed.

use serde::{Deserialize, Serialize};

use crate::connectivity::Connectivity;

/// The native gate set of a target device, by gate name.
///
/// `barrier` is always accepted and need not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeGates {
    gates: Vec<String>,
}

impl NativeGates {
    /// Create a native gate set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut set = Self { gates: vec![] };
        for gate in gates {
            set.insert(gate);
        }
        set
    }

    /// Add a gate name.
    pub fn insert(&mut self, gate: impl Into<String>) {
        let gate = gate.into();
        if !self.contains(&gate) {
            self.gates.push(gate);
        }
    }

    /// Check if a gate is native.
    pub fn contains(&self, gate: &str) -> bool {
        gate == "barrier" || self.gates.iter().any(|g| g == gate)
    }

    /// The listed gate names.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// The two-qubit entangler the unroller targets: `cz` if native,
    /// otherwise `cx`.
    pub fn entangler(&self) -> Option<&'static str> {
        if self.contains("cz") {
            Some("cz")
        } else if self.contains("cx") {
            Some("cx")
        } else {
            None
        }
    }

    /// CX-based variant of the default set: `id z rz u cx measure`.
    pub fn cx_based() -> Self {
        Self::new(["id", "z", "rz", "u", "cx", "measure"])
    }

    /// Rotation-only set: `rz ry cz measure`.
    pub fn rz_ry_cz() -> Self {
        Self::new(["rz", "ry", "cz", "measure"])
    }
}

impl Default for NativeGates {
    /// `id z rz u cz measure`.
    fn default() -> Self {
        Self::new(["id", "z", "rz", "u", "cz", "measure"])
    }
}

/// The device a pipeline compiles for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Allowed two-qubit interactions.
    pub connectivity: Connectivity,
    /// Gates the device executes.
    pub natives: NativeGates,
}

impl Target {
    /// Create a target.
    pub fn new(connectivity: Connectivity, natives: NativeGates) -> Self {
        Self {
            connectivity,
            natives,
        }
    }

    /// Physical qubit count.
    pub fn num_qubits(&self) -> u32 {
        self.connectivity.num_qubits()
    }
}
