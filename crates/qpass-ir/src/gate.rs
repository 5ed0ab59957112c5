//! Quantum gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::unitary::{Unitary2x2, Unitary4x4};

/// Unitarity tolerance applied to custom gate matrices.
pub const CUSTOM_UNITARY_TOLERANCE: f64 = 1e-8;

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// Controlled rotation around X.
    CRx(f64),
    /// Controlled rotation around Y.
    CRy(f64),
    /// Controlled rotation around Z.
    CRz(f64),
    /// Controlled phase gate.
    CP(f64),
    /// XX rotation gate.
    RXX(f64),
    /// YY rotation gate.
    RYY(f64),
    /// ZZ rotation gate.
    RZZ(f64),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,
        }
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RYY(p)
            | StandardGate::RZZ(p) => vec![*p],

            StandardGate::U(a, b, c) => vec![*a, *b, *c],

            _ => vec![],
        }
    }

    /// Whether the gate is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
                | StandardGate::P(_)
                | StandardGate::CZ
                | StandardGate::CRz(_)
                | StandardGate::CP(_)
                | StandardGate::RZZ(_)
        )
    }

    /// Matrix of a single-qubit gate, `None` for two-qubit gates.
    pub fn matrix_1q(&self) -> Option<Unitary2x2> {
        use std::f64::consts::FRAC_PI_2 as HALF_PI;
        use std::f64::consts::FRAC_PI_4 as QUARTER_PI;

        let m = match self {
            StandardGate::I => Unitary2x2::identity(),
            StandardGate::X => Unitary2x2::x(),
            StandardGate::Y => Unitary2x2::y(),
            StandardGate::Z => Unitary2x2::z(),
            StandardGate::H => Unitary2x2::h(),
            StandardGate::S => Unitary2x2::p(HALF_PI),
            StandardGate::Sdg => Unitary2x2::p(-HALF_PI),
            StandardGate::T => Unitary2x2::p(QUARTER_PI),
            StandardGate::Tdg => Unitary2x2::p(-QUARTER_PI),
            StandardGate::SX => Unitary2x2::sx(),
            StandardGate::SXdg => Unitary2x2::sx().dagger(),
            StandardGate::Rx(t) => Unitary2x2::rx(*t),
            StandardGate::Ry(t) => Unitary2x2::ry(*t),
            StandardGate::Rz(t) => Unitary2x2::rz(*t),
            StandardGate::P(l) => Unitary2x2::p(*l),
            StandardGate::U(t, p, l) => Unitary2x2::u(*t, *p, *l),
            _ => return None,
        };
        Some(m)
    }

    /// Matrix of a two-qubit gate, `None` for single-qubit gates.
    ///
    /// The first qubit is the control of controlled gates and the most
    /// significant index bit.
    pub fn matrix_2q(&self) -> Option<Unitary4x4> {
        let m = match self {
            StandardGate::CX => Unitary4x4::cx(),
            StandardGate::CY => Unitary4x4::controlled(&Unitary2x2::y()),
            StandardGate::CZ => Unitary4x4::cz(),
            StandardGate::CH => Unitary4x4::controlled(&Unitary2x2::h()),
            StandardGate::Swap => Unitary4x4::swap(),
            StandardGate::ISwap => Unitary4x4::iswap(),
            StandardGate::CRx(t) => Unitary4x4::controlled(&Unitary2x2::rx(*t)),
            StandardGate::CRy(t) => Unitary4x4::controlled(&Unitary2x2::ry(*t)),
            StandardGate::CRz(t) => Unitary4x4::controlled(&Unitary2x2::rz(*t)),
            StandardGate::CP(l) => Unitary4x4::controlled(&Unitary2x2::p(*l)),
            StandardGate::RXX(t) => Unitary4x4::pauli_rotation(&Unitary2x2::x(), *t),
            StandardGate::RYY(t) => Unitary4x4::pauli_rotation(&Unitary2x2::y(), *t),
            StandardGate::RZZ(t) => Unitary4x4::pauli_rotation(&Unitary2x2::z(), *t),
            _ => return None,
        };
        Some(m)
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A custom gate given by its matrix.
    Custom(CustomGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }
}

/// A gate defined by an explicit unitary (fused blocks, user input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on (1 or 2).
    pub num_qubits: u32,
    /// Unitary matrix, row-major, 2^n × 2^n.
    pub matrix: Vec<Complex64>,
}

impl CustomGate {
    /// Create a custom gate, checking shape and unitarity.
    pub fn new(name: impl Into<String>, num_qubits: u32, matrix: Vec<Complex64>) -> IrResult<Self> {
        let name = name.into();
        let gate = Self {
            name,
            num_qubits,
            matrix,
        };
        match num_qubits {
            1 => {
                let u = Unitary2x2::from_slice(&gate.matrix).ok_or_else(|| gate.shape_error())?;
                if !u.is_unitary(CUSTOM_UNITARY_TOLERANCE) {
                    return Err(gate.non_unitary_error());
                }
            }
            2 => {
                let u = Unitary4x4::from_slice(&gate.matrix).ok_or_else(|| gate.shape_error())?;
                if !u.is_unitary(CUSTOM_UNITARY_TOLERANCE) {
                    return Err(gate.non_unitary_error());
                }
            }
            n => {
                return Err(IrError::UnsupportedArity {
                    gate_name: gate.name,
                    num_qubits: n,
                });
            }
        }
        Ok(gate)
    }

    /// A single-qubit custom gate.
    pub fn from_unitary_1q(name: impl Into<String>, u: &Unitary2x2) -> Self {
        Self {
            name: name.into(),
            num_qubits: 1,
            matrix: u.data.to_vec(),
        }
    }

    /// A two-qubit custom gate.
    pub fn from_unitary_2q(name: impl Into<String>, u: &Unitary4x4) -> Self {
        Self {
            name: name.into(),
            num_qubits: 2,
            matrix: u.to_vec(),
        }
    }

    /// The matrix as a 2x2 unitary, if this is a single-qubit gate.
    pub fn matrix_1q(&self) -> Option<Unitary2x2> {
        (self.num_qubits == 1)
            .then(|| Unitary2x2::from_slice(&self.matrix))
            .flatten()
    }

    /// The matrix as a 4x4 unitary, if this is a two-qubit gate.
    pub fn matrix_2q(&self) -> Option<Unitary4x4> {
        (self.num_qubits == 2)
            .then(|| Unitary4x4::from_slice(&self.matrix))
            .flatten()
    }

    fn shape_error(&self) -> IrError {
        let dim = 1usize << self.num_qubits;
        IrError::InvalidMatrix {
            gate_name: self.name.clone(),
            reason: format!(
                "expected {} entries for a {}-qubit gate, got {}",
                dim * dim,
                self.num_qubits,
                self.matrix.len()
            ),
        }
    }

    fn non_unitary_error(&self) -> IrError {
        IrError::InvalidMatrix {
            gate_name: self.name.clone(),
            reason: "matrix is not unitary".into(),
        }
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    /// Create a new gate from a custom gate.
    pub fn custom(gate: CustomGate) -> Self {
        Self {
            kind: GateKind::Custom(gate),
            label: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// The standard gate, if this is one.
    pub fn as_standard(&self) -> Option<&StandardGate> {
        match &self.kind {
            GateKind::Standard(g) => Some(g),
            GateKind::Custom(_) => None,
        }
    }

    /// Single-qubit matrix of this gate.
    pub fn matrix_1q(&self) -> Option<Unitary2x2> {
        match &self.kind {
            GateKind::Standard(g) => g.matrix_1q(),
            GateKind::Custom(g) => g.matrix_1q(),
        }
    }

    /// Two-qubit matrix of this gate.
    pub fn matrix_2q(&self) -> Option<Unitary4x4> {
        match &self.kind {
            GateKind::Standard(g) => g.matrix_2q(),
            GateKind::Custom(g) => g.matrix_2q(),
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::U(0.1, 0.2, 0.3).name(), "u");
        assert_eq!(StandardGate::U(0.1, 0.2, 0.3).parameters(), vec![0.1, 0.2, 0.3]);
        assert!(StandardGate::Rz(PI).is_diagonal());
        assert!(!StandardGate::H.is_diagonal());
    }

    #[test]
    fn test_gate_creation() {
        let h = Gate::standard(StandardGate::H);
        assert_eq!(h.name(), "h");
        assert_eq!(h.num_qubits(), 1);
        assert!(h.label.is_none());

        let h_labeled = Gate::standard(StandardGate::H).with_label("my_hadamard");
        assert_eq!(h_labeled.label, Some("my_hadamard".to_string()));
    }

    #[test]
    fn test_every_standard_matrix_is_unitary() {
        let one_qubit = [
            StandardGate::I,
            StandardGate::X,
            StandardGate::Y,
            StandardGate::Z,
            StandardGate::H,
            StandardGate::S,
            StandardGate::Sdg,
            StandardGate::T,
            StandardGate::Tdg,
            StandardGate::SX,
            StandardGate::SXdg,
            StandardGate::Rx(0.3),
            StandardGate::Ry(0.4),
            StandardGate::Rz(0.5),
            StandardGate::P(0.6),
            StandardGate::U(0.7, 0.8, 0.9),
        ];
        for g in &one_qubit {
            let m = g.matrix_1q().expect("single-qubit gate");
            assert!(m.is_unitary(1e-12), "{} not unitary", g.name());
            assert!(g.matrix_2q().is_none());
        }

        let two_qubit = [
            StandardGate::CX,
            StandardGate::CY,
            StandardGate::CZ,
            StandardGate::CH,
            StandardGate::Swap,
            StandardGate::ISwap,
            StandardGate::CRx(0.3),
            StandardGate::CRy(0.4),
            StandardGate::CRz(0.5),
            StandardGate::CP(0.6),
            StandardGate::RXX(0.7),
            StandardGate::RYY(0.8),
            StandardGate::RZZ(0.9),
        ];
        for g in &two_qubit {
            let m = g.matrix_2q().expect("two-qubit gate");
            assert!(m.is_unitary(1e-12), "{} not unitary", g.name());
            assert!(g.matrix_1q().is_none());
        }
    }

    #[test]
    fn test_sx_squares_to_x() {
        let sx = StandardGate::SX.matrix_1q().unwrap();
        assert!((sx * sx).distance_up_to_phase(&Unitary2x2::x()) < 1e-12);
    }

    #[test]
    fn test_custom_gate_validation() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);

        let ok = CustomGate::new("flip", 1, vec![zero, one, one, zero]).unwrap();
        assert_eq!(ok.num_qubits, 1);
        assert!(ok.matrix_1q().unwrap().distance_up_to_phase(&Unitary2x2::x()) < 1e-12);

        let wrong_len = CustomGate::new("bad", 1, vec![one, zero, zero]);
        assert!(matches!(wrong_len, Err(IrError::InvalidMatrix { .. })));

        let not_unitary = CustomGate::new("bad", 1, vec![one, one, zero, one]);
        assert!(matches!(not_unitary, Err(IrError::InvalidMatrix { .. })));

        let three = CustomGate::new("big", 3, vec![one; 64]);
        assert!(matches!(three, Err(IrError::UnsupportedArity { .. })));
    }

    #[test]
    fn test_custom_two_qubit_roundtrip() {
        let g = CustomGate::from_unitary_2q("fused", &Unitary4x4::swap());
        assert_eq!(g.num_qubits, 2);
        assert_eq!(g.matrix_2q().unwrap(), Unitary4x4::swap());
        assert!(g.matrix_1q().is_none());
    }
}
