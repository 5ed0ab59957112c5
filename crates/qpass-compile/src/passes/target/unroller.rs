//! Native gate decomposition.

use std::f64::consts::FRAC_PI_2;

use tracing::{debug, instrument};

use qpass_ir::{
    Circuit, Gate, Instruction, InstructionKind, QubitId, StandardGate, Unitary2x2, Unitary4x4,
};

use crate::error::{CompileError, CompileResult};
use crate::kak::{KAK_TOLERANCE, TwoQubitKak, as_tensor_product};
use crate::property::NativeGates;

/// Default tolerance below which a rotation angle or a deviation from the
/// identity is treated as zero.
pub const DEFAULT_UNROLL_TOLERANCE: f64 = 1e-9;

/// Rewrites every gate into a native gate set.
///
/// One-qubit gates go through a ZYZ Euler factorization and come out as a
/// single `rz`, a `u`, or an `rz ry rz` sequence, depending on what is
/// native. Two-qubit gates are expressed with the native entangler (`cz`
/// preferred over `cx`); anything that is not a CX, CZ or SWAP is
/// synthesized through the KAK decomposition with at most three
/// entanglers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unroller {
    tolerance: f64,
}

impl Default for Unroller {
    fn default() -> Self {
        Self::new()
    }
}

impl Unroller {
    /// Create an unroller with the default tolerance.
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_UNROLL_TOLERANCE,
        }
    }

    /// Set the tolerance for dropping near-identity gates.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Get the name of this pass.
    pub fn name(&self) -> &'static str {
        "Unroller"
    }

    /// Rewrite `circuit` so that every instruction is in `natives`.
    ///
    /// The result keeps the circuit's name, size and level, and equals the
    /// input up to a global phase.
    #[instrument(skip(self, circuit, natives), fields(circuit = circuit.name()))]
    pub fn decompose(&self, circuit: &Circuit, natives: &NativeGates) -> CompileResult<Circuit> {
        let mut emitter = Emitter {
            natives,
            tolerance: self.tolerance,
            out: Vec::with_capacity(circuit.len()),
        };
        for inst in circuit.instructions() {
            emitter.instruction(inst)?;
        }
        debug!(
            "Unrolled {} instructions into {}",
            circuit.len(),
            emitter.out.len()
        );
        Ok(Circuit::from_instructions(
            circuit.name(),
            circuit.num_qubits(),
            circuit.level(),
            emitter.out,
        )?)
    }
}

/// Output buffer of one unroller run.
struct Emitter<'a> {
    natives: &'a NativeGates,
    tolerance: f64,
    out: Vec<Instruction>,
}

impl Emitter<'_> {
    fn instruction(&mut self, inst: &Instruction) -> CompileResult<()> {
        match &inst.kind {
            InstructionKind::Barrier => {
                self.out.push(inst.clone());
                Ok(())
            }
            InstructionKind::Measure => {
                if self.natives.contains("measure") {
                    self.out.push(inst.clone());
                    Ok(())
                } else {
                    Err(CompileError::Decomposition {
                        gate: "measure".into(),
                        reason: "measurement is not native".into(),
                    })
                }
            }
            InstructionKind::Gate(gate) => {
                // A custom gate is never native, whatever its name.
                if gate
                    .as_standard()
                    .is_some_and(|standard| self.natives.contains(standard.name()))
                {
                    self.out.push(inst.clone());
                    return Ok(());
                }
                match inst.qubits.as_slice() {
                    [q] => {
                        let u = gate.matrix_1q().ok_or_else(|| missing_matrix(gate))?;
                        self.one_qubit(&u, *q, gate.name())
                    }
                    [q0, q1] => self.two_qubit(gate, *q0, *q1),
                    _ => Err(missing_matrix(gate)),
                }
            }
        }
    }

    /// Emit `u` on `qubit` using native one-qubit gates.
    fn one_qubit(&mut self, u: &Unitary2x2, qubit: QubitId, name: &str) -> CompileResult<()> {
        if u.distance_up_to_phase(&Unitary2x2::identity()) < self.tolerance {
            return Ok(());
        }
        let (alpha, beta, gamma, _phase) = u.zyz_decomposition();
        let diagonal = u.data[1].norm() < self.tolerance && u.data[2].norm() < self.tolerance;

        if diagonal && self.natives.contains("rz") {
            self.rotation(StandardGate::Rz, alpha + gamma, qubit);
        } else if self.natives.contains("u") {
            self.out.push(Instruction::single_qubit_gate(
                StandardGate::U(beta, alpha, gamma),
                qubit,
            ));
        } else if self.natives.contains("rz") && self.natives.contains("ry") {
            self.rotation(StandardGate::Rz, gamma, qubit);
            self.rotation(StandardGate::Ry, beta, qubit);
            self.rotation(StandardGate::Rz, alpha, qubit);
        } else {
            return Err(CompileError::Decomposition {
                gate: name.into(),
                reason: "native set has neither u nor rz and ry".into(),
            });
        }
        Ok(())
    }

    /// Push a rotation unless its angle is negligible.
    fn rotation(&mut self, gate: fn(f64) -> StandardGate, angle: f64, qubit: QubitId) {
        let angle = Unitary2x2::normalize_angle(angle);
        if angle.abs() > self.tolerance {
            self.out.push(Instruction::single_qubit_gate(gate(angle), qubit));
        }
    }

    fn two_qubit(&mut self, gate: &Gate, q0: QubitId, q1: QubitId) -> CompileResult<()> {
        if self.natives.entangler().is_none() {
            return Err(CompileError::Decomposition {
                gate: gate.name().into(),
                reason: "native set has no two-qubit entangler (cz or cx)".into(),
            });
        }
        match gate.as_standard() {
            Some(StandardGate::CX) => self.cx(q0, q1),
            Some(StandardGate::CZ) => self.cz(q0, q1),
            Some(StandardGate::Swap) => {
                self.cx(q0, q1)?;
                self.cx(q1, q0)?;
                self.cx(q0, q1)
            }
            _ => {
                let u = gate.matrix_2q().ok_or_else(|| missing_matrix(gate))?;
                self.kak(&u, q0, q1, gate.name())
            }
        }
    }

    /// A native CX, or `H·CZ·H` on the target.
    fn cx(&mut self, control: QubitId, target: QubitId) -> CompileResult<()> {
        if self.natives.contains("cx") {
            self.out
                .push(Instruction::two_qubit_gate(StandardGate::CX, control, target));
            return Ok(());
        }
        let h = Unitary2x2::h();
        self.one_qubit(&h, target, "h")?;
        self.out
            .push(Instruction::two_qubit_gate(StandardGate::CZ, control, target));
        self.one_qubit(&h, target, "h")
    }

    /// A native CZ, or `H·CX·H` on the target.
    fn cz(&mut self, control: QubitId, target: QubitId) -> CompileResult<()> {
        if self.natives.contains("cz") {
            self.out
                .push(Instruction::two_qubit_gate(StandardGate::CZ, control, target));
            return Ok(());
        }
        let h = Unitary2x2::h();
        self.one_qubit(&h, target, "h")?;
        self.out
            .push(Instruction::two_qubit_gate(StandardGate::CX, control, target));
        self.one_qubit(&h, target, "h")
    }

    /// Synthesize `u` with at most three CX through its KAK form.
    fn kak(
        &mut self,
        u: &Unitary4x4,
        q0: QubitId,
        q1: QubitId,
        name: &str,
    ) -> CompileResult<()> {
        if let Some((first, second)) = as_tensor_product(u, KAK_TOLERANCE) {
            self.one_qubit(&first, q0, name)?;
            return self.one_qubit(&second, q1, name);
        }

        let kak = TwoQubitKak::decompose(u)?;
        debug!(
            "KAK of {}: a={:.6} b={:.6} c={:.6}",
            name, kak.a, kak.b, kak.c
        );

        // Canonical 3-CX circuit for N(a, b, c), with its outer Rz folded
        // into the local factors.
        self.one_qubit(&kak.b1, q0, name)?;
        self.one_qubit(&(Unitary2x2::rz(-FRAC_PI_2) * kak.b2), q1, name)?;
        self.cx(q1, q0)?;
        self.one_qubit(&Unitary2x2::ry(2.0 * kak.a - FRAC_PI_2), q1, name)?;
        self.cx(q0, q1)?;
        self.one_qubit(&Unitary2x2::rz(FRAC_PI_2 - 2.0 * kak.c), q0, name)?;
        self.one_qubit(&Unitary2x2::ry(FRAC_PI_2 - 2.0 * kak.b), q1, name)?;
        self.cx(q1, q0)?;
        self.one_qubit(&(kak.a1 * Unitary2x2::rz(FRAC_PI_2)), q0, name)?;
        self.one_qubit(&kak.a2, q1, name)
    }
}

fn missing_matrix(gate: &Gate) -> CompileError {
    CompileError::Decomposition {
        gate: gate.name().into(),
        reason: "gate has no matrix".into(),
    }
}
