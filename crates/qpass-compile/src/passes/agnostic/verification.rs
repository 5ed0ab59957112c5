//! Checks that a transpiled circuit is correct.
//!
//! These are not passes: the pipeline calls them after the last pass when
//! verification is enabled, and tests call them directly.

use tracing::debug;

use qpass_ir::{Circuit, Instruction};
use qpass_sim::Statevector;

use crate::connectivity::Connectivity;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::property::NativeGates;

/// Default tolerance for [`verify_equivalence`].
pub const DEFAULT_VERIFY_TOLERANCE: f64 = 1e-6;

/// Default number of random input states.
pub const DEFAULT_VERIFY_TRIALS: usize = 3;

/// Check that `transpiled` implements `original` up to the qubit
/// permutation described by the layouts and a global phase.
///
/// Each trial draws a random state over the physical qubits. The original
/// runs on it directly, with its logical indices. The transpiled circuit
/// runs on the same state moved through `initial`, and its output is moved
/// back through `final_layout`. Returns the largest deviation seen.
pub fn verify_equivalence(
    original: &Circuit,
    transpiled: &Circuit,
    initial: &Layout,
    final_layout: &Layout,
    tolerance: f64,
    trials: usize,
    seed: u64,
) -> CompileResult<f64> {
    let n = transpiled.num_qubits();
    if original.num_qubits() > n {
        return Err(CompileError::CircuitTooLarge {
            required: original.num_qubits() as usize,
            available: n,
        });
    }
    for layout in [initial, final_layout] {
        if layout.len() != n as usize {
            return Err(CompileError::InvalidLayout(format!(
                "layout covers {} qubits, circuit has {n}",
                layout.len()
            )));
        }
    }

    let mut padded = original.clone();
    padded.resize(n)?;

    let mut worst: f64 = 0.0;
    for trial in 0..trials {
        let input = Statevector::random(n, seed.wrapping_add(trial as u64))?;

        let mut expected = input.clone();
        expected.run(&padded)?;

        let mut actual = input.permute_qubits(initial.as_permutation())?;
        actual.run(transpiled)?;
        let actual = actual.permute_qubits(final_layout.inverse_permutation())?;

        let deviation = expected.phase_deviation(&actual)?;
        debug!("Equivalence trial {}: deviation {:.3e}", trial, deviation);
        if deviation > tolerance {
            return Err(CompileError::NumericTolerance {
                context: format!("equivalence check of '{}'", original.name()),
                deviation,
                tolerance,
            });
        }
        worst = worst.max(deviation);
    }
    Ok(worst)
}

/// Check that every two-qubit gate of a physical circuit acts on a coupled
/// pair.
pub fn check_connectivity(circuit: &Circuit, connectivity: &Connectivity) -> CompileResult<()> {
    if circuit.num_qubits() > connectivity.num_qubits() {
        return Err(CompileError::CircuitTooLarge {
            required: circuit.num_qubits() as usize,
            available: connectivity.num_qubits(),
        });
    }
    for inst in circuit.instructions() {
        if inst.is_two_qubit_gate() {
            let (p0, p1) = (inst.qubits[0].0, inst.qubits[1].0);
            if !connectivity.is_connected(p0, p1) {
                return Err(CompileError::RoutingFailed {
                    qubit1: p0,
                    qubit2: p1,
                });
            }
        }
    }
    Ok(())
}

/// Check that every instruction is native. Custom gates never are.
pub fn check_native(circuit: &Circuit, natives: &NativeGates) -> CompileResult<()> {
    match circuit
        .instructions()
        .iter()
        .find(|inst| !is_native(inst, natives))
    {
        Some(inst) => Err(CompileError::Decomposition {
            gate: inst.name().to_string(),
            reason: "not in the native gate set".into(),
        }),
        None => Ok(()),
    }
}

fn is_native(inst: &Instruction, natives: &NativeGates) -> bool {
    let custom = inst.as_gate().is_some_and(|gate| gate.as_standard().is_none());
    !custom && natives.contains(inst.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpass_ir::{CircuitLevel, CustomGate, QubitId, Unitary4x4};

    #[test]
    fn test_relabelled_circuit_is_equivalent() {
        let mut circuit = Circuit::new("test", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.ry(0.4, QubitId(1)).unwrap();

        let layout = Layout::from_physical(vec![2, 0, 1]).unwrap();
        let physical = circuit
            .relabelled(3, CircuitLevel::Physical, |q| QubitId(layout.physical(q.0)))
            .unwrap();

        let deviation =
            verify_equivalence(&circuit, &physical, &layout, &layout, 1e-9, 3, 7).unwrap();
        assert!(deviation < 1e-12);
    }

    #[test]
    fn test_swap_moves_final_layout() {
        let mut circuit = Circuit::new("test", 2);
        circuit.x(QubitId(0)).unwrap();

        // Same X, then a SWAP that leaves logical 0 on physical 1.
        let mut physical = Circuit::with_level("test", 2, CircuitLevel::Physical);
        physical.x(QubitId(0)).unwrap();
        physical.swap(QubitId(0), QubitId(1)).unwrap();

        let initial = Layout::trivial(2);
        let moved = Layout::from_physical(vec![1, 0]).unwrap();
        assert!(verify_equivalence(&circuit, &physical, &initial, &moved, 1e-9, 2, 0).is_ok());

        let err = verify_equivalence(&circuit, &physical, &initial, &initial, 1e-6, 2, 0)
            .unwrap_err();
        assert!(matches!(err, CompileError::NumericTolerance { .. }));
    }

    #[test]
    fn test_check_connectivity_and_native() {
        let mut circuit = Circuit::new("test", 3);
        circuit.cz(QubitId(0), QubitId(2)).unwrap();
        let line = Connectivity::line(3);
        assert!(matches!(
            check_connectivity(&circuit, &line),
            Err(CompileError::RoutingFailed {
                qubit1: 0,
                qubit2: 2
            })
        ));
        assert!(check_connectivity(&circuit, &Connectivity::complete(3)).is_ok());

        assert!(check_native(&circuit, &NativeGates::default()).is_ok());
        assert!(matches!(
            check_native(&circuit, &NativeGates::cx_based()),
            Err(CompileError::Decomposition { .. })
        ));
    }

    #[test]
    fn test_custom_gate_named_like_a_native_is_rejected() {
        let mut circuit = Circuit::new("test", 2);
        circuit
            .gate(
                CustomGate::from_unitary_2q("cz", &Unitary4x4::iswap()),
                [QubitId(0), QubitId(1)],
            )
            .unwrap();

        assert!(matches!(
            check_native(&circuit, &NativeGates::default()),
            Err(CompileError::Decomposition { gate, .. }) if gate == "cz"
        ));
    }
}
