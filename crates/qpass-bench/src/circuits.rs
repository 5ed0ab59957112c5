//! Benchmark circuits.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qpass_ir::{Circuit, IrError, IrResult, QubitId};

/// Generate a circuit of `n_controlled_gates` controlled gates on random
/// qubit pairs.
///
/// Each gate draws a distinct ordered pair uniformly. Gates are CX if
/// `use_cx`, otherwise CZ. The same seed always gives the same circuit.
pub fn random_control_circuit(
    n_qubits: u32,
    n_controlled_gates: usize,
    use_cx: bool,
    seed: u64,
) -> IrResult<Circuit> {
    let gate_name = if use_cx { "cx" } else { "cz" };
    let mut circuit = Circuit::new(
        format!("random_{gate_name}_{n_qubits}_{n_controlled_gates}"),
        n_qubits,
    );
    if n_controlled_gates == 0 {
        return Ok(circuit);
    }
    if n_qubits < 2 {
        return Err(IrError::QubitCountMismatch {
            gate_name: gate_name.into(),
            expected: 2,
            got: n_qubits,
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..n_controlled_gates {
        let control = rng.gen_range(0..n_qubits);
        // Draw from the other n - 1 qubits.
        let mut target = rng.gen_range(0..n_qubits - 1);
        if target >= control {
            target += 1;
        }
        let (control, target) = (QubitId(control), QubitId(target));
        if use_cx {
            circuit.cx(control, target)?;
        } else {
            circuit.cz(control, target)?;
        }
    }
    Ok(circuit)
}

/// Quantum Fourier transform on `n` qubits, final swaps included.
pub fn qft(n: u32) -> IrResult<Circuit> {
    Circuit::qft(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use qpass_ir::count_gates_of_type;

    #[test]
    fn test_gate_kind() {
        let cz = random_control_circuit(5, 10, false, 1).unwrap();
        assert_eq!(count_gates_of_type(&cz, "cz"), 10);
        assert_eq!(cz.len(), 10);

        let cx = random_control_circuit(5, 10, true, 1).unwrap();
        assert_eq!(count_gates_of_type(&cx, "cx"), 10);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = random_control_circuit(6, 30, false, 42).unwrap();
        let b = random_control_circuit(6, 30, false, 42).unwrap();
        let c = random_control_circuit(6, 30, false, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(random_control_circuit(1, 0, false, 0).unwrap().is_empty());
        assert!(matches!(
            random_control_circuit(1, 3, false, 0),
            Err(IrError::QubitCountMismatch { .. })
        ));
    }

    #[test]
    fn test_qft_fixture() {
        let circuit = qft(5).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(count_gates_of_type(&circuit, "h"), 5);
        assert_eq!(count_gates_of_type(&circuit, "swap"), 2);
    }

    proptest! {
        #[test]
        fn prop_pairs_are_distinct_and_in_range(
            n in 2u32..12,
            gates in 0usize..50,
            seed in any::<u64>(),
        ) {
            let circuit = random_control_circuit(n, gates, false, seed).unwrap();
            prop_assert_eq!(circuit.len(), gates);
            for inst in circuit.instructions() {
                prop_assert_ne!(inst.qubits[0], inst.qubits[1]);
                prop_assert!(inst.qubits.iter().all(|q| q.0 < n));
            }
        }
    }
}
