//! Statevector simulation engine.
//!
//! Amplitude index bit `q` holds qubit `q` (little-endian), so qubit 0 is
//! the least significant bit of a basis state index.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qpass_ir::{Circuit, GateKind, Instruction, InstructionKind, StandardGate, Unitary2x2, Unitary4x4};

use crate::error::{SimError, SimResult};

/// Largest state the simulator will allocate.
pub const MAX_QUBITS: u32 = 24;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// A statevector representing a quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: u32,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: u32) -> SimResult<Self> {
        check_size(num_qubits)?;
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// A normalized pseudo-random state drawn from `seed`.
    pub fn random(num_qubits: u32, seed: u64) -> SimResult<Self> {
        check_size(num_qubits)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut amplitudes: Vec<Complex64> = (0..1usize << num_qubits)
            .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect();
        let norm = amplitudes.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt();
        for amp in &mut amplitudes {
            *amp /= norm;
        }
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Wrap an amplitude vector whose length is a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> SimResult<Self> {
        let len = amplitudes.len();
        if !len.is_power_of_two() {
            return Err(SimError::InvalidLength(len));
        }
        let num_qubits = len.trailing_zeros();
        check_size(num_qubits)?;
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The amplitudes, indexed by basis state.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Squared norm of the state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Run every instruction of `circuit` on this state.
    pub fn run(&mut self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() != self.num_qubits {
            return Err(SimError::DimensionMismatch {
                left: self.num_qubits,
                right: circuit.num_qubits(),
            });
        }
        for inst in circuit.instructions() {
            self.apply(inst)?;
        }
        Ok(())
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) -> SimResult<()> {
        for q in &instruction.qubits {
            if q.0 >= self.num_qubits {
                return Err(SimError::QubitOutOfRange {
                    qubit: q.0,
                    n_qubits: self.num_qubits,
                });
            }
        }
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<_> = instruction.qubits.iter().map(|q| q.index()).collect();
                match &gate.kind {
                    GateKind::Standard(std_gate) => self.apply_standard_gate(std_gate, &qubits),
                    GateKind::Custom(custom) => match qubits.as_slice() {
                        [q] => {
                            let m = custom
                                .matrix_1q()
                                .ok_or_else(|| SimError::MissingMatrix(custom.name.clone()))?;
                            self.apply_matrix_1q(*q, &m);
                            Ok(())
                        }
                        [q0, q1] => {
                            let m = custom
                                .matrix_2q()
                                .ok_or_else(|| SimError::MissingMatrix(custom.name.clone()))?;
                            self.apply_matrix_2q(*q0, *q1, &m);
                            Ok(())
                        }
                        _ => Err(SimError::MissingMatrix(custom.name.clone())),
                    },
                }
            }
            // Measurements are treated as identity: verification compares
            // the unitary part only.
            InstructionKind::Measure | InstructionKind::Barrier => Ok(()),
        }
    }

    /// Apply a standard gate, with fast paths for the common permutation
    /// and diagonal gates.
    fn apply_standard_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> SimResult<()> {
        match (gate, qubits) {
            (StandardGate::I, _) => {}
            (StandardGate::X, [q]) => self.apply_x(*q),
            (StandardGate::Z, [q]) => self.apply_z(*q),
            (StandardGate::H, [q]) => self.apply_h(*q),
            (StandardGate::CX, [c, t]) => self.apply_cx(*c, *t),
            (StandardGate::CZ, [c, t]) => self.apply_cz(*c, *t),
            (StandardGate::Swap, [a, b]) => self.apply_swap(*a, *b),
            (_, [q]) => {
                let m = gate
                    .matrix_1q()
                    .ok_or_else(|| SimError::MissingMatrix(gate.name().into()))?;
                self.apply_matrix_1q(*q, &m);
            }
            (_, [q0, q1]) => {
                let m = gate
                    .matrix_2q()
                    .ok_or_else(|| SimError::MissingMatrix(gate.name().into()))?;
                self.apply_matrix_2q(*q0, *q1, &m);
            }
            _ => return Err(SimError::MissingMatrix(gate.name().into())),
        }
        Ok(())
    }

    // =========================================================================
    // Generic matrix application
    // =========================================================================

    /// Apply a 2x2 unitary to `qubit`.
    pub fn apply_matrix_1q(&mut self, qubit: usize, m: &Unitary2x2) {
        let mask = 1 << qubit;
        let [m00, m01, m10, m11] = m.data;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m00 * a + m01 * b;
                self.amplitudes[j] = m10 * a + m11 * b;
            }
        }
    }

    /// Apply a 4x4 unitary to the ordered pair `(q0, q1)`; `q0` is the most
    /// significant index of the matrix.
    pub fn apply_matrix_2q(&mut self, q0: usize, q1: usize, m: &Unitary4x4) {
        let mask0 = 1 << q0;
        let mask1 = 1 << q1;
        for i in 0..self.amplitudes.len() {
            if i & (mask0 | mask1) != 0 {
                continue;
            }
            let idx = [i, i | mask1, i | mask0, i | mask0 | mask1];
            let v = idx.map(|k| self.amplitudes[k]);
            for (row, &k) in idx.iter().enumerate() {
                self.amplitudes[k] = (0..4).map(|col| m.data[row][col] * v[col]).sum();
            }
        }
    }

    // =========================================================================
    // Fast paths
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask != 0 {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Comparison and relabelling
    // =========================================================================

    /// Move qubit `l` to position `perm[l]` for every `l`.
    pub fn permute_qubits(&self, perm: &[u32]) -> SimResult<Self> {
        let n = self.num_qubits as usize;
        if perm.len() != n {
            return Err(SimError::InvalidPermutation(format!(
                "expected {n} entries, got {}",
                perm.len()
            )));
        }
        let mut seen = vec![false; n];
        for &p in perm {
            let p = p as usize;
            if p >= n || seen[p] {
                return Err(SimError::InvalidPermutation(format!(
                    "{perm:?} is not a bijection on 0..{n}"
                )));
            }
            seen[p] = true;
        }

        let mut amplitudes = vec![ZERO; self.amplitudes.len()];
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let j = perm
                .iter()
                .enumerate()
                .filter(|(l, _)| i & (1 << l) != 0)
                .fold(0usize, |acc, (_, p)| acc | (1 << p));
            amplitudes[j] = *amp;
        }
        Ok(Self {
            amplitudes,
            num_qubits: self.num_qubits,
        })
    }

    /// Inner product ⟨self|other⟩.
    pub fn inner_product(&self, other: &Self) -> SimResult<Complex64> {
        if self.num_qubits != other.num_qubits {
            return Err(SimError::DimensionMismatch {
                left: self.num_qubits,
                right: other.num_qubits,
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// State fidelity |⟨self|other⟩|².
    pub fn fidelity(&self, other: &Self) -> SimResult<f64> {
        Ok(self.inner_product(other)?.norm_sqr())
    }

    /// Deviation from equality up to global phase: `1 - |⟨self|other⟩|`.
    /// Zero for states that differ only by a phase, infinite when either
    /// state holds a non-finite amplitude.
    pub fn phase_deviation(&self, other: &Self) -> SimResult<f64> {
        let deviation = 1.0 - self.inner_product(other)?.norm();
        if deviation.is_finite() {
            Ok(deviation.max(0.0))
        } else {
            Ok(f64::INFINITY)
        }
    }

    /// True if the states agree up to global phase within `tolerance`.
    pub fn equal_up_to_phase(&self, other: &Self, tolerance: f64) -> SimResult<bool> {
        Ok(self.phase_deviation(other)? <= tolerance)
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }
}

fn check_size(num_qubits: u32) -> SimResult<()> {
    if num_qubits > MAX_QUBITS {
        return Err(SimError::TooManyQubits {
            requested: num_qubits,
            max: MAX_QUBITS,
        });
    }
    Ok(())
}

/// Simulate `circuit` from |0...0⟩.
pub fn simulate(circuit: &Circuit) -> SimResult<Statevector> {
    let mut state = Statevector::new(circuit.num_qubits())?;
    state.run(circuit)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpass_ir::{CustomGate, QubitId};

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2).unwrap();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], ZERO));
        assert!(approx_eq(sv.amplitudes[2], ZERO));
        assert!(approx_eq(sv.amplitudes[3], ZERO));
    }

    #[test]
    fn test_bell_state() {
        let mut circuit = Circuit::new("bell", 2);
        circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        let sv = simulate(&circuit).unwrap();

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], ZERO));
        assert!(approx_eq(sv.amplitudes[2], ZERO));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_x_is_little_endian() {
        let mut circuit = Circuit::new("x", 3);
        circuit.x(QubitId(1)).unwrap();
        let sv = simulate(&circuit).unwrap();
        assert!(approx_eq(sv.amplitudes[0b010], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_fast_paths_match_matrices() {
        let gates = [
            (StandardGate::X, vec![2usize]),
            (StandardGate::Z, vec![0]),
            (StandardGate::H, vec![1]),
            (StandardGate::CX, vec![2, 0]),
            (StandardGate::CZ, vec![0, 1]),
            (StandardGate::Swap, vec![1, 2]),
        ];
        for (gate, qubits) in gates {
            let base = Statevector::random(3, 7).unwrap();
            let mut fast = base.clone();
            fast.apply_standard_gate(&gate, &qubits).unwrap();

            let mut generic = base.clone();
            match qubits.as_slice() {
                [q] => generic.apply_matrix_1q(*q, &gate.matrix_1q().unwrap()),
                [a, b] => generic.apply_matrix_2q(*a, *b, &gate.matrix_2q().unwrap()),
                _ => unreachable!(),
            }
            for (x, y) in fast.amplitudes.iter().zip(&generic.amplitudes) {
                assert!(approx_eq(*x, *y), "fast path differs for {}", gate.name());
            }
        }
    }

    #[test]
    fn test_custom_gate_applies_matrix() {
        let swap = CustomGate::from_unitary_2q("fused", &Unitary4x4::swap());
        let mut circuit = Circuit::new("custom", 2);
        circuit.x(QubitId(0)).unwrap();
        circuit.gate(swap, [QubitId(0), QubitId(1)]).unwrap();
        let sv = simulate(&circuit).unwrap();
        assert!(approx_eq(sv.amplitudes[0b10], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_random_state_normalized_and_seeded() {
        let a = Statevector::random(4, 42).unwrap();
        let b = Statevector::random(4, 42).unwrap();
        let c = Statevector::random(4, 43).unwrap();
        assert!((a.norm_sqr() - 1.0).abs() < 1e-12);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_permute_matches_swap_gate() {
        let base = Statevector::random(3, 5).unwrap();
        let permuted = base.permute_qubits(&[2, 1, 0]).unwrap();

        let mut swapped = base.clone();
        swapped.apply_swap(0, 2);
        assert!(permuted.phase_deviation(&swapped).unwrap() < 1e-12);
    }

    #[test]
    fn test_permute_rejects_non_bijection() {
        let base = Statevector::new(3).unwrap();
        assert!(matches!(
            base.permute_qubits(&[0, 0, 1]),
            Err(SimError::InvalidPermutation(_))
        ));
        assert!(matches!(
            base.permute_qubits(&[0, 1]),
            Err(SimError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_global_phase_is_ignored() {
        let a = Statevector::random(2, 1).unwrap();
        let phase = Complex64::from_polar(1.0, 0.9);
        let b = Statevector::from_amplitudes(a.amplitudes.iter().map(|x| x * phase).collect())
            .unwrap();
        assert!(a.equal_up_to_phase(&b, 1e-12).unwrap());
        assert!((a.fidelity(&b).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_size_limits() {
        assert!(matches!(
            Statevector::new(MAX_QUBITS + 1),
            Err(SimError::TooManyQubits { .. })
        ));
        assert!(matches!(
            Statevector::from_amplitudes(vec![ZERO; 3]),
            Err(SimError::InvalidLength(3))
        ));
    }

    #[test]
    fn test_run_checks_dimensions() {
        let mut sv = Statevector::new(2).unwrap();
        let circuit = Circuit::new("wide", 3);
        assert!(matches!(
            sv.run(&circuit),
            Err(SimError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_nan_state_exceeds_any_tolerance() {
        let good = Statevector::new(1).unwrap();
        let nan = Complex64::new(f64::NAN, 0.0);
        let broken = Statevector::from_amplitudes(vec![nan, ZERO]).unwrap();

        assert!(good.phase_deviation(&broken).unwrap().is_infinite());
        assert!(broken.phase_deviation(&good).unwrap().is_infinite());
        assert!(!good.equal_up_to_phase(&broken, 1e6).unwrap());
    }
}
