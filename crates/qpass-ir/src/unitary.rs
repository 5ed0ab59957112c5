//! Dense unitary matrices for one- and two-qubit gates.
//!
//! [`Unitary2x2`] and [`Unitary4x4`] back gate semantics across the
//! workspace: the simulator applies them, the unroller factors them.
//!
//! Two-qubit matrices are indexed `2 * b(q0) + b(q1)`, i.e. the first qubit
//! of a gate's qubit list is the most significant bit.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-10;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// Create the identity matrix.
    pub fn identity() -> Self {
        Self::new(ONE, ZERO, ZERO, ONE)
    }

    /// Hadamard.
    pub fn h() -> Self {
        let s = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        Self::new(s, s, s, -s)
    }

    /// Pauli-X.
    pub fn x() -> Self {
        Self::new(ZERO, ONE, ONE, ZERO)
    }

    /// Pauli-Y.
    pub fn y() -> Self {
        Self::new(ZERO, -I, I, ZERO)
    }

    /// Pauli-Z.
    pub fn z() -> Self {
        Self::new(ONE, ZERO, ZERO, -ONE)
    }

    /// sqrt(X).
    pub fn sx() -> Self {
        let half = Complex64::new(0.5, 0.0);
        let half_i = Complex64::new(0.0, 0.5);
        Self::new(half + half_i, half - half_i, half - half_i, half + half_i)
    }

    /// RX rotation `exp(-i theta X / 2)`.
    pub fn rx(theta: f64) -> Self {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new(0.0, -(theta / 2.0).sin());
        Self::new(c, s, s, c)
    }

    /// RY rotation `exp(-i theta Y / 2)`.
    pub fn ry(theta: f64) -> Self {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new((theta / 2.0).sin(), 0.0);
        Self::new(c, -s, s, c)
    }

    /// RZ rotation `exp(-i theta Z / 2)`.
    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            ZERO,
            ZERO,
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// Phase gate P(lambda) = diag(1, e^{i lambda}).
    pub fn p(lambda: f64) -> Self {
        Self::new(ONE, ZERO, ZERO, Complex64::from_polar(1.0, lambda))
    }

    /// Universal gate U(theta, phi, lambda).
    pub fn u(theta: f64, phi: f64, lambda: f64) -> Self {
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        Self::new(
            Complex64::new(c, 0.0),
            -Complex64::from_polar(s, lambda),
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        )
    }

    /// Build from a row-major slice of four entries.
    pub fn from_slice(entries: &[Complex64]) -> Option<Self> {
        match entries {
            [a, b, c, d] => Some(Self::new(*a, *b, *c, *d)),
            _ => None,
        }
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[2 * row + col]
    }

    /// Multiply this matrix by another: self * other.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Scale every entry.
    pub fn scale(&self, factor: Complex64) -> Self {
        let [a, b, c, d] = self.data;
        Self::new(a * factor, b * factor, c * factor, d * factor)
    }

    /// Get the conjugate transpose (dagger).
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Determinant.
    pub fn det(&self) -> Complex64 {
        self.data[0] * self.data[3] - self.data[1] * self.data[2]
    }

    /// Check if this is approximately identity (up to global phase).
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;
        if b.norm() > EPSILON || c.norm() > EPSILON {
            return false;
        }
        (a - d).norm() < EPSILON
    }

    /// Check `U U^dagger = I` within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        let product = self.mul(&self.dagger());
        product
            .data
            .iter()
            .zip(Self::identity().data.iter())
            .all(|(got, want)| (got - want).norm() < tolerance)
    }

    /// Largest entry-wise deviation between `self` and `other` after
    /// removing the best global phase.
    pub fn distance_up_to_phase(&self, other: &Self) -> f64 {
        phase_aligned_distance(&self.data, &other.data)
    }

    /// Decompose into RZ(alpha) * RY(beta) * RZ(gamma) * `global_phase`.
    ///
    /// Returns (alpha, beta, gamma, `global_phase`) with
    /// `U = e^{i global_phase} Rz(alpha) Ry(beta) Rz(gamma)`.
    pub fn zyz_decomposition(&self) -> (f64, f64, f64, f64) {
        let [a, b, c, d] = self.data;

        let det = a * d - b * c;
        let global_phase = det.arg() / 2.0;

        // Remove global phase to get an SU(2) matrix
        let phase_factor = Complex64::from_polar(1.0, -global_phase);
        let a = a * phase_factor;
        let b = b * phase_factor;
        let c = c * phase_factor;

        // For SU(2): U = [[cos(b/2)*e^(-i(a+g)/2), -sin(b/2)*e^(-i(a-g)/2)],
        //                 [sin(b/2)*e^(i(a-g)/2),   cos(b/2)*e^(i(a+g)/2)]]
        let beta = 2.0 * a.norm().min(1.0).acos();

        if beta.abs() < EPSILON {
            let alpha_plus_gamma = -2.0 * a.arg();
            return (
                alpha_plus_gamma / 2.0,
                0.0,
                alpha_plus_gamma / 2.0,
                global_phase,
            );
        }

        if (beta - PI).abs() < EPSILON {
            let alpha_minus_gamma = -2.0 * (-b).arg();
            return (
                alpha_minus_gamma / 2.0,
                PI,
                -alpha_minus_gamma / 2.0,
                global_phase,
            );
        }

        let alpha_plus_gamma = -2.0 * a.arg();
        let alpha_minus_gamma = 2.0 * c.arg();

        let alpha = f64::midpoint(alpha_plus_gamma, alpha_minus_gamma);
        let gamma = (alpha_plus_gamma - alpha_minus_gamma) / 2.0;

        (alpha, beta, gamma, global_phase)
    }

    /// Normalize angles to [-pi, pi].
    pub fn normalize_angle(angle: f64) -> f64 {
        if angle.is_nan() || angle.is_infinite() {
            return 0.0;
        }
        let mut a = angle.rem_euclid(2.0 * PI);
        if a > PI {
            a -= 2.0 * PI;
        }
        a
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

/// A 4x4 unitary acting on an ordered qubit pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unitary4x4 {
    /// Rows of the matrix.
    pub data: [[Complex64; 4]; 4],
}

impl Unitary4x4 {
    /// Build from rows.
    pub fn from_rows(data: [[Complex64; 4]; 4]) -> Self {
        Self { data }
    }

    /// Build from a row-major slice of sixteen entries.
    pub fn from_slice(entries: &[Complex64]) -> Option<Self> {
        if entries.len() != 16 {
            return None;
        }
        let mut data = [[ZERO; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            row.copy_from_slice(&entries[4 * i..4 * i + 4]);
        }
        Some(Self { data })
    }

    /// Row-major entries.
    pub fn to_vec(&self) -> Vec<Complex64> {
        self.data.iter().flatten().copied().collect()
    }

    /// The identity.
    pub fn identity() -> Self {
        Self::diagonal([ONE; 4])
    }

    /// A diagonal matrix.
    pub fn diagonal(diag: [Complex64; 4]) -> Self {
        let mut data = [[ZERO; 4]; 4];
        for (i, value) in diag.into_iter().enumerate() {
            data[i][i] = value;
        }
        Self { data }
    }

    /// Tensor product `a ⊗ b`, with `a` acting on the first qubit.
    pub fn kron(a: &Unitary2x2, b: &Unitary2x2) -> Self {
        let mut data = [[ZERO; 4]; 4];
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    for l in 0..2 {
                        data[2 * i + k][2 * j + l] = a.get(i, j) * b.get(k, l);
                    }
                }
            }
        }
        Self { data }
    }

    /// `|0><0| ⊗ I + |1><1| ⊗ u`: first qubit controls `u` on the second.
    pub fn controlled(u: &Unitary2x2) -> Self {
        let mut data = Self::identity().data;
        data[2][2] = u.get(0, 0);
        data[2][3] = u.get(0, 1);
        data[3][2] = u.get(1, 0);
        data[3][3] = u.get(1, 1);
        Self { data }
    }

    /// CNOT, control on the first qubit.
    pub fn cx() -> Self {
        Self::controlled(&Unitary2x2::x())
    }

    /// Controlled-Z.
    pub fn cz() -> Self {
        Self::diagonal([ONE, ONE, ONE, -ONE])
    }

    /// SWAP.
    pub fn swap() -> Self {
        let mut data = [[ZERO; 4]; 4];
        data[0][0] = ONE;
        data[1][2] = ONE;
        data[2][1] = ONE;
        data[3][3] = ONE;
        Self { data }
    }

    /// iSWAP.
    pub fn iswap() -> Self {
        let mut data = [[ZERO; 4]; 4];
        data[0][0] = ONE;
        data[1][2] = I;
        data[2][1] = I;
        data[3][3] = ONE;
        Self { data }
    }

    /// `exp(-i theta/2 P⊗P)` for a Pauli `P` given by its 2x2 matrix.
    pub fn pauli_rotation(pauli: &Unitary2x2, theta: f64) -> Self {
        let pp = Self::kron(pauli, pauli);
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new(0.0, -(theta / 2.0).sin());
        let mut data = [[ZERO; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                let identity = if i == j { c } else { ZERO };
                *entry = identity + s * pp.data[i][j];
            }
        }
        Self { data }
    }

    /// Matrix product `self * other`.
    pub fn mul(&self, other: &Self) -> Self {
        let mut data = [[ZERO; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = (0..4).map(|k| self.data[i][k] * other.data[k][j]).sum();
            }
        }
        Self { data }
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        let mut data = [[ZERO; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = self.data[j][i].conj();
            }
        }
        Self { data }
    }

    /// Plain transpose.
    pub fn transpose(&self) -> Self {
        let mut data = [[ZERO; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = self.data[j][i];
            }
        }
        Self { data }
    }

    /// Scale every entry.
    pub fn scale(&self, factor: Complex64) -> Self {
        let mut data = self.data;
        for entry in data.iter_mut().flatten() {
            *entry *= factor;
        }
        Self { data }
    }

    /// The same operator with its two qubits exchanged (`SWAP · U · SWAP`).
    pub fn reversed_qubits(&self) -> Self {
        const PERM: [usize; 4] = [0, 2, 1, 3];
        let mut data = [[ZERO; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = self.data[PERM[i]][PERM[j]];
            }
        }
        Self { data }
    }

    /// Determinant by cofactor expansion over 2x2 minors.
    pub fn det(&self) -> Complex64 {
        let m = &self.data;
        let minor = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        // Laplace expansion along the first two rows.
        let pairs = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
        let mut det = ZERO;
        for &(c0, c1) in &pairs {
            let rest: Vec<usize> = (0..4).filter(|c| *c != c0 && *c != c1).collect();
            let sign = if (c0 + c1 + 1) % 2 == 0 { 1.0 } else { -1.0 };
            det += sign * minor(0, 1, c0, c1) * minor(2, 3, rest[0], rest[1]);
        }
        det
    }

    /// Check `U U^dagger = I` within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        let product = self.mul(&self.dagger());
        let identity = Self::identity();
        product
            .data
            .iter()
            .flatten()
            .zip(identity.data.iter().flatten())
            .all(|(got, want)| (got - want).norm() < tolerance)
    }

    /// Largest entry-wise deviation between `self` and `other` after
    /// removing the best global phase.
    pub fn distance_up_to_phase(&self, other: &Self) -> f64 {
        let a: Vec<Complex64> = self.data.iter().flatten().copied().collect();
        let b: Vec<Complex64> = other.data.iter().flatten().copied().collect();
        phase_aligned_distance(&a, &b)
    }

    /// Largest entry-wise deviation without any phase freedom.
    pub fn distance(&self, other: &Self) -> f64 {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, worst_deviation)
    }
}

impl Default for Unitary4x4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary4x4 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary4x4::mul(&self, &rhs)
    }
}

/// Max-norm distance between `a` and `e^{i phi} b` for the phase that aligns
/// them best (taken from the Hilbert-Schmidt inner product).
fn phase_aligned_distance(a: &[Complex64], b: &[Complex64]) -> f64 {
    let overlap: Complex64 = a.iter().zip(b).map(|(x, y)| x.conj() * y).sum();
    let phase = if overlap.norm() < EPSILON {
        ONE
    } else {
        overlap / overlap.norm()
    };
    a.iter()
        .zip(b)
        .map(|(x, y)| (x * phase - y).norm())
        .fold(0.0, worst_deviation)
}

/// Max-fold step where a non-finite deviation is infinitely bad.
fn worst_deviation(worst: f64, deviation: f64) -> f64 {
    if deviation.is_finite() {
        worst.max(deviation)
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn zyz_roundtrip(u: &Unitary2x2) -> f64 {
        let (alpha, beta, gamma, phase) = u.zyz_decomposition();
        let rebuilt = (Unitary2x2::rz(alpha) * Unitary2x2::ry(beta) * Unitary2x2::rz(gamma))
            .scale(Complex64::from_polar(1.0, phase));
        rebuilt
            .data
            .iter()
            .zip(u.data.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, worst_deviation)
    }

    #[test]
    fn test_hadamard_squared() {
        let h = Unitary2x2::h();
        assert!((h * h).is_identity());
    }

    #[test]
    fn test_pauli_squared() {
        for p in [Unitary2x2::x(), Unitary2x2::y(), Unitary2x2::z()] {
            assert!((p * p).is_identity());
        }
    }

    #[test]
    fn test_zyz_identity() {
        let (_alpha, beta, _gamma, _phase) = Unitary2x2::identity().zyz_decomposition();
        assert!(approx_eq(beta, 0.0));
    }

    #[test]
    fn test_zyz_reconstructs_exactly() {
        let cases = [
            Unitary2x2::h(),
            Unitary2x2::x(),
            Unitary2x2::y(),
            Unitary2x2::sx(),
            Unitary2x2::u(0.3, -1.2, 2.5),
            Unitary2x2::u(PI, 0.4, 0.1),
            Unitary2x2::rx(1e-12),
            Unitary2x2::p(0.7),
        ];
        for u in &cases {
            assert!(zyz_roundtrip(u) < 1e-9, "ZYZ failed for {u:?}");
        }
    }

    #[test]
    fn test_u_matches_rotations_up_to_phase() {
        let u = Unitary2x2::u(0.8, 0.3, -0.5);
        let rot = Unitary2x2::rz(0.3) * Unitary2x2::ry(0.8) * Unitary2x2::rz(-0.5);
        assert!(u.distance_up_to_phase(&rot) < 1e-12);
    }

    #[test]
    fn test_kron_ordering() {
        // X on the first qubit flips the most significant bit.
        let xi = Unitary4x4::kron(&Unitary2x2::x(), &Unitary2x2::identity());
        assert_eq!(xi.data[2][0], ONE);
        assert_eq!(xi.data[0][2], ONE);
        assert_eq!(xi.data[1][0], ZERO);
    }

    #[test]
    fn test_cx_from_cz_and_hadamards() {
        let h_target = Unitary4x4::kron(&Unitary2x2::identity(), &Unitary2x2::h());
        let built = h_target * Unitary4x4::cz() * h_target;
        assert!(built.distance(&Unitary4x4::cx()) < 1e-12);
    }

    #[test]
    fn test_swap_is_three_cnots() {
        let cx01 = Unitary4x4::cx();
        let cx10 = cx01.reversed_qubits();
        let built = cx01 * cx10 * cx01;
        assert!(built.distance(&Unitary4x4::swap()) < 1e-12);
    }

    #[test]
    fn test_det_of_standard_gates() {
        assert!((Unitary4x4::identity().det() - ONE).norm() < 1e-12);
        assert!((Unitary4x4::cz().det() + ONE).norm() < 1e-12);
        assert!((Unitary4x4::swap().det() + ONE).norm() < 1e-12);
        let kron = Unitary4x4::kron(&Unitary2x2::rz(0.4), &Unitary2x2::ry(1.1));
        assert!((kron.det() - ONE).norm() < 1e-12);
    }

    #[test]
    fn test_pauli_rotation_is_unitary() {
        let rzz = Unitary4x4::pauli_rotation(&Unitary2x2::z(), 0.9);
        assert!(rzz.is_unitary(1e-12));
        assert!((rzz.data[0][0] - Complex64::from_polar(1.0, -0.45)).norm() < 1e-12);
        assert!((rzz.data[1][1] - Complex64::from_polar(1.0, 0.45)).norm() < 1e-12);
    }

    #[test]
    fn test_distance_up_to_phase_ignores_phase() {
        let u = Unitary4x4::cx();
        let shifted = u.scale(Complex64::from_polar(1.0, 1.3));
        assert!(u.distance_up_to_phase(&shifted) < 1e-12);
        assert!(u.distance(&shifted) > 0.5);
    }

    #[test]
    fn test_nan_matrix_exceeds_any_tolerance() {
        let nan = Complex64::new(f64::NAN, 0.0);
        let broken = Unitary4x4::cz().scale(nan);
        assert!(broken.distance(&Unitary4x4::cz()) > 1e6);
        assert!(Unitary4x4::cz().distance(&broken) > 1e6);
        assert!(broken.distance_up_to_phase(&Unitary4x4::cz()) > 1e6);

        let half_broken = Unitary2x2::new(nan, ZERO, ZERO, ONE);
        assert!(half_broken.distance_up_to_phase(&Unitary2x2::identity()) > 1e6);
        assert!(Unitary2x2::identity().distance_up_to_phase(&half_broken) > 1e6);
    }
}
