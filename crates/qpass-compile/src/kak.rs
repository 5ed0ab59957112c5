//! Two-qubit KAK (Cartan) decomposition.
//!
//! Every two-qubit unitary factors as
//!
//! ```text
//! U = e^{iφ} (A1 ⊗ A2) · N(a, b, c) · (B1 ⊗ B2),   N = exp(i(a·XX + b·YY + c·ZZ))
//! ```
//!
//! In the magic basis, local gates `SU(2) ⊗ SU(2)` become real orthogonal
//! matrices and `N` becomes diagonal. With `Up = B† U B`, the symmetric
//! unitary `UpᵀUp` is diagonalized by a real orthogonal matrix, which yields
//! both the interaction coefficients and the local factors.
//!
//! `UpᵀUp` has commuting real and imaginary parts. A random real
//! combination of the two shares their eigenvectors unless it is
//! accidentally degenerate, so the eigen-solve is retried with fresh
//! coefficients until the eigenvectors diagonalize the full matrix.
//!
//! The result is always checked by reconstruction; a decomposition off by
//! more than [`KAK_TOLERANCE`] is an error rather than a silently wrong
//! circuit.

use nalgebra::Matrix4;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qpass_ir::{Unitary2x2, Unitary4x4};

use crate::error::{CompileError, CompileResult};

/// Maximum entry-wise deviation of a reconstructed decomposition.
pub const KAK_TOLERANCE: f64 = 1e-7;

/// Maximum deviation when checking an eigenbasis of `UpᵀUp`.
const DIAGONALIZATION_TOLERANCE: f64 = 1e-9;

/// Determinant below which a 2x2 block cannot seed a tensor factor.
const SINGULAR_BLOCK_TOLERANCE: f64 = 1e-6;

/// Eigen-solve attempts with random coefficients after the fixed first one.
const DIAGONALIZATION_RETRIES: usize = 100;

/// Seed of the retry coefficients.
const DIAGONALIZATION_SEED: u64 = 2020;

/// First real/imaginary mixing coefficients; arbitrary but fixed.
const FIRST_MIX: (f64, f64) = (1.260_206_611_224_938_8, 0.223_178_490_467_220_27);

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// `1/√2 · [[1, i, 0, 0], [0, 0, i, 1], [0, 0, i, -1], [1, -i, 0, 0]]`.
fn magic_basis() -> Unitary4x4 {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let r = Complex64::new(s, 0.0);
    let i = Complex64::new(0.0, s);
    Unitary4x4::from_rows([
        [r, i, ZERO, ZERO],
        [ZERO, ZERO, i, r],
        [ZERO, ZERO, i, -r],
        [r, -i, ZERO, ZERO],
    ])
}

/// A two-qubit unitary in KAK form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoQubitKak {
    /// Global phase `φ`.
    pub global_phase: f64,
    /// XX coefficient.
    pub a: f64,
    /// YY coefficient.
    pub b: f64,
    /// ZZ coefficient.
    pub c: f64,
    /// Left local factor on the first qubit.
    pub a1: Unitary2x2,
    /// Left local factor on the second qubit.
    pub a2: Unitary2x2,
    /// Right local factor on the first qubit.
    pub b1: Unitary2x2,
    /// Right local factor on the second qubit.
    pub b2: Unitary2x2,
}

impl TwoQubitKak {
    /// Decompose `u`.
    ///
    /// Fails with `NumericTolerance` if the reconstruction deviates from
    /// `u` by more than [`KAK_TOLERANCE`] or no eigenbasis is found.
    pub fn decompose(u: &Unitary4x4) -> CompileResult<Self> {
        let det = u.det();
        if det.norm() < 0.5 {
            return Err(CompileError::NumericTolerance {
                context: "kak: input is not unitary".into(),
                deviation: (1.0 - det.norm()).abs(),
                tolerance: KAK_TOLERANCE,
            });
        }
        let global_phase = det.arg() / 4.0;
        let special = u.scale(Complex64::from_polar(1.0, -global_phase));

        let magic = magic_basis();
        let magic_dag = magic.dagger();
        let up = magic_dag * special * magic;
        let m2 = up.transpose() * up;

        let (mut p, diag) = diagonalize_symmetric_unitary(&m2)?;
        if p.determinant() < 0.0 {
            for row in 0..4 {
                p[(row, 3)] = -p[(row, 3)];
            }
        }

        let mut d = [0.0; 4];
        for k in 0..3 {
            d[k] = -diag[k].arg() / 2.0;
        }
        d[3] = -(d[0] + d[1] + d[2]);

        let p_complex = Unitary4x4::from_rows(std::array::from_fn(|i| {
            std::array::from_fn(|j| Complex64::new(p[(i, j)], 0.0))
        }));
        let phases = Unitary4x4::diagonal(d.map(|x| Complex64::from_polar(1.0, x)));

        let k1 = magic * (up * p_complex * phases) * magic_dag;
        let k2 = magic * p_complex.transpose() * magic_dag;
        let (Some((a1, a2)), Some((b1, b2))) =
            (factor_tensor_product(&k1), factor_tensor_product(&k2))
        else {
            return Err(CompileError::NumericTolerance {
                context: "kak: local factor has no tensor product split".into(),
                deviation: f64::INFINITY,
                tolerance: KAK_TOLERANCE,
            });
        };

        let kak = Self {
            global_phase,
            a: -(d[0] + d[2]) / 2.0,
            b: -(d[1] + d[2]) / 2.0,
            c: -(d[0] + d[1]) / 2.0,
            a1,
            a2,
            b1,
            b2,
        };

        let deviation = kak.reconstruct().distance_up_to_phase(u);
        if deviation > KAK_TOLERANCE {
            return Err(CompileError::NumericTolerance {
                context: "kak reconstruction".into(),
                deviation,
                tolerance: KAK_TOLERANCE,
            });
        }
        Ok(kak)
    }

    /// The canonical interaction `exp(i(a·XX + b·YY + c·ZZ))`.
    pub fn interaction(a: f64, b: f64, c: f64) -> Unitary4x4 {
        // Diagonal in the magic basis, one Bell state per entry.
        let eigenphases = [a - b + c, -a + b + c, a + b - c, -a - b - c];
        let magic = magic_basis();
        magic
            * Unitary4x4::diagonal(eigenphases.map(|x| Complex64::from_polar(1.0, x)))
            * magic.dagger()
    }

    /// Multiply the factors back together.
    pub fn reconstruct(&self) -> Unitary4x4 {
        (Unitary4x4::kron(&self.a1, &self.a2)
            * Self::interaction(self.a, self.b, self.c)
            * Unitary4x4::kron(&self.b1, &self.b2))
        .scale(Complex64::from_polar(1.0, self.global_phase))
    }
}

/// Real orthogonal `P` and eigenvalues `D` with `m2 = P·diag(D)·Pᵀ`.
fn diagonalize_symmetric_unitary(m2: &Unitary4x4) -> CompileResult<(Matrix4<f64>, [Complex64; 4])> {
    let mut rng = StdRng::seed_from_u64(DIAGONALIZATION_SEED);
    let mut best = f64::INFINITY;

    for attempt in 0..=DIAGONALIZATION_RETRIES {
        let (mix_re, mix_im) = if attempt == 0 {
            FIRST_MIX
        } else {
            (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        };
        let mixed = Matrix4::from_fn(|i, j| mix_re * m2.data[i][j].re + mix_im * m2.data[i][j].im);
        let p = mixed.symmetric_eigen().eigenvectors;

        let diag: [Complex64; 4] = std::array::from_fn(|k| {
            let mut sum = ZERO;
            for i in 0..4 {
                for j in 0..4 {
                    sum += m2.data[i][j] * (p[(i, k)] * p[(j, k)]);
                }
            }
            sum
        });

        let mut deviation: f64 = 0.0;
        for i in 0..4 {
            for j in 0..4 {
                let rebuilt: Complex64 = (0..4).map(|k| diag[k] * (p[(i, k)] * p[(j, k)])).sum();
                deviation = deviation.max((rebuilt - m2.data[i][j]).norm());
            }
        }
        if deviation < DIAGONALIZATION_TOLERANCE {
            return Ok((p, diag));
        }
        best = best.min(deviation);
    }

    Err(CompileError::NumericTolerance {
        context: "kak: no real eigenbasis".into(),
        deviation: best,
        tolerance: DIAGONALIZATION_TOLERANCE,
    })
}

/// Split `k ≈ A ⊗ B` into `(A, B)` with `det(B) = 1`.
///
/// `B` is normalized from the 2x2 block of largest determinant, since a
/// block with the largest entries can still be singular. `None` when every
/// block is singular; no tensor product has that shape. The result is exact
/// for a tensor product and a best effort otherwise; check it with
/// [`as_tensor_product`].
pub fn factor_tensor_product(k: &Unitary4x4) -> Option<(Unitary2x2, Unitary2x2)> {
    let block = |i: usize, j: usize| {
        Unitary2x2::new(
            k.data[2 * i][2 * j],
            k.data[2 * i][2 * j + 1],
            k.data[2 * i + 1][2 * j],
            k.data[2 * i + 1][2 * j + 1],
        )
    };
    let blocks = [block(0, 0), block(0, 1), block(1, 0), block(1, 1)];

    let mut pivot = blocks[0];
    for b in &blocks[1..] {
        if b.det().norm() > pivot.det().norm() {
            pivot = *b;
        }
    }
    // For `A ⊗ B` with unitary factors the largest block determinant is at
    // least 1/2.
    let pivot_det = pivot.det();
    if !pivot_det.is_finite() || pivot_det.norm() < SINGULAR_BLOCK_TOLERANCE {
        return None;
    }
    let second = pivot.scale(pivot_det.sqrt().inv());
    let second_dag = second.dagger();

    let coeffs = blocks.map(|b| {
        let prod = second_dag * b;
        (prod.data[0] + prod.data[3]) / 2.0
    });
    let first = Unitary2x2::new(coeffs[0], coeffs[1], coeffs[2], coeffs[3]);
    Some((first, second))
}

/// `Some((A, B))` if `u` equals `A ⊗ B` within `tolerance`.
pub fn as_tensor_product(u: &Unitary4x4, tolerance: f64) -> Option<(Unitary2x2, Unitary2x2)> {
    let (a, b) = factor_tensor_product(u)?;
    let finite = a.data.iter().chain(&b.data).all(|z| z.is_finite());
    (finite && Unitary4x4::kron(&a, &b).distance(u) <= tolerance).then_some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, PI};

    fn assert_roundtrip(u: &Unitary4x4) -> TwoQubitKak {
        let kak = TwoQubitKak::decompose(u).unwrap();
        let deviation = kak.reconstruct().distance_up_to_phase(u);
        assert!(deviation < 1e-9, "deviation {deviation}");
        kak
    }

    #[test]
    fn test_identity() {
        let kak = assert_roundtrip(&Unitary4x4::identity());
        assert!(kak.a.abs() < 1e-9);
        assert!(kak.b.abs() < 1e-9);
        assert!(kak.c.abs() < 1e-9);
    }

    #[test]
    fn test_cnot() {
        let kak = assert_roundtrip(&Unitary4x4::cx());
        let strengths = [kak.a.abs(), kak.b.abs(), kak.c.abs()];
        // One maximal coefficient, the others zero.
        assert_eq!(
            strengths.iter().filter(|s| (**s - FRAC_PI_4).abs() < 1e-9).count(),
            1
        );
        assert_eq!(strengths.iter().filter(|s| **s < 1e-9).count(), 2);
    }

    #[test]
    fn test_reversed_cnot_and_cz() {
        assert_roundtrip(&Unitary4x4::cx().reversed_qubits());
        assert_roundtrip(&Unitary4x4::cz());
    }

    #[test]
    fn test_swap_and_iswap() {
        let kak = assert_roundtrip(&Unitary4x4::swap());
        for s in [kak.a, kak.b, kak.c] {
            assert!((s.abs() - FRAC_PI_4).abs() < 1e-9);
        }
        assert_roundtrip(&Unitary4x4::iswap());
    }

    #[test]
    fn test_local_gate_has_no_interaction() {
        let local = Unitary4x4::kron(&Unitary2x2::ry(0.3), &Unitary2x2::rz(1.1));
        let kak = assert_roundtrip(&local);
        assert!(kak.a.abs() < 1e-9 && kak.b.abs() < 1e-9 && kak.c.abs() < 1e-9);
    }

    #[test]
    fn test_interaction_matches_pauli_rotations() {
        // RXX(θ) = exp(-iθ/2 XX), so N(-θ/2, 0, 0) = RXX(θ).
        let theta = 0.8;
        let n = TwoQubitKak::interaction(-theta / 2.0, 0.0, 0.0);
        let rxx = Unitary4x4::pauli_rotation(&Unitary2x2::x(), theta);
        assert!(n.distance(&rxx) < 1e-12);

        let n = TwoQubitKak::interaction(0.0, 0.0, -theta / 2.0);
        let rzz = Unitary4x4::pauli_rotation(&Unitary2x2::z(), theta);
        assert!(n.distance(&rzz) < 1e-12);
    }

    #[test]
    fn test_product_of_rotations_and_entanglers() {
        let u = Unitary4x4::kron(&Unitary2x2::u(0.4, 1.2, -0.7), &Unitary2x2::h())
            * Unitary4x4::cx()
            * Unitary4x4::pauli_rotation(&Unitary2x2::y(), 0.9)
            * Unitary4x4::kron(&Unitary2x2::rx(2.1), &Unitary2x2::ry(-0.3))
            * Unitary4x4::controlled(&Unitary2x2::p(PI / 3.0));
        assert_roundtrip(&u);
        assert_roundtrip(&u.scale(Complex64::from_polar(1.0, 0.77)));
    }

    #[test]
    fn test_factor_tensor_product() {
        let a = Unitary2x2::u(0.3, -0.4, 1.9);
        let b = Unitary2x2::rx(0.6);
        let k = Unitary4x4::kron(&a, &b);
        let (fa, fb) = as_tensor_product(&k, 1e-12).unwrap();
        assert!(Unitary4x4::kron(&fa, &fb).distance(&k) < 1e-12);
        assert!((fb.det() - Complex64::new(1.0, 0.0)).norm() < 1e-12);

        assert!(as_tensor_product(&Unitary4x4::cx(), 1e-6).is_none());
    }

    #[test]
    fn test_factor_rejects_all_singular_blocks() {
        // Every 2x2 block of iSWAP has determinant zero.
        assert!(factor_tensor_product(&Unitary4x4::iswap()).is_none());
        assert!(as_tensor_product(&Unitary4x4::iswap(), 1e-6).is_none());

        let nan = Complex64::new(f64::NAN, 0.0);
        assert!(as_tensor_product(&Unitary4x4::cz().scale(nan), 1e6).is_none());
    }

    #[test]
    fn test_factor_with_zero_diagonal_block() {
        // X ⊗ H has a zero upper-left block.
        let k = Unitary4x4::kron(&Unitary2x2::x(), &Unitary2x2::h());
        let (fa, fb) = as_tensor_product(&k, 1e-12).unwrap();
        assert!(Unitary4x4::kron(&fa, &fb).distance(&k) < 1e-12);
    }
}
