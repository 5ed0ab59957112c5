//! Integration tests checking gate semantics through simulation.

use proptest::prelude::*;
use qpass_ir::{Circuit, QubitId};
use qpass_sim::{Statevector, simulate};
use std::f64::consts::PI;

/// Run `circuit` on the seeded random state.
fn run_on_random(circuit: &Circuit, seed: u64) -> Statevector {
    let mut state = Statevector::random(circuit.num_qubits(), seed).unwrap();
    state.run(circuit).unwrap();
    state
}

fn assert_same_action(a: &Circuit, b: &Circuit) {
    for seed in 0..4 {
        let sa = run_on_random(a, seed);
        let sb = run_on_random(b, seed);
        let dev = sa.phase_deviation(&sb).unwrap();
        assert!(dev < 1e-10, "{} vs {}: deviation {dev}", a.name(), b.name());
    }
}

// ============================================================================
// Single-qubit identities
// ============================================================================

#[test]
fn test_s_squared_is_z() {
    let mut ss = Circuit::new("ss", 1);
    ss.s(QubitId(0)).unwrap().s(QubitId(0)).unwrap();
    let mut z = Circuit::new("z", 1);
    z.z(QubitId(0)).unwrap();
    assert_same_action(&ss, &z);
}

#[test]
fn test_hzh_is_x() {
    let mut hzh = Circuit::new("hzh", 1);
    hzh.h(QubitId(0)).unwrap().z(QubitId(0)).unwrap().h(QubitId(0)).unwrap();
    let mut x = Circuit::new("x", 1);
    x.x(QubitId(0)).unwrap();
    assert_same_action(&hzh, &x);
}

#[test]
fn test_u_matches_zyz_rotations() {
    let (theta, phi, lambda) = (0.7, -1.1, 2.3);
    let mut u = Circuit::new("u", 1);
    u.u(theta, phi, lambda, QubitId(0)).unwrap();
    let mut rot = Circuit::new("rot", 1);
    rot.rz(lambda, QubitId(0))
        .unwrap()
        .ry(theta, QubitId(0))
        .unwrap()
        .rz(phi, QubitId(0))
        .unwrap();
    assert_same_action(&u, &rot);
}

// ============================================================================
// Two-qubit identities
// ============================================================================

#[test]
fn test_cx_is_h_cz_h() {
    let mut cx = Circuit::new("cx", 3);
    cx.cx(QubitId(2), QubitId(0)).unwrap();
    let mut hczh = Circuit::new("hczh", 3);
    hczh.h(QubitId(0))
        .unwrap()
        .cz(QubitId(2), QubitId(0))
        .unwrap()
        .h(QubitId(0))
        .unwrap();
    assert_same_action(&cx, &hczh);
}

#[test]
fn test_swap_is_three_cx() {
    let mut swap = Circuit::new("swap", 3);
    swap.swap(QubitId(0), QubitId(2)).unwrap();
    let mut cxs = Circuit::new("cxs", 3);
    cxs.cx(QubitId(0), QubitId(2))
        .unwrap()
        .cx(QubitId(2), QubitId(0))
        .unwrap()
        .cx(QubitId(0), QubitId(2))
        .unwrap();
    assert_same_action(&swap, &cxs);
}

#[test]
fn test_cp_is_symmetric() {
    let mut a = Circuit::new("cp01", 2);
    a.cp(0.8, QubitId(0), QubitId(1)).unwrap();
    let mut b = Circuit::new("cp10", 2);
    b.cp(0.8, QubitId(1), QubitId(0)).unwrap();
    assert_same_action(&a, &b);
}

#[test]
fn test_rzz_pi_is_zz() {
    let mut rzz = Circuit::new("rzz", 2);
    rzz.rzz(PI, QubitId(0), QubitId(1)).unwrap();
    let mut zz = Circuit::new("zz", 2);
    zz.z(QubitId(0)).unwrap().z(QubitId(1)).unwrap();
    assert_same_action(&rzz, &zz);
}

#[test]
fn test_qft_of_zero_is_uniform() {
    let state = simulate(&Circuit::qft(4).unwrap()).unwrap();
    for p in state.probabilities() {
        assert!((p - 1.0 / 16.0).abs() < 1e-12);
    }
}

#[test]
fn test_measure_and_barrier_do_not_change_state() {
    let mut plain = Circuit::new("plain", 2);
    plain.h(QubitId(0)).unwrap();
    let mut annotated = Circuit::new("annotated", 2);
    annotated
        .h(QubitId(0))
        .unwrap()
        .barrier_all()
        .unwrap()
        .measure_all()
        .unwrap();
    assert_same_action(&plain, &annotated);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn rotations_preserve_norm(
        angles in prop::collection::vec(-PI..PI, 1..12),
        seed in 0u64..1000,
    ) {
        let mut circuit = Circuit::new("rot", 3);
        for (i, a) in angles.iter().enumerate() {
            let q = QubitId((i % 3) as u32);
            match i % 4 {
                0 => circuit.rx(*a, q).unwrap(),
                1 => circuit.ry(*a, q).unwrap(),
                2 => circuit.crz(*a, q, QubitId(((i + 1) % 3) as u32)).unwrap(),
                _ => circuit.ryy(*a, q, QubitId(((i + 2) % 3) as u32)).unwrap(),
            };
        }
        let state = run_on_random(&circuit, seed);
        prop_assert!((state.norm_sqr() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn permutation_then_inverse_is_identity(seed in 0u64..1000) {
        let state = Statevector::random(4, seed).unwrap();
        let perm = [2u32, 0, 3, 1];
        let mut inverse = [0u32; 4];
        for (l, p) in perm.iter().enumerate() {
            inverse[*p as usize] = l as u32;
        }
        let back = state
            .permute_qubits(&perm)
            .unwrap()
            .permute_qubits(&inverse)
            .unwrap();
        prop_assert_eq!(back, state);
    }
}
