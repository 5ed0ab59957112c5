//! Benchmarks for circuit construction and analysis
//!
//! Run with: cargo bench -p qpass-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qpass_ir::{Circuit, DependencyDag, QubitId, StandardGate, Unitary4x4};
use std::f64::consts::PI;

fn layered_circuit(n: u32, layers: usize) -> Circuit {
    let mut circuit = Circuit::new("bench", n);
    for _ in 0..layers {
        for i in 0..n {
            circuit.h(QubitId(i)).unwrap();
        }
        for i in (0..n - 1).step_by(2) {
            circuit.cx(QubitId(i), QubitId(i + 1)).unwrap();
        }
    }
    circuit
}

/// Benchmark adding validated gates to a circuit
fn bench_gate_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_addition");

    group.bench_function("rx_gate", |b| {
        let mut circuit = Circuit::new("bench", 10);
        b.iter(|| {
            circuit
                .rx(black_box(PI / 4.0), black_box(QubitId(0)))
                .unwrap();
        });
    });

    group.bench_function("cz_gate", |b| {
        let mut circuit = Circuit::new("bench", 10);
        b.iter(|| {
            circuit
                .cz(black_box(QubitId(0)), black_box(QubitId(1)))
                .unwrap();
        });
    });

    group.finish();
}

/// Benchmark QFT fixture construction
fn bench_qft(c: &mut Criterion) {
    let mut group = c.benchmark_group("qft");

    for n in &[5u32, 10, 20, 40] {
        group.bench_with_input(BenchmarkId::new("create", n), n, |b, &n| {
            b.iter(|| black_box(Circuit::qft(n).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark depth and dependency graph construction
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    for n in &[5u32, 10, 20, 50] {
        let circuit = layered_circuit(*n, 5);
        group.bench_with_input(BenchmarkId::new("depth", n), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit.depth()));
        });
        group.bench_with_input(BenchmarkId::new("dag", n), &circuit, |b, circuit| {
            b.iter(|| black_box(DependencyDag::from_circuit(circuit)));
        });
    }

    group.finish();
}

/// Benchmark 4x4 matrix products used when fusing two-qubit blocks
fn bench_matrix(c: &mut Criterion) {
    let cx = StandardGate::CX.matrix_2q().unwrap();
    let rzz = StandardGate::RZZ(0.3).matrix_2q().unwrap();
    c.bench_function("unitary4x4_mul", |b| {
        b.iter(|| black_box(Unitary4x4::mul(black_box(&cx), black_box(&rzz))));
    });
}

criterion_group!(
    benches,
    bench_gate_addition,
    bench_qft,
    bench_analysis,
    bench_matrix,
);

criterion_main!(benches);
