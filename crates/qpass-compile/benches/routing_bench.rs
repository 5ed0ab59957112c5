//! Benchmarks for placement, routing and unrolling
//!
//! Run with: cargo bench -p qpass-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qpass_compile::passes::{
    SabreHeuristic, SabreRouter, ShortestPathRouter, StarRouter, SubgraphPlacer, Unroller,
};
use qpass_compile::{Connectivity, Layout, NativeGates, Placer, Router, TwoQubitKak};
use qpass_ir::{Circuit, QubitId, StandardGate};

fn random_cz_circuit(n: u32, gates: usize, seed: u64) -> Circuit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut circuit = Circuit::new("bench", n);
    for _ in 0..gates {
        let a = rng.gen_range(0..n);
        let mut b = rng.gen_range(0..n - 1);
        if b >= a {
            b += 1;
        }
        circuit.cz(QubitId(a), QubitId(b)).unwrap();
    }
    circuit
}

/// Compare routers on random CZ circuits over a 20-qubit device
fn bench_routers(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    let connectivity = Connectivity::iqm20();
    let layout = Layout::trivial(20);

    for gates in &[20usize, 100, 400] {
        let circuit = random_cz_circuit(20, *gates, 7);

        group.bench_with_input(
            BenchmarkId::new("shortest_path", gates),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    ShortestPathRouter
                        .route(black_box(circuit), &layout, &connectivity)
                        .unwrap()
                });
            },
        );

        for heuristic in [SabreHeuristic::Basic, SabreHeuristic::Decay] {
            let router = SabreRouter::new(0).with_heuristic(heuristic);
            group.bench_with_input(
                BenchmarkId::new(format!("sabre_{heuristic:?}").to_lowercase(), gates),
                &circuit,
                |b, circuit| {
                    b.iter(|| {
                        router
                            .route(black_box(circuit), &layout, &connectivity)
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

/// Star router on the 5-qubit star
fn bench_star(c: &mut Criterion) {
    let mut group = c.benchmark_group("star");
    let connectivity = Connectivity::star(5);
    let layout = Layout::trivial(5);

    for gates in &[20usize, 200] {
        let circuit = random_cz_circuit(5, *gates, 3);
        group.bench_with_input(BenchmarkId::new("route", gates), &circuit, |b, circuit| {
            b.iter(|| {
                StarRouter::new()
                    .route(black_box(circuit), &layout, &connectivity)
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Subgraph placement, which searches for an embedding of the interaction graph
fn bench_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement");
    let connectivity = Connectivity::iqm20();

    for n in &[6u32, 10, 16] {
        let circuit = random_cz_circuit(*n, 2 * *n as usize, 11);
        group.bench_with_input(BenchmarkId::new("subgraph", n), &circuit, |b, circuit| {
            b.iter(|| {
                SubgraphPlacer::new()
                    .place(black_box(circuit), &connectivity)
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// KAK decomposition and unrolling of fused two-qubit blocks
fn bench_unroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("unroll");

    let block = StandardGate::RZZ(0.3).matrix_2q().unwrap()
        * StandardGate::CX.matrix_2q().unwrap()
        * StandardGate::RXX(1.1).matrix_2q().unwrap();
    group.bench_function("kak", |b| {
        b.iter(|| TwoQubitKak::decompose(black_box(&block)).unwrap());
    });

    for n in &[5u32, 10] {
        let circuit = Circuit::qft(*n).unwrap();
        let natives = NativeGates::default();
        group.bench_with_input(BenchmarkId::new("qft", n), &circuit, |b, circuit| {
            b.iter(|| {
                Unroller::new()
                    .decompose(black_box(circuit), &natives)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_routers,
    bench_star,
    bench_placement,
    bench_unroll
);
criterion_main!(benches);
