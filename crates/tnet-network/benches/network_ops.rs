//! Performance benchmarks for tensor network operations
//!
//! Covers compression (TT-SVD, CP-ALS), format-aware arithmetic, rounding and
//! indexing on networks that are never materialised in full.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use tnet_core::DenseND;
use tnet_network::{cp_als, CpAlsOptions, Index, RoundingOptions, TensorNetwork};

fn smooth(shape: &[usize]) -> DenseND<f64> {
    let total: usize = shape.iter().product();
    let mut values = Vec::with_capacity(total);
    for flat in 0..total {
        let mut rem = flat;
        let mut acc = 0.0;
        for &s in shape.iter().rev() {
            acc += (rem % s) as f64 / s as f64;
            rem /= s;
        }
        values.push((1.0 + acc).recip());
    }
    DenseND::from_vec(values, shape).unwrap()
}

// ============================================================================
// Construction Benchmarks
// ============================================================================

fn bench_tt_svd(c: &mut Criterion) {
    let mut group = c.benchmark_group("tt_svd");

    for &(size, order) in &[(8, 4), (16, 4), (8, 6)] {
        let shape = vec![size; order];
        let tensor = smooth(&shape);

        group.throughput(Throughput::Elements(tensor.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}^{}", size, order)),
            &tensor,
            |b, tensor| b.iter(|| black_box(TensorNetwork::tt_svd(black_box(tensor), 1e-6))),
        );
    }

    group.finish();
}

fn bench_cp_als(c: &mut Criterion) {
    let mut group = c.benchmark_group("cp_als");
    group.sample_size(10);

    for &(size, rank) in &[(16, 4), (32, 8)] {
        let tensor = DenseND::<f64>::random_uniform(&[size, size, size], 0.0, 1.0);
        let options = CpAlsOptions {
            max_iter: 10,
            tol: 0.0,
            ..CpAlsOptions::new(rank)
        };

        group.throughput(Throughput::Elements((size * size * size) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}x{}_r{}", size, size, size, rank)),
            &tensor,
            |b, tensor| b.iter(|| black_box(cp_als(black_box(tensor), &options, None))),
        );
    }

    group.finish();
}

// ============================================================================
// Arithmetic and Rounding Benchmarks
// ============================================================================

fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");

    for &order in &[4, 8] {
        let t = TensorNetwork::tt_svd(&smooth(&vec![6; order]), 1e-6).unwrap();

        group.bench_with_input(BenchmarkId::new("add", order), &t, |b, t| {
            b.iter(|| black_box(black_box(t).try_add(t)))
        });
        group.bench_with_input(BenchmarkId::new("mul", order), &t, |b, t| {
            b.iter(|| black_box(black_box(t).try_mul(t)))
        });
        group.bench_with_input(BenchmarkId::new("norm", order), &t, |b, t| {
            b.iter(|| black_box(black_box(t).norm()))
        });
    }

    group.finish();
}

fn bench_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("round");
    group.sample_size(20);

    for &order in &[4, 8] {
        let t = TensorNetwork::tt_svd(&smooth(&vec![6; order]), 1e-6).unwrap();
        let squared = t.try_mul(&t).unwrap();

        group.bench_with_input(BenchmarkId::new("round_tt", order), &squared, |b, t| {
            b.iter(|| {
                let mut t = t.clone();
                t.round_tt(&RoundingOptions::with_eps(1e-6)).unwrap();
                black_box(t)
            })
        });
        group.bench_with_input(BenchmarkId::new("round", order), &squared, |b, t| {
            b.iter(|| {
                let mut t = t.clone();
                t.round(1e-6).unwrap();
                black_box(t)
            })
        });
    }

    group.finish();
}

// ============================================================================
// Indexing Benchmarks
// ============================================================================

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");

    let t = TensorNetwork::tt_svd(&smooth(&[10; 6]), 1e-6).unwrap();
    let positions: Vec<usize> = (0..10).collect();

    group.bench_function("element", |b| {
        b.iter(|| black_box(t.value_at(black_box(&[1, 2, 3, 4, 5, 6]))))
    });
    group.bench_function("slice", |b| {
        let key = [Index::full(), Index::Int(3), Index::from(2..8), Index::Ellipsis];
        b.iter(|| black_box(t.get(black_box(&key))))
    });
    group.bench_function("fancy", |b| {
        let key = [
            Index::Fancy(positions.clone()),
            Index::Fancy(positions.clone()),
            Index::Ellipsis,
        ];
        b.iter(|| black_box(t.get(black_box(&key))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tt_svd,
    bench_cp_als,
    bench_arithmetic,
    bench_round,
    bench_indexing
);
criterion_main!(benches);
