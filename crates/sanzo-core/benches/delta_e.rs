//! Delta E and Conversion Benchmarks
//!
//! Accelerated backend against the portable backend for the bridge's hot
//! paths.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sanzo_core::bridge::{AcceleratedBackend, MathBackend, PortableBackend};
use sanzo_core::{AcceleratedConfig, DeltaEAlgorithm, Lab, SpatialIndex, ciede2000};

/// Generate RGB triples on 0-255
fn generate_rgb_data(count: usize) -> Vec<[f64; 3]> {
    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            [t * 255.0, (t * 2.0 % 1.0) * 255.0, (t * 3.0 % 1.0) * 255.0]
        })
        .collect()
}

fn generate_lab_data(count: usize) -> Vec<Lab> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            Lab::new((t * 7.3) % 100.0, (t * 13.1) % 160.0 - 80.0, (t * 29.7) % 160.0 - 80.0)
        })
        .collect()
}

fn accelerated() -> AcceleratedBackend {
    AcceleratedBackend::load(&AcceleratedConfig {
        enabled: true,
        memory_words: 1 << 20,
    })
    .expect("accelerated backend")
}

// ============================================================================
// Single Pair Benchmarks
// ============================================================================

fn bench_delta_e_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("delta_e_single");

    let a = Lab::new(50.0, 2.6772, -79.7751);
    let b = Lab::new(50.0, 0.0, -82.7485);

    group.bench_function("ciede2000_scalar", |bench| {
        bench.iter(|| ciede2000(black_box(a), black_box(b)))
    });

    let backend = accelerated();
    group.bench_function("ciede2000_accelerated", |bench| {
        bench.iter(|| backend.delta_e_2000(black_box(a), black_box(b)))
    });

    group.finish();
}

// ============================================================================
// Batch Benchmarks
// ============================================================================

fn bench_batch_rgb_to_lab(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_rgb_to_lab");
    let backend = accelerated();

    for size in [100, 1000, 10000].iter() {
        let input = generate_rgb_data(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("accelerated", size), &input, |b, input| {
            b.iter(|| backend.batch_rgb_to_lab(black_box(input)))
        });

        group.bench_with_input(BenchmarkId::new("portable", size), &input, |b, input| {
            b.iter(|| PortableBackend.batch_rgb_to_lab(black_box(input)))
        });
    }

    group.finish();
}

fn bench_distance_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_matrix");
    let backend = accelerated();

    for size in [16, 64, 256].iter() {
        let labs = generate_lab_data(*size);
        group.throughput(Throughput::Elements((*size * *size) as u64));

        for algorithm in [DeltaEAlgorithm::Cie76, DeltaEAlgorithm::Ciede2000] {
            group.bench_with_input(
                BenchmarkId::new(format!("accelerated_{}", algorithm.name()), size),
                &labs,
                |b, labs| b.iter(|| backend.distance_matrix(black_box(labs), algorithm)),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("portable_{}", algorithm.name()), size),
                &labs,
                |b, labs| b.iter(|| PortableBackend.distance_matrix(black_box(labs), algorithm)),
            );
        }
    }

    group.finish();
}

// ============================================================================
// Nearest Neighbor Benchmarks
// ============================================================================

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("k_nearest");

    for size in [100, 1000, 10000].iter() {
        let labs = generate_lab_data(*size);
        let index = SpatialIndex::build(&labs);
        let target = Lab::new(42.0, 11.0, -23.0);

        group.bench_with_input(BenchmarkId::new("kd_tree", size), &index, |b, index| {
            b.iter(|| index.k_nearest(black_box(target), 5, DeltaEAlgorithm::Ciede2000))
        });

        group.bench_with_input(BenchmarkId::new("linear", size), &labs, |b, labs| {
            b.iter(|| {
                sanzo_core::index::linear_k_nearest(black_box(labs), black_box(target), 5, DeltaEAlgorithm::Ciede2000)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_delta_e_single,
    bench_batch_rgb_to_lab,
    bench_distance_matrix,
    bench_nearest,
);
criterion_main!(benches);
