use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;
use tessera_math::{primes::safe_prime, Field, Poly};

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");
    let mut rng = StdRng::seed_from_u64(0);
    let field = Field::new(safe_prime(&mut rng, 256).unwrap()).unwrap();

    for &n in &[4, 8, 16, 32, 64, 128] {
        let points = (1..=n)
            .map(|i: u32| (field.element(i), field.random(&mut rng)))
            .collect::<Vec<_>>();

        group.bench_with_input(BenchmarkId::new("lagrange", n), &points, |b, points| {
            b.iter(|| black_box(Poly::interpolate(&field, points).unwrap()));
        });
    }

    group.finish();
}

fn bench_safe_prime(c: &mut Criterion) {
    let mut group = c.benchmark_group("safe_prime");
    group.sample_size(10);
    for &bits in &[16u64, 64, 128] {
        group.bench_with_input(BenchmarkId::new("bits", bits), &bits, |b, &bits| {
            let mut rng = StdRng::seed_from_u64(bits);
            b.iter(|| black_box(safe_prime(&mut rng, bits).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_interpolate, bench_safe_prime);
criterion_main!(benches);
