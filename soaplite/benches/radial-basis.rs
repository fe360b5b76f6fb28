#![allow(clippy::needless_return)]

use soaplite::{GtoBasis, PolynomialBasis};

use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn gto_basis(c: &mut Criterion) {
    let mut group = c.benchmark_group("GTO basis construction");
    group.noise_threshold(0.05);

    for &max_radial in black_box(&[2, 6, 10]) {
        group.bench_function(&format!("n_max = {}", max_radial), |b| b.iter(|| {
            GtoBasis::new(black_box(5.0), max_radial).unwrap()
        }));
    }

    group.finish();
}

fn polynomial_basis(c: &mut Criterion) {
    let mut group = c.benchmark_group("Polynomial basis construction");
    group.noise_threshold(0.05);

    for &max_radial in black_box(&[1, 4, 6]) {
        group.bench_function(&format!("n_max = {}", max_radial), |b| b.iter(|| {
            PolynomialBasis::new(black_box(5.0), max_radial).unwrap()
        }));
    }

    group.finish();
}

criterion_group!(all, gto_basis, polynomial_basis);
criterion_main!(all);
