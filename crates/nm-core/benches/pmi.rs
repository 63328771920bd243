use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nm_core::{compute_pmi, unique_counts};

fn synthetic_tuples(n: usize) -> Vec<Vec<u32>> {
    (0..n as u32)
        .map(|i| vec![i % 97, (i * 7) % 31, (i * 13) % 11])
        .collect()
}

fn bench_counting(c: &mut Criterion) {
    let tuples = synthetic_tuples(50_000);

    c.bench_function("unique_counts_50k", |b| {
        b.iter(|| unique_counts(black_box(&tuples), true))
    });

    c.bench_function("compute_pmi_50k", |b| {
        b.iter(|| compute_pmi(black_box(&tuples), true))
    });
}

criterion_group!(benches, bench_counting);
criterion_main!(benches);
