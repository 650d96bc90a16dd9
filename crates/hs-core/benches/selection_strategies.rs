//! Criterion benchmarks for Baum-Welch fitting and per-word selection.
//!
//! Data is synthetic and deterministic so runs are comparable.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hs_core::{
    Corpus, GaussianHmmEngine, HmmEngine, ModelSelector, SelectionConfig, Sequence, Strategy,
    Xlengths,
};

fn sequence(offset: f64, len: usize, phase: usize) -> Sequence {
    (0..len)
        .map(|t| {
            let wobble = (((t + phase) * 13) % 7) as f64 * 0.05;
            vec![offset + t as f64 * 0.3 + wobble, offset - t as f64 * 0.2 - wobble]
        })
        .collect()
}

fn word(offset: f64) -> Vec<Sequence> {
    (0..6).map(|i| sequence(offset, 8 + i, i)).collect()
}

fn bench_fit(c: &mut Criterion) {
    let data = Xlengths::from_sequences(&word(0.0)).expect("bench data");
    let engine = GaussianHmmEngine::default();

    let mut group = c.benchmark_group("gaussian_fit");
    for n_states in [2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(n_states), &n_states, |b, &n| {
            b.iter(|| engine.fit(black_box(&data), n, 14).expect("fit"));
        });
    }
    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let corpus = Corpus::from_sequences([
        ("CAT", word(0.0)),
        ("DOG", word(8.0)),
        ("EMU", word(-8.0)),
    ])
    .expect("bench corpus");
    let engine = GaussianHmmEngine::default();
    let config = SelectionConfig::default().with_state_range(2, 5);
    let selector = ModelSelector::new(&corpus, &engine, &config);

    let mut group = c.benchmark_group("select_best_model");
    group.sample_size(10);
    for strategy in Strategy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &strategy, |b, &s| {
            b.iter(|| selector.select_best_model(black_box("CAT"), s).expect("select"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fit, bench_select);
criterion_main!(benches);
