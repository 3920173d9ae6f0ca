use criterion::{criterion_group, criterion_main, Criterion};
use runeforge::config::{Config, Strategy};
use runeforge::model::{Combination, ScoringContext};
use runeforge::scorer::Scorer;
use runeforge::search::{execute, Mode, SearchEvent, SearchJob};
use runeforge::synthetic::{generate, SynthSpec};
use std::hint::black_box;
use std::sync::atomic::AtomicBool;

fn job(strategy: Strategy) -> SearchJob {
    let pools = generate(&SynthSpec {
        weapons: 6,
        armor: 12,
        emblems: 4,
        accessories: 9,
        seed: 42,
    });
    let mut config = Config::default();
    config.search.strategy = strategy;
    config.search.threads = 4;
    SearchJob::new(pools, ScoringContext::default(), config)
}

fn criterion_benchmark(c: &mut Criterion) {
    let pools = generate(&SynthSpec::default());
    let scorer = Scorer::new(Default::default(), ScoringContext::default());
    let combo = Combination::new(3, [0, 2, 4, 6, 8], 1, [1, 5, 7]);

    c.bench_function("combination_score", |b| {
        b.iter(|| scorer.combination_score(black_box(&pools), black_box(&combo)))
    });

    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    for (label, strategy) in [
        ("single_phase", Strategy::SinglePhase),
        ("two_phase", Strategy::TwoPhase),
    ] {
        let job = job(strategy);
        group.bench_function(label, |b| {
            b.iter(|| {
                let cancel = AtomicBool::new(false);
                let mut ignore = |_: SearchEvent| {};
                execute(black_box(&job), &Mode::Full, &cancel, &mut ignore)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
