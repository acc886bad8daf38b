use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;

mod single_threaded;

fn limiter_config() -> Criterion {
    Criterion::default().measurement_time(Duration::from_secs(3))
}

criterion_group!(
    name = limiters;
    config = limiter_config();
    targets = single_threaded::bench_all, multi_threaded::bench_all
);
criterion_main!(limiters);
