use criterion::{black_box, Criterion, Throughput};
use futures::executor::{block_on, ThreadPool};
use reservoir::{NaiveLimiter, Quota, ReservoirLimiter};
use std::time::Duration;

pub fn bench_all(c: &mut Criterion) {
    bench_reservoir(c);
    bench_naive(c);
}

// Large enough that the benchmark never has to wait for a refill.
fn quota() -> Quota {
    Quota::new(u32::MAX, Duration::from_micros(1)).unwrap()
}

fn bench_reservoir(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");
    group.throughput(Throughput::Elements(1));
    group.bench_function("reservoir", |b| {
        let rl = ReservoirLimiter::direct(quota()).unwrap();
        b.iter(|| {
            black_box(block_on(rl.until_ready()));
        });
    });
    group.finish();
}

fn bench_naive(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");
    group.throughput(Throughput::Elements(1));
    group.bench_function("naive", |b| {
        let rl = NaiveLimiter::with_spawner(quota(), ThreadPool::new().unwrap()).unwrap();
        b.iter(|| {
            black_box(block_on(rl.until_ready()));
        });
    });
    group.finish();
}
