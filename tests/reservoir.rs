use all_asserts::*;
use futures::executor::block_on;
use nonzero_ext::*;
use reservoir::{Quota, ReservoirLimiter};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const PROCEEDS_DURATION_MAX_MILLIS: u64 = 60;
const SCHEDULING_SLACK_MILLIS: u64 = 150;

fn limiter(capacity: u32, refill_millis: u64) -> ReservoirLimiter {
    let quota = Quota::new(capacity, Duration::from_millis(refill_millis)).unwrap();
    ReservoirLimiter::direct(quota).unwrap()
}

/// Acquires a token on each of `n` threads at once, returning how long each one took,
/// in ascending order.
fn acquire_concurrently(lim: &Arc<ReservoirLimiter>, n: usize) -> Vec<Duration> {
    let start = Instant::now();
    let children: Vec<_> = (0..n)
        .map(|_| {
            let lim = Arc::clone(lim);
            thread::spawn(move || {
                block_on(lim.until_ready());
                start.elapsed()
            })
        })
        .collect();
    let mut elapsed: Vec<Duration> = children
        .into_iter()
        .map(|child| child.join().unwrap())
        .collect();
    elapsed.sort();
    elapsed
}

#[test]
fn proceeds() {
    let lim = limiter(4, 1000);

    let i = Instant::now();
    block_on(lim.until_ready());
    assert_le!(
        i.elapsed(),
        Duration::from_millis(PROCEEDS_DURATION_MAX_MILLIS)
    );
}

#[test]
fn first_capacity_calls_do_not_wait_for_refills() {
    let lim = limiter(5, 10_000);

    let i = Instant::now();
    for _ in 0..5 {
        assert_eq!(Ok(()), block_on(lim.acquire_timeout(Duration::from_secs(1))));
    }
    assert_le!(
        i.elapsed(),
        Duration::from_millis(PROCEEDS_DURATION_MAX_MILLIS)
    );
}

#[test]
fn pauses_for_one_refill_period() {
    let lim = limiter(3, 200);

    let i = Instant::now();
    for _ in 0..3 {
        block_on(lim.until_ready());
    }
    block_on(lim.until_ready());
    let elapsed = i.elapsed();
    assert_ge!(elapsed, Duration::from_millis(200));
    assert_le!(elapsed, Duration::from_millis(200 + SCHEDULING_SLACK_MILLIS));
}

#[test]
fn one_past_capacity_waits_one_period() {
    let lim = Arc::new(limiter(3, 200));

    let elapsed = acquire_concurrently(&lim, 4);
    for e in &elapsed[..3] {
        assert_le!(*e, Duration::from_millis(PROCEEDS_DURATION_MAX_MILLIS));
    }
    assert_ge!(elapsed[3], Duration::from_millis(200));
    assert_le!(
        elapsed[3],
        Duration::from_millis(200 + SCHEDULING_SLACK_MILLIS)
    );
}

#[test]
fn burst_then_steady_refill() {
    // Capacity 4, one token back per period; six callers at once, twice.
    let period = 100;
    let lim = Arc::new(limiter(4, period));

    let check_batch = |elapsed: Vec<Duration>| {
        assert_eq!(elapsed.len(), 6);
        for e in &elapsed[..4] {
            assert_le!(*e, Duration::from_millis(PROCEEDS_DURATION_MAX_MILLIS));
        }
        assert_ge!(elapsed[4], Duration::from_millis(period));
        assert_le!(
            elapsed[4],
            Duration::from_millis(period + SCHEDULING_SLACK_MILLIS)
        );
        assert_ge!(elapsed[5], Duration::from_millis(2 * period));
        assert_le!(
            elapsed[5],
            Duration::from_millis(2 * period + SCHEDULING_SLACK_MILLIS)
        );
    };

    check_batch(acquire_concurrently(&lim, 6));

    // Five periods later, the reservoir has refilled, but only up to its capacity.
    thread::sleep(Duration::from_millis(5 * period));
    check_batch(acquire_concurrently(&lim, 6));
}

#[test]
fn refill_stops_at_capacity() {
    let lim = limiter(2, 50);
    block_on(lim.until_ready());
    block_on(lim.until_ready());

    // Far longer than it takes to refill two tokens:
    thread::sleep(Duration::from_millis(500));

    let i = Instant::now();
    block_on(lim.until_ready());
    block_on(lim.until_ready());
    assert_le!(
        i.elapsed(),
        Duration::from_millis(PROCEEDS_DURATION_MAX_MILLIS)
    );
    block_on(lim.until_ready());
    assert_ge!(i.elapsed(), Duration::from_millis(50));
}

#[test]
fn multiple() {
    let lim = Arc::new(ReservoirLimiter::direct(Quota::per_second(nonzero!(100u32))).unwrap());
    let i = Instant::now();
    let mut children = vec![];

    for _i in 0..120 {
        let lim = Arc::clone(&lim);
        children.push(thread::spawn(move || {
            block_on(lim.until_ready());
        }));
    }
    for child in children {
        child.join().unwrap();
    }
    // 100 go through at once, the remaining 20 need 10ms each; let's assume at least 150ms:
    let elapsed = i.elapsed();
    assert_ge!(elapsed, Duration::from_millis(150));
}

#[test]
fn quota_and_debug() {
    let lim = limiter(4, 1000);
    assert_eq!(lim.quota(), Quota::new(4, Duration::from_secs(1)).unwrap());
    let debug_output = format!("{:?}", lim);
    assert!(debug_output.contains("ReservoirLimiter"));
    assert!(debug_output.contains("listeners"));
}
