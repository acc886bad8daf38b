//! A baseline limiter: a guarded counter refilled by one permanent timer.
//!
//! Waiting callers poll the counter once per refill period. This is simpler than
//! [`ReservoirLimiter`](crate::ReservoirLimiter) but keeps its refill timer alive for as long
//! as the limiter exists, and a waiting caller may miss a token that another caller grabs
//! between two of its polls.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::{self, BoxFuture, Either, FutureExt};
use futures::pin_mut;
use futures::task::{Spawn, SpawnError, SpawnExt};
use futures_timer::Delay;
use parking_lot::Mutex;
use tracing::debug;

use crate::errors::Canceled;
use crate::limiter::Limiter;
use crate::quota::Quota;

/// A limiter keeping its available tokens in a mutex-guarded counter.
pub struct NaiveLimiter {
    quota: Quota,
    available: Arc<Mutex<u32>>,
}

impl NaiveLimiter {
    /// Constructs a full limiter and starts its refill timer on `spawner`.
    pub fn with_spawner<S>(quota: Quota, spawner: S) -> Result<NaiveLimiter, SpawnError>
    where
        S: Spawn,
    {
        let available = Arc::new(Mutex::new(quota.capacity().get()));
        spawner.spawn(refill_forever(quota, Arc::downgrade(&available)))?;
        Ok(NaiveLimiter { quota, available })
    }

    /// Waits until a token is available, or until `cancel` resolves.
    pub async fn acquire<F>(&self, cancel: F) -> Result<(), Canceled>
    where
        F: Future<Output = ()>,
    {
        if self.try_take() {
            return Ok(());
        }
        pin_mut!(cancel);
        loop {
            let tick = Delay::new(self.quota.refill_period());
            pin_mut!(tick);
            match future::select(tick, cancel.as_mut()).await {
                Either::Left(_) => {
                    if self.try_take() {
                        return Ok(());
                    }
                }
                Either::Right(_) => return Err(Canceled),
            }
        }
    }

    /// Waits for a token for at most `timeout`.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<(), Canceled> {
        self.acquire(Delay::new(timeout)).await
    }

    /// Waits until a token is available, however long that takes.
    pub async fn until_ready(&self) {
        let never = future::pending::<()>();
        if self.acquire(never).await.is_err() {
            unreachable!("a pending future never cancels");
        }
    }

    /// The number of tokens that can be taken right now.
    pub fn available(&self) -> u32 {
        *self.available.lock()
    }

    /// The quota this limiter was constructed with.
    pub fn quota(&self) -> Quota {
        self.quota
    }

    fn try_take(&self) -> bool {
        let mut available = self.available.lock();
        if *available == 0 {
            return false;
        }
        *available -= 1;
        true
    }
}

/// Restores a token every refill period until the limiter is dropped.
async fn refill_forever(quota: Quota, available: Weak<Mutex<u32>>) {
    let capacity = quota.capacity().get();
    loop {
        Delay::new(quota.refill_period()).await;
        match available.upgrade() {
            Some(counter) => {
                let mut counter = counter.lock();
                if *counter < capacity {
                    *counter += 1;
                }
            }
            None => break,
        }
    }
    debug!("naive limiter dropped, refill timer stopped");
}

impl fmt::Debug for NaiveLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NaiveLimiter")
            .field("quota", &self.quota)
            .field("available", &self.available())
            .finish()
    }
}

impl Limiter for NaiveLimiter {
    fn limit<'a>(&'a self, cancel: BoxFuture<'a, ()>) -> BoxFuture<'a, Result<(), Canceled>> {
        self.acquire(cancel).boxed()
    }
}
