//! The capability shared by all limiters in this crate.

use futures::future::BoxFuture;

use crate::errors::Canceled;

/// Something that admits callers at a bounded rate.
///
/// This is implemented by both [`ReservoirLimiter`](crate::ReservoirLimiter) and
/// [`NaiveLimiter`](crate::NaiveLimiter), so code that only needs to be throttled can hold a
/// `dyn Limiter` and be handed either one.
///
/// ```rust
/// # use futures::executor::{block_on, ThreadPool};
/// # use futures::future::{self, FutureExt};
/// # use reservoir::{Limiter, Quota, ReservoirLimiter};
/// # use std::time::Duration;
/// let pool = ThreadPool::new().unwrap();
/// let quota = Quota::new(2, Duration::from_millis(100)).unwrap();
/// let limiter: Box<dyn Limiter> = Box::new(ReservoirLimiter::with_spawner(quota, pool));
/// assert_eq!(Ok(()), block_on(limiter.limit(future::pending().boxed())));
/// ```
pub trait Limiter: Send + Sync {
    /// Blocks until a token is granted, or until `cancel` resolves.
    ///
    /// Returns [`Canceled`] without consuming a token if the cancellation signal wins.
    fn limit<'a>(&'a self, cancel: BoxFuture<'a, ()>) -> BoxFuture<'a, Result<(), Canceled>>;
}
