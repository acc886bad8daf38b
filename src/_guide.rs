//! # A more in-depth guide to `reservoir`
//!
//! # Constructing a limiter
//!
//! Construction of limiters is designed to be infallible once the
//! parameters are valid. To that end, the configuration lives in its
//! own value type, [`Quota`][crate::Quota], which can only hold a
//! non-zero capacity and a non-zero refill period.
//!
//! #### Quotas
//!
//! A quota can be given as raw values, which are validated:
//!
//! ```rust
//! # use reservoir::{InvalidConfiguration, Quota};
//! # use std::time::Duration;
//! assert!(Quota::new(4, Duration::from_secs(1)).is_ok());
//! assert_eq!(
//!     Quota::new(0, Duration::from_secs(1)),
//!     Err(InvalidConfiguration::ZeroCapacity)
//! );
//! ```
//!
//! or as a rate per unit of time, using the
//! [`nonzero!`](../../nonzero_ext/macro.nonzero.html) macro:
//!
//! ```rust
//! # use nonzero_ext::*;
//! use reservoir::Quota;
//! Quota::per_second(nonzero!(20u32));
//! ```
//!
//! #### Picking an executor
//!
//! A [`ReservoirLimiter`][crate::ReservoirLimiter] starts a manager
//! task when a caller shows up and retires it when the reservoir is
//! full and nobody waits. Those tasks need an executor: pass anything
//! implementing [`futures::task::Spawn`] to
//! [`ReservoirLimiter::with_spawner`][crate::ReservoirLimiter::with_spawner],
//! or let [`ReservoirLimiter::direct`][crate::ReservoirLimiter::direct]
//! build a one-thread pool for the limiter.
//!
//! ```rust
//! # use futures::executor::ThreadPool;
//! # use reservoir::{Quota, ReservoirLimiter};
//! # use std::time::Duration;
//! let pool = ThreadPool::new().unwrap();
//! let quota = Quota::new(10, Duration::from_millis(100)).unwrap();
//! let limiter = ReservoirLimiter::with_spawner(quota, pool);
//! assert!(limiter.is_idle());
//! ```
//!
//! # Cancellation
//!
//! Every wait takes a cancellation signal, which is any future
//! resolving to `()`. When it resolves first, the caller gets
//! [`Canceled`][crate::Canceled] back and no token is used up:
//!
//! ```rust
//! # use futures::executor::block_on;
//! # use futures::future;
//! # use reservoir::{Canceled, Quota, ReservoirLimiter};
//! # use std::time::Duration;
//! let quota = Quota::new(1, Duration::from_secs(3600)).unwrap();
//! let limiter = ReservoirLimiter::direct(quota).unwrap();
//! block_on(limiter.until_ready());
//!
//! // The reservoir is empty for the next hour:
//! assert_eq!(Err(Canceled), block_on(limiter.acquire(future::ready(()))));
//! assert_eq!(
//!     Err(Canceled),
//!     block_on(limiter.acquire_timeout(Duration::from_millis(10)))
//! );
//! ```
//!
//! Dropping a pending `acquire` future cancels it just the same.
//!
//! # Usage in multiple threads
//!
//! Limiters are `Send` and `Sync`, and can not be cloned. To use one
//! from several threads, either borrow it from a `crossbeam` scope:
//!
//! ```rust
//! # use futures::executor::block_on;
//! # use reservoir::{Quota, ReservoirLimiter};
//! # use std::time::Duration;
//! let quota = Quota::new(4, Duration::from_secs(1)).unwrap();
//! let lim = ReservoirLimiter::direct(quota).unwrap();
//!
//! crossbeam::scope(|scope| {
//!     for _i in 0..4 {
//!         scope.spawn(|_| {
//!             assert_eq!(Ok(()), block_on(lim.acquire_timeout(Duration::from_millis(500))));
//!         });
//!     }
//! })
//! .unwrap();
//! ```
//!
//! or wrap it in an [`Arc`][std::sync::Arc]:
//!
//! ```rust
//! # use futures::executor::block_on;
//! # use reservoir::{Quota, ReservoirLimiter};
//! # use std::sync::Arc;
//! # use std::thread;
//! # use std::time::Duration;
//! let quota = Quota::new(4, Duration::from_secs(1)).unwrap();
//! let lim = Arc::new(ReservoirLimiter::direct(quota).unwrap());
//! for _i in 0..4 {
//!     let lim = lim.clone();
//!     thread::spawn(move || {
//!         block_on(lim.until_ready());
//!     })
//!     .join()
//!     .unwrap();
//! }
//! ```
//!
//! # The naive baseline
//!
//! [`NaiveLimiter`][crate::NaiveLimiter] implements the same
//! [`Limiter`][crate::Limiter] trait with a mutex-guarded counter and
//! a refill timer that runs for as long as the limiter lives. It is
//! mostly useful as a point of comparison.
