//! # reservoir - an admission-control primitive for async Rust
//!
//! This library throttles how many callers proceed against a
//! downstream resource: callers [`acquire`](ReservoirLimiter::acquire)
//! a token and are admitted up to a bounded burst capacity, after
//! which they are admitted at a steady refill rate, or turned away
//! when their cancellation signal fires first.
//!
//! The main type, [`ReservoirLimiter`], keeps its token count inside a
//! background manager task that only exists while it has work to do:
//! the first waiting caller starts it, and it retires as soon as the
//! reservoir is full again and nobody is waiting. Tokens are refilled
//! by a periodic scheduler that stops by itself once the reservoir can
//! hold no more.
//!
//! The crate does not pick an async runtime: background tasks are
//! spawned through [`futures::task::Spawn`], and timers use
//! [`futures_timer`].
//!
//! # Quick example
//!
//! ```rust
//! # use futures::executor::block_on;
//! use reservoir::{Quota, ReservoirLimiter};
//! use std::time::Duration;
//!
//! let quota = Quota::new(4, Duration::from_secs(1)).unwrap();
//! let limiter = ReservoirLimiter::direct(quota).unwrap();
//! assert_eq!(Ok(()), block_on(limiter.acquire_timeout(Duration::from_secs(1))));
//! ```
//!
//! See the [guide](_guide/index.html) for more.

pub mod _guide;
mod errors;
mod limiter;
mod naive;
mod quota;
mod reservoir;

pub use errors::*;
pub use limiter::Limiter;
pub use naive::NaiveLimiter;
pub use quota::Quota;
pub use reservoir::ReservoirLimiter;
