//! The reservoir limiter: a lazily-started background manager handing tokens to waiting
//! callers, refilled by a self-stopping scheduler.
//!
//! Nothing runs in the background while the reservoir is full and nobody is waiting. The first
//! caller to find no manager running starts one; the manager retires again once it is full and
//! unobserved.

mod listeners;
mod manager;
mod refill;

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::channel::{mpsc, oneshot};
use futures::future::{self, BoxFuture, Either, FutureExt};
use futures::pin_mut;
use futures::task::Spawn;
use futures_timer::Delay;
use tracing::error;

use crate::errors::Canceled;
use crate::limiter::Limiter;
use crate::quota::Quota;

use listeners::ListenerRegistry;
use manager::{ManagerHandle, Parked};

/// One unit of permission to proceed.
#[derive(Debug)]
struct Token;

/// A waiting caller's reply slot. The manager hands out a token by completing it.
struct Request(oneshot::Sender<Token>);

impl Request {
    /// Returns whether the token reached a caller that was still waiting.
    fn fulfill(self) -> bool {
        self.0.send(Token).is_ok()
    }
}

/// State shared between the limiter, its manager task and its refill scheduler.
struct Shared {
    quota: Quota,
    spawner: Box<dyn Spawn + Send + Sync>,
    listeners: ListenerRegistry,
    handle: ManagerHandle,
    requests: mpsc::UnboundedSender<Request>,
    schedulers: AtomicUsize,
}

/// A rate limiter that keeps a bounded reservoir of tokens and refills it at a steady pace.
///
/// Up to [`capacity`](Quota::capacity) callers are admitted at once; after that, one caller
/// is admitted per [`refill_period`](Quota::refill_period). Token delivery order among
/// waiting callers is unspecified: it is not FIFO.
///
/// The limiter spawns its background work on the executor it was given. That work only
/// exists while tokens are being handed out or restored; an idle, full limiter costs nothing
/// but its memory.
///
/// # Example
/// ```rust
/// # use futures::executor::block_on;
/// # use reservoir::{Quota, ReservoirLimiter};
/// # use std::time::Duration;
/// let limiter = ReservoirLimiter::direct(Quota::new(4, Duration::from_secs(1)).unwrap()).unwrap();
/// for _ in 0..4 {
///     // the first four callers don't wait for a refill:
///     assert_eq!(Ok(()), block_on(limiter.acquire_timeout(Duration::from_millis(500))));
/// }
/// ```
pub struct ReservoirLimiter {
    shared: Arc<Shared>,
}

/// # Constructors
impl ReservoirLimiter {
    /// Constructs a limiter whose background tasks run on `spawner`.
    ///
    /// The executor behind `spawner` must outlive the limiter. If it stops accepting tasks,
    /// the limiter stops handing out tokens and waiting callers only return through their
    /// cancellation signal.
    pub fn with_spawner<S>(quota: Quota, spawner: S) -> ReservoirLimiter
    where
        S: Spawn + Send + Sync + 'static,
    {
        let (requests, requests_rx) = mpsc::unbounded();
        let (idle, idle_rx) = mpsc::channel(0);
        let shared = Shared {
            quota,
            spawner: Box::new(spawner),
            listeners: ListenerRegistry::new(idle),
            handle: ManagerHandle::new(Parked::new(requests_rx, idle_rx)),
            requests,
            schedulers: AtomicUsize::new(0),
        };
        ReservoirLimiter {
            shared: Arc::new(shared),
        }
    }

    /// Constructs a limiter that runs its background tasks on a small thread pool of its own.
    #[cfg(feature = "thread-pool")]
    pub fn direct(quota: Quota) -> std::io::Result<ReservoirLimiter> {
        let pool = futures::executor::ThreadPool::builder()
            .pool_size(1)
            .name_prefix("reservoir-")
            .create()?;
        Ok(ReservoirLimiter::with_spawner(quota, pool))
    }
}

/// # Acquiring tokens
impl ReservoirLimiter {
    /// Waits until a token is handed to this caller, or until `cancel` resolves.
    ///
    /// On success the token is consumed. If `cancel` wins, [`Canceled`] is returned and no
    /// token is consumed; if a token arrived at the same moment, the token wins. Dropping the
    /// returned future behaves like cancellation.
    pub async fn acquire<F>(&self, cancel: F) -> Result<(), Canceled>
    where
        F: Future<Output = ()>,
    {
        let _listener = self.shared.listeners.register();
        pin_mut!(cancel);
        manager::ensure_running(&self.shared);
        let (reply, mut delivery) = oneshot::channel();
        // The receiving end lives as long as `shared`, parked or owned by a manager, so queued
        // requests are never dropped unanswered.
        let _ = self.shared.requests.unbounded_send(Request(reply));

        let delivered = match future::select(&mut delivery, cancel.as_mut()).await {
            Either::Left((delivered, _)) => Some(delivered.is_ok()),
            Either::Right(((), _)) => None,
        };
        match delivered {
            Some(true) => Ok(()),
            Some(false) => {
                error!("token request dropped unanswered, waiting for cancellation");
                cancel.await;
                Err(Canceled)
            }
            None => {
                delivery.close();
                match delivery.try_recv() {
                    Ok(Some(Token)) => Ok(()),
                    _ => Err(Canceled),
                }
            }
        }
    }

    /// Waits for a token for at most `timeout`.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<(), Canceled> {
        self.acquire(Delay::new(timeout)).await
    }

    /// Waits until a token is handed to this caller, however long that takes.
    pub async fn until_ready(&self) {
        let never = future::pending::<()>();
        if self.acquire(never).await.is_err() {
            unreachable!("a pending future never cancels");
        }
    }
}

/// # Observing the limiter
impl ReservoirLimiter {
    /// The quota this limiter was constructed with.
    pub fn quota(&self) -> Quota {
        self.shared.quota
    }

    /// The number of callers currently waiting for a token.
    pub fn listeners(&self) -> usize {
        self.shared.listeners.snapshot()
    }

    /// Returns whether a manager task is currently alive for this limiter.
    pub fn is_manager_running(&self) -> bool {
        self.shared.handle.is_running()
    }

    /// The number of refill schedulers that have not yet terminated.
    ///
    /// At most one of them is refilling; a stopped one may still be winding down.
    pub fn active_schedulers(&self) -> usize {
        self.shared.schedulers.load(Ordering::Acquire)
    }

    /// Returns whether the limiter has no background work alive at all.
    pub fn is_idle(&self) -> bool {
        !self.is_manager_running() && self.active_schedulers() == 0
    }
}

impl fmt::Debug for ReservoirLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservoirLimiter")
            .field("quota", &self.shared.quota)
            .field("listeners", &self.listeners())
            .field("manager_running", &self.is_manager_running())
            .field("active_schedulers", &self.active_schedulers())
            .finish()
    }
}

impl Limiter for ReservoirLimiter {
    fn limit<'a>(&'a self, cancel: BoxFuture<'a, ()>) -> BoxFuture<'a, Result<(), Canceled>> {
        self.acquire(cancel).boxed()
    }
}
