use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::channel::{mpsc, oneshot};
use futures::future::{self, Either};
use futures::pin_mut;
use futures::task::SpawnExt;
use futures::SinkExt;
use futures_timer::Delay;
use tracing::{debug, error};

use super::Shared;

/// A signal that one token should go back into the reservoir.
pub(super) struct Refill;

/// The manager's end of a running refill scheduler.
///
/// Dropping it stops the scheduler: the manager does that when the reservoir is full again.
pub(super) struct RefillLink {
    pub(super) refills: mpsc::Receiver<Refill>,
    _stop: oneshot::Sender<()>,
}

/// Spawns a scheduler restoring one token per refill period.
///
/// Returns `None` if the executor refused the task.
pub(super) fn start(shared: &Arc<Shared>) -> Option<RefillLink> {
    let (refills_tx, refills) = mpsc::channel(0);
    let (stop_tx, stop) = oneshot::channel();
    let scheduler = Scheduler {
        period: shared.quota.refill_period(),
        refills: refills_tx,
        stop,
        _active: Active::new(shared),
    };
    match shared.spawner.spawn(scheduler.run()) {
        Ok(()) => Some(RefillLink {
            refills,
            _stop: stop_tx,
        }),
        Err(err) => {
            error!(%err, "could not spawn a refill scheduler");
            None
        }
    }
}

struct Scheduler {
    period: Duration,
    refills: mpsc::Sender<Refill>,
    stop: oneshot::Receiver<()>,
    _active: Active,
}

impl Scheduler {
    async fn run(mut self) {
        debug!(period = ?self.period, "refill scheduler started");
        loop {
            let tick = Delay::new(self.period);
            pin_mut!(tick);
            if let Either::Right(_) = future::select(tick, &mut self.stop).await {
                break;
            }
            // The manager receives whenever it is below capacity, so this only waits for the
            // step it is currently taking.
            if self.refills.send(Refill).await.is_err() {
                break;
            }
        }
        debug!("refill scheduler stopped");
    }
}

/// Counts a scheduler as alive from before it is spawned until its task is dropped.
struct Active(Arc<Shared>);

impl Active {
    fn new(shared: &Arc<Shared>) -> Active {
        shared.schedulers.fetch_add(1, Ordering::AcqRel);
        Active(Arc::clone(shared))
    }
}

impl Drop for Active {
    fn drop(&mut self) {
        self.0.schedulers.fetch_sub(1, Ordering::AcqRel);
    }
}
