use std::sync::Arc;

use futures::channel::mpsc;
use futures::task::SpawnExt;
use futures::{select, StreamExt};
use parking_lot::Mutex;
use tracing::{debug, error, trace};

use super::listeners::ListenerRegistry;
use super::refill::{self, Refill, RefillLink};
use super::{Request, Shared};

/// The receiving ends a manager works from. They are owned by the running manager, or parked
/// in the [`ManagerHandle`] while none runs.
pub(super) struct Parked {
    requests: mpsc::UnboundedReceiver<Request>,
    idle: mpsc::Receiver<()>,
}

impl Parked {
    pub(super) fn new(
        requests: mpsc::UnboundedReceiver<Request>,
        idle: mpsc::Receiver<()>,
    ) -> Parked {
        Parked { requests, idle }
    }
}

/// Whether a manager is running for a limiter: it is iff nothing is parked here.
pub(super) struct ManagerHandle(Mutex<Option<Parked>>);

impl ManagerHandle {
    pub(super) fn new(parked: Parked) -> ManagerHandle {
        ManagerHandle(Mutex::new(Some(parked)))
    }

    pub(super) fn is_running(&self) -> bool {
        self.0.lock().is_none()
    }

    /// Takes the parked resources, marking a manager as running.
    fn claim(&self) -> Option<Parked> {
        self.0.lock().take()
    }

    fn park(&self, parked: Parked) {
        let mut handle = self.0.lock();
        debug_assert!(handle.is_none(), "two managers for one reservoir");
        *handle = Some(parked);
    }

    /// Parks `parked` if there are no listeners, in one critical section with the listener
    /// snapshot. Callers register before they look at the handle, so any caller missed by the
    /// snapshot finds the resources parked and starts a fresh manager.
    fn retire_if_unobserved(
        &self,
        parked: &mut Option<Parked>,
        listeners: &ListenerRegistry,
    ) -> bool {
        let mut handle = self.0.lock();
        if listeners.snapshot() > 0 {
            return false;
        }
        *handle = parked.take();
        true
    }
}

/// Starts a manager for `shared` unless one is already running.
pub(super) fn ensure_running(shared: &Arc<Shared>) {
    let parked = match shared.handle.claim() {
        Some(parked) => parked,
        None => return,
    };
    let manager = Manager {
        shared: Arc::clone(shared),
        parked: Some(parked),
    };
    // A manager that is dropped unstarted parks its resources again.
    if let Err(err) = shared.spawner.spawn(manager.run()) {
        error!(%err, "could not spawn the reservoir manager");
    }
}

/// The task owning the token count.
struct Manager {
    shared: Arc<Shared>,
    parked: Option<Parked>,
}

/// What woke the manager up.
enum Step {
    Refilled,
    Requested(Request),
    Drained,
    Vanished,
}

impl Manager {
    async fn run(mut self) {
        let capacity = self.shared.quota.capacity().get();
        let mut count = capacity;
        let mut refill: Option<RefillLink> = None;
        debug!(capacity, "reservoir manager started");

        loop {
            debug_assert!(count <= capacity);
            let step = if count == capacity {
                if self
                    .shared
                    .handle
                    .retire_if_unobserved(&mut self.parked, &self.shared.listeners)
                {
                    debug!("reservoir full and unobserved, manager retiring");
                    return;
                }
                match self.parked.as_mut() {
                    Some(parked) => select! {
                        request = parked.requests.next() => {
                            request.map_or(Step::Vanished, Step::Requested)
                        }
                        _ = parked.idle.next() => Step::Drained,
                    },
                    None => Step::Vanished,
                }
            } else if count == 0 {
                match refill.as_mut() {
                    Some(link) => link
                        .refills
                        .next()
                        .await
                        .map_or(Step::Vanished, |Refill| Step::Refilled),
                    None => Step::Vanished,
                }
            } else {
                match (self.parked.as_mut(), refill.as_mut()) {
                    (Some(parked), Some(link)) => select! {
                        refilled = link.refills.next() => {
                            refilled.map_or(Step::Vanished, |Refill| Step::Refilled)
                        }
                        request = parked.requests.next() => {
                            request.map_or(Step::Vanished, Step::Requested)
                        }
                    },
                    _ => Step::Vanished,
                }
            };

            match step {
                Step::Refilled => {
                    count += 1;
                    trace!(count, "token refilled");
                    if count == capacity {
                        // Dropping the link stops the scheduler.
                        refill = None;
                    }
                }
                Step::Requested(request) => {
                    if request.fulfill() {
                        if count == capacity {
                            refill = refill::start(&self.shared);
                        }
                        count -= 1;
                        trace!(count, "token dispensed");
                    }
                }
                Step::Drained => {}
                Step::Vanished => return self.abandon(),
            }
        }
    }

    /// Gives up after a channel end went away under the manager, which only happens when the
    /// executor drops tasks. The resources get parked again on drop.
    fn abandon(self) {
        error!("reservoir manager lost its refill scheduler, giving up");
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        if let Some(parked) = self.parked.take() {
            self.shared.handle.park(parked);
        }
    }
}
