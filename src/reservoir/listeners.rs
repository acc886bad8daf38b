use futures::channel::mpsc;
use parking_lot::Mutex;

/// Tracks how many callers are currently waiting for a token.
///
/// Whenever the count drops back to zero, the registry sends a (coalesced) wake-up on the
/// idle channel, so that a manager waiting to hand out a token notices that nobody is left to
/// take it.
pub(super) struct ListenerRegistry {
    inner: Mutex<Listeners>,
}

struct Listeners {
    count: usize,
    idle: mpsc::Sender<()>,
}

impl ListenerRegistry {
    pub(super) fn new(idle: mpsc::Sender<()>) -> ListenerRegistry {
        ListenerRegistry {
            inner: Mutex::new(Listeners { count: 0, idle }),
        }
    }

    /// Registers a listener for as long as the returned guard lives.
    pub(super) fn register(&self) -> Listener<'_> {
        self.increment();
        Listener { registry: self }
    }

    /// A point-in-time read of the listener count.
    pub(super) fn snapshot(&self) -> usize {
        self.inner.lock().count
    }

    fn increment(&self) {
        self.inner.lock().count += 1;
    }

    fn decrement(&self) {
        let mut inner = self.inner.lock();
        debug_assert!(inner.count > 0, "listener count underflow");
        inner.count -= 1;
        if inner.count == 0 {
            // A full channel already holds an unconsumed wake-up.
            let _ = inner.idle.try_send(());
        }
    }
}

/// A registered listener. Deregisters on drop.
pub(super) struct Listener<'a> {
    registry: &'a ListenerRegistry,
}

impl Drop for Listener<'_> {
    fn drop(&mut self) {
        self.registry.decrement();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_registered_listeners() {
        let (idle, _idle_rx) = mpsc::channel(0);
        let registry = ListenerRegistry::new(idle);
        assert_eq!(registry.snapshot(), 0);

        let first = registry.register();
        let second = registry.register();
        assert_eq!(registry.snapshot(), 2);

        drop(first);
        assert_eq!(registry.snapshot(), 1);
        drop(second);
        assert_eq!(registry.snapshot(), 0);
    }

    #[test]
    fn wakes_once_when_drained() {
        let (idle, mut idle_rx) = mpsc::channel(0);
        let registry = ListenerRegistry::new(idle);

        let first = registry.register();
        let second = registry.register();
        drop(first);
        assert!(idle_rx.try_next().is_err(), "still one listener left");
        drop(second);
        assert!(matches!(idle_rx.try_next(), Ok(Some(()))));

        // wake-ups don't pile up while nobody consumes them:
        drop(registry.register());
        drop(registry.register());
        assert!(matches!(idle_rx.try_next(), Ok(Some(()))));
        assert!(idle_rx.try_next().is_err());
    }
}
