// SubscriberList - ordered observer registry with RAII subscriptions

use crate::observable::lock;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Observer<E> = Box<dyn FnMut(&E) + Send>;

struct Slot<E> {
    replay: Option<E>,
    observer: Observer<E>,
}

/// One registered observer; `detached` is readable without the slot lock
/// so an observer can drop its own subscription while it is being called
struct Shared<E> {
    detached: AtomicBool,
    slot: Mutex<Slot<E>>,
}

impl<E> Shared<E> {
    fn deliver(&self, event: Option<&E>) {
        let mut guard = lock(&self.slot);
        let slot = &mut *guard;
        if let Some(initial) = slot.replay.take() {
            (slot.observer)(&initial);
        }
        if let Some(event) = event {
            if !self.detached.load(Ordering::Acquire) {
                (slot.observer)(event);
            }
        }
    }
}

struct Entry<E> {
    id: u64,
    // First event sequence number this observer receives
    since: u64,
    shared: Arc<Shared<E>>,
}

struct Registry<E> {
    next_id: u64,
    next_seq: u64,
    entries: Vec<Entry<E>>,
    queue: VecDeque<(u64, E)>,
    draining: bool,
}

/// Ordered list of observers for events of type `E`
///
/// Observers are called in subscription order, one event at a time and in
/// publication order. No lock of the list is held while an observer runs, so
/// an observer may subscribe, unsubscribe (including itself) or publish to the
/// same list. An event published while another is being delivered is queued
/// and delivered once the current one has reached every observer, by the
/// call that was already delivering.
pub struct SubscriberList<E> {
    inner: Arc<Mutex<Registry<E>>>,
}

impl<E: Send + 'static> SubscriberList<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                next_seq: 0,
                entries: Vec::new(),
                queue: VecDeque::new(),
                draining: false,
            })),
        }
    }

    /// Register an observer for all future events
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&E) + Send + 'static,
    {
        self.register(None, observer).finish()
    }

    /// Deliver `initial` to this observer only, then every later event
    ///
    /// The initial delivery happens before the observer can see any other event.
    pub fn subscribe_with_replay<F>(&self, initial: E, observer: F) -> Subscription
    where
        F: FnMut(&E) + Send + 'static,
    {
        self.register(Some(initial), observer).finish()
    }

    /// Add an observer without running it yet
    ///
    /// Callers that must register atomically with some other state hold their
    /// own lock around this and call [`Registration::finish`] after releasing it.
    pub(crate) fn register<F>(&self, replay: Option<E>, observer: F) -> Registration<E>
    where
        F: FnMut(&E) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            detached: AtomicBool::new(false),
            slot: Mutex::new(Slot {
                replay,
                observer: Box::new(observer),
            }),
        });

        let id = {
            let mut registry = lock(&self.inner);
            let id = registry.next_id;
            registry.next_id += 1;
            let since = registry.next_seq;
            registry.entries.push(Entry {
                id,
                since,
                shared: Arc::clone(&shared),
            });
            id
        };

        let registry: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.inner);
        let subscription = Subscription::new(move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let removed = {
                let mut registry = lock(&registry);
                registry
                    .entries
                    .iter()
                    .position(|entry| entry.id == id)
                    .map(|index| registry.entries.remove(index))
            };
            // Dropped outside the registry lock: the observer may own subscriptions
            if let Some(entry) = removed {
                entry.shared.detached.store(true, Ordering::Release);
            }
        });

        Registration {
            subscription,
            shared,
        }
    }

    /// Deliver an event to every registered observer, in subscription order
    pub fn emit(&self, event: E) {
        self.enqueue(event);
        self.drain();
    }

    /// Queue an event for the observers registered so far
    pub(crate) fn enqueue(&self, event: E) {
        let mut registry = lock(&self.inner);
        let seq = registry.next_seq;
        registry.next_seq += 1;
        registry.queue.push_back((seq, event));
    }

    /// Deliver queued events unless another call is already delivering
    pub(crate) fn drain(&self) {
        {
            let mut registry = lock(&self.inner);
            if registry.draining {
                return;
            }
            registry.draining = true;
        }
        let mut guard = DrainGuard {
            registry: &self.inner,
            finished: false,
        };

        loop {
            let (event, targets) = {
                let mut registry = lock(&self.inner);
                let Some((seq, event)) = registry.queue.pop_front() else {
                    registry.draining = false;
                    guard.finished = true;
                    return;
                };
                let targets: Vec<Arc<Shared<E>>> = registry
                    .entries
                    .iter()
                    .filter(|entry| entry.since <= seq)
                    .map(|entry| Arc::clone(&entry.shared))
                    .collect();
                (event, targets)
            };

            for target in &targets {
                target.deliver(Some(&event));
            }
        }
    }

    /// Number of live observers
    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Send + 'static> Default for SubscriberList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for SubscriberList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberList")
            .field("observers", &lock(&self.inner).entries.len())
            .finish()
    }
}

/// Releases the delivering flag if an observer panics
struct DrainGuard<'a, E> {
    registry: &'a Mutex<Registry<E>>,
    finished: bool,
}

impl<E> Drop for DrainGuard<'_, E> {
    fn drop(&mut self) {
        if !self.finished {
            lock(self.registry).draining = false;
        }
    }
}

/// An observer that is registered but has not received its replay yet
pub(crate) struct Registration<E> {
    subscription: Subscription,
    shared: Arc<Shared<E>>,
}

impl<E> Registration<E> {
    /// Deliver the pending replay, if any, and hand out the subscription
    pub(crate) fn finish(self) -> Subscription {
        self.shared.deliver(None);
        self.subscription
    }
}

/// Handle for a registered observer
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) detaches the
/// observer. Detaching never affects the state of the observed source.
#[must_use = "dropping a Subscription detaches the observer immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Stop delivery to this observer
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    /// Whether the observer is still attached to its source
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
