// ObservableValue - current value plus change notifications

use crate::observable::lock;
use crate::observable::subscribers::{SubscriberList, Subscription};
use std::fmt;
use std::sync::{Arc, Mutex};

/// A shared value whose observers see the current value on subscribe and
/// every subsequent change
///
/// Setting a value equal to the current one is not a change and notifies
/// nobody. Clones share the same underlying value and observers.
pub struct ObservableValue<T> {
    value: Arc<Mutex<T>>,
    subscribers: Arc<SubscriberList<T>>,
}

impl<T> ObservableValue<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(Mutex::new(initial)),
            subscribers: Arc::new(SubscriberList::new()),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        lock(&self.value).clone()
    }

    /// Replace the value, notifying observers if it changed
    ///
    /// Returns true when observers were notified.
    pub fn set(&self, new_value: T) -> bool {
        self.update(|_| new_value)
    }

    /// Derive the next value from the current one
    ///
    /// The read and the write happen under one lock, so concurrent updates
    /// are neither lost nor reported out of order.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        {
            let mut current = lock(&self.value);
            let next = f(&current);
            if *current == next {
                return false;
            }
            *current = next.clone();
            // Queued while the value is locked so notifications keep the write order
            self.subscribers.enqueue(next);
        }
        self.subscribers.drain();
        true
    }

    /// Observe the value: `observer` is called with the current value
    /// immediately, then on every change
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&T) + Send + 'static,
    {
        let registration = {
            let current = lock(&self.value);
            self.subscribers.register(Some(current.clone()), observer)
        };
        registration.finish()
    }
}

impl<T> Clone for ObservableValue<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableValue")
            .field("value", &*lock(&self.value))
            .finish()
    }
}
