// Observable primitives
//
// Push-based notification building blocks shared by the playlist collection
// and the undo/redo history:
// - SubscriberList: ordered list of observers, one event delivered to all
// - Subscription: RAII handle, dropping it detaches the observer
// - ObservableValue: a value that replays itself on subscribe and notifies on change
//
// Delivery is synchronous on the thread performing the mutation. No registry
// lock is held while an observer runs; changes made from inside an observer
// are delivered after the event currently in flight.

pub mod subscribers;
pub mod value;

pub use subscribers::{SubscriberList, Subscription};
pub use value::ObservableValue;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
