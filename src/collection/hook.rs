// InsertHook - per-item async work performed before an item enters a collection

use std::future::{self, Future};

/// Prepare an item before it is inserted
///
/// Used by [`ItemCollection::add_with`](crate::collection::ItemCollection::add_with)
/// and [`ItemCollection::set_with`](crate::collection::ItemCollection::set_with),
/// typically to resolve metadata from disk.
pub trait InsertHook<T> {
    fn prepare(&self, item: T) -> impl Future<Output = T>;
}

/// Hook that inserts items unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<T> InsertHook<T> for PassThrough {
    fn prepare(&self, item: T) -> impl Future<Output = T> {
        future::ready(item)
    }
}
