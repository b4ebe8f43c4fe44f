// ItemCollection - ordered, duplicate-free collection with change notifications

use crate::collection::event::ChangeEvent;
use crate::collection::hook::InsertHook;
use crate::observable::{SubscriberList, Subscription};
use log::debug;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Items that carry an identity key
///
/// Two items with equal keys are the same item as far as a collection is
/// concerned.
pub trait Keyed {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> &Self::Key;
}

/// Ordered collection of unique items that publishes every change
///
/// Invariants:
/// - No two items share a key
/// - Insertion order is preserved
/// - Each mutating operation publishes at most one [`ChangeEvent`], after the
///   mutation is complete
///
/// The collection has a single owner: every mutation takes `&mut self`.
/// Observers are called synchronously, in subscription order, from inside the
/// mutating call.
pub struct ItemCollection<T: Keyed> {
    items: Vec<T>,
    keys: HashSet<T::Key>,
    subscribers: SubscriberList<ChangeEvent<T>>,
}

impl<T> ItemCollection<T>
where
    T: Keyed + Clone + Send + 'static,
{
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            keys: HashSet::new(),
            subscribers: SubscriberList::new(),
        }
    }

    /// Append the items whose keys are not present yet
    ///
    /// Survivors keep their input order; a key repeated inside `items` is only
    /// inserted once. Publishes a single `Add` event carrying the survivors.
    /// When every item is already present nothing is published.
    ///
    /// Returns the slice of items that were appended.
    pub fn add<I>(&mut self, items: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
    {
        let start = self.items.len();
        let survivors = self.filter_new(items);
        self.commit_add(survivors);
        &self.items[start..]
    }

    /// Like [`add`](Self::add), but each survivor is passed through `hook` first
    ///
    /// The collection is only modified once every item has been prepared, so
    /// observers never see a partial batch. Dropping the returned future
    /// before it completes leaves the collection untouched.
    pub async fn add_with<I, H>(&mut self, items: I, hook: &H) -> &[T]
    where
        I: IntoIterator<Item = T>,
        H: InsertHook<T>,
    {
        let start = self.items.len();
        let candidates = self.filter_new(items);

        let mut prepared = Vec::with_capacity(candidates.len());
        for item in candidates {
            prepared.push(hook.prepare(item).await);
        }

        // The hook may hand back an item with a different key.
        let survivors = self.filter_new(prepared);
        self.commit_add(survivors);
        &self.items[start..]
    }

    /// Replace the whole contents and publish a `Reset`
    pub fn set<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let fresh = dedup(items);
        self.replace(fresh);
    }

    /// Like [`set`](Self::set), preparing every item through `hook` first
    pub async fn set_with<I, H>(&mut self, items: I, hook: &H)
    where
        I: IntoIterator<Item = T>,
        H: InsertHook<T>,
    {
        let candidates = dedup(items);

        let mut prepared = Vec::with_capacity(candidates.len());
        for item in candidates {
            prepared.push(hook.prepare(item).await);
        }

        self.replace(dedup(prepared));
    }

    /// Remove an item (matched by key)
    ///
    /// Returns false, publishing nothing, when `item` is `None` or not present.
    pub fn remove(&mut self, item: Option<&T>) -> bool {
        let Some(item) = item else {
            return false;
        };
        let Some(index) = self.position(item.key()) else {
            return false;
        };

        let removed = self.items.remove(index);
        self.keys.remove(removed.key());
        self.subscribers.emit(ChangeEvent::Remove {
            index,
            items: vec![removed],
        });
        true
    }

    /// Remove everything and publish an empty `Reset`, even if already empty
    pub fn remove_all(&mut self) {
        self.items.clear();
        self.keys.clear();
        self.subscribers.emit(ChangeEvent::Reset { items: Vec::new() });
    }

    pub fn contains(&self, item: &T) -> bool {
        self.keys.contains(item.key())
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.keys.contains(key)
    }

    /// Index of the item with the given key
    pub fn position(&self, key: &T::Key) -> Option<usize> {
        if !self.keys.contains(key) {
            return None;
        }
        self.items.iter().position(|item| item.key() == key)
    }

    /// Item with the given key
    pub fn find(&self, key: &T::Key) -> Option<&T> {
        self.position(key).map(|index| &self.items[index])
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Owned copy of the current contents
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Observe changes
    ///
    /// The observer immediately receives a `Reset` with the current contents,
    /// then every later change in mutation order, until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&ChangeEvent<T>) + Send + 'static,
    {
        let current = ChangeEvent::Reset {
            items: self.snapshot(),
        };
        self.subscribers.subscribe_with_replay(current, observer)
    }

    /// Number of attached observers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn filter_new<I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut batch = HashSet::new();
        items
            .into_iter()
            .filter(|item| !self.keys.contains(item.key()) && batch.insert(item.key().clone()))
            .collect()
    }

    fn commit_add(&mut self, survivors: Vec<T>) {
        if survivors.is_empty() {
            debug!("Add skipped: every item already present");
            return;
        }

        for item in &survivors {
            self.keys.insert(item.key().clone());
        }
        self.items.extend(survivors.iter().cloned());
        self.subscribers.emit(ChangeEvent::Add { items: survivors });
    }

    fn replace(&mut self, items: Vec<T>) {
        self.keys = items.iter().map(|item| item.key().clone()).collect();
        self.items = items;
        self.subscribers.emit(ChangeEvent::Reset {
            items: self.items.clone(),
        });
    }
}

fn dedup<T, I>(items: I) -> Vec<T>
where
    T: Keyed,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.key().clone()))
        .collect()
}

impl<T> Default for ItemCollection<T>
where
    T: Keyed + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ItemCollection<T>
where
    T: Keyed + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCollection")
            .field("items", &self.items)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl<'a, T: Keyed> IntoIterator for &'a ItemCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::event::ChangeKind;
    use crate::collection::hook::PassThrough;
    use crate::media::MediaItem;
    use futures::executor::block_on;
    use std::future::Future;
    use std::pin::pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    type Events = Arc<Mutex<Vec<ChangeEvent<MediaItem>>>>;

    fn item(path: &str) -> MediaItem {
        MediaItem::new(path)
    }

    fn record(collection: &ItemCollection<MediaItem>) -> (Events, Subscription) {
        let events: Events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let subscription =
            collection.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        (events, subscription)
    }

    fn paths(items: &[MediaItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| item.path().to_string_lossy().into_owned())
            .collect()
    }

    struct UpperCaseTitle;

    impl InsertHook<MediaItem> for UpperCaseTitle {
        async fn prepare(&self, item: MediaItem) -> MediaItem {
            let title = item.display_name().to_uppercase();
            item.with_title(title)
        }
    }

    struct Stalls;

    impl InsertHook<MediaItem> for Stalls {
        async fn prepare(&self, item: MediaItem) -> MediaItem {
            futures::pending!();
            item
        }
    }

    #[test]
    fn test_add_filters_duplicates() {
        let mut collection = ItemCollection::new();
        let (events, _sub) = record(&collection);

        collection.add(vec![item("a.mp3"), item("b.mp3")]);
        let added = paths(collection.add(vec![item("B.MP3"), item("c.mp3")]));

        assert_eq!(added, vec!["c.mp3"]);
        assert_eq!(
            paths(collection.as_slice()),
            vec!["a.mp3", "b.mp3", "c.mp3"]
        );

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2],
            ChangeEvent::Add {
                items: vec![item("c.mp3")]
            }
        );
    }

    #[test]
    fn test_add_deduplicates_within_batch() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3"), item("A.mp3"), item("b.mp3")]);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_add_of_only_duplicates_publishes_nothing() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3")]);
        let (events, _sub) = record(&collection);

        let added = collection.add(vec![item("a.mp3")]);
        assert!(added.is_empty());

        collection.add(Vec::new());

        // Only the replayed Reset
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_subscribe_replays_reset_first() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3")]);
        collection.remove(Some(&item("a.mp3")));
        collection.add(vec![item("b.mp3")]);

        let (events, _sub) = record(&collection);
        collection.add(vec![item("c.mp3")]);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            ChangeEvent::Reset {
                items: vec![item("b.mp3")]
            }
        );
        assert_eq!(events[1].kind(), ChangeKind::Add);
    }

    #[test]
    fn test_set_replaces_and_resets() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3")]);
        let (events, _sub) = record(&collection);

        collection.set(vec![item("c.mp3"), item("b.mp3"), item("C.mp3")]);

        assert_eq!(paths(collection.as_slice()), vec!["c.mp3", "b.mp3"]);
        assert!(!collection.contains(&item("a.mp3")));
        let events = events.lock().unwrap();
        assert_eq!(
            events[1],
            ChangeEvent::Reset {
                items: vec![item("c.mp3"), item("b.mp3")]
            }
        );
    }

    #[test]
    fn test_remove_reports_index() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3"), item("b.mp3"), item("c.mp3")]);
        let (events, _sub) = record(&collection);

        assert!(collection.remove(Some(&item("B.mp3"))));

        assert_eq!(paths(collection.as_slice()), vec!["a.mp3", "c.mp3"]);
        assert_eq!(
            events.lock().unwrap()[1],
            ChangeEvent::Remove {
                index: 1,
                items: vec![item("b.mp3")]
            }
        );
    }

    #[test]
    fn test_remove_absent_or_none_is_silent() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3")]);
        let (events, _sub) = record(&collection);

        assert!(!collection.remove(Some(&item("x.mp3"))));
        assert!(!collection.remove(None));

        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_remove_all_always_resets() {
        let mut collection: ItemCollection<MediaItem> = ItemCollection::new();
        let (events, _sub) = record(&collection);

        collection.remove_all();
        collection.add(vec![item("a.mp3")]);
        collection.remove_all();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[1], ChangeEvent::Reset { items: Vec::new() });
        assert_eq!(events[3], ChangeEvent::Reset { items: Vec::new() });
        assert!(collection.is_empty());
    }

    #[test]
    fn test_unsubscribe_stops_delivery_only() {
        let mut collection = ItemCollection::new();
        let (events, subscription) = record(&collection);
        subscription.unsubscribe();

        collection.add(vec![item("a.mp3")]);

        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.subscriber_count(), 0);
    }

    #[test]
    fn test_one_shot_observer_detaches_itself() {
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let mut collection = ItemCollection::new();
            let own: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
            let kinds = Arc::new(Mutex::new(Vec::new()));

            let handle = own.clone();
            let sink = kinds.clone();
            let subscription = collection.subscribe(move |event: &ChangeEvent<MediaItem>| {
                sink.lock().unwrap().push(event.kind());
                if event.kind() != ChangeKind::Reset {
                    drop(handle.lock().unwrap().take());
                }
            });
            *own.lock().unwrap() = Some(subscription);

            collection.add(vec![item("a.mp3")]);
            collection.add(vec![item("b.mp3")]);

            let kinds = kinds.lock().unwrap().clone();
            done_tx.send((kinds, collection.subscriber_count())).unwrap();
        });

        let (kinds, remaining) = done_rx
            .recv_timeout(std::time::Duration::from_secs(3))
            .expect("add did not return after the observer unsubscribed");
        assert_eq!(kinds, vec![ChangeKind::Reset, ChangeKind::Add]);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_add_with_prepares_items_then_publishes_once() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3")]);
        let (events, _sub) = record(&collection);

        let added = block_on(
            collection.add_with(vec![item("a.mp3"), item("b.mp3")], &UpperCaseTitle),
        );
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].title.as_deref(), Some("B"));

        // Existing item is not re-prepared
        assert_eq!(collection.get(0).unwrap().title, None);
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_set_with_prepares_items() {
        let mut collection = ItemCollection::new();
        let batch = vec![item("x.mp3"), item("y.mp3")];
        block_on(collection.set_with(batch, &UpperCaseTitle));
        let titles: Vec<_> = collection.iter().map(|i| i.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["X", "Y"]);

        block_on(collection.set_with(Vec::new(), &PassThrough));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_dropped_add_with_leaves_collection_untouched() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3")]);
        let (events, _sub) = record(&collection);

        {
            let waker = futures::task::noop_waker();
            let mut cx = Context::from_waker(&waker);
            let mut pending = pin!(collection.add_with(vec![item("b.mp3")], &Stalls));
            assert!(pending.as_mut().poll(&mut cx).is_pending());
        }

        assert_eq!(paths(collection.as_slice()), vec!["a.mp3"]);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_position_and_find_use_keys() {
        let mut collection = ItemCollection::new();
        collection.add(vec![item("a.mp3"), item("b.mp3")]);
        let key = item("B.MP3").key().clone();

        assert_eq!(collection.position(&key), Some(1));
        let found = collection.find(&key).map(|i| i.path().to_path_buf());
        assert_eq!(found, Some("b.mp3".into()));
        assert!(collection.contains_key(&key));
    }

    #[test]
    fn test_poll_ready_future_completes() {
        let mut collection: ItemCollection<MediaItem> = ItemCollection::new();
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut ready = pin!(collection.add_with(vec![item("a.mp3")], &PassThrough));
        match ready.as_mut().poll(&mut cx) {
            Poll::Ready(added) => assert_eq!(added.len(), 1),
            Poll::Pending => panic!("pass-through add should complete on first poll"),
        }
    }
}
