// PlaybackQueue - mirrors the playlist into a navigable play order

use crate::collection::{Playlist, PlaylistEvent};
use crate::media::{ItemKey, MediaItem};
use crate::observable::{Subscription, lock};
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Playback state kept in sync with a playlist's change stream
#[derive(Debug, Default)]
struct QueueState {
    /// Keys in playlist order
    entries: Vec<ItemKey>,
    /// Permutation of entry indices used while shuffling
    order: Vec<usize>,
    /// Index into `entries`
    current: Option<usize>,
    shuffle: bool,
    repeat: bool,
}

impl QueueState {
    fn apply(&mut self, event: &PlaylistEvent) {
        match event {
            PlaylistEvent::Reset { items } => self.reset(items),
            PlaylistEvent::Add { items } => self.append(items),
            PlaylistEvent::Remove { index, .. } => self.remove_at(*index),
        }
    }

    fn reset(&mut self, items: &[MediaItem]) {
        let current_key = self.current.and_then(|i| self.entries.get(i)).cloned();

        self.entries = items.iter().map(|item| item.key().clone()).collect();
        self.current = current_key.and_then(|key| self.entries.iter().position(|k| *k == key));
        self.order = (0..self.entries.len()).collect();
        if self.shuffle {
            self.reshuffle();
        }
    }

    fn append(&mut self, items: &[MediaItem]) {
        let start = self.entries.len();
        self.entries.extend(items.iter().map(|item| item.key().clone()));

        let mut rng = rand::thread_rng();
        for index in start..self.entries.len() {
            if self.shuffle {
                // New entries land somewhere after the current one
                let after = self.order_position().map_or(0, |p| p + 1);
                let slot = rng.gen_range(after..=self.order.len());
                self.order.insert(slot, index);
            } else {
                self.order.push(index);
            }
        }
    }

    fn remove_at(&mut self, index: usize) {
        if index >= self.entries.len() {
            return;
        }
        self.entries.remove(index);
        self.order.retain(|&i| i != index);
        for i in self.order.iter_mut() {
            if *i > index {
                *i -= 1;
            }
        }

        self.current = match self.current {
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
    }

    /// Shuffle the order, keeping the current entry first
    fn reshuffle(&mut self) {
        self.order.shuffle(&mut rand::thread_rng());
        if let Some(current) = self.current {
            if let Some(pos) = self.order.iter().position(|&i| i == current) {
                self.order.swap(0, pos);
            }
        }
    }

    fn order_position(&self) -> Option<usize> {
        let current = self.current?;
        self.order.iter().position(|&i| i == current)
    }

    /// Entry index one step away in play order
    fn neighbour(&self, forward: bool) -> Option<usize> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }

        let sequence: Vec<usize> = if self.shuffle {
            self.order.clone()
        } else {
            (0..len).collect()
        };

        let Some(pos) = self.current.and_then(|c| sequence.iter().position(|&i| i == c)) else {
            return if forward {
                sequence.first().copied()
            } else {
                sequence.last().copied()
            };
        };

        let target = if forward {
            match pos + 1 {
                next if next < len => Some(next),
                _ if self.repeat => Some(0),
                _ => None,
            }
        } else {
            match pos.checked_sub(1) {
                Some(prev) => Some(prev),
                None if self.repeat => Some(len - 1),
                None => None,
            }
        };
        target.map(|p| sequence[p])
    }
}

/// Play order derived from a playlist
///
/// Once attached, the queue follows the playlist's change stream: a `Reset`
/// rebuilds it (keeping the current item when it survives), an `Add` appends,
/// and a `Remove` drops the entry and shifts the current index. Removing the
/// current item leaves the queue without a current item.
///
/// With shuffle enabled navigation follows a random permutation; items added
/// while shuffling are inserted at random positions after the current one.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    state: Arc<Mutex<QueueState>>,
    link: Option<Subscription>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow `playlist`, replacing any previous attachment
    ///
    /// The playlist replays its contents on subscribe, so the queue is in
    /// sync as soon as this returns.
    pub fn attach(&mut self, playlist: &Playlist) {
        let state = Arc::clone(&self.state);
        self.link = Some(playlist.subscribe(move |event| {
            lock(&state).apply(event);
        }));
        debug!("Playback queue attached ({} entries)", self.len());
    }

    /// Stop following the playlist; the current entries are kept
    pub fn detach(&mut self) {
        self.link = None;
    }

    pub fn is_attached(&self) -> bool {
        self.link.is_some()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).entries.is_empty()
    }

    /// Key of the current item
    pub fn current(&self) -> Option<ItemKey> {
        let state = lock(&self.state);
        state.current.and_then(|i| state.entries.get(i)).cloned()
    }

    /// Playlist index of the current item
    pub fn current_index(&self) -> Option<usize> {
        lock(&self.state).current
    }

    /// Make the item at playlist `index` current
    ///
    /// Returns false, leaving the current item unchanged, when `index` is out
    /// of range.
    pub fn set_current(&self, index: usize) -> bool {
        let mut state = lock(&self.state);
        if index >= state.entries.len() {
            return false;
        }
        state.current = Some(index);
        true
    }

    pub fn clear_current(&self) {
        lock(&self.state).current = None;
    }

    /// Advance to the next item in play order
    ///
    /// Without a current item this starts from the beginning. At the end the
    /// queue wraps around when repeat is on; otherwise it returns `None` and
    /// the current item is unchanged.
    pub fn next(&self) -> Option<ItemKey> {
        self.step(true)
    }

    /// Go back to the previous item in play order
    pub fn previous(&self) -> Option<ItemKey> {
        self.step(false)
    }

    fn step(&self, forward: bool) -> Option<ItemKey> {
        let mut state = lock(&self.state);
        let target = state.neighbour(forward)?;
        state.current = Some(target);
        state.entries.get(target).cloned()
    }

    pub fn shuffle(&self) -> bool {
        lock(&self.state).shuffle
    }

    /// Toggle shuffling; enabling it draws a fresh order
    pub fn set_shuffle(&self, shuffle: bool) {
        let mut state = lock(&self.state);
        if state.shuffle == shuffle {
            return;
        }
        state.shuffle = shuffle;
        if shuffle {
            state.reshuffle();
        }
    }

    pub fn repeat(&self) -> bool {
        lock(&self.state).repeat
    }

    pub fn set_repeat(&self, repeat: bool) {
        lock(&self.state).repeat = repeat;
    }

    /// Current shuffle permutation of playlist indices
    pub fn shuffled_indices(&self) -> Vec<usize> {
        lock(&self.state).order.clone()
    }

    /// Restore a saved queue state on top of the current entries
    ///
    /// Out-of-range and repeated indices in `order` are dropped, and indices it
    /// misses are appended, so the result is always a full permutation. An
    /// out-of-range `current` is ignored.
    pub fn restore(&self, order: &[usize], current: Option<usize>, shuffle: bool, repeat: bool) {
        let mut state = lock(&self.state);
        let len = state.entries.len();

        let mut seen = HashSet::with_capacity(len);
        let mut restored: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&i| i < len && seen.insert(i))
            .collect();
        restored.extend((0..len).filter(|i| !seen.contains(i)));

        state.order = restored;
        state.current = current.filter(|&i| i < len);
        state.shuffle = shuffle;
        state.repeat = repeat;
    }
}
