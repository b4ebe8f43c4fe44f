// UndoRedoHistory - bounded LIFO stack of executed commands

use crate::command::trait_def::{CommandError, CommandResult, UndoableCommand};
use crate::observable::ObservableValue;
use log::debug;
use std::collections::VecDeque;

/// Default maximum number of entries kept per stack
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Entries that own resources which must be released when the history
/// discards them
pub trait Release {
    fn release(&mut self);
}

impl Release for Box<dyn UndoableCommand> {
    fn release(&mut self) {
        UndoableCommand::release(&mut **self);
    }
}

/// Bounded LIFO stack
///
/// Pushing onto a full stack evicts the oldest (bottom) entry. Evicted and
/// cleared entries are released exactly once; popped entries are handed to
/// the caller as-is.
///
/// The stack also publishes its emptiness through an [`ObservableValue`],
/// which only changes on empty/non-empty transitions.
pub struct UndoRedoHistory<T: Release> {
    entries: VecDeque<T>,
    max_size: usize,
    empty: ObservableValue<bool>,
}

impl<T: Release> UndoRedoHistory<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    /// Create a stack holding at most `max_size` entries (at least one)
    pub fn with_capacity(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
            empty: ObservableValue::new(true),
        }
    }

    /// Push an entry, evicting the oldest one when full
    pub fn push(&mut self, entry: T) {
        while self.entries.len() >= self.max_size {
            if let Some(mut evicted) = self.entries.pop_front() {
                evicted.release();
                debug!("History full ({}), evicted oldest entry", self.max_size);
            }
        }
        self.entries.push_back(entry);
        self.empty.set(false);
    }

    /// Remove and return the top entry, if any
    pub fn try_pop(&mut self) -> Option<T> {
        let entry = self.entries.pop_back();
        if self.entries.is_empty() {
            self.empty.set(true);
        }
        entry
    }

    /// Remove and return the top entry
    ///
    /// # Errors
    /// [`CommandError::EmptyHistory`] when the stack is empty.
    pub fn pop(&mut self) -> CommandResult<T> {
        self.try_pop().ok_or(CommandError::EmptyHistory)
    }

    /// Top entry without removing it
    ///
    /// # Errors
    /// [`CommandError::EmptyHistory`] when the stack is empty.
    pub fn peek(&self) -> CommandResult<&T> {
        self.entries.back().ok_or(CommandError::EmptyHistory)
    }

    /// Release and drop every entry
    pub fn clear(&mut self) {
        for mut entry in self.entries.drain(..) {
            entry.release();
        }
        self.empty.set(true);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Emptiness stream: true while empty, false once an entry is pushed
    pub fn emptiness(&self) -> &ObservableValue<bool> {
        &self.empty
    }
}

impl<T: Release> Default for UndoRedoHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Release> Drop for UndoRedoHistory<T> {
    fn drop(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.release();
        }
    }
}
