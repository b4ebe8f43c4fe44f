// HistoryManager - Coordinates the undo and redo stacks

use crate::collection::Playlist;
use crate::command::history::{DEFAULT_MAX_HISTORY, UndoRedoHistory};
use crate::command::trait_def::{CommandError, CommandResult, UndoableCommand};
use crate::observable::{ObservableValue, Subscription};
use log::{debug, info};

/// A command recorded in history
pub type HistoryEntry = Box<dyn UndoableCommand>;

/// Manages undo/redo for executed playlist commands
///
/// The HistoryManager maintains two bounded stacks:
/// - Undo stack: commands that have been executed and can be undone
/// - Redo stack: commands that have been undone and can be redone
///
/// Pushing a newly executed command clears the redo stack, since the
/// playlist is now on a new timeline.
///
/// UI-facing state is published through observable values: `can_undo` and
/// `can_redo` follow the emptiness of the stacks, and `executed_count` is the
/// running number of applied actions.
pub struct HistoryManager {
    undo_stack: UndoRedoHistory<HistoryEntry>,
    redo_stack: UndoRedoHistory<HistoryEntry>,
    can_undo: ObservableValue<bool>,
    can_redo: ObservableValue<bool>,
    executed_count: ObservableValue<i64>,
    _links: [Subscription; 2],
}

impl HistoryManager {
    /// Create a HistoryManager with the default depth
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    /// Create a HistoryManager keeping at most `max_history` entries per stack
    pub fn with_capacity(max_history: usize) -> Self {
        let undo_stack = UndoRedoHistory::with_capacity(max_history);
        let redo_stack = UndoRedoHistory::with_capacity(max_history);
        let can_undo = ObservableValue::new(false);
        let can_redo = ObservableValue::new(false);

        let undo_link = {
            let can_undo = can_undo.clone();
            undo_stack.emptiness().subscribe(move |empty| {
                can_undo.set(!*empty);
            })
        };
        let redo_link = {
            let can_redo = can_redo.clone();
            redo_stack.emptiness().subscribe(move |empty| {
                can_redo.set(!*empty);
            })
        };

        Self {
            undo_stack,
            redo_stack,
            can_undo,
            can_redo,
            executed_count: ObservableValue::new(0),
            _links: [undo_link, redo_link],
        }
    }

    /// Record an executed command
    ///
    /// Clears the redo stack and increments the executed count.
    ///
    /// # Errors
    /// [`CommandError::NotExecuted`] if the command never ran successfully.
    pub fn push(&mut self, command: HistoryEntry) -> CommandResult<()> {
        if !command.is_executed() {
            return Err(CommandError::NotExecuted);
        }

        debug!("History push: {}", command.description());
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.executed_count.update(|count| count + 1);
        Ok(())
    }

    /// Undo the most recent command
    ///
    /// Returns `Ok(false)` when there is nothing to undo.
    ///
    /// # Errors
    /// Propagates a failure from the command's reverse effect; the command then
    /// stays on the undo stack.
    pub fn undo(&mut self, playlist: &mut Playlist) -> CommandResult<bool> {
        let Some(mut command) = self.undo_stack.try_pop() else {
            return Ok(false);
        };

        if let Err(e) = command.undo(playlist) {
            self.undo_stack.push(command);
            return Err(e);
        }

        info!("Undo: {}", command.description());
        self.redo_stack.push(command);
        self.executed_count.update(|count| count - 1);
        Ok(true)
    }

    /// Redo the most recently undone command
    ///
    /// Returns `Ok(false)` when there is nothing to redo.
    ///
    /// # Errors
    /// Propagates a failure from the command's forward effect; the command then
    /// stays on the redo stack.
    pub fn redo(&mut self, playlist: &mut Playlist) -> CommandResult<bool> {
        let Some(mut command) = self.redo_stack.try_pop() else {
            return Ok(false);
        };

        if let Err(e) = command.redo(playlist) {
            self.redo_stack.push(command);
            return Err(e);
        }

        info!("Redo: {}", command.description());
        self.undo_stack.push(command);
        self.executed_count.update(|count| count + 1);
        Ok(true)
    }

    /// Clear all command history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.executed_count.set(0);
    }

    /// Check if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        self.can_undo.get()
    }

    /// Check if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        self.can_redo.get()
    }

    /// Running number of applied actions
    pub fn executed_count(&self) -> i64 {
        self.executed_count.get()
    }

    pub fn can_undo_state(&self) -> &ObservableValue<bool> {
        &self.can_undo
    }

    pub fn can_redo_state(&self) -> &ObservableValue<bool> {
        &self.can_redo
    }

    pub fn executed_count_state(&self) -> &ObservableValue<i64> {
        &self.executed_count
    }

    /// Get a description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.peek().ok().map(|cmd| cmd.description())
    }

    /// Get a description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.peek().ok().map(|cmd| cmd.description())
    }

    /// Get the number of commands in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of commands in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_history(&self) -> usize {
        self.undo_stack.max_size()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::trait_def::CommandLifecycle;
    use crate::media::MediaItem;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // Mock command appending one item; counts releases
    struct MockCommand {
        item: MediaItem,
        releases: Arc<AtomicUsize>,
        fail_revert: bool,
        refuse_reapply: Arc<AtomicBool>,
        lifecycle: CommandLifecycle,
    }

    impl MockCommand {
        fn new(path: &str) -> Self {
            Self {
                item: MediaItem::new(path),
                releases: Arc::new(AtomicUsize::new(0)),
                fail_revert: false,
                refuse_reapply: Arc::new(AtomicBool::new(false)),
                lifecycle: CommandLifecycle::default(),
            }
        }

        fn executed(path: &str, playlist: &mut Playlist) -> Box<Self> {
            let mut cmd = Box::new(Self::new(path));
            cmd.execute(playlist).unwrap();
            cmd
        }
    }

    impl UndoableCommand for MockCommand {
        fn lifecycle(&self) -> &CommandLifecycle {
            &self.lifecycle
        }

        fn lifecycle_mut(&mut self) -> &mut CommandLifecycle {
            &mut self.lifecycle
        }

        fn apply(&mut self, playlist: &mut Playlist) -> CommandResult<bool> {
            Ok(!playlist.add(vec![self.item.clone()]).is_empty())
        }

        fn revert(&mut self, playlist: &mut Playlist) -> CommandResult<()> {
            if self.fail_revert {
                return Err(CommandError::InvalidState("revert refused".into()));
            }
            playlist.remove(Some(&self.item));
            Ok(())
        }

        fn reapply(&mut self, playlist: &mut Playlist) -> CommandResult<()> {
            if self.refuse_reapply.load(Ordering::SeqCst) {
                return Err(CommandError::InvalidState("reapply refused".into()));
            }
            self.apply(playlist).map(|_| ())
        }

        fn description(&self) -> String {
            format!("Add {}", self.item.display_name())
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn names(playlist: &Playlist) -> Vec<String> {
        playlist.iter().map(|item| item.display_name()).collect()
    }

    #[test]
    fn test_push_requires_executed_command() {
        let mut manager = HistoryManager::new();
        let result = manager.push(Box::new(MockCommand::new("a.mp3")));

        assert_eq!(result, Err(CommandError::NotExecuted));
        assert!(!manager.can_undo());
        assert_eq!(manager.executed_count(), 0);
    }

    #[test]
    fn test_push_undo_redo() {
        let mut manager = HistoryManager::new();
        let mut playlist = Playlist::new();

        manager.push(MockCommand::executed("a.mp3", &mut playlist)).unwrap();
        assert!(manager.can_undo());
        assert!(!manager.can_redo());
        assert_eq!(manager.executed_count(), 1);
        assert_eq!(manager.undo_description().as_deref(), Some("Add a"));

        assert!(manager.undo(&mut playlist).unwrap());
        assert!(playlist.is_empty());
        assert!(!manager.can_undo());
        assert!(manager.can_redo());
        assert_eq!(manager.executed_count(), 0);
        assert_eq!(manager.redo_description().as_deref(), Some("Add a"));

        assert!(manager.redo(&mut playlist).unwrap());
        assert_eq!(names(&playlist), vec!["a"]);
        assert_eq!(manager.undo_count(), 1);
        assert_eq!(manager.redo_count(), 0);
        assert_eq!(manager.executed_count(), 1);
    }

    #[test]
    fn test_undo_redo_with_empty_stacks_are_noops() {
        let mut manager = HistoryManager::new();
        let mut playlist = Playlist::new();

        assert!(!manager.undo(&mut playlist).unwrap());
        assert!(!manager.redo(&mut playlist).unwrap());
        assert_eq!(manager.executed_count(), 0);
    }

    #[test]
    fn test_redo_stack_cleared_on_new_command() {
        let mut manager = HistoryManager::new();
        let mut playlist = Playlist::new();

        manager.push(MockCommand::executed("a.mp3", &mut playlist)).unwrap();
        manager.undo(&mut playlist).unwrap();
        manager.push(MockCommand::executed("b.mp3", &mut playlist)).unwrap();

        assert!(!manager.can_redo());
        assert!(!manager.redo(&mut playlist).unwrap());
        assert_eq!(names(&playlist), vec!["b"]);
    }

    #[test]
    fn test_history_limit_releases_evicted() {
        let mut manager = HistoryManager::with_capacity(3);
        let mut playlist = Playlist::new();
        let mut releases = Vec::new();

        for i in 0..4 {
            let cmd = MockCommand::executed(&format!("{}.mp3", i), &mut playlist);
            releases.push(cmd.releases.clone());
            manager.push(cmd).unwrap();
        }

        assert_eq!(manager.undo_count(), 3);
        assert_eq!(manager.executed_count(), 4);
        assert_eq!(releases[0].load(Ordering::SeqCst), 1);
        assert!(releases[1..].iter().all(|r| r.load(Ordering::SeqCst) == 0));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut manager = HistoryManager::new();
        let mut playlist = Playlist::new();
        let first = MockCommand::executed("a.mp3", &mut playlist);
        let released = first.releases.clone();
        manager.push(first).unwrap();
        manager.push(MockCommand::executed("b.mp3", &mut playlist)).unwrap();
        manager.undo(&mut playlist).unwrap();

        manager.clear();

        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
        assert_eq!(manager.executed_count(), 0);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_undo_keeps_command() {
        let mut manager = HistoryManager::new();
        let mut playlist = Playlist::new();
        let mut cmd = MockCommand::executed("a.mp3", &mut playlist);
        cmd.fail_revert = true;
        manager.push(cmd).unwrap();

        assert!(manager.undo(&mut playlist).is_err());
        assert_eq!(manager.undo_count(), 1);
        assert!(manager.can_undo());
        assert_eq!(manager.executed_count(), 1);
    }

    #[test]
    fn test_failed_redo_keeps_command() {
        let mut manager = HistoryManager::new();
        let mut playlist = Playlist::new();
        let cmd = MockCommand::executed("a.mp3", &mut playlist);
        let refuse = cmd.refuse_reapply.clone();
        manager.push(cmd).unwrap();
        manager.undo(&mut playlist).unwrap();

        refuse.store(true, Ordering::SeqCst);
        assert!(manager.redo(&mut playlist).is_err());
        assert_eq!(manager.redo_count(), 1);
        assert_eq!(manager.undo_count(), 0);
        assert!(manager.can_redo());
        assert!(playlist.is_empty());
        assert_eq!(manager.executed_count(), 0);

        refuse.store(false, Ordering::SeqCst);
        assert!(manager.redo(&mut playlist).unwrap());
        assert_eq!(names(&playlist), vec!["a"]);
        assert_eq!(manager.executed_count(), 1);
    }

    #[test]
    fn test_executed_count_stream() {
        let mut manager = HistoryManager::new();
        let mut playlist = Playlist::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = manager
            .executed_count_state()
            .subscribe(move |count| sink.lock().unwrap().push(*count));

        manager.push(MockCommand::executed("a.mp3", &mut playlist)).unwrap();
        manager.undo(&mut playlist).unwrap();
        manager.redo(&mut playlist).unwrap();
        manager.clear();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_can_undo_stream_follows_stack() {
        let mut manager = HistoryManager::new();
        let mut playlist = Playlist::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = manager.can_undo_state().subscribe(move |can| sink.lock().unwrap().push(*can));

        manager.push(MockCommand::executed("a.mp3", &mut playlist)).unwrap();
        manager.push(MockCommand::executed("b.mp3", &mut playlist)).unwrap();
        manager.undo(&mut playlist).unwrap();
        manager.undo(&mut playlist).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![false, true, false]);
    }
}
