// UndoableCommand trait definition

use crate::collection::Playlist;
use crate::command::dispatcher::CommandKind;

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors that can occur while executing or replaying commands
///
/// All of these are precondition failures detected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// `execute` was called on a command that already ran
    #[error("Command has already been executed")]
    AlreadyExecuted,

    /// `undo`/`redo` before a successful `execute`, or pushing such a command
    #[error("Command has not been executed")]
    NotExecuted,

    /// Strict access to an empty history stack
    #[error("History is empty")]
    EmptyHistory,

    /// The dispatcher has no handler for this kind of command
    #[error("No handler registered for {0} commands")]
    HandlerNotFound(CommandKind),

    /// Invalid state for this operation
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Execution state of a single command instance
///
/// ```text
/// Created --execute--> Executed (can_undo)
/// Executed --undo--> Undone (can_redo)
/// Undone --redo--> Executed (can_undo)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandLifecycle {
    executed: bool,
    can_undo: bool,
    can_redo: bool,
}

impl CommandLifecycle {
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn can_undo(&self) -> bool {
        self.can_undo
    }

    pub fn can_redo(&self) -> bool {
        self.can_redo
    }

    fn ensure_not_executed(&self) -> CommandResult<()> {
        if self.executed {
            return Err(CommandError::AlreadyExecuted);
        }
        Ok(())
    }

    fn ensure_executed(&self) -> CommandResult<()> {
        if !self.executed {
            return Err(CommandError::NotExecuted);
        }
        Ok(())
    }

    fn mark_executed(&mut self) {
        self.executed = true;
        self.can_undo = true;
        self.can_redo = false;
    }

    fn mark_undone(&mut self) {
        self.can_undo = false;
        self.can_redo = true;
    }
}

/// Trait for playlist commands that support undo/redo
///
/// Implementors provide the forward (`apply`) and reverse (`revert`) effects
/// and own a [`CommandLifecycle`]; the provided `execute`, `undo` and `redo`
/// enforce the state machine around those hooks.
///
/// # Example
/// ```no_run
/// use playlist_core::collection::Playlist;
/// use playlist_core::command::trait_def::{CommandLifecycle, CommandResult, UndoableCommand};
///
/// struct ClearCommand {
///     previous: Vec<playlist_core::MediaItem>,
///     lifecycle: CommandLifecycle,
/// }
///
/// impl UndoableCommand for ClearCommand {
///     fn lifecycle(&self) -> &CommandLifecycle {
///         &self.lifecycle
///     }
///
///     fn lifecycle_mut(&mut self) -> &mut CommandLifecycle {
///         &mut self.lifecycle
///     }
///
///     fn apply(&mut self, playlist: &mut Playlist) -> CommandResult<bool> {
///         self.previous = playlist.snapshot();
///         playlist.remove_all();
///         Ok(true)
///     }
///
///     fn revert(&mut self, playlist: &mut Playlist) -> CommandResult<()> {
///         playlist.set(self.previous.clone());
///         Ok(())
///     }
///
///     fn description(&self) -> String {
///         "Clear playlist".to_string()
///     }
/// }
/// ```
pub trait UndoableCommand: Send {
    fn lifecycle(&self) -> &CommandLifecycle;

    fn lifecycle_mut(&mut self) -> &mut CommandLifecycle;

    /// Forward effect
    ///
    /// Returns `Ok(false)` when the command had nothing to do; such a command
    /// is not considered executed and is never recorded in history.
    fn apply(&mut self, playlist: &mut Playlist) -> CommandResult<bool>;

    /// Reverse effect, restoring the playlist to its state before `apply`
    fn revert(&mut self, playlist: &mut Playlist) -> CommandResult<()>;

    /// Re-apply the forward effect after an undo
    fn reapply(&mut self, playlist: &mut Playlist) -> CommandResult<()> {
        self.apply(playlist).map(|_| ())
    }

    /// Human-readable description (e.g. "Undo: Remove a.mp3")
    fn description(&self) -> String;

    /// Release resources owned by the command
    ///
    /// Called exactly once when the history evicts or clears this command.
    fn release(&mut self) {}

    fn is_executed(&self) -> bool {
        self.lifecycle().is_executed()
    }

    /// Run the command for the first time
    ///
    /// # Errors
    /// [`CommandError::AlreadyExecuted`] if this instance already ran.
    fn execute(&mut self, playlist: &mut Playlist) -> CommandResult<bool> {
        self.lifecycle().ensure_not_executed()?;
        let applied = self.apply(playlist)?;
        if applied {
            self.lifecycle_mut().mark_executed();
        }
        Ok(applied)
    }

    /// Reverse the command; a no-op when it is already undone
    ///
    /// # Errors
    /// [`CommandError::NotExecuted`] before a successful `execute`.
    fn undo(&mut self, playlist: &mut Playlist) -> CommandResult<()> {
        self.lifecycle().ensure_executed()?;
        if !self.lifecycle().can_undo() {
            return Ok(());
        }
        self.revert(playlist)?;
        self.lifecycle_mut().mark_undone();
        Ok(())
    }

    /// Re-apply the command; a no-op unless it is currently undone
    ///
    /// # Errors
    /// [`CommandError::NotExecuted`] before a successful `execute`.
    fn redo(&mut self, playlist: &mut Playlist) -> CommandResult<()> {
        self.lifecycle().ensure_executed()?;
        if !self.lifecycle().can_redo() {
            return Ok(());
        }
        self.reapply(playlist)?;
        self.lifecycle_mut().mark_executed();
        Ok(())
    }
}
