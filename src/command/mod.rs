// Command Pattern for Undo/Redo functionality
//
// Every user-triggered playlist mutation goes through an UndoableCommand so
// it can be reversed.
//
// Architecture:
// - UndoableCommand trait: apply()/revert() hooks plus the execute/undo/redo state machine
// - UndoRedoHistory: bounded LIFO stack releasing evicted entries
// - HistoryManager: undo and redo stacks with observable availability
// - CommandDispatcher: maps CommandParams to the handler that builds the command
// - Concrete commands: AddItemsCommand, RemoveItemCommand

pub mod commands;
pub mod dispatcher;
pub mod history;
pub mod manager;
pub mod trait_def;

pub use commands::{AddItemsCommand, RemoveItemCommand};
pub use dispatcher::{
    AddItemsHandler, CommandDispatcher, CommandHandler, CommandKind, CommandParams,
    RemoveItemHandler,
};
pub use history::{DEFAULT_MAX_HISTORY, Release, UndoRedoHistory};
pub use manager::{HistoryEntry, HistoryManager};
pub use trait_def::{CommandError, CommandLifecycle, CommandResult, UndoableCommand};
