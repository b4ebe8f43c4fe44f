// CommandDispatcher - routes command parameters to their handler

use crate::collection::Playlist;
use crate::command::commands::{AddItemsCommand, RemoveItemCommand};
use crate::command::manager::HistoryManager;
use crate::command::trait_def::{CommandError, CommandResult, UndoableCommand};
use crate::media::MediaItem;
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// Kind of playlist command, used as the dispatcher's registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddItems,
    RemoveItem,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::AddItems => write!(f, "AddItems"),
            CommandKind::RemoveItem => write!(f, "RemoveItem"),
        }
    }
}

/// Parameters of a user-triggered playlist mutation
#[derive(Debug, Clone)]
pub enum CommandParams {
    AddItems {
        items: Vec<MediaItem>,
        overwrite: bool,
    },
    RemoveItem {
        item: Option<MediaItem>,
        remove_all: bool,
    },
}

impl CommandParams {
    pub fn kind(&self) -> CommandKind {
        match self {
            CommandParams::AddItems { .. } => CommandKind::AddItems,
            CommandParams::RemoveItem { .. } => CommandKind::RemoveItem,
        }
    }

    /// Append items
    pub fn add(items: Vec<MediaItem>) -> Self {
        CommandParams::AddItems {
            items,
            overwrite: false,
        }
    }

    /// Replace the playlist with items
    pub fn replace(items: Vec<MediaItem>) -> Self {
        CommandParams::AddItems {
            items,
            overwrite: true,
        }
    }

    /// Remove a single item
    pub fn remove(item: MediaItem) -> Self {
        CommandParams::RemoveItem {
            item: Some(item),
            remove_all: false,
        }
    }

    /// Clear the playlist
    pub fn remove_all() -> Self {
        CommandParams::RemoveItem {
            item: None,
            remove_all: true,
        }
    }
}

/// Builds commands for one [`CommandKind`]
pub trait CommandHandler: Send {
    fn kind(&self) -> CommandKind;

    /// Turn parameters into a ready-to-execute command
    fn build(&self, params: CommandParams) -> CommandResult<Box<dyn UndoableCommand>>;

    /// Whether executed commands are recorded for undo
    fn records_history(&self) -> bool {
        true
    }
}

fn mismatched(handler: CommandKind, params: &CommandParams) -> CommandError {
    CommandError::InvalidState(format!(
        "{} handler cannot build a {} command",
        handler,
        params.kind()
    ))
}

/// Handler for [`CommandParams::AddItems`]
#[derive(Debug, Default)]
pub struct AddItemsHandler;

impl CommandHandler for AddItemsHandler {
    fn kind(&self) -> CommandKind {
        CommandKind::AddItems
    }

    fn build(&self, params: CommandParams) -> CommandResult<Box<dyn UndoableCommand>> {
        match params {
            CommandParams::AddItems { items, overwrite } => {
                Ok(Box::new(AddItemsCommand::new(items, overwrite)))
            }
            other => Err(mismatched(self.kind(), &other)),
        }
    }
}

/// Handler for [`CommandParams::RemoveItem`]
#[derive(Debug, Default)]
pub struct RemoveItemHandler;

impl CommandHandler for RemoveItemHandler {
    fn kind(&self) -> CommandKind {
        CommandKind::RemoveItem
    }

    fn build(&self, params: CommandParams) -> CommandResult<Box<dyn UndoableCommand>> {
        match params {
            CommandParams::RemoveItem { item, remove_all } => {
                Ok(Box::new(RemoveItemCommand::new(item, remove_all)))
            }
            other => Err(mismatched(self.kind(), &other)),
        }
    }
}

/// Resolves and executes the handler registered for a parameter kind
///
/// The registry is explicit: one handler per [`CommandKind`], registered at
/// construction or through [`CommandDispatcher::register`].
pub struct CommandDispatcher {
    handlers: HashMap<CommandKind, Box<dyn CommandHandler>>,
}

impl CommandDispatcher {
    /// Dispatcher with no handlers
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Dispatcher with the built-in add/remove handlers
    pub fn with_default_handlers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Box::new(AddItemsHandler));
        dispatcher.register(Box::new(RemoveItemHandler));
        dispatcher
    }

    /// Register a handler, returning the one it replaces
    pub fn register(
        &mut self,
        handler: Box<dyn CommandHandler>,
    ) -> Option<Box<dyn CommandHandler>> {
        self.handlers.insert(handler.kind(), handler)
    }

    pub fn is_registered(&self, kind: CommandKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Build and execute the command for `params`
    ///
    /// When a history manager is given and the handler records history, a
    /// command that changed the playlist is pushed onto it.
    ///
    /// Returns whether the playlist was changed.
    ///
    /// # Errors
    /// [`CommandError::HandlerNotFound`] when no handler is registered for the
    /// parameter kind; nothing is mutated in that case.
    pub fn dispatch(
        &self,
        params: CommandParams,
        playlist: &mut Playlist,
        history: Option<&mut HistoryManager>,
    ) -> CommandResult<bool> {
        let kind = params.kind();
        let handler = self.handlers.get(&kind).ok_or(CommandError::HandlerNotFound(kind))?;

        let mut command = handler.build(params)?;
        if !command.execute(playlist)? {
            debug!("{} made no change", command.description());
            return Ok(false);
        }

        debug!("Dispatched: {}", command.description());
        if handler.records_history() {
            if let Some(history) = history {
                history.push(command)?;
            }
        }
        Ok(true)
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::with_default_handlers()
    }
}
