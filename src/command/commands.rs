// Concrete playlist commands

use crate::collection::Playlist;
use crate::command::trait_def::{CommandLifecycle, CommandResult, UndoableCommand};
use crate::media::{ItemKey, MediaItem, sort_by_display_name};

/// Command adding items to the playlist
///
/// Items are ordered by display name (natural ordering) before insertion.
/// With `overwrite` the playlist is replaced; otherwise the items are
/// appended, skipping those already present.
///
/// Undo removes exactly the items this command appended, or restores the
/// previous contents when it replaced them.
pub struct AddItemsCommand {
    items: Vec<MediaItem>,
    overwrite: bool,
    previous: Option<Vec<MediaItem>>,
    added: Vec<ItemKey>,
    lifecycle: CommandLifecycle,
}

impl AddItemsCommand {
    /// Create a new AddItemsCommand
    ///
    /// # Arguments
    /// * `items` - Items to add, in any order
    /// * `overwrite` - Replace the playlist instead of appending
    pub fn new(items: Vec<MediaItem>, overwrite: bool) -> Self {
        let mut items = items;
        sort_by_display_name(&mut items);
        Self {
            items,
            overwrite,
            previous: None,
            added: Vec::new(),
            lifecycle: CommandLifecycle::default(),
        }
    }

    /// Items in insertion order
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

impl UndoableCommand for AddItemsCommand {
    fn lifecycle(&self) -> &CommandLifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut CommandLifecycle {
        &mut self.lifecycle
    }

    fn apply(&mut self, playlist: &mut Playlist) -> CommandResult<bool> {
        if self.items.is_empty() {
            return Ok(false);
        }

        if self.overwrite {
            self.previous = Some(playlist.snapshot());
            playlist.set(self.items.clone());
            return Ok(true);
        }

        self.added = playlist
            .add(self.items.clone())
            .iter()
            .map(|item| item.key().clone())
            .collect();
        Ok(!self.added.is_empty())
    }

    fn revert(&mut self, playlist: &mut Playlist) -> CommandResult<()> {
        if let Some(previous) = &self.previous {
            playlist.set(previous.clone());
            return Ok(());
        }

        for key in self.added.iter().rev() {
            if let Some(item) = playlist.find(key).cloned() {
                playlist.remove(Some(&item));
            }
        }
        Ok(())
    }

    fn description(&self) -> String {
        let noun = if self.items.len() == 1 { "item" } else { "items" };
        if self.overwrite {
            format!("Replace playlist with {} {}", self.items.len(), noun)
        } else {
            format!("Add {} {}", self.items.len(), noun)
        }
    }
}

/// Command removing one item, or everything
///
/// Undo restores the previous contents, so removed items come back at their
/// original positions.
pub struct RemoveItemCommand {
    item: Option<MediaItem>,
    remove_all: bool,
    previous: Option<Vec<MediaItem>>,
    lifecycle: CommandLifecycle,
}

impl RemoveItemCommand {
    /// Create a new RemoveItemCommand
    ///
    /// # Arguments
    /// * `item` - Item to remove (ignored when `remove_all` is set)
    /// * `remove_all` - Clear the whole playlist
    pub fn new(item: Option<MediaItem>, remove_all: bool) -> Self {
        Self {
            item,
            remove_all,
            previous: None,
            lifecycle: CommandLifecycle::default(),
        }
    }

    /// Command removing a single item
    pub fn item(item: MediaItem) -> Self {
        Self::new(Some(item), false)
    }

    /// Command clearing the playlist
    pub fn all() -> Self {
        Self::new(None, true)
    }
}

impl UndoableCommand for RemoveItemCommand {
    fn lifecycle(&self) -> &CommandLifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut CommandLifecycle {
        &mut self.lifecycle
    }

    fn apply(&mut self, playlist: &mut Playlist) -> CommandResult<bool> {
        let snapshot = playlist.snapshot();

        if self.remove_all {
            playlist.remove_all();
            // Clearing an empty playlist still publishes a Reset, but there is
            // nothing worth undoing.
            let changed = !snapshot.is_empty();
            self.previous = Some(snapshot);
            return Ok(changed);
        }

        if playlist.remove(self.item.as_ref()) {
            self.previous = Some(snapshot);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn revert(&mut self, playlist: &mut Playlist) -> CommandResult<()> {
        if let Some(previous) = &self.previous {
            playlist.set(previous.clone());
        }
        Ok(())
    }

    fn description(&self) -> String {
        match (&self.item, self.remove_all) {
            (_, true) => "Remove all items".to_string(),
            (Some(item), false) => format!("Remove {}", item.display_name()),
            (None, false) => "Remove nothing".to_string(),
        }
    }
}
