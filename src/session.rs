// PlaylistSession - owns the playlist and everything wired around it

use crate::collection::{InsertHook, Playlist, PlaylistEvent};
use crate::command::{CommandDispatcher, CommandParams, CommandResult, HistoryManager};
use crate::config::SessionConfig;
use crate::media::{MediaItem, MetadataHook, MetadataLoader, discover};
use crate::observable::Subscription;
use crate::persistence::{PersistenceError, PlaylistStore};
use crate::playback::PlaybackQueue;
use log::info;
use std::path::Path;

/// A playlist together with its undo history, command dispatcher and
/// playback queue
///
/// All user-triggered mutations go through [`dispatch`](Self::dispatch) (or
/// the shorthands built on it), so they are recorded for undo. The queue is
/// attached on construction and follows every change.
pub struct PlaylistSession {
    playlist: Playlist,
    history: HistoryManager,
    dispatcher: CommandDispatcher,
    queue: PlaybackQueue,
    config: SessionConfig,
}

impl PlaylistSession {
    pub fn new(config: SessionConfig) -> Self {
        let playlist = Playlist::new();
        let mut queue = PlaybackQueue::new();
        queue.attach(&playlist);

        Self {
            playlist,
            history: HistoryManager::with_capacity(config.history_depth),
            dispatcher: CommandDispatcher::with_default_handlers(),
            queue,
            config,
        }
    }

    /// Run a command and record it for undo
    pub fn dispatch(&mut self, params: CommandParams) -> CommandResult<bool> {
        self.dispatcher.dispatch(params, &mut self.playlist, Some(&mut self.history))
    }

    /// Add items, or replace the playlist with them when `overwrite` is set
    pub fn add_items(&mut self, items: Vec<MediaItem>, overwrite: bool) -> CommandResult<bool> {
        self.dispatch(CommandParams::AddItems { items, overwrite })
    }

    pub fn remove_item(&mut self, item: MediaItem) -> CommandResult<bool> {
        self.dispatch(CommandParams::remove(item))
    }

    pub fn remove_all(&mut self) -> CommandResult<bool> {
        self.dispatch(CommandParams::remove_all())
    }

    pub fn undo(&mut self) -> CommandResult<bool> {
        self.history.undo(&mut self.playlist)
    }

    pub fn redo(&mut self) -> CommandResult<bool> {
        self.history.redo(&mut self.playlist)
    }

    /// Expand dropped files and folders and add the supported media found
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> CommandResult<bool> {
        let items = discover(paths, &self.config.supported_extensions);
        self.add_items(items, false)
    }

    /// Like [`add_paths`](Self::add_paths), resolving metadata through `loader`
    /// before the add command runs
    pub async fn add_paths_with<P, L>(&mut self, paths: &[P], loader: L) -> CommandResult<bool>
    where
        P: AsRef<Path>,
        L: MetadataLoader,
    {
        let hook = MetadataHook::new(loader);
        let mut items = Vec::new();
        for item in discover(paths, &self.config.supported_extensions) {
            items.push(hook.prepare(item).await);
        }
        self.add_items(items, false)
    }

    /// Observe playlist changes; see [`Playlist::subscribe`]
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&PlaylistEvent) + Send + 'static,
    {
        self.playlist.subscribe(observer)
    }

    /// Restore the saved playlist
    ///
    /// Loading is not an undoable action: the history is cleared afterwards.
    pub async fn load<L: MetadataLoader>(&mut self, loader: L) -> Result<bool, PersistenceError> {
        let store = self.store();
        let loaded = store.load(&mut self.playlist, &self.queue, loader).await?;
        if loaded {
            self.history.clear();
        }
        Ok(loaded)
    }

    /// Save the playlist and queue state
    pub fn save(&self) -> Result<(), PersistenceError> {
        self.store().save(&self.playlist, &self.queue)
    }

    fn store(&self) -> PlaylistStore {
        PlaylistStore::new(&self.config.playlist_path)
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Register additional command handlers
    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher {
        &mut self.dispatcher
    }

    /// One-line summary for logs
    pub fn log_state(&self) {
        info!(
            "Playlist: {} items, undo: {}, redo: {}, executed: {}",
            self.playlist.len(),
            self.history.undo_description().unwrap_or_else(|| "-".to_string()),
            self.history.redo_description().unwrap_or_else(|| "-".to_string()),
            self.history.executed_count()
        );
    }
}

impl Default for PlaylistSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
