// Playlist store for loading and saving the session playlist

use crate::collection::Playlist;
use crate::media::{ItemKey, MediaItem, MetadataHook, MetadataLoader};
use crate::persistence::document::{NO_CURRENT_ITEM, PlaylistDocument};
use crate::playback::PlaybackQueue;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Persistence error types
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid playlist document: {0}")]
    InvalidDocument(String),
}

/// Reads and writes a [`PlaylistDocument`] at a fixed path
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    path: PathBuf,
}

impl PlaylistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Capture the playlist and queue state
    pub fn snapshot(playlist: &Playlist, queue: &PlaybackQueue) -> PlaylistDocument {
        let mut doc = PlaylistDocument {
            items: playlist
                .iter()
                .map(|item| item.path().to_string_lossy().into_owned())
                .collect(),
            shuffled_items: queue.shuffled_indices(),
            current_item: NO_CURRENT_ITEM,
            shuffle_mode: queue.shuffle(),
            repeat_mode: queue.repeat(),
        };
        doc.set_current_index(queue.current_index());
        doc
    }

    /// Write the document, replacing any previous save
    ///
    /// The JSON is written next to the target first and then renamed over it,
    /// so an interrupted save never leaves a truncated playlist behind.
    pub fn write(&self, doc: &PlaylistDocument) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(doc)?;
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, json)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }

    /// Read the saved document; `None` when nothing was saved yet
    pub fn read(&self) -> Result<Option<PlaylistDocument>, PersistenceError> {
        if !self.path.exists() {
            debug!("No saved playlist at {}", self.path.display());
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path)?;
        let doc: PlaylistDocument = serde_json::from_str(&json)?;
        if doc.current_item < NO_CURRENT_ITEM {
            return Err(PersistenceError::InvalidDocument(format!(
                "CurrentItem must be {} or an index, got {}",
                NO_CURRENT_ITEM, doc.current_item
            )));
        }
        Ok(Some(doc))
    }

    /// Save the playlist and queue state
    pub fn save(&self, playlist: &Playlist, queue: &PlaybackQueue) -> Result<(), PersistenceError> {
        let doc = Self::snapshot(playlist, queue);
        self.write(&doc)?;
        info!("Saved {} items to {}", doc.items.len(), self.path.display());
        Ok(())
    }

    /// Restore the saved playlist into `playlist` and `queue`
    ///
    /// Entries whose file no longer exists are skipped with a warning, and
    /// every remaining entry is resolved through `loader` before the playlist
    /// is replaced in one step. Saved indices are remapped onto the surviving
    /// entries; those pointing at skipped entries are dropped.
    ///
    /// Returns false, leaving everything untouched, when nothing was saved.
    pub async fn load<L: MetadataLoader>(
        &self,
        playlist: &mut Playlist,
        queue: &PlaybackQueue,
        loader: L,
    ) -> Result<bool, PersistenceError> {
        let Some(doc) = self.read()? else {
            return Ok(false);
        };

        let (items, remap) = resolve_entries(&doc.items);
        let skipped = doc.items.len() - items.len();

        playlist.set_with(items, &MetadataHook::new(loader)).await;

        let order: Vec<usize> = doc
            .shuffled_items
            .iter()
            .filter_map(|&i| remap.get(i).copied().flatten())
            .collect();
        let current = doc.current_index().and_then(|i| remap.get(i).copied().flatten());
        queue.restore(&order, current, doc.shuffle_mode, doc.repeat_mode);

        info!(
            "Loaded {} items from {} ({} skipped)",
            playlist.len(),
            self.path.display(),
            skipped
        );
        Ok(true)
    }
}

/// Turn saved paths into items, returning the old-index to new-index map
fn resolve_entries(paths: &[String]) -> (Vec<MediaItem>, Vec<Option<usize>>) {
    let mut items = Vec::with_capacity(paths.len());
    let mut remap = Vec::with_capacity(paths.len());
    let mut seen: HashSet<ItemKey> = HashSet::new();

    for raw in paths {
        let path = PathBuf::from(raw);
        if !path.is_file() {
            warn!("Skipping missing playlist entry: {}", raw);
            remap.push(None);
            continue;
        }

        let item = MediaItem::new(path);
        if !seen.insert(item.key().clone()) {
            debug!("Skipping duplicate playlist entry: {}", raw);
            remap.push(None);
            continue;
        }

        remap.push(Some(items.len()));
        items.push(item);
    }

    (items, remap)
}
