// MediaItem - a playable entry identified by its file path

use crate::collection::Keyed;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Case-insensitive identity of a media file
///
/// The path is folded to lowercase on construction, so two keys built from
/// paths differing only in case compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(path: &Path) -> Self {
        Self(path.to_string_lossy().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A media file in the playlist, with whatever tag metadata is known
///
/// Equality and hashing only consider the [`ItemKey`]; descriptive fields
/// never affect identity.
#[derive(Debug, Clone)]
pub struct MediaItem {
    key: ItemKey,
    path: PathBuf,
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub track_number: Option<u32>,
    pub year: Option<u32>,
    /// Average bitrate in kbit/s
    pub bitrate: Option<u32>,
    pub duration: Option<Duration>,
    pub genres: Vec<String>,
}

impl MediaItem {
    /// Create an item with no metadata
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            key: ItemKey::new(&path),
            path,
            title: None,
            album: None,
            artist: None,
            track_number: None,
            year: None,
            bitrate: None,
            duration: None,
            genres: Vec::new(),
        }
    }

    pub fn key(&self) -> &ItemKey {
        &self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without extension, used for ordering
    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Tag title if present, otherwise the display name
    pub fn title_or_name(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.display_name())
    }

    /// Whether any tag metadata has been resolved for this item
    pub fn has_metadata(&self) -> bool {
        self.title.is_some()
            || self.album.is_some()
            || self.artist.is_some()
            || self.track_number.is_some()
            || self.year.is_some()
            || self.duration.is_some()
            || !self.genres.is_empty()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl PartialEq for MediaItem {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for MediaItem {}

impl Hash for MediaItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Keyed for MediaItem {
    type Key = ItemKey;

    fn key(&self) -> &ItemKey {
        &self.key
    }
}
