// Playlist document - on-disk JSON shape of a saved playlist

use serde::{Deserialize, Serialize};

/// Value of `CurrentItem` when nothing is selected
pub const NO_CURRENT_ITEM: i32 = -1;

/// Saved playlist
///
/// ```json
/// {
///   "Items": ["/music/a.mp3", "/music/b.flac"],
///   "ShuffledItems": [1, 0],
///   "CurrentItem": 0,
///   "ShuffleMode": false,
///   "RepeatMode": true
/// }
/// ```
///
/// `ShuffledItems` and `CurrentItem` are indices into `Items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaylistDocument {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub shuffled_items: Vec<usize>,
    #[serde(default = "no_current_item")]
    pub current_item: i32,
    #[serde(default)]
    pub shuffle_mode: bool,
    #[serde(default)]
    pub repeat_mode: bool,
}

fn no_current_item() -> i32 {
    NO_CURRENT_ITEM
}

impl Default for PlaylistDocument {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            shuffled_items: Vec::new(),
            current_item: NO_CURRENT_ITEM,
            shuffle_mode: false,
            repeat_mode: false,
        }
    }
}

impl PlaylistDocument {
    /// `CurrentItem` as an index, if it names one
    pub fn current_index(&self) -> Option<usize> {
        usize::try_from(self.current_item).ok().filter(|&index| index < self.items.len())
    }

    pub fn set_current_index(&mut self, index: Option<usize>) {
        self.current_item = index.and_then(|i| i32::try_from(i).ok()).unwrap_or(NO_CURRENT_ITEM);
    }
}
