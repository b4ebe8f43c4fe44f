// Observable item collection
//
// The playlist is an ItemCollection<MediaItem>: ordered, deduplicated by a
// case-insensitive path key, and publishing Reset/Add/Remove events to every
// subscriber (playlist view, playback queue, persistence).

pub mod event;
pub mod hook;
pub mod items;

pub use event::{ChangeEvent, ChangeKind};
pub use hook::{InsertHook, PassThrough};
pub use items::{ItemCollection, Keyed};

use crate::media::MediaItem;

/// The collection backing the active playlist
pub type Playlist = ItemCollection<MediaItem>;

/// Change event published by the playlist
pub type PlaylistEvent = ChangeEvent<MediaItem>;
