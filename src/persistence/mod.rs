// Playlist persistence
//
// The playlist is saved as a small JSON document listing item paths plus the
// playback queue state. Item metadata is not stored; it is probed again when
// the playlist is loaded.

pub mod document;
pub mod store;

pub use document::{NO_CURRENT_ITEM, PlaylistDocument};
pub use store::{PersistenceError, PlaylistStore};
