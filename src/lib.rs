// playlist_core - Library exports for the player, tests and benchmarks

pub mod collection;
pub mod command;
pub mod config;
pub mod media;
pub mod observable;
pub mod persistence;
pub mod playback;
pub mod session;

// Re-export commonly used types for convenience
pub use collection::{
    ChangeEvent, ChangeKind, InsertHook, ItemCollection, Keyed, Playlist, PlaylistEvent,
};
pub use command::{
    CommandDispatcher, CommandError, CommandKind, CommandParams, CommandResult, HistoryManager,
    UndoRedoHistory, UndoableCommand,
};
pub use config::SessionConfig;
pub use media::{ItemKey, MediaItem, MetadataLoader, SymphoniaMetadataLoader};
pub use observable::{ObservableValue, Subscription};
pub use persistence::{PersistenceError, PlaylistDocument, PlaylistStore};
pub use playback::PlaybackQueue;
pub use session::PlaylistSession;
