// Media items and the helpers that produce them
//
// - item: MediaItem and its case-insensitive ItemKey
// - ordering: natural ordering by display name
// - discovery: expand dropped files/folders into items
// - metadata: tag probing and the metadata insert hook

pub mod discovery;
pub mod item;
pub mod metadata;
pub mod ordering;

pub use discovery::{DEFAULT_EXTENSIONS, default_extensions, discover, is_supported};
pub use item::{ItemKey, MediaItem};
pub use metadata::{MetadataError, MetadataHook, MetadataLoader, SymphoniaMetadataLoader};
pub use ordering::{natural_cmp, sort_by_display_name};
