// Integration test for playlist persistence
// Saves a session to disk and restores it into a fresh one

use futures::executor::block_on;
use playlist_core::media::MetadataError;
use playlist_core::{
    MediaItem, MetadataLoader, PlaylistDocument, PlaylistSession, PlaylistStore, SessionConfig,
};
use std::path::Path;
use tempfile::TempDir;

/// Loader that derives an artist from the parent folder name
struct FolderArtistLoader;

impl MetadataLoader for FolderArtistLoader {
    async fn load(&self, path: &Path) -> Result<MediaItem, MetadataError> {
        let artist = path
            .parent()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| MetadataError::Unsupported(path.display().to_string()))?;
        Ok(MediaItem::new(path).with_artist(artist))
    }
}

fn library(dir: &TempDir) {
    for (folder, file) in [
        ("Artist A", "01 Intro.mp3"),
        ("Artist A", "02 Song.flac"),
        ("Artist B", "Track 10.ogg"),
        ("Artist B", "Track 9.ogg"),
        ("Artist B", "cover.jpg"),
    ] {
        let folder = dir.path().join("music").join(folder);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(file), b"").unwrap();
    }
}

fn config(dir: &TempDir) -> SessionConfig {
    SessionConfig {
        playlist_path: dir.path().join("state").join("playlist.json"),
        ..Default::default()
    }
}

#[test]
fn test_session_round_trip() {
    let dir = TempDir::new().unwrap();
    library(&dir);

    let mut session = PlaylistSession::new(config(&dir));
    assert!(
        block_on(session.add_paths_with(&[dir.path().join("music")], FolderArtistLoader)).unwrap()
    );
    assert_eq!(session.playlist().len(), 4);

    session.queue().set_shuffle(true);
    session.queue().set_repeat(true);
    session.queue().set_current(2);
    let order = session.queue().shuffled_indices();
    session.save().unwrap();

    let mut restored = PlaylistSession::new(config(&dir));
    assert!(block_on(restored.load(FolderArtistLoader)).unwrap());

    let names: Vec<String> = restored.playlist().iter().map(|item| item.display_name()).collect();
    assert_eq!(names, vec!["01 Intro", "02 Song", "Track 9", "Track 10"]);
    assert!(restored.playlist().iter().all(|item| item.artist.is_some()));
    assert_eq!(restored.queue().shuffled_indices(), order);
    assert_eq!(restored.queue().current_index(), Some(2));
    assert!(restored.queue().shuffle());
    assert!(restored.queue().repeat());
    assert!(!restored.history().can_undo());
}

#[test]
fn test_saved_document_shape() {
    let dir = TempDir::new().unwrap();
    library(&dir);

    let mut session = PlaylistSession::new(config(&dir));
    session
        .add_paths(&[dir.path().join("music").join("Artist A")])
        .unwrap();
    session.save().unwrap();

    let json = std::fs::read_to_string(&session.config().playlist_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["Items"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["CurrentItem"], -1);
    assert_eq!(value["ShuffledItems"], serde_json::json!([0, 1]));

    let doc: PlaylistDocument = serde_json::from_str(&json).unwrap();
    assert!(doc.items[0].ends_with("01 Intro.mp3"));
}

#[test]
fn test_load_drops_files_deleted_since_save() {
    let dir = TempDir::new().unwrap();
    library(&dir);
    let music = dir.path().join("music");

    let mut session = PlaylistSession::new(config(&dir));
    session.add_paths(&[music.join("Artist B")]).unwrap();
    session.queue().set_current(1);
    session.save().unwrap();

    std::fs::remove_file(music.join("Artist B").join("Track 9.ogg")).unwrap();

    let store = PlaylistStore::new(&session.config().playlist_path);
    let mut restored = PlaylistSession::new(config(&dir));
    assert!(block_on(restored.load(FolderArtistLoader)).unwrap());

    assert_eq!(restored.playlist().len(), 1);
    assert_eq!(restored.queue().current_index(), Some(0));
    assert_eq!(store.read().unwrap().map(|doc| doc.items.len()), Some(2));
}
