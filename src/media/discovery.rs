// Media discovery - expand dropped files and folders into playlist items

use crate::media::item::{ItemKey, MediaItem};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions accepted when no configuration overrides them
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "ogg", "m4a", "aac", "wma"];

/// Check whether a path has one of the given extensions (case-insensitive)
pub fn is_supported(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Expand a set of paths into media items
///
/// Files are kept when their extension is supported. Directories are walked
/// recursively in file-name order. Missing paths are skipped with a warning,
/// and a file reached twice (e.g. dropped alongside its folder) is kept once.
pub fn discover<P: AsRef<Path>>(paths: &[P], extensions: &[String]) -> Vec<MediaItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for path in paths {
        let path = path.as_ref();

        if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                        continue;
                    }
                };

                if entry.file_type().is_file() && is_supported(entry.path(), extensions) {
                    push_unique(&mut items, &mut seen, entry.path());
                }
            }
        } else if path.is_file() {
            if is_supported(path, extensions) {
                push_unique(&mut items, &mut seen, path);
            } else {
                debug!("Ignoring unsupported file {}", path.display());
            }
        } else {
            warn!("Dropped path does not exist: {}", path.display());
        }
    }

    items
}

fn push_unique(items: &mut Vec<MediaItem>, seen: &mut HashSet<ItemKey>, path: &Path) {
    let item = MediaItem::new(path);
    if seen.insert(item.key().clone()) {
        items.push(item);
    }
}

/// Default extension list as owned strings
pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}
