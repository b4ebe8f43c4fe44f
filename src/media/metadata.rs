// Metadata loading - resolve tag metadata for media items
//
// Loading happens when items enter the playlist (drag & drop, file picks,
// restoring a saved playlist). The collection drives it through the
// InsertHook adapter below so that a batch is only committed once every item
// has been resolved.

use crate::collection::InsertHook;
use crate::media::item::MediaItem;
use log::{debug, warn};
use std::fs::File;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey, Tag};
use symphonia::core::probe::Hint;

/// Metadata error types
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported media format: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves a file path into a fully described media item
pub trait MetadataLoader {
    fn load(&self, path: &Path) -> impl Future<Output = Result<MediaItem, MetadataError>>;
}

/// Loader reading container tags and stream parameters with symphonia
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaMetadataLoader;

impl MetadataLoader for SymphoniaMetadataLoader {
    async fn load(&self, path: &Path) -> Result<MediaItem, MetadataError> {
        read_media_item(path)
    }
}

/// Probe a file and build a media item from its tags
pub fn read_media_item(path: &Path) -> Result<MediaItem, MetadataError> {
    if !path.is_file() {
        return Err(MetadataError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let mut probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| MetadataError::Unsupported(format!("{}: {}", path.display(), e)))?;

    let mut item = MediaItem::new(path);

    if let Some(probe_meta) = probed.metadata.get() {
        if let Some(revision) = probe_meta.current() {
            apply_revision(&mut item, revision);
        }
    }

    while !probed.format.metadata().is_latest() {
        let _ = probed.format.metadata().pop();
    }
    if let Some(revision) = probed.format.metadata().current() {
        apply_revision(&mut item, revision);
    }

    if let Some(track) = probed.format.default_track() {
        let params = &track.codec_params;
        if let (Some(frames), Some(rate)) = (params.n_frames, params.sample_rate) {
            if rate > 0 {
                let duration = Duration::from_secs_f64(frames as f64 / rate as f64);
                if duration.as_secs() > 0 {
                    item.bitrate = Some((file_len * 8 / duration.as_secs() / 1000) as u32);
                }
                item.duration = Some(duration);
            }
        }
    }

    debug!("Loaded metadata for {}", path.display());
    Ok(item)
}

fn apply_revision(item: &mut MediaItem, revision: &MetadataRevision) {
    for tag in revision.tags() {
        apply_tag(item, tag);
    }
}

fn apply_tag(item: &mut MediaItem, tag: &Tag) {
    let value = tag.value.to_string();
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    match tag.std_key {
        Some(StandardTagKey::TrackTitle) => set_if_empty(&mut item.title, value),
        Some(StandardTagKey::Artist) => set_if_empty(&mut item.artist, value),
        Some(StandardTagKey::Album) => set_if_empty(&mut item.album, value),
        Some(StandardTagKey::TrackNumber) => {
            if item.track_number.is_none() {
                item.track_number = parse_leading_number(value);
            }
        }
        Some(StandardTagKey::Date)
        | Some(StandardTagKey::ReleaseDate)
        | Some(StandardTagKey::OriginalDate) => {
            if item.year.is_none() {
                item.year = parse_year(value);
            }
        }
        Some(StandardTagKey::Genre) => {
            for genre in split_genres(value) {
                if !item.genres.iter().any(|g| g.eq_ignore_ascii_case(&genre)) {
                    item.genres.push(genre);
                }
            }
        }
        _ => {}
    }
}

fn set_if_empty(target: &mut Option<String>, value: &str) {
    if target.is_none() {
        *target = Some(value.to_string());
    }
}

/// "3/12" -> 3
fn parse_leading_number(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// First run of four digits, so "2004-05-01" and "May 2004" both give 2004
fn parse_year(value: &str) -> Option<u32> {
    let mut run = String::with_capacity(4);
    for c in value.chars() {
        if c.is_ascii_digit() {
            run.push(c);
            if run.len() == 4 {
                return run.parse().ok();
            }
        } else {
            run.clear();
        }
    }
    None
}

fn split_genres(value: &str) -> Vec<String> {
    value
        .split([';', '/', '\0'])
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map(str::to_string)
        .collect()
}

/// Insert hook that resolves metadata for items entering a collection
///
/// Items that already carry metadata pass through untouched. If loading
/// fails the bare item is kept, so a file with unreadable tags can still be
/// queued.
#[derive(Debug, Clone, Default)]
pub struct MetadataHook<L> {
    loader: L,
}

impl<L: MetadataLoader> MetadataHook<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }
}

impl<L: MetadataLoader> InsertHook<MediaItem> for MetadataHook<L> {
    async fn prepare(&self, item: MediaItem) -> MediaItem {
        if item.has_metadata() {
            return item;
        }

        let loaded = self.loader.load(item.path()).await;
        match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Keeping {} without metadata: {}", item.path().display(), e);
                item
            }
        }
    }
}
