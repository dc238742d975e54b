use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::player::TrackInfo;

use super::cover::find_cover;

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read one audio file into a [`TrackInfo`].
///
/// The title falls back to the file stem; unreadable tags leave artist and
/// duration unknown.
pub(super) fn read_track(path: &Path) -> TrackInfo {
    let mut track = TrackInfo::new(path.to_string_lossy());
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string);

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let duration = tagged.properties().duration();
            if !duration.is_zero() {
                track = track.with_duration(duration);
            }
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(t) = non_empty(tag.title().as_deref()) {
                    title = Some(t);
                }
                if let Some(artist) = non_empty(tag.artist().as_deref()) {
                    track = track.with_artist(artist);
                }
            }
        }
        Err(err) => debug!(path = %path.display(), %err, "no readable tags"),
    }

    if let Some(title) = title {
        track = track.with_title(title);
    }
    track.image = find_cover(path).map(|p| p.to_string_lossy().into_owned());
    track
}

/// Scan `dir` for audio files, sorted case-insensitively by artist and title.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<TrackInfo> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut tracks: Vec<TrackInfo> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && is_audio_file(e.path(), settings))
        .map(|e| read_track(e.path()))
        .collect();

    tracks.sort_by_cached_key(sort_key);
    debug!(dir = %dir.display(), count = tracks.len(), "library scanned");
    tracks
}

fn sort_key(track: &TrackInfo) -> String {
    let title = track.title.as_deref().unwrap_or(&track.src);
    match track.artist.as_deref() {
        Some(artist) => format!("{artist} - {title}").to_lowercase(),
        None => title.to_lowercase(),
    }
}
