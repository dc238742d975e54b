use std::path::{Path, PathBuf};

/// Sidecar image stems, in order of preference.
const COVER_STEMS: &[&str] = &["cover", "folder", "front", "album", "artwork"];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Find a sidecar cover image next to `audio_path`.
///
/// Matching is case-insensitive, so `Folder.JPG` is found as well.
pub fn find_cover(audio_path: &Path) -> Option<PathBuf> {
    let parent = audio_path.parent()?;
    let entries = std::fs::read_dir(parent).ok()?;

    let mut best: Option<(usize, PathBuf)> = None;
    for path in entries.filter_map(Result::ok).map(|e| e.path()) {
        if !path.is_file() {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase);
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase);

        if let (Some(stem), Some(ext)) = (stem, ext)
            && IMAGE_EXTENSIONS.contains(&ext.as_str())
            && let Some(rank) = COVER_STEMS.iter().position(|s| *s == stem)
            && best.as_ref().is_none_or(|(r, _)| rank < *r)
        {
            best = Some((rank, path));
        }
    }
    best.map(|(_, p)| p)
}
