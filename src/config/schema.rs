use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tether/config.toml` or `~/.config/tether/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TETHER__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub floating: FloatingSettings,
    pub tracks: TrackSettings,
    pub controls: ControlsSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FloatingSettings {
    /// Whether the page mounts a floating player at startup.
    pub enabled: bool,
    /// Whether the floating player can be moved with the mouse.
    pub draggable: bool,
    /// Size of the floating player, in terminal cells.
    pub width: u16,
    pub height: u16,
}

impl Default for FloatingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            draggable: false,
            width: 48,
            height: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackSettings {
    /// Whether track widgets offer the detach control.
    pub detachable: bool,
    /// Number of decorative waveform bars per track.
    pub waveform_bars: usize,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            detachable: true,
            waveform_bars: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Percentage of the track to seek when pressing `h` / `l`.
    pub seek_step_percent: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_step_percent: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}
