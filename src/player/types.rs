//! Small value types passed between track widgets and the floating player.

use std::time::Duration;

/// Display metadata of a track. `src` is the identity of the track on the page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackInfo {
    pub src: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub image: Option<String>,
    /// Pre-rendered length shown before playback starts.
    pub duration: Option<Duration>,
}

impl TrackInfo {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Whether this track can be played at all.
    pub fn is_playable(&self) -> bool {
        !self.src.trim().is_empty()
    }
}

/// Lifecycle notification broadcast by the floating player.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle {
    /// A track was loaded into the floating player.
    Loaded(TrackInfo),
    /// The floating player was closed and holds no track anymore.
    Closed,
}

/// Seek/autoplay requested by a `load` that has to wait for the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingStart {
    pub start_time: f64,
    pub autoplay: bool,
}

/// Readiness of the floating player's current source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Readiness {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Source assigned, waiting for the media runtime to report it can play.
    Loading { pending: PendingStart },
    /// The source can play; requests apply immediately.
    Ready,
}
