//! Display slots of the pre-rendered widgets.
//!
//! The player core never builds layout; it only writes text, flags and
//! highlight state into these structs after each state change. `ui` draws
//! whatever is in them.

use rand::Rng;

use crate::player::{Placement, TrackInfo, format_time};

pub const UNKNOWN_TRACK: &str = "Unknown Track";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// One bar of the decorative waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformBar {
    /// Relative height in `0.15..=1.0`.
    pub height: f32,
    pub active: bool,
}

/// Generate `count` bars, tallest around the center, with random jitter.
pub fn generate_bars<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<WaveformBar> {
    let center = count as f32 / 2.0;
    (1..=count)
        .map(|i| {
            let distance = (i as f32 - center).abs() / center;
            let base = 0.3 + 0.7 * (1.0 - distance * 0.5);
            let jitter = rng.random_range(30..=100) as f32 / 100.0;
            WaveformBar {
                height: (base * jitter).clamp(0.15, 1.0),
                active: false,
            }
        })
        .collect()
}

/// Whether bar `index` of `count` lies before `progress` percent.
pub fn bar_is_active(index: usize, count: usize, progress: f64) -> bool {
    count > 0 && (index as f64 / count as f64) * 100.0 < progress
}

/// Mark every bar before `progress` percent as active.
pub fn highlight(bars: &mut [WaveformBar], progress: f64) {
    let count = bars.len();
    for (i, bar) in bars.iter_mut().enumerate() {
        bar.active = bar_is_active(i, count, progress);
    }
}

/// Slots of an inline track widget.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMarkup {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub image: Option<String>,
    /// Shown until playback has started.
    pub duration_label: String,
    pub time_label: String,
    /// Starts from the beginning during this session; hidden while `None`.
    pub plays: Option<u32>,
    pub bars: Vec<WaveformBar>,
    pub playing: bool,
    pub detached: bool,
    /// Whether the detach hook is rendered.
    pub detachable: bool,
}

impl TrackMarkup {
    pub fn new(info: &TrackInfo, bars: Vec<WaveformBar>, detachable: bool) -> Self {
        let duration_label = info
            .duration
            .map(|d| format_time(d.as_secs_f64()))
            .unwrap_or_else(|| format_time(0.0));
        Self {
            title: info.title.clone(),
            artist: info.artist.clone(),
            image: info.image.clone(),
            time_label: duration_label.clone(),
            duration_label,
            plays: None,
            bars,
            playing: false,
            detached: false,
            detachable,
        }
    }
}

/// Slots of the floating mini-player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMarkup {
    pub visible: bool,
    pub title: String,
    pub artist: String,
    pub image: Option<String>,
    pub current_label: String,
    pub duration_label: String,
    /// Width of the progress bar fill, in percent.
    pub progress_fill: f64,
    pub playing: bool,
    pub placement: Placement,
    pub draggable: bool,
}

impl Default for PlayerMarkup {
    fn default() -> Self {
        Self {
            visible: false,
            title: UNKNOWN_TRACK.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            image: None,
            current_label: format_time(0.0),
            duration_label: format_time(0.0),
            progress_fill: 0.0,
            playing: false,
            placement: Placement::Docked,
            draggable: false,
        }
    }
}
