//! Playback state shared by inline track widgets and the floating player.

/// Transport and timing state of one playback handle.
///
/// `progress` is always derived from `current_time` and `duration`; callers
/// go through [`PlaybackState::sync_time`] instead of writing it directly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    pub playing: bool,
    /// Percentage in `0.0..=100.0`.
    pub progress: f64,
    /// Seconds, never negative.
    pub current_time: f64,
    /// Seconds; `0.0` while unknown.
    pub duration: f64,
}

impl PlaybackState {
    /// Record a new position and (possibly unknown) duration and recompute `progress`.
    pub fn sync_time(&mut self, current_time: f64, duration: Option<f64>) {
        self.current_time = sanitize_seconds(current_time);
        self.duration = duration.map(sanitize_seconds).unwrap_or(0.0);
        self.progress = progress_of(self.current_time, self.duration);
    }

    /// Update only the duration, keeping the current position.
    pub fn sync_duration(&mut self, duration: Option<f64>) {
        let current = self.current_time;
        self.sync_time(current, duration);
    }

    /// Stopped at zero. The duration survives since the source is unchanged.
    pub fn rewind(&mut self) {
        self.playing = false;
        self.current_time = 0.0;
        self.progress = 0.0;
    }

    pub fn has_duration(&self) -> bool {
        self.duration > 0.0
    }
}

/// `current / duration * 100`, clamped to `0..=100`; zero when the duration is unknown.
pub fn progress_of(current_time: f64, duration: f64) -> f64 {
    if duration > 0.0 && duration.is_finite() {
        (current_time / duration * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn sanitize_seconds(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 { secs } else { 0.0 }
}

/// Format seconds as `M:SS`. Zero, negative and non-finite input render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
