//! The playback handle abstraction consumed from the media runtime.

/// Notifications raised by a playback handle.
///
/// Handles queue these internally; the owner drains them with
/// [`MediaHandle::poll_events`] once per event-loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    TimeUpdate,
    Ended,
    LoadedMetadata,
    CanPlay,
}

/// How much of the current source the handle knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    Empty,
    Metadata,
    CanPlay,
}

impl ReadyState {
    pub fn is_ready(self) -> bool {
        self == ReadyState::CanPlay
    }
}

/// A single-stream audio object: source, timing and transport controls.
pub trait MediaHandle {
    fn src(&self) -> Option<&str>;
    /// Assign a new source. Takes effect on the next [`MediaHandle::load`].
    fn set_src(&mut self, src: &str);
    /// (Re)load the current source, resetting position and readiness.
    fn load(&mut self);

    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// Length of the source in seconds, `None` while unknown.
    fn duration(&self) -> Option<f64>;

    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    fn ready_state(&self) -> ReadyState;
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}

/// Creates playback handles for widgets and the floating player.
pub trait MediaFactory {
    /// A handle preloading `src`, or an empty one when `src` is `None`.
    fn create(&self, src: Option<&str>) -> Box<dyn MediaHandle>;
}
