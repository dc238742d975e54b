//! A [`MediaHandle`] that decodes local files and plays them through `rodio`.

use std::path::Path;
use std::time::Duration;

use rodio::Sink;
use rodio::mixer::Mixer;
use tracing::{debug, warn};

use super::handle::{MediaEvent, MediaFactory, MediaHandle, ReadyState};
use super::sink::{create_sink_at, probe_duration};

pub struct RodioMedia {
    mixer: Mixer,
    src: Option<String>,
    sink: Option<Sink>,
    /// Position the current sink started from; `Sink::get_pos` counts from here.
    offset: Duration,
    duration: Option<Duration>,
    ready: ReadyState,
    paused: bool,
    events: Vec<MediaEvent>,
}

impl RodioMedia {
    pub fn new(mixer: Mixer) -> Self {
        Self {
            mixer,
            src: None,
            sink: None,
            offset: Duration::ZERO,
            duration: None,
            ready: ReadyState::Empty,
            paused: true,
            events: Vec::new(),
        }
    }

    fn position(&self) -> Duration {
        let pos = self.offset + self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos);
        match self.duration {
            Some(total) => pos.min(total),
            None => pos,
        }
    }

    /// Replace the current sink with a fresh one starting at `start_at`.
    fn rebuild_at(&mut self, start_at: Duration) {
        let Some(src) = self.src.as_deref() else {
            return;
        };
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        match create_sink_at(&self.mixer, Path::new(src), start_at) {
            Ok((sink, _)) => {
                if !self.paused {
                    sink.play();
                }
                self.sink = Some(sink);
                self.offset = start_at;
            }
            Err(e) => {
                warn!(error = %e, "failed to reopen media source");
                self.ready = ReadyState::Empty;
                self.paused = true;
            }
        }
    }
}

impl MediaHandle for RodioMedia {
    fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn set_src(&mut self, src: &str) {
        self.src = Some(src.to_string());
        self.ready = ReadyState::Empty;
    }

    fn load(&mut self) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.offset = Duration::ZERO;
        self.duration = None;
        self.ready = ReadyState::Empty;
        self.paused = true;

        let Some(src) = self.src.clone() else {
            return;
        };
        let path = Path::new(&src);
        match create_sink_at(&self.mixer, path, Duration::ZERO) {
            Ok((probe, total)) => {
                // Sinks are built on first play or seek, so idle widgets hold no open file.
                probe.stop();
                self.duration = total.or_else(|| probe_duration(path));
                self.ready = ReadyState::CanPlay;
                self.events.push(MediaEvent::LoadedMetadata);
                self.events.push(MediaEvent::CanPlay);
                debug!(src = %src, duration = ?self.duration, "media source ready");
            }
            Err(e) => warn!(error = %e, "media source failed to load"),
        }
    }

    fn current_time(&self) -> f64 {
        self.position().as_secs_f64()
    }

    fn set_current_time(&mut self, seconds: f64) {
        if !self.ready.is_ready() {
            return;
        }
        let mut target = Duration::from_secs_f64(seconds.max(0.0));
        if let Some(total) = self.duration {
            target = target.min(total);
        }
        self.rebuild_at(target);
        self.events.push(MediaEvent::TimeUpdate);
    }

    fn duration(&self) -> Option<f64> {
        self.duration.map(|d| d.as_secs_f64())
    }

    fn play(&mut self) {
        if !self.ready.is_ready() {
            return;
        }
        self.paused = false;
        // A drained sink restarts from the beginning, like an ended media element.
        if self.sink.as_ref().is_none_or(Sink::empty) {
            self.rebuild_at(Duration::ZERO);
        }
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
    }

    fn pause(&mut self) {
        self.paused = true;
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn ready_state(&self) -> ReadyState {
        self.ready
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        if !self.paused {
            let drained = self.sink.as_ref().is_none_or(Sink::empty);
            if drained {
                self.paused = true;
                self.events.push(MediaEvent::Ended);
            } else {
                self.events.push(MediaEvent::TimeUpdate);
            }
        }
        std::mem::take(&mut self.events)
    }
}

/// Builds [`RodioMedia`] handles that all play through one output mixer.
pub struct RodioFactory {
    mixer: Mixer,
}

impl RodioFactory {
    pub fn new(mixer: Mixer) -> Self {
        Self { mixer }
    }
}

impl MediaFactory for RodioFactory {
    fn create(&self, src: Option<&str>) -> Box<dyn MediaHandle> {
        let mut media = RodioMedia::new(self.mixer.clone());
        if let Some(src) = src {
            media.set_src(src);
            media.load();
        }
        Box::new(media)
    }
}
