//! Inline per-track player widget.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::markup::{TrackMarkup, WaveformBar, highlight};
use crate::media::{MediaEvent, MediaHandle, MediaRegistry, SharedDeck};

use super::floating::{FloatingHandle, LifecycleObserver, WeakFloating};
use super::state::{PlaybackState, format_time};
use super::types::{Lifecycle, TrackInfo};

/// The widget's side of the detachment relation.
///
/// A widget is detached exactly when the floating player's loaded source is
/// the widget's own; the flag is recomputed from every broadcast.
#[derive(Debug)]
pub struct DetachLink {
    src: String,
    detached: Cell<bool>,
}

impl DetachLink {
    fn new(src: &str) -> Self {
        Self {
            src: src.to_string(),
            detached: Cell::new(false),
        }
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }
}

impl LifecycleObserver for DetachLink {
    fn notify(&self, event: &Lifecycle) {
        match event {
            Lifecycle::Loaded(track) => self.detached.set(track.src == self.src),
            Lifecycle::Closed => self.detached.set(false),
        }
    }
}

pub struct TrackWidget {
    info: TrackInfo,
    deck: Option<SharedDeck>,
    registry: MediaRegistry,
    floating: WeakFloating,
    link: Rc<DetachLink>,
    detachable: bool,
    markup: TrackMarkup,
}

impl TrackWidget {
    /// Mount a widget for `info`.
    ///
    /// `media` is the widget's own playback handle, absent when the track has
    /// no source. `floating` is the page's floating player, if one is mounted.
    pub fn new(
        info: TrackInfo,
        media: Option<Box<dyn MediaHandle>>,
        registry: &MediaRegistry,
        floating: Option<&FloatingHandle>,
        bars: Vec<WaveformBar>,
        detachable: bool,
    ) -> Self {
        let link = Rc::new(DetachLink::new(&info.src));
        let markup = TrackMarkup::new(&info, bars, detachable);
        let mut widget = Self {
            deck: media.map(|m| registry.register(m)),
            registry: registry.clone(),
            floating: Weak::new(),
            link,
            detachable,
            markup,
            info,
        };
        if let Some(floating) = floating {
            widget.connect(floating);
        }
        widget.update_display();
        widget
    }

    /// Subscribe to `floating` and derive the initial detachment from what it has loaded.
    pub fn connect(&mut self, floating: &FloatingHandle) {
        self.floating = Rc::downgrade(floating);
        let mut player = floating.borrow_mut();
        let link: Weak<dyn LifecycleObserver> = Rc::<DetachLink>::downgrade(&self.link);
        player.subscribe(link);
        self.link
            .detached
            .set(player.src() == Some(self.info.src.as_str()));
    }

    pub fn info(&self) -> &TrackInfo {
        &self.info
    }

    pub fn markup(&self) -> &TrackMarkup {
        &self.markup
    }

    /// Whether the floating player currently controls this track.
    pub fn is_detached(&self) -> bool {
        self.link.is_detached() && self.floating.strong_count() > 0
    }

    /// The widget's own state, as left by its local handle.
    pub fn local_state(&self) -> PlaybackState {
        self.deck
            .as_ref()
            .map(|d| d.borrow().state)
            .unwrap_or_default()
    }

    /// The state the widget displays: the floating player's while detached.
    pub fn effective_state(&self) -> PlaybackState {
        if self.is_detached() {
            if let Some(floating) = self.floating.upgrade() {
                return floating.borrow().state();
            }
        }
        self.local_state()
    }

    pub fn toggle(&mut self) {
        let from_start = {
            let state = self.effective_state();
            !state.playing && state.current_time == 0.0
        };

        if self.is_detached() {
            if let Some(floating) = self.floating.upgrade() {
                let mut player = floating.borrow_mut();
                player.toggle();
                if from_start && player.state().playing {
                    self.count_play();
                }
            }
            self.update_display();
            return;
        }

        let Some(deck) = self.deck.as_ref() else {
            return;
        };
        if deck.borrow().state.playing {
            deck.borrow_mut().halt();
        } else {
            let id = deck.borrow().id();
            self.registry.pause_all_except(id);
            deck.borrow_mut().start();
            if from_start {
                self.count_play();
            }
        }
        self.update_display();
    }

    fn count_play(&mut self) {
        self.markup.plays = Some(self.markup.plays.map_or(1, |n| n.saturating_add(1)));
    }

    /// Jump to `fraction` (0..=1) of the track. Ignored while the duration is unknown.
    pub fn seek(&mut self, fraction: f64) {
        if self.is_detached() {
            if let Some(floating) = self.floating.upgrade() {
                floating.borrow_mut().seek(fraction);
            }
            self.update_display();
            return;
        }

        let Some(deck) = self.deck.as_ref() else {
            return;
        };
        if !fraction.is_finite() {
            return;
        }
        {
            let mut deck = deck.borrow_mut();
            let Some(duration) = deck.media.duration().filter(|d| *d > 0.0) else {
                return;
            };
            deck.media.set_current_time(fraction.clamp(0.0, 1.0) * duration);
            deck.sync_from_media();
        }
        self.update_display();
    }

    /// Hand playback over to the floating player, continuing from the local position.
    pub fn detach(&mut self) {
        if !self.detachable || !self.info.is_playable() {
            debug!(src = %self.info.src, "track cannot be detached");
            return;
        }
        if self.is_detached() {
            // The floating player already owns this track; reloading would
            // rewind it to the stale local position.
            debug!(src = %self.info.src, "track already detached");
            return;
        }
        let Some(floating) = self.floating.upgrade() else {
            warn!(src = %self.info.src, "floating player not mounted; cannot detach track");
            return;
        };

        let (start_time, playing) = match self.deck.as_ref() {
            Some(deck) => {
                let deck = deck.borrow();
                (deck.media.current_time(), deck.state.playing)
            }
            None => (0.0, false),
        };

        floating
            .borrow_mut()
            .load(self.info.clone(), start_time, playing);

        if let Some(deck) = self.deck.as_ref() {
            deck.borrow_mut().halt();
        }
        self.link.detached.set(true);
        self.update_display();
    }

    /// Drain and apply the local handle's notifications.
    ///
    /// While detached, time updates and the end of the local source are ignored.
    pub fn pump(&mut self) {
        let Some(deck) = self.deck.as_ref() else {
            return;
        };
        let events = deck.borrow_mut().media.poll_events();
        let detached = self.is_detached();
        for event in events {
            let mut deck = deck.borrow_mut();
            match event {
                MediaEvent::LoadedMetadata => {
                    let duration = deck.media.duration();
                    deck.state.sync_duration(duration);
                }
                MediaEvent::TimeUpdate if !detached => deck.sync_from_media(),
                MediaEvent::Ended if !detached => deck.rewind(),
                _ => {}
            }
        }
        self.update_display();
    }

    /// Write the effective state into the display slots.
    pub fn update_display(&mut self) {
        let detached = self.is_detached();
        let state = self.effective_state();
        let m = &mut self.markup;

        m.detached = detached;
        m.playing = state.playing;
        highlight(&mut m.bars, state.progress);
        m.time_label = if detached || state.playing || state.current_time > 0.0 {
            format_time(state.current_time)
        } else {
            m.duration_label.clone()
        };
    }
}
