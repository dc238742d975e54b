//! The page-wide floating mini-player.
//!
//! Exactly one `FloatingPlayer` exists per page. It owns the playback handle
//! used for every detached track and tells track widgets about loads and
//! closes through [`LifecycleObserver`] subscriptions.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::markup::{PlayerMarkup, UNKNOWN_ARTIST, UNKNOWN_TRACK};
use crate::media::{DeckId, MediaEvent, MediaHandle, MediaRegistry, SharedDeck};

use super::drag::{DragState, Placement, Point, Size};
use super::state::{PlaybackState, format_time};
use super::types::{Lifecycle, PendingStart, Readiness, TrackInfo};

pub type FloatingHandle = Rc<RefCell<FloatingPlayer>>;
pub type WeakFloating = Weak<RefCell<FloatingPlayer>>;

/// Receives lifecycle broadcasts from the floating player.
pub trait LifecycleObserver {
    fn notify(&self, event: &Lifecycle);
}

pub struct FloatingPlayer {
    deck: SharedDeck,
    registry: MediaRegistry,
    track: Option<TrackInfo>,
    active: bool,
    readiness: Readiness,
    draggable: bool,
    drag: DragState,
    observers: Vec<Weak<dyn LifecycleObserver>>,
    markup: PlayerMarkup,
}

impl FloatingPlayer {
    /// Create the player around an empty playback handle.
    pub fn new(registry: &MediaRegistry, media: Box<dyn MediaHandle>, draggable: bool) -> Self {
        let mut player = Self {
            deck: registry.register(media),
            registry: registry.clone(),
            track: None,
            active: false,
            readiness: Readiness::Idle,
            draggable,
            drag: DragState::default(),
            observers: Vec::new(),
            markup: PlayerMarkup::default(),
        };
        player.update_display();
        player
    }

    /// Create the player behind a shared handle, ready to be injected into widgets.
    pub fn mount(
        registry: &MediaRegistry,
        media: Box<dyn MediaHandle>,
        draggable: bool,
    ) -> FloatingHandle {
        Rc::new(RefCell::new(Self::new(registry, media, draggable)))
    }

    pub fn subscribe(&mut self, observer: Weak<dyn LifecycleObserver>) {
        self.observers.push(observer);
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Source of the loaded track, if any.
    pub fn src(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.src.as_str())
    }

    pub fn track(&self) -> Option<&TrackInfo> {
        self.track.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.deck.borrow().state
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck.borrow().id()
    }

    pub fn markup(&self) -> &PlayerMarkup {
        &self.markup
    }

    pub fn placement(&self) -> Placement {
        self.drag.placement()
    }

    /// Load `track`, superseding whatever was loaded before.
    ///
    /// Seeking to `start_time` (and starting playback when `autoplay`) happens
    /// now if the source can already play, otherwise once it reports ready.
    pub fn load(&mut self, track: TrackInfo, start_time: f64, autoplay: bool) {
        let id = self.deck_id();
        self.registry.pause_all_except(id);

        self.track = Some(track.clone());
        self.active = true;

        let ready = {
            let mut deck = self.deck.borrow_mut();
            if deck.media.src() != Some(track.src.as_str()) {
                deck.media.set_src(&track.src);
                deck.media.load();
                deck.state = PlaybackState::default();
            }
            deck.media.ready_state().is_ready()
        };

        let pending = PendingStart {
            start_time,
            autoplay,
        };
        if ready {
            self.readiness = Readiness::Ready;
            self.apply_start(pending);
        } else {
            self.readiness = Readiness::Loading { pending };
        }
        debug!(src = %track.src, start_time, autoplay, ready, "floating player loaded track");

        self.broadcast(&Lifecycle::Loaded(track));
        self.update_display();
    }

    /// Flip between playing and paused. Ignored when nothing is loaded.
    pub fn toggle(&mut self) {
        if !self.active || self.track.is_none() {
            return;
        }
        let id = self.deck_id();

        if let Readiness::Loading { pending } = &mut self.readiness {
            // Not playable yet: flip the queued intent instead of the handle.
            pending.autoplay = !pending.autoplay;
            let autoplay = pending.autoplay;
            if autoplay {
                self.registry.pause_all_except(id);
            }
            self.deck.borrow_mut().state.playing = autoplay;
        } else if self.deck.borrow().state.playing {
            self.deck.borrow_mut().halt();
        } else {
            self.registry.pause_all_except(id);
            self.deck.borrow_mut().start();
        }
        self.update_display();
    }

    /// Jump to `fraction` (0..=1) of the track. Ignored without a known duration.
    pub fn seek(&mut self, fraction: f64) {
        if !self.active || !fraction.is_finite() {
            return;
        }
        {
            let mut deck = self.deck.borrow_mut();
            let Some(duration) = deck.media.duration().filter(|d| *d > 0.0) else {
                return;
            };
            deck.media.set_current_time(fraction.clamp(0.0, 1.0) * duration);
            deck.sync_from_media();
        }
        self.update_display();
    }

    /// Stop playback, forget the track and return to the docked layout.
    pub fn close(&mut self) {
        {
            let mut deck = self.deck.borrow_mut();
            deck.halt();
            deck.state.rewind();
        }
        self.active = false;
        self.track = None;
        self.readiness = Readiness::Idle;
        self.drag.reset();
        debug!("floating player closed");

        self.broadcast(&Lifecycle::Closed);
        self.update_display();
    }

    /// Drain and apply the playback handle's notifications.
    pub fn pump(&mut self) {
        let events = self.deck.borrow_mut().media.poll_events();
        if events.is_empty() {
            return;
        }
        for event in events {
            self.on_media_event(event);
        }
        self.update_display();
    }

    fn on_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate => {
                if self.active {
                    self.deck.borrow_mut().sync_from_media();
                }
            }
            MediaEvent::LoadedMetadata => {
                let mut deck = self.deck.borrow_mut();
                let duration = deck.media.duration();
                deck.state.sync_duration(duration);
            }
            MediaEvent::CanPlay => {
                if let Readiness::Loading { pending } = self.readiness {
                    self.readiness = Readiness::Ready;
                    self.apply_start(pending);
                }
            }
            MediaEvent::Ended => {
                // The track stays loaded, stopped at zero.
                self.deck.borrow_mut().rewind();
            }
        }
    }

    fn apply_start(&mut self, pending: PendingStart) {
        if pending.autoplay {
            let id = self.deck_id();
            self.registry.pause_all_except(id);
        }
        let mut deck = self.deck.borrow_mut();
        deck.media.set_current_time(pending.start_time);
        deck.sync_from_media();
        if pending.autoplay {
            deck.start();
        }
    }

    fn broadcast(&mut self, event: &Lifecycle) {
        self.observers.retain(|o| o.strong_count() > 0);
        for observer in self.observers.iter().filter_map(Weak::upgrade) {
            observer.notify(event);
        }
    }

    /// Pointer pressed at `pointer` while the player is drawn at `origin`.
    ///
    /// Returns whether a drag started; presses on buttons never start one.
    pub fn pointer_down(&mut self, pointer: Point, origin: Point, on_button: bool) -> bool {
        if !self.draggable || !self.active || on_button {
            return false;
        }
        self.drag.begin(pointer, origin);
        true
    }

    /// Pointer moved; returns the clamped position while dragging.
    pub fn pointer_move(&mut self, pointer: Point, viewport: Size, widget: Size) -> Option<Point> {
        let pos = self.drag.move_to(pointer, viewport, widget)?;
        self.markup.placement = self.drag.placement();
        Some(pos)
    }

    pub fn pointer_up(&mut self) {
        self.drag.end();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Write the current state into the display slots.
    pub fn update_display(&mut self) {
        let state = self.state();
        let m = &mut self.markup;
        m.visible = self.active;
        m.title = self
            .track
            .as_ref()
            .and_then(|t| t.title.clone())
            .unwrap_or_else(|| UNKNOWN_TRACK.to_string());
        m.artist = self
            .track
            .as_ref()
            .and_then(|t| t.artist.clone())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        m.image = self.track.as_ref().and_then(|t| t.image.clone());
        m.current_label = format_time(state.current_time);
        m.duration_label = format_time(state.duration);
        m.progress_fill = state.progress;
        m.playing = state.playing;
        m.placement = self.drag.placement();
        m.draggable = self.draggable;
    }
}

impl Drop for FloatingPlayer {
    fn drop(&mut self) {
        if let Ok(mut deck) = self.deck.try_borrow_mut() {
            deck.halt();
        }
    }
}
