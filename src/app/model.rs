//! The page: track widgets, the floating player and the selection cursor.

use rand::Rng;
use tracing::{debug, info};

use crate::config::Settings;
use crate::markup::generate_bars;
use crate::media::{MediaFactory, MediaRegistry};
use crate::player::{FloatingHandle, FloatingPlayer, Point, Size, TrackInfo, TrackWidget};

/// A user intent, resolved from a key press or a click on an action hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Toggle(usize),
    /// Seek track `i` to a fraction (0..=1) of its duration.
    Seek(usize, f64),
    /// Seek track `i` relative to its current progress, as a fraction.
    SeekBy(usize, f64),
    Detach(usize),
    FloatingToggle,
    FloatingSeek(f64),
    Close,
}

pub struct Page {
    registry: MediaRegistry,
    factory: Box<dyn MediaFactory>,
    floating: Option<FloatingHandle>,
    widgets: Vec<TrackWidget>,
    pub selected: usize,
    pub current_dir: Option<String>,
    draggable: bool,
    floating_size: Size,
    seek_step: f64,
}

impl Page {
    /// Mount one widget per track. The floating player is mounted first when
    /// enabled, so every widget gets it injected.
    pub fn new<R: Rng + ?Sized>(
        tracks: Vec<TrackInfo>,
        factory: Box<dyn MediaFactory>,
        settings: &Settings,
        rng: &mut R,
    ) -> Self {
        let mut page = Self {
            registry: MediaRegistry::new(),
            factory,
            floating: None,
            widgets: Vec::with_capacity(tracks.len()),
            selected: 0,
            current_dir: None,
            draggable: settings.floating.draggable,
            floating_size: Size::new(
                i32::from(settings.floating.width),
                i32::from(settings.floating.height),
            ),
            seek_step: f64::from(settings.controls.seek_step_percent) / 100.0,
        };
        if settings.floating.enabled {
            page.mount_floating();
        }

        for info in tracks {
            let media = info
                .is_playable()
                .then(|| page.factory.create(Some(&info.src)));
            let bars = generate_bars(settings.tracks.waveform_bars, rng);
            let widget = TrackWidget::new(
                info,
                media,
                &page.registry,
                page.floating.as_ref(),
                bars,
                settings.tracks.detachable,
            );
            page.widgets.push(widget);
        }
        debug!(tracks = page.widgets.len(), "page mounted");
        page
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn widgets(&self) -> &[TrackWidget] {
        &self.widgets
    }

    pub fn widget(&self, index: usize) -> Option<&TrackWidget> {
        self.widgets.get(index)
    }

    pub fn floating(&self) -> Option<&FloatingHandle> {
        self.floating.as_ref()
    }

    pub fn floating_size(&self) -> Size {
        self.floating_size
    }

    pub fn registry(&self) -> &MediaRegistry {
        &self.registry
    }

    /// Seek step of `h` / `l`, as a fraction of the duration.
    pub fn seek_step(&self) -> f64 {
        self.seek_step
    }

    pub fn has_tracks(&self) -> bool {
        !self.widgets.is_empty()
    }

    /// Mount the floating player and connect every widget to it. Does nothing
    /// when one is already mounted.
    pub fn mount_floating(&mut self) {
        if self.floating.is_some() {
            return;
        }
        let handle =
            FloatingPlayer::mount(&self.registry, self.factory.create(None), self.draggable);
        for widget in &mut self.widgets {
            widget.connect(&handle);
        }
        self.floating = Some(handle);
        info!("floating player mounted");
        self.refresh();
    }

    /// Close and drop the floating player; widgets fall back to local playback.
    pub fn unmount_floating(&mut self) {
        let Some(handle) = self.floating.take() else {
            return;
        };
        handle.borrow_mut().close();
        drop(handle);
        info!("floating player unmounted");
        self.refresh();
    }

    /// Move the selection down, wrapping to the top.
    pub fn next(&mut self) {
        if self.widgets.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.widgets.len();
    }

    /// Move the selection up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.widgets.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.widgets.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn set_selected(&mut self, index: usize) {
        if index < self.widgets.len() {
            self.selected = index;
        }
    }

    /// Run `action` and refresh every display slot.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Toggle(i) => {
                if let Some(w) = self.widgets.get_mut(i) {
                    w.toggle();
                }
            }
            Action::Seek(i, fraction) => {
                if let Some(w) = self.widgets.get_mut(i) {
                    w.seek(fraction);
                }
            }
            Action::SeekBy(i, delta) => {
                if let Some(w) = self.widgets.get_mut(i) {
                    let state = w.effective_state();
                    if state.has_duration() {
                        w.seek((state.progress / 100.0 + delta).clamp(0.0, 1.0));
                    }
                }
            }
            Action::Detach(i) => {
                if let Some(w) = self.widgets.get_mut(i) {
                    w.detach();
                }
            }
            Action::FloatingToggle => {
                if let Some(f) = &self.floating {
                    f.borrow_mut().toggle();
                }
            }
            Action::FloatingSeek(fraction) => {
                if let Some(f) = &self.floating {
                    f.borrow_mut().seek(fraction);
                }
            }
            Action::Close => {
                if let Some(f) = &self.floating {
                    f.borrow_mut().close();
                }
            }
        }
        self.refresh();
    }

    /// Pointer pressed on the floating player drawn at `origin`.
    pub fn drag_start(&mut self, pointer: Point, origin: Point, on_button: bool) -> bool {
        self.floating
            .as_ref()
            .is_some_and(|f| f.borrow_mut().pointer_down(pointer, origin, on_button))
    }

    pub fn drag_move(&mut self, pointer: Point, viewport: Size) -> Option<Point> {
        let size = self.floating_size;
        self.floating
            .as_ref()
            .and_then(|f| f.borrow_mut().pointer_move(pointer, viewport, size))
    }

    pub fn drag_end(&mut self) {
        if let Some(f) = &self.floating {
            f.borrow_mut().pointer_up();
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.floating
            .as_ref()
            .is_some_and(|f| f.borrow().is_dragging())
    }

    /// Drain the media events of the floating player and every widget.
    pub fn pump(&mut self) {
        if let Some(f) = &self.floating {
            f.borrow_mut().pump();
        }
        for widget in &mut self.widgets {
            widget.pump();
        }
        self.refresh();
    }

    /// Rewrite every display slot from the current state.
    ///
    /// Widgets show the floating player's state while detached, so any change
    /// to it has to reach all of them.
    pub fn refresh(&mut self) {
        if let Some(f) = &self.floating {
            f.borrow_mut().update_display();
        }
        for widget in &mut self.widgets {
            widget.update_display();
        }
    }
}
