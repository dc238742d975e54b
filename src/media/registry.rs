//! Page-wide bookkeeping of every playback handle.
//!
//! Each handle lives in a [`Deck`] together with the [`PlaybackState`] its
//! owner shows. The registry only keeps weak references, so widgets and the
//! floating player can be dropped independently of each other.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::player::PlaybackState;

use super::handle::MediaHandle;

pub type DeckId = u64;
pub type SharedDeck = Rc<RefCell<Deck>>;

/// A playback handle and the transport state derived from it.
pub struct Deck {
    id: DeckId,
    pub media: Box<dyn MediaHandle>,
    pub state: PlaybackState,
}

impl Deck {
    pub fn id(&self) -> DeckId {
        self.id
    }

    /// Start the handle and flag it as playing.
    pub fn start(&mut self) {
        self.media.play();
        self.state.playing = true;
    }

    /// Pause the handle and clear the playing flag; position is kept.
    pub fn halt(&mut self) {
        self.media.pause();
        self.state.playing = false;
    }

    /// Stop at zero after the source ended, moving the handle's clock back too.
    pub fn rewind(&mut self) {
        self.media.set_current_time(0.0);
        self.state.rewind();
    }

    /// Copy position and duration from the handle into `state`.
    pub fn sync_from_media(&mut self) {
        let (current, duration) = (self.media.current_time(), self.media.duration());
        self.state.sync_time(current, duration);
    }
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deck")
            .field("id", &self.id)
            .field("src", &self.media.src())
            .field("state", &self.state)
            .finish()
    }
}

#[derive(Default)]
struct RegistryInner {
    next_id: Cell<DeckId>,
    decks: RefCell<Vec<Weak<RefCell<Deck>>>>,
}

/// Cheaply clonable handle to the page's set of decks.
#[derive(Clone, Default)]
pub struct MediaRegistry {
    inner: Rc<RegistryInner>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `media` in a new deck and track it.
    pub fn register(&self, media: Box<dyn MediaHandle>) -> SharedDeck {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let deck = Rc::new(RefCell::new(Deck {
            id,
            media,
            state: PlaybackState::default(),
        }));
        self.inner.decks.borrow_mut().push(Rc::downgrade(&deck));
        deck
    }

    fn live(&self) -> Vec<SharedDeck> {
        let mut decks = self.inner.decks.borrow_mut();
        decks.retain(|d| d.strong_count() > 0);
        decks.iter().filter_map(Weak::upgrade).collect()
    }

    /// Pause every deck except `keep`.
    ///
    /// A deck that is currently borrowed belongs to the caller and is skipped.
    pub fn pause_all_except(&self, keep: DeckId) {
        for deck in self.live() {
            let Ok(mut deck) = deck.try_borrow_mut() else {
                continue;
            };
            if deck.id != keep && (deck.state.playing || !deck.media.is_paused()) {
                deck.halt();
            }
        }
    }
}

#[cfg(test)]
impl MediaRegistry {
    /// Number of decks whose state says they are playing.
    pub fn playing_count(&self) -> usize {
        self.live()
            .iter()
            .filter(|d| d.try_borrow().is_ok_and(|d| d.state.playing))
            .count()
    }

    /// Number of decks still alive.
    pub fn len(&self) -> usize {
        self.live().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
