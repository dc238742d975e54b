//! Player core: inline track widgets, the floating mini-player and the
//! state they share.
//!
//! A [`TrackWidget`] plays through its own handle until it is detached. From
//! then on the [`FloatingPlayer`] owns playback and the widget mirrors the
//! floating player's state, until the floating player is closed or loads a
//! different track.

mod drag;
mod floating;
mod state;
mod track;
mod types;

pub use drag::*;
pub use floating::*;
pub use state::*;
pub use track::*;
pub use types::*;

#[cfg(test)]
mod tests;
