//! Application module: the page model driven by the TUI and runtime.
//!
//! The `Page` lives in `app::model` and owns every track widget, the media
//! registry and the floating player.

mod model;

pub use model::*;
