//! Music directory scanning.
//!
//! Produces the [`TrackInfo`](crate::player::TrackInfo) list the page mounts
//! one widget per entry for.

mod cover;
mod scan;

pub use cover::find_cover;
pub use scan::scan;
