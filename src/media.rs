//! Media runtime: playback handles, the page-wide deck registry and the
//! rodio-backed implementation used by the terminal player.

mod handle;
mod registry;
mod rodio_handle;
mod sink;

pub use handle::*;
pub use registry::*;
pub use rodio_handle::RodioFactory;

#[cfg(test)]
pub(crate) mod fake;
