//! Configuration loader and schema types.
//!
//! Settings cover the floating player, the track widgets, key bindings that
//! take a parameter and library scanning.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
