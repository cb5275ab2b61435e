//! Settings (read-only, layered from file and environment) and the small
//! `state.toml` record that remembers the library folder between runs.

mod load;
mod schema;
mod state;

pub use load::{config_dir, default_config_path, resolve_config_path};
pub use schema::*;
pub use state::{LibraryState, resolve_state_path};
