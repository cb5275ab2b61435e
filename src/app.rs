//! Application module: the view state used by the TUI and runtime.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
