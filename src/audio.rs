//! Audio output: the `PlaybackEngine` seam and its implementations.
//!
//! The session only ever talks to `PlaybackEngine`; `RodioEngine` is the real
//! device, `UnavailableEngine` is what runs when there is no device.

mod clock;
mod engine;
mod rodio_engine;
mod sink;
mod unavailable;

#[cfg(test)]
pub(crate) mod scripted;

pub use clock::PlayClock;
pub use engine::PlaybackEngine;
pub use rodio_engine::RodioEngine;
pub use unavailable::UnavailableEngine;
