use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// A decoder plus output device that can only "play from offset".
///
/// Rendering happens on the device's own thread. Callers observe it only
/// through `is_busy` and `elapsed`, which are best-effort and may lag the
/// audible output slightly; nothing here pushes notifications back.
pub trait PlaybackEngine {
    /// Open `path` for playback and return its duration.
    ///
    /// On failure whatever was playing before keeps playing. On success the
    /// previous track is stopped and the elapsed clock is reset.
    fn load(&mut self, path: &Path) -> Result<Duration>;

    /// Start output of the loaded track at `start`, restarting the elapsed
    /// clock from zero.
    fn play(&mut self, start: Duration) -> Result<()>;

    /// Suspend output; `elapsed` stops advancing.
    fn pause(&mut self);

    /// Continue after `pause` without touching the elapsed clock.
    fn resume(&mut self);

    /// Halt output and drop the decoded stream. The track stays loaded.
    fn stop(&mut self);

    /// True while audio is actually being rendered.
    fn is_busy(&self) -> bool;

    /// Audio rendered since the last `play`, excluding paused time.
    ///
    /// `None` is the end sentinel: the stream ran out on its own.
    fn elapsed(&self) -> Option<Duration>;

    /// Output gain in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);
}

impl<E: PlaybackEngine + ?Sized> PlaybackEngine for Box<E> {
    fn load(&mut self, path: &Path) -> Result<Duration> {
        (**self).load(path)
    }

    fn play(&mut self, start: Duration) -> Result<()> {
        (**self).play(start)
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }

    fn elapsed(&self) -> Option<Duration> {
        (**self).elapsed()
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }
}
