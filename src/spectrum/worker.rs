use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::capture::FrameSource;
use super::pipeline::{SpectrumFrame, SpectrumPipeline};

/// Background analysis thread. Frames come out of `frames()`.
///
/// The thread only analyzes while `gate` is set (the session sets it from
/// the engine's busy flag) and sends at most one frame per `interval`.
/// Per-frame failures are logged and skipped; the thread runs until the
/// source closes, `shutdown` is called or the receiver is dropped.
pub struct SpectrumWorker {
    rx: Receiver<SpectrumFrame>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SpectrumWorker {
    pub fn spawn<S>(
        source: S,
        pipeline: SpectrumPipeline,
        gate: Arc<AtomicBool>,
        interval: Duration,
    ) -> std::io::Result<Self>
    where
        S: FrameSource + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::Builder::new()
            .name("spectrum".to_string())
            .spawn(move || run(source, pipeline, tx, flag, gate, interval))?;

        Ok(Self {
            rx,
            running,
            handle: Some(handle),
        })
    }

    pub fn frames(&self) -> &Receiver<SpectrumFrame> {
        &self.rx
    }

    /// Newest frame sent since the last call, if any.
    pub fn latest(&self) -> Option<SpectrumFrame> {
        self.rx.try_iter().last()
    }

    /// Ask the thread to stop. It exits at its next frame; close the source
    /// to wake it sooner.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn join(mut self) {
        self.shutdown();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() {
            log::error!("spectrum thread panicked");
        }
    }
}

impl Drop for SpectrumWorker {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

fn run<S: FrameSource>(
    mut source: S,
    pipeline: SpectrumPipeline,
    tx: Sender<SpectrumFrame>,
    running: Arc<AtomicBool>,
    gate: Arc<AtomicBool>,
    interval: Duration,
) {
    let mut last_sent: Option<Instant> = None;

    while running.load(Ordering::Relaxed) {
        let samples = match source.next_frame() {
            Ok(Some(samples)) => samples,
            Ok(None) => break,
            Err(e) if e.is_transient() => {
                log::debug!("skipping capture frame: {e}");
                continue;
            }
            Err(e) => {
                log::warn!("capture read failed: {e}");
                continue;
            }
        };

        if !gate.load(Ordering::Relaxed) {
            continue;
        }
        if last_sent.is_some_and(|t| t.elapsed() < interval) {
            continue;
        }

        match pipeline.process(&samples) {
            Ok(frame) => {
                if tx.send(frame).is_err() {
                    break;
                }
                last_sent = Some(Instant::now());
            }
            Err(e) => log::debug!("skipping capture frame: {e}"),
        }
    }
    log::debug!("spectrum thread exiting");
}
