//! Live input capture delivered as fixed-size frames of `i16` samples.
//!
//! The device pushes samples from its own callback thread into a bounded
//! `SampleQueue`; a reader blocks on the queue until a whole frame is there.
//! When the reader falls behind, the oldest samples are dropped and the next
//! read reports `CaptureOverflow` once, which callers treat as "no frame
//! this time".

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

use crate::error::{PlayerError, Result};

/// Anything that can hand out capture frames, blocking until one is ready.
pub trait FrameSource: Send {
    /// The next frame, `Err(CaptureOverflow)` if samples were lost since the
    /// last call, or `Ok(None)` once the source is closed for good.
    fn next_frame(&mut self) -> Result<Option<Vec<i16>>>;
}

#[derive(Debug, Default)]
struct QueueInner {
    samples: VecDeque<i16>,
    overflowed: bool,
    closed: bool,
}

/// Bounded hand-off between a capture callback and a frame reader.
#[derive(Debug)]
pub struct SampleQueue {
    inner: Mutex<QueueInner>,
    ready: Condvar,
    frame_size: usize,
    capacity: usize,
}

impl SampleQueue {
    /// Room for `capacity_frames` whole frames before samples are dropped.
    pub fn new(frame_size: usize, capacity_frames: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner::default()),
            ready: Condvar::new(),
            frame_size,
            capacity: frame_size * capacity_frames.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        // A panicking producer leaves plain sample data behind; keep going.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, samples: &[i16]) {
        let mut q = self.lock();
        if q.closed {
            return;
        }
        q.samples.extend(samples.iter().copied());
        if q.samples.len() > self.capacity {
            let excess = q.samples.len() - self.capacity;
            q.samples.drain(..excess);
            q.overflowed = true;
        }
        if q.samples.len() >= self.frame_size || q.overflowed {
            self.ready.notify_one();
        }
    }

    /// Block until a frame, an overflow, or close.
    pub fn read_frame(&self) -> Result<Option<Vec<i16>>> {
        let mut q = self.lock();
        while !q.closed && !q.overflowed && q.samples.len() < self.frame_size {
            q = self.ready.wait(q).unwrap_or_else(|e| e.into_inner());
        }
        if q.overflowed {
            // Whatever is left is stale; start the next frame fresh.
            q.overflowed = false;
            q.samples.clear();
            return Err(PlayerError::CaptureOverflow);
        }
        if q.samples.len() < self.frame_size {
            return Ok(None);
        }
        Ok(Some(q.samples.drain(..self.frame_size).collect()))
    }

    /// Wake any reader and refuse further samples.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// The reading end of a `SampleQueue`, movable to a worker thread.
#[derive(Debug, Clone)]
pub struct QueueReader {
    queue: Arc<SampleQueue>,
}

impl QueueReader {
    pub fn new(queue: Arc<SampleQueue>) -> Self {
        Self { queue }
    }
}

impl FrameSource for QueueReader {
    fn next_frame(&mut self) -> Result<Option<Vec<i16>>> {
        self.queue.read_frame()
    }
}

/// The default input device, mixed down to mono `i16`.
pub struct AudioCapture {
    _stream: Stream,
    queue: Arc<SampleQueue>,
    sample_rate: u32,
}

impl AudioCapture {
    /// Open and start the default input device.
    pub fn open(frame_size: usize) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| PlayerError::DeviceUnavailable("no input device".to_string()))?;

        if let Ok(name) = device.name() {
            log::info!("capturing from {name}");
        }

        let supported = device
            .default_input_config()
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?;
        let format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let queue = Arc::new(SampleQueue::new(frame_size, 8));

        let stream = match format {
            SampleFormat::I16 => build_stream::<i16>(&device, &config, queue.clone()),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, queue.clone()),
            SampleFormat::F32 => build_stream::<f32>(&device, &config, queue.clone()),
            other => Err(PlayerError::DeviceUnavailable(format!(
                "unsupported sample format {other:?}"
            ))),
        }?;
        stream
            .play()
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            queue,
            sample_rate: config.sample_rate.0,
        })
    }

    pub fn reader(&self) -> QueueReader {
        QueueReader::new(self.queue.clone())
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Unblock readers; the device keeps running until dropped.
    pub fn close(&self) {
        self.queue.close();
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.queue.close();
    }
}

fn build_stream<T>(device: &Device, config: &StreamConfig, queue: Arc<SampleQueue>) -> Result<Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let channels = usize::from(config.channels).max(1);
    let err_queue = queue.clone();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mono: Vec<i16> = data.chunks(channels).map(downmix).collect();
                queue.push(&mono);
            },
            move |err| {
                log::warn!("capture stream error: {err}");
                err_queue.close();
            },
            None,
        )
        .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))
}

/// Average one interleaved frame into a single `i16` sample.
pub(crate) fn downmix<T>(frame: &[T]) -> i16
where
    T: Sample,
    i16: FromSample<T>,
{
    if frame.is_empty() {
        return 0;
    }
    let sum: i32 = frame.iter().map(|&s| i32::from(i16::from_sample(s))).sum();
    (sum / frame.len() as i32) as i16
}
