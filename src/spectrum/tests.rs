use super::*;
use crate::error::PlayerError;
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

const N: usize = 1024;

fn sine(bin: usize, amplitude: f32) -> Vec<i16> {
    (0..N)
        .map(|n| (amplitude * (2.0 * PI * bin as f32 * n as f32 / N as f32).sin()).round() as i16)
        .collect()
}

fn noise() -> Vec<i16> {
    let mut x: u32 = 12345;
    (0..N)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (x >> 16) as u16 as i16
        })
        .collect()
}

#[test]
fn output_has_half_the_frame_size_in_bins() {
    let pipeline = SpectrumPipeline::new(N);
    assert_eq!(pipeline.bin_count(), N / 2);
    assert_eq!(pipeline.process(&noise()).unwrap().len(), N / 2);
}

#[test]
fn values_stay_inside_display_range() {
    let pipeline = SpectrumPipeline::new(N);
    for frame in [noise(), sine(7, 32_000.0), vec![i16::MIN; N], vec![i16::MAX; N]] {
        let out = pipeline.process(&frame).unwrap();
        assert!(out.bins.iter().all(|v| (0.0..=100.0).contains(v)), "{out:?}");
    }
}

#[test]
fn silence_sits_on_the_floor() {
    let out = SpectrumPipeline::new(N).process(&vec![0; N]).unwrap();
    assert!(out.bins.iter().all(|&v| v == 0.0));

    let narrow = SpectrumPipeline::with_range(8, 10.0, 20.0);
    assert_eq!(narrow.process(&[0; 8]).unwrap().bins, vec![10.0; 4]);
}

#[test]
fn pure_tone_peaks_at_its_bin() {
    let out = SpectrumPipeline::new(N).process(&sine(32, 100.0)).unwrap();
    let (peak, value) = out
        .bins
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap();
    assert_eq!(peak, 32);
    assert!(*value > 80.0, "{value}");
}

#[test]
fn processing_is_pure() {
    let pipeline = SpectrumPipeline::new(N);
    let a = noise();
    let first = pipeline.process(&a).unwrap();
    pipeline.process(&sine(3, 5_000.0)).unwrap();
    assert_eq!(pipeline.process(&a).unwrap(), first);
    assert_eq!(pipeline.clone().process(&a).unwrap(), first);
}

#[test]
fn wrong_frame_length_is_rejected() {
    let err = SpectrumPipeline::new(N).process(&[0; 100]).unwrap_err();
    assert!(matches!(
        err,
        PlayerError::FrameSize {
            expected: N,
            actual: 100
        }
    ));
    assert!(err.is_transient());
}

#[test]
fn downsample_averages_neighbours() {
    let frame = SpectrumFrame {
        bins: vec![0.0, 10.0, 20.0, 30.0, 40.0],
    };
    assert_eq!(frame.downsample(3), vec![5.0, 25.0, 40.0]);
    assert_eq!(frame.downsample(10).len(), 5);
    assert!(frame.downsample(0).is_empty());
}

#[test]
fn queue_hands_out_whole_frames() {
    let queue = SampleQueue::new(4, 4);
    queue.push(&[1, 2, 3]);
    queue.push(&[4, 5, 6, 7, 8, 9]);
    assert_eq!(queue.read_frame().unwrap(), Some(vec![1, 2, 3, 4]));
    assert_eq!(queue.read_frame().unwrap(), Some(vec![5, 6, 7, 8]));

    queue.close();
    assert_eq!(queue.read_frame().unwrap(), None);
    assert!(queue.is_closed());
}

#[test]
fn overflow_is_reported_once_then_capture_continues() {
    let queue = SampleQueue::new(4, 2);
    queue.push(&[0; 12]);
    assert!(matches!(queue.read_frame(), Err(PlayerError::CaptureOverflow)));

    queue.push(&[1, 2, 3, 4]);
    assert_eq!(queue.read_frame().unwrap(), Some(vec![1, 2, 3, 4]));
}

#[test]
fn blocked_reader_wakes_on_push_and_close() {
    let queue = Arc::new(SampleQueue::new(2, 4));
    let mut reader = QueueReader::new(queue.clone());
    let handle = thread::spawn(move || {
        let first = reader.next_frame().unwrap();
        let second = reader.next_frame().unwrap();
        (first, second)
    });

    thread::sleep(Duration::from_millis(20));
    queue.push(&[7, 8]);
    thread::sleep(Duration::from_millis(20));
    queue.close();

    let (first, second) = handle.join().unwrap();
    assert_eq!(first, Some(vec![7, 8]));
    assert_eq!(second, None);
}

#[test]
fn downmix_averages_channels() {
    assert_eq!(capture::downmix(&[100i16, 300]), 200);
    assert_eq!(capture::downmix(&[32_768u16, 32_768]), 0);
    assert_eq!(capture::downmix::<i16>(&[]), 0);
}

struct ScriptedSource(VecDeque<crate::error::Result<Option<Vec<i16>>>>);

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> crate::error::Result<Option<Vec<i16>>> {
        self.0.pop_front().unwrap_or(Ok(None))
    }
}

fn bumpy_source() -> ScriptedSource {
    ScriptedSource(VecDeque::from([
        Ok(Some(vec![0; 8])),
        Err(PlayerError::CaptureOverflow),
        Ok(Some(vec![0; 3])),
        Err(PlayerError::DeviceUnavailable("glitch".into())),
        Ok(Some(vec![1; 8])),
    ]))
}

#[test]
fn worker_skips_bad_frames_and_keeps_going() {
    let worker = SpectrumWorker::spawn(
        bumpy_source(),
        SpectrumPipeline::new(8),
        Arc::new(AtomicBool::new(true)),
        Duration::ZERO,
    )
    .unwrap();

    let frames: Vec<SpectrumFrame> = worker.frames().iter().collect();
    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|f| f.len() == 4));
    worker.join();
}

#[test]
fn worker_is_silent_while_gate_is_closed() {
    let worker = SpectrumWorker::spawn(
        bumpy_source(),
        SpectrumPipeline::new(8),
        Arc::new(AtomicBool::new(false)),
        Duration::ZERO,
    )
    .unwrap();

    assert_eq!(worker.frames().iter().count(), 0);
    worker.join();
}
