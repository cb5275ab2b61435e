use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};

use crate::config::SpectrumSettings;
use crate::error::{PlayerError, Result};

/// Added to every magnitude so silence maps to a finite dB value.
pub const DB_EPSILON: f32 = 1e-10;

/// One analyzed frame: `frame_size / 2` bins of clamped dB values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectrumFrame {
    pub bins: Vec<f32>,
}

impl SpectrumFrame {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Average neighbouring bins down to at most `bands` values.
    pub fn downsample(&self, bands: usize) -> Vec<f32> {
        if bands == 0 || self.bins.is_empty() {
            return Vec::new();
        }
        let per_band = self.bins.len().div_ceil(bands);
        self.bins
            .chunks(per_band)
            .map(|c| c.iter().sum::<f32>() / c.len() as f32)
            .collect()
    }
}

/// Frame → magnitude spectrum in dB, clamped to a display range.
///
/// Holds only the FFT plan, never data from earlier frames: the same input
/// always produces the same output, and `process` is safe to call from any
/// thread.
#[derive(Clone)]
pub struct SpectrumPipeline {
    fft: Arc<dyn RealToComplex<f32>>,
    frame_size: usize,
    floor_db: f32,
    ceiling_db: f32,
}

impl SpectrumPipeline {
    /// A pipeline for `frame_size` samples clamped to 0..=100 dB.
    pub fn new(frame_size: usize) -> Self {
        Self::with_range(frame_size, 0.0, 100.0)
    }

    pub fn with_range(frame_size: usize, floor_db: f32, ceiling_db: f32) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        Self {
            fft: planner.plan_fft_forward(frame_size),
            frame_size,
            floor_db,
            ceiling_db,
        }
    }

    pub fn from_settings(settings: &SpectrumSettings) -> Self {
        Self::with_range(settings.frame_size, settings.floor_db, settings.ceiling_db)
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of bins in every output frame. The upper half of a real
    /// signal's spectrum mirrors the lower half, so it is dropped.
    pub fn bin_count(&self) -> usize {
        self.frame_size / 2
    }

    pub fn process(&self, frame: &[i16]) -> Result<SpectrumFrame> {
        let size_error = || PlayerError::FrameSize {
            expected: self.frame_size,
            actual: frame.len(),
        };
        if frame.len() != self.frame_size {
            return Err(size_error());
        }

        let mut input: Vec<f32> = frame.iter().map(|&s| f32::from(s)).collect();
        let mut output = self.fft.make_output_vec();
        self.fft
            .process(&mut input, &mut output)
            .map_err(|_| size_error())?;

        let bins = output[..self.bin_count()]
            .iter()
            .map(|c| (20.0 * (c.norm() + DB_EPSILON).log10()).clamp(self.floor_db, self.ceiling_db))
            .collect();

        Ok(SpectrumFrame { bins })
    }
}
