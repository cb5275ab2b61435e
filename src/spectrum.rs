pub mod capture;
pub mod pipeline;
pub mod worker;

pub use capture::{AudioCapture, FrameSource, QueueReader, SampleQueue};
pub use pipeline::{SpectrumFrame, SpectrumPipeline};
pub use worker::SpectrumWorker;

#[cfg(test)]
mod tests;
