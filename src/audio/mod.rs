/// Audio processing module for decoding WAV files and estimating their pitch.
///
/// This module provides functionality to:
/// - Read and validate PCM WAV files
/// - Decode and normalize samples for display
/// - Compute the frequency domain and the fundamental frequency
/// - Run that analysis in the background and poll for it
mod analysis;
mod normalize;
mod task;
mod types;
mod wav;

pub use analysis::{
    bin_to_hz, compute_frequency_domain, fundamental_bin, raw_window, SpectralAnalyzer,
};
pub use normalize::{normalize_samples, scale_divisor, SampleNormalizer, ABSENT_SAMPLE_VALUE};
pub use task::{AnalysisTask, Readiness, MAX_POLL_WAIT};
pub use types::{
    AnalysisConfig, AudioError, BitDepth, ComplexBin, ExecutionMode, FundamentalFrequencyResult,
    WavHeader, MAX_WINDOW_SIZE,
};
pub use wav::WavFile;
