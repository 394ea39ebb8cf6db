use super::types::{AnalysisConfig, ComplexBin, FundamentalFrequencyResult};
use super::wav::WavFile;
use rustfft::{num_complex::Complex, FftPlanner};
use std::time::Instant;
use tracing::info;

/// Computes the frequency-domain representation of a sample window and
/// estimates its fundamental frequency.
#[derive(Debug, Clone, Default)]
pub struct SpectralAnalyzer {
    config: AnalysisConfig,
}

impl SpectralAnalyzer {
    /// Creates an analyzer with the given window and mode settings.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Settings this analyzer was built with.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes the first window of `samples`.
    ///
    /// The window holds `window_size` samples (half a second unless
    /// configured otherwise). Shorter input is zero-padded up to the window
    /// size. An empty window produces no bins and a fundamental of 0 Hz.
    ///
    /// Only bins `0..=N/2` take part in the peak search: for real input the
    /// upper half mirrors the lower one and would report `sample_rate - f`.
    ///
    /// The window is not checked here; [`AnalysisTask::launch`] rejects
    /// windows above [`MAX_WINDOW_SIZE`] before calling this.
    ///
    /// # Arguments
    /// * `samples` - Raw (not normalized) samples, first window used
    /// * `sample_rate` - Sample rate of `samples` in Hz
    ///
    /// # Returns
    /// The spectrum of the window and the estimated fundamental frequency
    ///
    /// [`AnalysisTask::launch`]: super::task::AnalysisTask::launch
    /// [`MAX_WINDOW_SIZE`]: super::types::MAX_WINDOW_SIZE
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> FundamentalFrequencyResult {
        let started = Instant::now();
        let window = take_window(samples, self.config.window_size_for(sample_rate));
        let window_size = window.len();

        let frequency_domain = compute_frequency_domain(&window);
        let peak_bin = if frequency_domain.is_empty() {
            None
        } else {
            fundamental_bin(&frequency_domain[..=window_size / 2])
        };
        let fundamental_frequency =
            peak_bin.map_or(0.0, |bin| bin_to_hz(bin, sample_rate, window_size));

        info!(
            window_size,
            ?peak_bin,
            fundamental_frequency,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "spectral analysis finished"
        );

        FundamentalFrequencyResult {
            frequency_domain,
            fundamental_frequency,
            peak_bin,
            window_size,
            sample_rate,
        }
    }
}

/// Copies the first `window_size` raw samples of `wav` for analysis.
pub fn raw_window(wav: &WavFile, window_size: usize) -> Vec<f32> {
    wav.samples()
        .take(window_size)
        .map(|sample| sample as f32)
        .collect()
}

/// Cuts `samples` down to `window_size`, zero-padding short non-empty input.
fn take_window(samples: &[f32], window_size: usize) -> Vec<f32> {
    if samples.is_empty() || window_size == 0 {
        return Vec::new();
    }
    let mut window = samples[..samples.len().min(window_size)].to_vec();
    window.resize(window_size, 0.0);
    window
}

/// Discrete Fourier transform of `samples`, one bin per input sample.
///
/// Computed with rustfft, which matches the direct
/// `X[k] = Σ x[n]·e^(-2πikn/N)` definition bin for bin for any length.
pub fn compute_frequency_domain(samples: &[f32]) -> Vec<ComplexBin> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(samples.len());

    let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    buffer.into_iter().map(ComplexBin::new).collect()
}

/// Index of the bin with the largest magnitude.
///
/// Uses `>=`, so among equal maxima the last one scanned wins. Bins with
/// no energy never win; an all-silent (or empty) spectrum gives `None`.
pub fn fundamental_bin(bins: &[ComplexBin]) -> Option<usize> {
    let mut max = f32::MIN_POSITIVE;
    let mut peak = None;
    for (index, bin) in bins.iter().enumerate() {
        if bin.magnitude >= max {
            max = bin.magnitude;
            peak = Some(index);
        }
    }
    peak
}

/// Converts a bin index to Hz. A zero window maps to 0 Hz.
pub fn bin_to_hz(bin: usize, sample_rate: u32, window_size: usize) -> f32 {
    if window_size == 0 {
        return 0.0;
    }
    bin as f32 * (sample_rate as f32 / window_size as f32)
}
