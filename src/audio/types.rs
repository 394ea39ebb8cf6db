use rustfft::num_complex::Complex;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Bit depths the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight,
    Sixteen,
    TwentyFour,
}

impl BitDepth {
    /// Maps a declared `bits_per_sample` onto a supported depth.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            24 => Some(BitDepth::TwentyFour),
            _ => None,
        }
    }

    /// Declared `bits_per_sample` for this depth.
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        self.bits() as usize / 8
    }
}

/// Header fields of a validated PCM WAV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    /// Format tag from the `fmt ` chunk (1 = PCM, 0xFFFE = extensible)
    pub format_tag: u16,
    /// Number of interleaved channels
    pub channel_count: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Average bytes per second as declared by the file
    pub byte_rate: u32,
    /// Bytes per frame (all channels)
    pub block_align: u16,
    /// Bit depth of a single sample
    pub bit_depth: BitDepth,
    /// Length of the `data` chunk payload in bytes
    pub data_size: u32,
}

impl WavHeader {
    pub fn bits_per_sample(&self) -> u16 {
        self.bit_depth.bits()
    }

    /// Number of frames in the payload (one sample per channel each).
    pub fn frame_count(&self) -> usize {
        self.data_size as usize / self.block_align as usize
    }

    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.frame_count() as f32 / self.sample_rate as f32
    }
}

impl fmt::Display for WavHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format tag: {:#06x}", self.format_tag)?;
        writeln!(f, "Channels: {}", self.channel_count)?;
        writeln!(f, "Sample rate: {} Hz", self.sample_rate)?;
        writeln!(f, "Byte rate: {} B/s", self.byte_rate)?;
        writeln!(f, "Block align: {} bytes", self.block_align)?;
        writeln!(f, "Bits per sample: {}", self.bits_per_sample())?;
        write!(f, "Data size: {} bytes", self.data_size)
    }
}

/// One frequency-domain sample and its magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexBin {
    pub value: Complex<f32>,
    /// Euclidean norm of `value`
    pub magnitude: f32,
}

impl ComplexBin {
    pub fn new(value: Complex<f32>) -> Self {
        Self {
            value,
            magnitude: value.norm(),
        }
    }
}

/// Output of a single spectral analysis run
#[derive(Debug, Clone)]
pub struct FundamentalFrequencyResult {
    /// One bin per frequency in `[0, window_size)`
    pub frequency_domain: Vec<ComplexBin>,
    /// Estimated fundamental frequency in Hz
    pub fundamental_frequency: f32,
    /// Index of the winning bin, if any bin carried energy
    pub peak_bin: Option<usize>,
    /// Number of samples the transform was computed over
    pub window_size: usize,
    /// Sample rate of the analyzed signal in Hz
    pub sample_rate: u32,
}

impl FundamentalFrequencyResult {
    /// Width of one frequency bin in Hz, or 0 for an empty window.
    pub fn bin_width(&self) -> f32 {
        if self.window_size == 0 {
            0.0
        } else {
            self.sample_rate as f32 / self.window_size as f32
        }
    }
}

/// Where the spectral analysis runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run on the calling thread before `launch` returns
    Inline,
    /// Run on a dedicated worker and poll for the result
    #[default]
    Background,
}

/// Largest window a single analysis may transform (about 95 s at 44.1 kHz).
///
/// Windows come from the command line, `config.toml` or the file header
/// (`sample_rate / 2`), and the zero-padded window plus its spectrum are
/// allocated up front.
pub const MAX_WINDOW_SIZE: usize = 1 << 22;

/// Configuration for spectral analysis
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Samples per transform; `None` uses half a second (`sample_rate / 2`)
    pub window_size: Option<usize>,
    /// Inline or background execution
    pub mode: ExecutionMode,
    /// Upper bound on how long a single readiness poll may wait
    pub poll_wait: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            window_size: None,
            mode: ExecutionMode::Background,
            poll_wait: Duration::from_millis(3),
        }
    }
}

impl AnalysisConfig {
    /// Resolves the window size for a signal sampled at `sample_rate`.
    pub fn window_size_for(&self, sample_rate: u32) -> usize {
        self.window_size.unwrap_or(sample_rate as usize / 2)
    }

    /// Resolves the window size and checks it against [`MAX_WINDOW_SIZE`].
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate of the signal in Hz
    ///
    /// # Returns
    /// The number of samples the transform will run over
    ///
    /// # Errors
    /// * `AudioError::InvalidParams` if the window exceeds [`MAX_WINDOW_SIZE`]
    pub fn checked_window_size(&self, sample_rate: u32) -> Result<usize, AudioError> {
        let window_size = self.window_size_for(sample_rate);
        if window_size > MAX_WINDOW_SIZE {
            return Err(AudioError::InvalidParams(format!(
                "analysis window of {} samples exceeds the maximum of {}",
                window_size, MAX_WINDOW_SIZE
            )));
        }
        Ok(window_size)
    }
}

/// Errors that can occur during audio processing
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// The file could not be opened or read
    #[error("cannot open '{}': {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO errors outside of opening the input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The RIFF/WAVE structure is missing or malformed
    #[error("not a valid WAV file: {0}")]
    InvalidContainer(String),

    /// The declared bit depth has no known scale factor
    #[error("unknown bitrate: {0}-bit samples cannot be interpreted")]
    UnsupportedBitDepth(u16),

    /// Invalid parameter values
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
