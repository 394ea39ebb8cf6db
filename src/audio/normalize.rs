use super::types::AudioError;
use super::wav::WavFile;

/// Value a missing sample normalizes to (`1.0 - 0 / divisor`).
pub const ABSENT_SAMPLE_VALUE: f32 = 1.0;

/// Picks the divisor that maps raw samples of the given depth onto `[-1, 1]`.
///
/// 8 and 16 bit use their signed maximum; every other depth falls back to
/// `2^24 - 1`. The result is checked against `f32::EPSILON` so that a
/// depth without a usable scale factor fails before any sample is touched,
/// independently of the container validation in [`WavFile`].
///
/// # Errors
/// * `AudioError::UnsupportedBitDepth` if the divisor is indistinguishable from zero
pub fn scale_divisor(bits_per_sample: u16) -> Result<f32, AudioError> {
    let divisor = match bits_per_sample {
        8 => i8::MAX as f32,
        16 => i16::MAX as f32,
        _ => 2.0f32.powi(24) - 1.0,
    };

    if divisor <= f32::EPSILON {
        return Err(AudioError::UnsupportedBitDepth(bits_per_sample));
    }

    Ok(divisor)
}

/// Maps raw samples onto the inverted display range `[0, 1]`.
///
/// A full-scale positive sample lands at 0 and silence at 1; the negative
/// half-wave would fall past 1 and is clamped there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleNormalizer {
    divisor: f32,
}

impl SampleNormalizer {
    /// Builds a normalizer for samples of `bits_per_sample` bits.
    ///
    /// # Errors
    /// * `AudioError::UnsupportedBitDepth` if the depth has no usable divisor
    pub fn new(bits_per_sample: u16) -> Result<Self, AudioError> {
        Ok(Self {
            divisor: scale_divisor(bits_per_sample)?,
        })
    }

    /// Builds a normalizer for the bit depth declared in `wav`'s header.
    pub fn for_wav(wav: &WavFile) -> Result<Self, AudioError> {
        Self::new(wav.header().bits_per_sample())
    }

    /// The divisor from [`scale_divisor`].
    pub fn divisor(&self) -> f32 {
        self.divisor
    }

    /// Normalizes one raw sample. An absent sample counts as 0 and
    /// therefore yields exactly [`ABSENT_SAMPLE_VALUE`]; callers that step
    /// past the last index rely on this instead of an error.
    pub fn normalize(&self, raw: Option<i32>) -> f32 {
        let raw = raw.unwrap_or(0) as f32;
        (1.0 - raw / self.divisor).clamp(0.0, 1.0)
    }

    /// Normalized value of `wav`'s sample at `index`.
    pub fn at(&self, wav: &WavFile, index: usize) -> f32 {
        self.normalize(wav.sample(index))
    }
}

/// Normalizes every sample of `wav`, in payload order.
///
/// # Errors
/// * `AudioError::UnsupportedBitDepth` if the header's depth has no scale factor
pub fn normalize_samples(wav: &WavFile) -> Result<Vec<f32>, AudioError> {
    let normalizer = SampleNormalizer::for_wav(wav)?;
    let mut normalized = Vec::with_capacity(wav.sample_size());
    normalized.extend(wav.samples().map(|raw| normalizer.normalize(Some(raw))));
    Ok(normalized)
}
