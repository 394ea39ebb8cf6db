use super::types::{AudioError, BitDepth, WavHeader};
use std::fs;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const MIN_FMT_CHUNK_LEN: usize = 16;
const EXTENSIBLE_FMT_CHUNK_LEN: usize = 40;

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// A validated PCM WAV file held in memory.
///
/// Instances only exist for files that passed container validation, so
/// holding a `WavFile` is the "valid" state: every accessor can assume a
/// consistent header and a payload that is a whole number of frames.
///
/// Samples are exposed in raw frame order. Multi-channel files are not
/// de-interleaved; they read as one flat sequence.
#[derive(Debug, Clone)]
pub struct WavFile {
    header: WavHeader,
    payload: Vec<u8>,
}

impl WavFile {
    /// Reads and validates the WAV file at `path`.
    ///
    /// # Arguments
    /// * `path` - Path to the WAV file
    ///
    /// # Returns
    /// The validated file with its header and raw payload
    ///
    /// # Errors
    /// * `AudioError::FileOpen` if the file cannot be read
    /// * `AudioError::InvalidContainer` if the RIFF/WAVE structure is malformed
    /// * `AudioError::UnsupportedBitDepth` if the depth is not 8, 16 or 24 bits
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| AudioError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), len = bytes.len(), "read wav file");
        Self::from_bytes(&bytes)
    }

    /// Validates an in-memory RIFF/WAVE buffer and copies out its payload.
    ///
    /// # Arguments
    /// * `bytes` - The complete file contents, starting at the `RIFF` tag
    ///
    /// # Returns
    /// The validated file; unrelated chunks in `bytes` are dropped
    ///
    /// # Errors
    /// * `AudioError::InvalidContainer` if the RIFF/WAVE structure is malformed
    /// * `AudioError::UnsupportedBitDepth` if the depth is not 8, 16 or 24 bits
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        let (header, data_range) = parse_container(bytes)?;
        Ok(WavFile {
            header,
            payload: bytes[data_range].to_vec(),
        })
    }

    /// Header fields read from the `fmt ` and `data` chunks.
    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    /// The raw, undecoded sample payload of the `data` chunk.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Total number of decoded samples across all channels.
    pub fn sample_size(&self) -> usize {
        self.payload.len() / self.header.bit_depth.bytes_per_sample()
    }

    /// Decodes the sample at `index`, or `None` past the end of the payload.
    pub fn sample(&self, index: usize) -> Option<i32> {
        let width = self.header.bit_depth.bytes_per_sample();
        let start = index.checked_mul(width)?;
        let end = start.checked_add(width)?;
        self.payload
            .get(start..end)
            .map(|bytes| decode_sample(self.header.bit_depth, bytes))
    }

    /// Iterates every decoded sample in payload order.
    pub fn samples(&self) -> impl Iterator<Item = i32> + '_ {
        let depth = self.header.bit_depth;
        self.payload
            .chunks_exact(depth.bytes_per_sample())
            .map(move |bytes| decode_sample(depth, bytes))
    }

    /// Human-readable summary of the header fields, one per line.
    pub fn readable_header(&self) -> String {
        self.header.to_string()
    }
}

/// 8-bit PCM is unsigned offset-binary; wider depths are little-endian
/// two's complement.
fn decode_sample(depth: BitDepth, bytes: &[u8]) -> i32 {
    match depth {
        BitDepth::Eight => bytes[0] as i32 - 128,
        BitDepth::Sixteen => i16::from_le_bytes([bytes[0], bytes[1]]) as i32,
        BitDepth::TwentyFour => i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8,
    }
}

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn invalid(reason: impl Into<String>) -> AudioError {
    AudioError::InvalidContainer(reason.into())
}

/// Fields of the `fmt ` chunk before validation against each other.
struct FmtChunk {
    format_tag: u16,
    channel_count: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

/// Walks the RIFF chunk list and returns the validated header together
/// with the byte range of the `data` payload inside `bytes`.
fn parse_container(bytes: &[u8]) -> Result<(WavHeader, Range<usize>), AudioError> {
    if bytes.len() < RIFF_HEADER_LEN {
        return Err(invalid(format!(
            "{} bytes is too short for a RIFF header",
            bytes.len()
        )));
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(invalid("missing RIFF marker"));
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(invalid("missing WAVE form type"));
    }

    let mut fmt = None;
    let mut data = None;
    let mut pos = RIFF_HEADER_LEN;

    while pos + CHUNK_HEADER_LEN <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = le_u32(bytes, pos + 4) as usize;
        let body_start = pos + CHUNK_HEADER_LEN;
        let body_end = body_start
            .checked_add(size)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                invalid(format!(
                    "chunk '{}' declares {} bytes but only {} remain",
                    String::from_utf8_lossy(id),
                    size,
                    bytes.len() - body_start
                ))
            })?;

        match id {
            b"fmt " => fmt = Some(parse_fmt(&bytes[body_start..body_end])?),
            b"data" => data = Some(body_start..body_end),
            _ => debug!(chunk = %String::from_utf8_lossy(id), size, "skipping chunk"),
        }

        if fmt.is_some() && data.is_some() {
            break;
        }

        // Chunks are word aligned; odd sizes carry one pad byte.
        pos = body_end + (size & 1);
    }

    let fmt = fmt.ok_or_else(|| invalid("missing fmt chunk"))?;
    let data = data.ok_or_else(|| invalid("missing data chunk"))?;

    if fmt.channel_count == 0 {
        return Err(invalid("file declares zero channels"));
    }
    if fmt.sample_rate == 0 {
        return Err(invalid("file declares a sample rate of 0 Hz"));
    }

    let bit_depth = BitDepth::from_bits(fmt.bits_per_sample)
        .ok_or(AudioError::UnsupportedBitDepth(fmt.bits_per_sample))?;

    let frame_len = fmt.channel_count as usize * bit_depth.bytes_per_sample();
    if fmt.block_align as usize != frame_len {
        return Err(invalid(format!(
            "block align of {} bytes does not match {} channel(s) of {}-bit samples",
            fmt.block_align,
            fmt.channel_count,
            bit_depth.bits()
        )));
    }

    let data_size = data.len();
    if data_size % frame_len != 0 {
        return Err(invalid(format!(
            "data size of {} bytes is not a whole number of {}-byte frames",
            data_size, frame_len
        )));
    }
    let data_size = u32::try_from(data_size)
        .map_err(|_| invalid(format!("data chunk of {} bytes is too large", data_size)))?;

    let header = WavHeader {
        format_tag: fmt.format_tag,
        channel_count: fmt.channel_count,
        sample_rate: fmt.sample_rate,
        byte_rate: fmt.byte_rate,
        block_align: fmt.block_align,
        bit_depth,
        data_size,
    };

    let expected_byte_rate = u64::from(header.sample_rate) * frame_len as u64;
    if u64::from(header.byte_rate) != expected_byte_rate {
        debug!(
            declared = header.byte_rate,
            expected = expected_byte_rate,
            "byte rate disagrees with sample rate and frame size"
        );
    }

    debug!(
        sample_rate = header.sample_rate,
        channels = header.channel_count,
        bits = header.bits_per_sample(),
        data_size = header.data_size,
        "parsed wav header"
    );

    Ok((header, data))
}

fn parse_fmt(body: &[u8]) -> Result<FmtChunk, AudioError> {
    if body.len() < MIN_FMT_CHUNK_LEN {
        return Err(invalid(format!(
            "fmt chunk is {} bytes, expected at least {}",
            body.len(),
            MIN_FMT_CHUNK_LEN
        )));
    }

    let format_tag = le_u16(body, 0);
    match format_tag {
        WAVE_FORMAT_PCM => {}
        WAVE_FORMAT_EXTENSIBLE => {
            // The sub-format GUID starts at offset 24; its first two bytes
            // carry the effective format tag.
            if body.len() < EXTENSIBLE_FMT_CHUNK_LEN {
                return Err(invalid("extensible fmt chunk is truncated"));
            }
            let sub_format = le_u16(body, 24);
            if sub_format != WAVE_FORMAT_PCM {
                return Err(invalid(format!(
                    "unsupported extensible sub-format {:#06x}, only PCM is supported",
                    sub_format
                )));
            }
        }
        other => {
            return Err(invalid(format!(
                "unsupported format tag {:#06x}, only PCM is supported",
                other
            )))
        }
    }

    Ok(FmtChunk {
        format_tag,
        channel_count: le_u16(body, 2),
        sample_rate: le_u32(body, 4),
        byte_rate: le_u32(body, 8),
        block_align: le_u16(body, 12),
        bits_per_sample: le_u16(body, 14),
    })
}
