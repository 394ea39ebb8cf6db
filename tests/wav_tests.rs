// WAV container tests
//
// These tests focus on parsing and validating the RIFF/WAVE container and on
// the bounds-checked sample accessor.
//
// The tests cover:
// - Header extraction for 8, 16 and 24-bit files
// - Raw sample decoding and out-of-range access
// - Rejection of malformed containers and unsupported bit depths
// - Deterministic re-parsing

use wavscope::audio::{normalize_samples, AudioError, BitDepth, WavFile};

use test_utils::{
    full_scale, pcm_bytes, sine_wave, write_tone, write_wav, WavBuilder, SAMPLE_RATE,
};

/// Test header extraction from a 16-bit mono file.
#[test]
fn test_wav_header_fields() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_tone(dir.path(), 16);
    let wav = WavFile::open(&path).expect("Failed to load WAV file");

    let header = wav.header();
    assert_eq!(header.sample_rate, SAMPLE_RATE);
    assert_eq!(header.channel_count, 1);
    assert_eq!(header.bit_depth, BitDepth::Sixteen);
    assert_eq!(header.bits_per_sample(), 16);
    assert_eq!(header.block_align, 2);
    assert_eq!(header.byte_rate, SAMPLE_RATE * 2);
    assert_eq!(header.data_size, SAMPLE_RATE * 2);
    assert_eq!(wav.sample_size(), SAMPLE_RATE as usize);
    assert_eq!(wav.payload().len(), header.data_size as usize);
    assert!((header.duration_secs() - 1.0).abs() < 1e-6);
}

/// Test that every supported depth decodes back to the written samples.
#[test]
fn test_sample_decoding_per_bit_depth() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    for bits in [8u16, 16, 24] {
        let max = full_scale(bits);
        let samples = vec![0, 1, -1, max, -max - 1, max / 2, -(max / 3)];
        let path = write_wav(dir.path(), &format!("edges_{}.wav", bits), bits, 1, 8000, &samples);

        let wav = WavFile::open(&path).expect("Failed to load WAV file");
        assert_eq!(wav.header().bits_per_sample(), bits);
        assert_eq!(wav.sample_size(), samples.len());

        let decoded: Vec<i32> = wav.samples().collect();
        assert_eq!(decoded, samples, "{}-bit samples should round-trip", bits);
        for (index, &expected) in samples.iter().enumerate() {
            assert_eq!(wav.sample(index), Some(expected));
        }
    }
}

/// Test that access past the end is absent rather than a fault.
#[test]
fn test_out_of_range_access_is_absent() {
    let bytes = WavBuilder::pcm(16, 1, 8000, pcm_bytes(&[10, 20, 30], 16)).build();
    let wav = WavFile::from_bytes(&bytes).expect("Failed to parse WAV bytes");

    assert_eq!(wav.sample_size(), 3);
    assert_eq!(wav.sample(2), Some(30));
    assert_eq!(wav.sample(3), None);
    assert_eq!(wav.sample(1_000_000), None);
    assert_eq!(wav.sample(usize::MAX), None);
}

/// Test that multi-channel files stay interleaved as one flat sequence.
#[test]
fn test_stereo_samples_stay_interleaved() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let frames = [100, -100, 200, -200, 300, -300];
    let path = write_wav(dir.path(), "stereo.wav", 16, 2, 22050, &frames);

    let wav = WavFile::open(&path).expect("Failed to load WAV file");
    assert_eq!(wav.header().channel_count, 2);
    assert_eq!(wav.header().block_align, 4);
    assert_eq!(wav.header().frame_count(), 3);
    assert_eq!(wav.sample_size(), 6);
    assert_eq!(wav.samples().collect::<Vec<_>>(), frames);
}

/// Test that the readable summary mentions every header field.
#[test]
fn test_readable_header() {
    let bytes = WavBuilder::pcm(8, 2, 11025, vec![128; 8]).build();
    let wav = WavFile::from_bytes(&bytes).expect("Failed to parse WAV bytes");
    let summary = wav.readable_header();

    assert!(summary.contains("Sample rate: 11025 Hz"));
    assert!(summary.contains("Bits per sample: 8"));
    assert!(summary.contains("Channels: 2"));
    assert!(summary.contains("Byte rate: 22050"));
    assert!(summary.contains("Block align: 2"));
    assert!(summary.contains("Data size: 8 bytes"));
    assert_eq!(summary, wav.readable_header());
}

/// Test that parsing the same file twice gives identical results.
#[test]
fn test_reparse_is_deterministic() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_tone(dir.path(), 24);

    let first = WavFile::open(&path).expect("Failed to load WAV file");
    let second = WavFile::open(&path).expect("Failed to load WAV file");

    assert_eq!(first.header(), second.header());
    assert_eq!(first.payload(), second.payload());

    let first_normalized = normalize_samples(&first).expect("Failed to normalize");
    let second_normalized = normalize_samples(&second).expect("Failed to normalize");
    assert_eq!(first_normalized.len(), second_normalized.len());
    assert!(first_normalized
        .iter()
        .zip(&second_normalized)
        .all(|(a, b)| a.to_bits() == b.to_bits()));
}

/// Test that hound's extensible 24-bit header is understood.
#[test]
fn test_24bit_multichannel_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let samples = sine_wave(1000.0, 48000, 4 * 480, 24, 0.5);
    let path = write_wav(dir.path(), "quad.wav", 24, 4, 48000, &samples);

    let wav = WavFile::open(&path).expect("Failed to load WAV file");
    assert_eq!(wav.header().bit_depth, BitDepth::TwentyFour);
    assert_eq!(wav.header().channel_count, 4);
    assert_eq!(wav.header().block_align, 12);
    assert_eq!(wav.sample_size(), samples.len());
}

/// Test that unrelated chunks, including odd-sized ones, are skipped.
#[test]
fn test_unknown_chunks_are_skipped() {
    let mut builder = WavBuilder::pcm(16, 1, 8000, pcm_bytes(&[1, 2, 3, 4], 16));
    builder.extra_chunks.push((*b"LIST", b"INFOabc".to_vec()));
    builder.extra_chunks.push((*b"junk", vec![0; 4]));

    let wav = WavFile::from_bytes(&builder.build()).expect("Failed to parse WAV bytes");
    assert_eq!(wav.samples().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

/// Test error reporting for a file that does not exist.
#[test]
fn test_missing_file() {
    let result = WavFile::open("non_existent_file.wav");
    match result {
        Err(AudioError::FileOpen { path, .. }) => {
            assert_eq!(path.to_str(), Some("non_existent_file.wav"));
        }
        other => panic!("expected FileOpen error, got {:?}", other),
    }
}

/// Test that wrong magic bytes fail container validation.
#[test]
fn test_bad_magic_is_rejected() {
    let mut builder = WavBuilder::pcm(16, 1, 8000, pcm_bytes(&[1, 2], 16));
    builder.riff_magic = *b"RIFX";
    let err = WavFile::from_bytes(&builder.build()).unwrap_err();
    assert!(matches!(err, AudioError::InvalidContainer(_)), "{:?}", err);
    assert!(err.to_string().contains("not a valid WAV file"));

    let mut builder = WavBuilder::pcm(16, 1, 8000, pcm_bytes(&[1, 2], 16));
    builder.wave_magic = *b"AVI ";
    let err = WavFile::from_bytes(&builder.build()).unwrap_err();
    assert!(matches!(err, AudioError::InvalidContainer(_)), "{:?}", err);

    let err = WavFile::from_bytes(b"RIFF").unwrap_err();
    assert!(matches!(err, AudioError::InvalidContainer(_)), "{:?}", err);
}

/// Test that a 32-bit file fails with the bitrate error.
#[test]
fn test_32bit_is_unsupported() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let samples = sine_wave(440.0, 8000, 800, 32, 0.5);
    let path = write_wav(dir.path(), "deep.wav", 32, 1, 8000, &samples);

    let err = WavFile::open(&path).unwrap_err();
    assert!(matches!(err, AudioError::UnsupportedBitDepth(32)), "{:?}", err);
    assert!(err.to_string().contains("unknown bitrate"));

    let bytes = WavBuilder::pcm(12, 1, 8000, vec![0; 16]).build();
    let err = WavFile::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, AudioError::UnsupportedBitDepth(12)), "{:?}", err);
}

/// Test that malformed chunk sizes and header fields are rejected.
#[test]
fn test_malformed_containers() {
    // Payload is not a whole number of 16-bit stereo frames
    let bytes = WavBuilder::pcm(16, 2, 8000, vec![0; 6]).build();
    assert!(matches!(
        WavFile::from_bytes(&bytes),
        Err(AudioError::InvalidContainer(_))
    ));

    // Data chunk claims more bytes than the file holds
    let mut builder = WavBuilder::pcm(16, 1, 8000, vec![0; 8]);
    builder.declared_data_size = Some(64);
    assert!(matches!(
        WavFile::from_bytes(&builder.build()),
        Err(AudioError::InvalidContainer(_))
    ));

    // Block align disagrees with the channel count
    let mut builder = WavBuilder::pcm(16, 2, 8000, vec![0; 8]);
    builder.block_align = 2;
    assert!(matches!(
        WavFile::from_bytes(&builder.build()),
        Err(AudioError::InvalidContainer(_))
    ));

    // Zero sample rate
    let bytes = WavBuilder::pcm(16, 1, 0, vec![0; 8]).build();
    assert!(matches!(
        WavFile::from_bytes(&bytes),
        Err(AudioError::InvalidContainer(_))
    ));

    // Zero channels
    let mut builder = WavBuilder::pcm(16, 1, 8000, vec![0; 8]);
    builder.channels = 0;
    builder.block_align = 0;
    assert!(matches!(
        WavFile::from_bytes(&builder.build()),
        Err(AudioError::InvalidContainer(_))
    ));

    // IEEE float is not PCM
    let mut builder = WavBuilder::pcm(16, 1, 8000, vec![0; 8]);
    builder.format_tag = 3;
    assert!(matches!(
        WavFile::from_bytes(&builder.build()),
        Err(AudioError::InvalidContainer(_))
    ));
}

/// Test that an empty data chunk is a valid, sample-less file.
#[test]
fn test_empty_payload() {
    let bytes = WavBuilder::pcm(16, 1, 8000, Vec::new()).build();
    let wav = WavFile::from_bytes(&bytes).expect("Failed to parse WAV bytes");
    assert_eq!(wav.sample_size(), 0);
    assert_eq!(wav.sample(0), None);
}
