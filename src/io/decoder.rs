//! Audio decoding using Symphonia

use crate::error::{Result, SeparationError};
use crate::preprocessing::channel_mixer::downmix_interleaved;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Mono PCM decoded at the file's native sample rate
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in [-1.0, 1.0]
    pub samples: Vec<f32>,

    /// Native sample rate in Hz
    pub sample_rate: u32,

    /// Channel count of the source before down-mixing
    pub channels: usize,
}

/// Decode an audio file to mono `f32` PCM
///
/// Reads the first track with a known codec, converts every packet to
/// interleaved `f32` and averages the channels into one.
///
/// # Errors
///
/// Returns `SeparationError::AudioLoad` if the file cannot be opened, probed
/// or decoded, has no audio track, or decodes to zero samples.
pub fn decode_audio(path: &Path) -> Result<DecodedAudio> {
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path).map_err(|e| {
        SeparationError::AudioLoad(format!("cannot open {}: {}", path.display(), e))
    })?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            SeparationError::AudioLoad(format!(
                "unrecognized audio format for {}: {}",
                path.display(),
                e
            ))
        })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            SeparationError::AudioLoad(format!("no audio track in {}", path.display()))
        })?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| {
            SeparationError::AudioLoad(format!(
                "unsupported codec in {}: {}",
                path.display(),
                e
            ))
        })?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(ref e) if is_end_of_stream(e) => break,
            Err(e) => {
                return Err(SeparationError::AudioLoad(format!(
                    "failed reading {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(_)) => {
                // Corrupted packets are skipped, the rest of the stream is kept
                skipped_packets += 1;
                continue;
            }
            Err(e) => {
                return Err(SeparationError::AudioLoad(format!(
                    "failed decoding {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let spec = *decoded.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }
        if channels == 0 {
            channels = spec.channels.count();
        }

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(buf.samples());
    }

    if skipped_packets > 0 {
        log::warn!(
            "Skipped {} undecodable packets in {}",
            skipped_packets,
            path.display()
        );
    }

    if interleaved.is_empty() {
        return Err(SeparationError::AudioLoad(format!(
            "{} contains no audio samples",
            path.display()
        )));
    }

    if sample_rate == 0 {
        return Err(SeparationError::AudioLoad(format!(
            "{} does not declare a sample rate",
            path.display()
        )));
    }

    let channels = channels.max(1);
    let samples = downmix_interleaved(&interleaved, channels)?;

    log::debug!(
        "Decoded {} frames at {} Hz ({} channels)",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Whether a `next_packet` error marks the normal end of the stream
///
/// Symphonia reports end-of-stream as an `UnexpectedEof` I/O error; any other
/// I/O failure is a read error.
fn is_end_of_stream(err: &SymphoniaError) -> bool {
    match err {
        SymphoniaError::IoError(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
        SymphoniaError::ResetRequired => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_audio_load_error() {
        let result = decode_audio(Path::new("/definitely/not/here.wav"));
        assert!(matches!(result, Err(SeparationError::AudioLoad(_))));
    }

    #[test]
    fn test_only_unexpected_eof_ends_the_stream() {
        let eof = SymphoniaError::IoError(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "end of stream",
        ));
        assert!(is_end_of_stream(&eof));

        let read_failure = SymphoniaError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            "device went away",
        ));
        assert!(!is_end_of_stream(&read_failure));

        let denied = SymphoniaError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!is_end_of_stream(&denied));
    }

    #[test]
    fn test_truncated_wav_keeps_samples_read_before_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..48_000 {
            writer.write_sample(8192i16).unwrap();
        }
        writer.finalize().unwrap();

        // Cut the data chunk short; the header still declares 48000 samples
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 4000]).unwrap();

        let decoded = decode_audio(&path).unwrap();
        assert!(!decoded.samples.is_empty());
        assert!(decoded.samples.len() < 48_000);
        assert!((decoded.samples[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_garbage_file_is_audio_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"this is not a riff header at all").unwrap();

        let result = decode_audio(&path);
        assert!(matches!(result, Err(SeparationError::AudioLoad(_))));
    }

    #[test]
    fn test_stereo_wav_is_downmixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..800 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = decode_audio(&path).unwrap();
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.samples.len(), 800);
        assert!((decoded.samples[10] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_empty_wav_is_audio_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        hound::WavWriter::create(&path, spec)
            .unwrap()
            .finalize()
            .unwrap();

        let result = decode_audio(&path);
        assert!(matches!(result, Err(SeparationError::AudioLoad(_))));
    }
}
