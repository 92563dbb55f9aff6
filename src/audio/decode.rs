//! Compressed audio decoding via symphonia.
//!
//! Podcast enclosures are usually MP3 or M4A. WAV input takes the hound
//! fast path; everything else is probed and decoded with symphonia, then
//! normalized to the pipeline rate.

use crate::audio::{AudioBuffer, downmix_to_mono, resample, wav};
use crate::defaults::SAMPLE_RATE;
use crate::error::{PodscribeError, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an audio file into 16kHz mono PCM.
pub fn decode_audio_file(path: &Path) -> Result<AudioBuffer> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    if extension.as_deref() == Some("wav") {
        let file = File::open(path)?;
        return wav::read_wav(file);
    }

    decode_with_symphonia(path, extension.as_deref())
}

fn decode_with_symphonia(path: &Path, extension: Option<&str>) -> Result<AudioBuffer> {
    let file = File::open(path)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PodscribeError::AudioDecode {
            message: format!("Unsupported container format: {}", e),
        })?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PodscribeError::AudioDecode {
            message: "No decodable audio track found".to_string(),
        })?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PodscribeError::AudioDecode {
            message: format!("Unsupported codec: {}", e),
        })?;

    let mut samples: Vec<i16> = Vec::new();
    let mut source_rate = 0u32;
    let mut channels = 1usize;
    let mut sample_buf: Option<SampleBuffer<i16>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(PodscribeError::AudioDecode {
                    message: format!("Failed to read packet: {}", e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Skip malformed packets; MP3 streams routinely contain a few
            Err(SymphoniaError::DecodeError(e)) => {
                log::debug!("skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => {
                return Err(PodscribeError::AudioDecode {
                    message: format!("Decode failed: {}", e),
                });
            }
        };

        let spec = *decoded.spec();
        source_rate = spec.rate;
        channels = spec.channels.count();

        let buf = sample_buf
            .get_or_insert_with(|| SampleBuffer::<i16>::new(decoded.capacity() as u64, spec));
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    if samples.is_empty() {
        return Err(PodscribeError::AudioDecode {
            message: "Stream contained no decodable audio".to_string(),
        });
    }

    let mono = downmix_to_mono(&samples, channels);
    let normalized = resample(&mono, source_rate, SAMPLE_RATE);

    Ok(AudioBuffer::new(normalized, SAMPLE_RATE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_wav_file_via_hound_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..1600i32 {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let buffer = decode_audio_file(&path).unwrap();
        assert_eq!(buffer.sample_rate, 16000);
        assert_eq!(buffer.samples.len(), 1600);
    }

    #[test]
    fn test_decode_rejects_non_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode.mp3");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"definitely not an mp3 stream").unwrap();

        let result = decode_audio_file(&path);
        assert!(matches!(
            result,
            Err(PodscribeError::AudioDecode { .. }) | Err(PodscribeError::Io(_))
        ));
    }

    #[test]
    fn test_decode_missing_file_is_io_error() {
        let result = decode_audio_file(Path::new("/nonexistent/episode.wav"));
        assert!(result.is_err());
    }
}
