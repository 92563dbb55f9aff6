//! WAV parsing and encoding for segment payloads.
//!
//! Segments are uploaded as 16-bit mono PCM WAV, so the encoded size of a
//! sample count is exact: header plus two bytes per sample. The segmenter
//! relies on that to map a byte budget onto a sample budget.

use crate::audio::{AudioBuffer, downmix_to_mono, resample};
use crate::defaults::{SAMPLE_RATE, WAV_HEADER_BYTES};
use crate::error::{PodscribeError, Result};
use std::io::{Cursor, Read};

/// Parse WAV data into an [`AudioBuffer`] at the pipeline rate.
///
/// Supports arbitrary sample rates and channel counts; stereo is downmixed
/// and everything is resampled to 16kHz mono.
pub fn read_wav(reader: impl Read) -> Result<AudioBuffer> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| PodscribeError::AudioDecode {
        message: format!("Failed to parse WAV data: {}", e),
    })?;

    let spec = wav_reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(PodscribeError::AudioDecode {
            message: format!(
                "Unsupported WAV sample format: {} bits {:?}",
                spec.bits_per_sample, spec.sample_format
            ),
        });
    }

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| PodscribeError::AudioDecode {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    let mono = downmix_to_mono(&raw_samples, spec.channels as usize);
    let samples = resample(&mono, spec.sample_rate, SAMPLE_RATE);

    Ok(AudioBuffer::new(samples, SAMPLE_RATE))
}

/// Encode mono samples as an in-memory 16-bit PCM WAV file.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| PodscribeError::AudioDecode {
                message: format!("Failed to create WAV writer: {}", e),
            })?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| PodscribeError::AudioDecode {
                    message: format!("Failed to write WAV samples: {}", e),
                })?;
        }
        writer.finalize().map_err(|e| PodscribeError::AudioDecode {
            message: format!("Failed to finalize WAV data: {}", e),
        })?;
    }

    Ok(cursor.into_inner())
}

/// Encoded size in bytes of a mono 16-bit PCM WAV holding `samples` samples.
pub fn encoded_wav_size(samples: usize) -> u64 {
    WAV_HEADER_BYTES + 2 * samples as u64
}
