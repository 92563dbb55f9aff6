//! Audio segmenter: cuts decoded audio into size-bounded WAV segments.
//!
//! Cuts happen at fixed sample boundaries computed from the byte budget; no
//! silence detection. The last segment may be shorter than the others. When
//! the whole buffer already fits the budget, exactly one segment covers the
//! full duration, so the reassembly path is identical either way.

use crate::audio::{AudioBuffer, encode_wav, encoded_wav_size};
use crate::defaults::{MAX_SEGMENT_BYTES, SEGMENT_SAFETY_FACTOR, WAV_HEADER_BYTES};
use crate::error::{PodscribeError, Result};
use crate::timeline::AudioSegment;

/// Configuration for the segmenter.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Maximum encoded size per segment in bytes.
    pub max_segment_bytes: u64,
    /// Fraction of the byte budget the sample budget targets, absorbing
    /// encoding overhead.
    pub safety_factor: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_segment_bytes: MAX_SEGMENT_BYTES,
            safety_factor: SEGMENT_SAFETY_FACTOR,
        }
    }
}

impl SegmenterConfig {
    /// Creates a config with a custom byte budget.
    pub fn with_max_bytes(max_segment_bytes: u64) -> Self {
        Self {
            max_segment_bytes,
            ..Self::default()
        }
    }

    /// Number of samples a segment may hold under the budget.
    ///
    /// Encoded size of n mono 16-bit samples is `44 + 2n`, so the budget maps
    /// exactly onto a sample count; the safety factor shaves it down.
    fn samples_per_segment(&self) -> usize {
        let payload = self.max_segment_bytes.saturating_sub(WAV_HEADER_BYTES);
        ((payload as f64 * self.safety_factor) / 2.0).floor() as usize
    }
}

/// Cut `audio` into segments whose encoded size stays under the budget.
///
/// Segment offsets are contiguous: segment i+1 starts exactly where segment i
/// ends, and the durations sum to the buffer duration.
pub fn segment(audio: &AudioBuffer, config: &SegmenterConfig) -> Result<Vec<AudioSegment>> {
    let rate = audio.sample_rate;

    // Whole episode under budget: one segment covering the full duration.
    if encoded_wav_size(audio.len()) <= config.max_segment_bytes {
        let segment = build_segment(0, 0, &audio.samples, rate, config.max_segment_bytes)?;
        return Ok(vec![segment]);
    }

    let samples_per_segment = config.samples_per_segment();
    if samples_per_segment == 0 {
        // Budget smaller than a WAV header plus one sample.
        return Err(PodscribeError::SegmentTooLarge {
            index: 0,
            size: encoded_wav_size(1),
            budget: config.max_segment_bytes,
        });
    }

    let mut segments = Vec::with_capacity(audio.len() / samples_per_segment + 1);
    let mut start = 0usize;
    while start < audio.len() {
        let end = usize::min(start + samples_per_segment, audio.len());
        let segment = build_segment(
            segments.len(),
            start,
            &audio.samples[start..end],
            rate,
            config.max_segment_bytes,
        )?;
        segments.push(segment);
        start = end;
    }

    Ok(segments)
}

fn build_segment(
    index: usize,
    start_sample: usize,
    samples: &[i16],
    rate: u32,
    budget: u64,
) -> Result<AudioSegment> {
    let wav_bytes = encode_wav(samples, rate)?;

    let size = wav_bytes.len() as u64;
    if size > budget {
        return Err(PodscribeError::SegmentTooLarge {
            index,
            size,
            budget,
        });
    }

    Ok(AudioSegment {
        index,
        start_offset: start_sample as f64 / rate as f64,
        duration: samples.len() as f64 / rate as f64,
        wav_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBuffer;

    fn make_audio(seconds: f64, rate: u32) -> AudioBuffer {
        let n = (seconds * rate as f64) as usize;
        AudioBuffer::new((0..n).map(|i| (i % 256) as i16).collect(), rate)
    }

    /// Budget admitting roughly `seconds` of 16kHz audio per segment.
    fn budget_for(seconds: f64, rate: u32) -> u64 {
        (seconds * rate as f64 * 2.0 / SEGMENT_SAFETY_FACTOR) as u64 + WAV_HEADER_BYTES
    }

    #[test]
    fn test_audio_under_budget_yields_single_segment() {
        let audio = make_audio(10.0, 16000);
        let config = SegmenterConfig::with_max_bytes(1024 * 1024);

        let segments = segment(&audio, &config).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[0].start_offset, 0.0);
        assert_eq!(segments[0].duration, 10.0);
    }

    #[test]
    fn test_audio_over_budget_is_split() {
        let audio = make_audio(30.0, 16000);
        let config = SegmenterConfig::with_max_bytes(budget_for(10.0, 16000));

        let segments = segment(&audio, &config).unwrap();

        assert!(segments.len() >= 3);
        for s in &segments {
            assert!(s.encoded_len() <= config.max_segment_bytes);
        }
    }

    #[test]
    fn test_offsets_are_contiguous_and_cover_duration() {
        let audio = make_audio(45.0, 16000);
        let config = SegmenterConfig::with_max_bytes(budget_for(7.0, 16000));

        let segments = segment(&audio, &config).unwrap();

        assert_eq!(segments[0].start_offset, 0.0);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end_offset(), pair[1].start_offset);
        }

        let total: f64 = segments.iter().map(|s| s.duration).sum();
        assert!((total - audio.duration_secs()).abs() < 1e-9);
    }

    #[test]
    fn test_indices_are_sequential() {
        let audio = make_audio(20.0, 16000);
        let config = SegmenterConfig::with_max_bytes(budget_for(3.0, 16000));

        let segments = segment(&audio, &config).unwrap();

        for (i, s) in segments.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }

    #[test]
    fn test_last_segment_may_be_shorter() {
        let audio = make_audio(10.0, 16000);
        let config = SegmenterConfig::with_max_bytes(budget_for(4.0, 16000));

        let segments = segment(&audio, &config).unwrap();

        let last = segments.last().unwrap();
        let first = &segments[0];
        assert!(last.duration <= first.duration);
    }

    #[test]
    fn test_budget_below_header_fails() {
        let audio = make_audio(1.0, 16000);
        let config = SegmenterConfig::with_max_bytes(40);

        let result = segment(&audio, &config);

        assert!(matches!(
            result,
            Err(PodscribeError::SegmentTooLarge { index: 0, .. })
        ));
    }

    #[test]
    fn test_segments_decode_back_to_original_samples() {
        let audio = make_audio(6.0, 16000);
        let config = SegmenterConfig::with_max_bytes(budget_for(2.5, 16000));

        let segments = segment(&audio, &config).unwrap();

        let mut reassembled = Vec::new();
        for s in &segments {
            let decoded =
                crate::audio::read_wav(std::io::Cursor::new(s.wav_bytes.clone())).unwrap();
            reassembled.extend(decoded.samples);
        }
        assert_eq!(reassembled, audio.samples);
    }

    #[test]
    fn test_empty_audio_yields_empty_single_segment() {
        let audio = AudioBuffer::new(Vec::new(), 16000);
        let config = SegmenterConfig::default();

        let segments = segment(&audio, &config).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].duration, 0.0);
    }
}
