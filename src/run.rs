//! Episode run orchestration.
//!
//! Drives one episode end to end: download, decode + segment (on a blocking
//! task), sequential per-segment transcription, assembly. Each run owns a
//! temporary directory that is removed on every exit path. Segments are
//! transcribed strictly in order — segment i+1 is not sent before segment
//! i's fragments arrive — and on the first fatal error the run discards all
//! partial results and lands in the terminal `Failed` state.

use crate::audio::decode_audio_file;
use crate::download::{audio_filename_from_url, download_audio};
use crate::error::{PodscribeError, Result};
use crate::progress::{ProgressTracker, RunPhase};
use crate::stt::SegmentTranscriber;
use crate::timeline::{SegmentFragments, SegmenterConfig, Transcript, assemble, segment};
use std::path::Path;

/// Orchestrator for episode runs.
///
/// Generic over the transcription adapter so runs are testable without a
/// network. Independent runs may share one runner; each call owns its
/// segment list, fragment accumulator, and tracker.
pub struct EpisodeRunner<T: SegmentTranscriber> {
    transcriber: T,
    segmenter: SegmenterConfig,
    http: reqwest::Client,
}

impl<T: SegmentTranscriber> EpisodeRunner<T> {
    /// Creates a runner with the default segmenter budget.
    pub fn new(transcriber: T) -> Self {
        Self::with_segmenter_config(transcriber, SegmenterConfig::default())
    }

    /// Creates a runner with a custom segmenter configuration.
    pub fn with_segmenter_config(transcriber: T, segmenter: SegmenterConfig) -> Self {
        Self {
            transcriber,
            segmenter,
            http: reqwest::Client::new(),
        }
    }

    /// Download and transcribe an episode from its audio URL.
    pub async fn transcribe_url(
        &self,
        audio_url: &str,
        tracker: &ProgressTracker,
    ) -> Result<Transcript> {
        let result = self.url_inner(audio_url, tracker).await;
        finish(tracker, &result);
        result
    }

    /// Transcribe a local audio file.
    pub async fn transcribe_file(
        &self,
        path: &Path,
        tracker: &ProgressTracker,
    ) -> Result<Transcript> {
        let result = self.path_inner(path, tracker).await;
        finish(tracker, &result);
        result
    }

    async fn url_inner(&self, audio_url: &str, tracker: &ProgressTracker) -> Result<Transcript> {
        // Run-scoped temp dir: removed when this function returns, on
        // success and failure alike.
        let temp_dir = tempfile::tempdir()?;
        let dest = temp_dir.path().join(audio_filename_from_url(audio_url));

        tracker.set_phase(RunPhase::Downloading);
        download_audio(&self.http, audio_url, &dest, |downloaded, total| {
            tracker.set_download_progress(downloaded, total);
        })
        .await?;

        self.path_inner(&dest, tracker).await
    }

    async fn path_inner(&self, path: &Path, tracker: &ProgressTracker) -> Result<Transcript> {
        tracker.set_phase(RunPhase::Segmenting);

        let audio_path = path.to_path_buf();
        let segmenter = self.segmenter.clone();
        let segments = tokio::task::spawn_blocking(move || {
            let audio = decode_audio_file(&audio_path)?;
            segment(&audio, &segmenter)
        })
        .await
        .map_err(|e| PodscribeError::Other(format!("segmentation task failed: {e}")))??;

        let total = segments.len();
        log::info!("transcribing {} segment(s)", total);
        tracker.set_phase(RunPhase::Transcribing {
            completed: 0,
            total,
        });

        let mut per_segment: Vec<SegmentFragments> = Vec::with_capacity(total);
        for seg in segments {
            let fragments = self.transcriber.transcribe(&seg).await?;
            per_segment.push(SegmentFragments::new(&seg, fragments));
            tracker.set_phase(RunPhase::Transcribing {
                completed: per_segment.len(),
                total,
            });
            // seg (and its encoded payload) is dropped here
        }

        tracker.set_phase(RunPhase::Assembling);
        Ok(assemble(&per_segment))
    }
}

fn finish(tracker: &ProgressTracker, result: &Result<Transcript>) {
    match result {
        Ok(_) => tracker.complete(),
        Err(e) => tracker.fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{SEGMENT_SAFETY_FACTOR, WAV_HEADER_BYTES};
    use crate::stt::MockTranscriber;
    use crate::timeline::Fragment;
    use std::path::PathBuf;

    /// Write `seconds` of 16kHz mono audio to a WAV file.
    fn write_wav(dir: &Path, seconds: f64) -> PathBuf {
        let path = dir.join("episode.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..(seconds * 16000.0) as usize {
            writer.write_sample((i % 128) as i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    /// Budget admitting roughly `seconds` of 16kHz audio per segment.
    fn budget_for(seconds: f64) -> u64 {
        (seconds * 16000.0 * 2.0 / SEGMENT_SAFETY_FACTOR) as u64 + WAV_HEADER_BYTES
    }

    #[tokio::test]
    async fn test_single_segment_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), 2.0);

        let mock = MockTranscriber::new().with_fragments(vec![
            Fragment::new(0.0, 1.0, "hello"),
            Fragment::new(1.0, 2.0, "world"),
        ]);
        let runner = EpisodeRunner::new(mock);
        let tracker = ProgressTracker::new();

        let transcript = runner.transcribe_file(&path, &tracker).await.unwrap();

        assert_eq!(transcript.full_text, "hello world");
        assert_eq!(transcript.blocks.len(), 2);
        assert_eq!(tracker.snapshot().phase, RunPhase::Complete);
    }

    #[tokio::test]
    async fn test_multi_segment_offsets_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        // 6s split into ~2s segments
        let path = write_wav(dir.path(), 6.0);

        let mock = MockTranscriber::new()
            .with_fragments(vec![Fragment::new(0.0, 1.0, "one")])
            .with_fragments(vec![Fragment::new(0.0, 1.0, "two")])
            .with_fragments(vec![Fragment::new(0.0, 1.0, "three")]);
        let runner = EpisodeRunner::with_segmenter_config(
            mock,
            SegmenterConfig::with_max_bytes(budget_for(2.0)),
        );
        let tracker = ProgressTracker::new();

        let transcript = runner.transcribe_file(&path, &tracker).await.unwrap();

        assert_eq!(transcript.full_text, "one two three");
        assert_eq!(transcript.blocks.len(), 3);

        // Later segments start later on the global timeline
        assert_eq!(transcript.blocks[0].start, 0.0);
        assert!(transcript.blocks[1].start > 1.5);
        assert!(transcript.blocks[2].start > transcript.blocks[1].start);
        assert_eq!(tracker.snapshot().phase, RunPhase::Complete);
    }

    #[tokio::test]
    async fn test_failed_segment_aborts_run_without_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), 6.0);

        // Three segments; the third (index 2) fails after "retries"
        let mock = MockTranscriber::new()
            .with_fragments(vec![Fragment::new(0.0, 1.0, "one")])
            .with_fragments(vec![Fragment::new(0.0, 1.0, "two")])
            .with_failure_on(2);
        let runner = EpisodeRunner::with_segmenter_config(
            mock,
            SegmenterConfig::with_max_bytes(budget_for(2.0)),
        );
        let tracker = ProgressTracker::new();

        let result = runner.transcribe_file(&path, &tracker).await;

        match result {
            Err(PodscribeError::TranscriptionFailed { segment, .. }) => assert_eq!(segment, 2),
            other => panic!("Expected TranscriptionFailed, got {other:?}"),
        }

        let status = tracker.snapshot();
        assert_eq!(status.phase, RunPhase::Failed);
        assert_eq!(status.failed_segment, Some(2));
    }

    #[tokio::test]
    async fn test_oversized_budget_failure_reaches_tracker() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), 1.0);

        let runner = EpisodeRunner::with_segmenter_config(
            MockTranscriber::new(),
            // Smaller than a WAV header: nothing can fit
            SegmenterConfig::with_max_bytes(20),
        );
        let tracker = ProgressTracker::new();

        let result = runner.transcribe_file(&path, &tracker).await;

        assert!(matches!(
            result,
            Err(PodscribeError::SegmentTooLarge { .. })
        ));
        assert_eq!(tracker.snapshot().phase, RunPhase::Failed);
    }

    #[tokio::test]
    async fn test_missing_file_fails_cleanly() {
        let runner = EpisodeRunner::new(MockTranscriber::new());
        let tracker = ProgressTracker::new();

        let result = runner
            .transcribe_file(Path::new("/nonexistent/episode.wav"), &tracker)
            .await;

        assert!(result.is_err());
        assert_eq!(tracker.snapshot().phase, RunPhase::Failed);
    }

    #[tokio::test]
    async fn test_unreachable_url_fails_in_download_phase() {
        let runner = EpisodeRunner::new(MockTranscriber::new());
        let tracker = ProgressTracker::new();

        let result = runner
            .transcribe_url("http://127.0.0.1:1/ep.mp3", &tracker)
            .await;

        assert!(matches!(result, Err(PodscribeError::Download { .. })));
        let status = tracker.snapshot();
        assert_eq!(status.phase, RunPhase::Failed);
        assert!(status.error.as_deref().unwrap().contains("Download"));
    }
}
