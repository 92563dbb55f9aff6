//! Per-run progress state machine and snapshot publication.
//!
//! One episode run moves through
//! `Pending -> Downloading -> Segmenting -> Transcribing(i/N) -> Assembling -> Complete`,
//! with `Failed` reachable from any non-terminal phase. Terminal phases absorb
//! all later updates. A concurrent observer polls `snapshot()`, which copies
//! the whole status under one lock so the transcription counter pair can
//! never be read torn.

use crate::error::PodscribeError;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Phase of one episode run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RunPhase {
    Pending,
    Downloading,
    Segmenting,
    Transcribing { completed: usize, total: usize },
    Assembling,
    Complete,
    Failed,
}

impl RunPhase {
    /// Terminal phases accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Complete | RunPhase::Failed)
    }
}

/// Snapshot of a run's progress, safe to hand to a polling observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatus {
    pub phase: RunPhase,
    pub episode_title: Option<String>,
    /// Download completion 0.0..=100.0, when known.
    pub download_percent: Option<f32>,
    pub error: Option<String>,
    /// Zero-based index of the segment that caused a failure, if applicable.
    pub failed_segment: Option<usize>,
}

impl Default for RunStatus {
    fn default() -> Self {
        Self {
            phase: RunPhase::Pending,
            episode_title: None,
            download_percent: None,
            error: None,
            failed_segment: None,
        }
    }
}

/// Cloneable handle to one run's mutable status.
///
/// All writers go through this handle; readers take owned snapshots.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<Mutex<RunStatus>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned copy of the current status.
    pub fn snapshot(&self) -> RunStatus {
        self.lock().clone()
    }

    /// Advance to a new phase. Ignored once the run is terminal.
    pub fn set_phase(&self, phase: RunPhase) {
        let mut status = self.lock();
        if status.phase.is_terminal() {
            return;
        }
        status.phase = phase;
    }

    /// Record the episode being processed.
    pub fn set_episode_title(&self, title: impl Into<String>) {
        let mut status = self.lock();
        if status.phase.is_terminal() {
            return;
        }
        status.episode_title = Some(title.into());
    }

    /// Publish download progress as a percentage when the total is known.
    pub fn set_download_progress(&self, downloaded: u64, total: Option<u64>) {
        let mut status = self.lock();
        if status.phase.is_terminal() {
            return;
        }
        status.download_percent = total
            .filter(|&t| t > 0)
            .map(|t| (downloaded as f64 / t as f64 * 100.0).min(100.0) as f32);
    }

    /// Enter the terminal `Complete` phase.
    pub fn complete(&self) {
        let mut status = self.lock();
        if status.phase.is_terminal() {
            return;
        }
        status.phase = RunPhase::Complete;
    }

    /// Enter the terminal `Failed` phase with the fatal error.
    pub fn fail(&self, error: &PodscribeError) {
        let mut status = self.lock();
        if status.phase.is_terminal() {
            return;
        }
        status.phase = RunPhase::Failed;
        status.error = Some(error.to_string());
        status.failed_segment = error.segment_index();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RunStatus> {
        // A poisoned status lock means a writer panicked; the data is a plain
        // snapshot either way.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_pending() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.snapshot().phase, RunPhase::Pending);
    }

    #[test]
    fn test_phase_transitions() {
        let tracker = ProgressTracker::new();

        tracker.set_phase(RunPhase::Downloading);
        assert_eq!(tracker.snapshot().phase, RunPhase::Downloading);

        tracker.set_phase(RunPhase::Transcribing {
            completed: 2,
            total: 5,
        });
        assert_eq!(
            tracker.snapshot().phase,
            RunPhase::Transcribing {
                completed: 2,
                total: 5
            }
        );
    }

    #[test]
    fn test_complete_is_terminal() {
        let tracker = ProgressTracker::new();
        tracker.complete();

        tracker.set_phase(RunPhase::Downloading);
        tracker.set_episode_title("late");
        assert_eq!(tracker.snapshot().phase, RunPhase::Complete);
        assert_eq!(tracker.snapshot().episode_title, None);
    }

    #[test]
    fn test_failed_is_terminal() {
        let tracker = ProgressTracker::new();
        tracker.fail(&PodscribeError::TranscriptionFailed {
            segment: 2,
            message: "boom".to_string(),
        });

        let status = tracker.snapshot();
        assert_eq!(status.phase, RunPhase::Failed);
        assert_eq!(status.failed_segment, Some(2));
        assert!(status.error.as_deref().unwrap().contains("boom"));

        // No escape from Failed, not even into Complete
        tracker.complete();
        assert_eq!(tracker.snapshot().phase, RunPhase::Failed);
    }

    #[test]
    fn test_fail_without_segment_context() {
        let tracker = ProgressTracker::new();
        tracker.fail(&PodscribeError::FeedNoEpisodes);

        let status = tracker.snapshot();
        assert_eq!(status.phase, RunPhase::Failed);
        assert_eq!(status.failed_segment, None);
    }

    #[test]
    fn test_download_progress_percent() {
        let tracker = ProgressTracker::new();

        tracker.set_download_progress(50, Some(200));
        assert_eq!(tracker.snapshot().download_percent, Some(25.0));

        tracker.set_download_progress(300, Some(200));
        assert_eq!(tracker.snapshot().download_percent, Some(100.0));

        tracker.set_download_progress(300, None);
        assert_eq!(tracker.snapshot().download_percent, None);
    }

    #[test]
    fn test_snapshot_counter_pair_is_consistent() {
        // Writers replace the whole phase value under the lock, so a snapshot
        // can never pair a numerator with a stale denominator.
        let tracker = ProgressTracker::new();
        let writer = {
            let tracker = tracker.clone();
            std::thread::spawn(move || {
                for total in [5usize, 10, 20] {
                    for completed in 0..=total {
                        tracker.set_phase(RunPhase::Transcribing { completed, total });
                    }
                }
            })
        };

        for _ in 0..1000 {
            if let RunPhase::Transcribing { completed, total } = tracker.snapshot().phase {
                assert!(completed <= total);
            }
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_status_serializes() {
        let tracker = ProgressTracker::new();
        tracker.set_phase(RunPhase::Transcribing {
            completed: 1,
            total: 3,
        });

        let json = serde_json::to_value(tracker.snapshot()).unwrap();
        assert_eq!(json["phase"]["phase"], "transcribing");
        assert_eq!(json["phase"]["completed"], 1);
        assert_eq!(json["phase"]["total"], 3);
    }
}
