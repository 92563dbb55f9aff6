//! Transcription adapter seam.
//!
//! The pipeline only ever talks to a [`SegmentTranscriber`], so the network
//! client can be swapped for a mock in tests.

use crate::error::{PodscribeError, Result};
use crate::timeline::{AudioSegment, Fragment};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for per-segment speech-to-text.
///
/// Implementations receive one encoded segment and return timestamped
/// fragments in the segment's local time, starting at 0, ordered as the
/// service produced them.
#[async_trait]
pub trait SegmentTranscriber: Send + Sync {
    /// Transcribe one audio segment.
    ///
    /// # Errors
    /// `TranscriptionFailed` carrying the segment index once retries (if any)
    /// are exhausted. Never silently skips a segment.
    async fn transcribe(&self, segment: &AudioSegment) -> Result<Vec<Fragment>>;
}

/// Implement SegmentTranscriber for Arc<T> to allow sharing across runs.
#[async_trait]
impl<T: SegmentTranscriber> SegmentTranscriber for Arc<T> {
    async fn transcribe(&self, segment: &AudioSegment) -> Result<Vec<Fragment>> {
        (**self).transcribe(segment).await
    }
}

/// Mock transcriber for testing.
#[derive(Debug, Clone, Default)]
pub struct MockTranscriber {
    /// Fragment sequences keyed by segment index.
    responses: Vec<Vec<Fragment>>,
    /// Segment index that fails on every attempt.
    fail_on: Option<usize>,
}

impl MockTranscriber {
    /// Create a mock that returns empty fragment lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the fragment sequence returned for the next segment index.
    pub fn with_fragments(mut self, fragments: Vec<Fragment>) -> Self {
        self.responses.push(fragments);
        self
    }

    /// Configure the mock to fail when asked for the given segment index.
    pub fn with_failure_on(mut self, segment_index: usize) -> Self {
        self.fail_on = Some(segment_index);
        self
    }
}

#[async_trait]
impl SegmentTranscriber for MockTranscriber {
    async fn transcribe(&self, segment: &AudioSegment) -> Result<Vec<Fragment>> {
        if self.fail_on == Some(segment.index) {
            return Err(PodscribeError::TranscriptionFailed {
                segment: segment.index,
                message: "mock transcription failure".to_string(),
            });
        }

        Ok(self
            .responses
            .get(segment.index)
            .cloned()
            .unwrap_or_default())
    }
}
