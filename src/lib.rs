//! podscribe - podcast episode transcription via chunked speech-to-text.
//!
//! Fetches an episode from an RSS feed, cuts its audio into size-bounded
//! segments, transcribes each segment through an OpenAI-compatible API, and
//! reassembles the results into a plain transcript and an SRT subtitle file.

// Enforce error handling discipline in non-test code
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod download;
pub mod error;
pub mod feed;
pub mod progress;
pub mod run;
pub mod stt;
pub mod tasks;
pub mod timeline;

// Core pipeline (segment → transcribe → assemble)
pub use run::EpisodeRunner;
pub use timeline::{
    AudioSegment, Fragment, SegmentFragments, SegmenterConfig, SubtitleBlock, Transcript,
    assemble, segment,
};

// Adapter seam
pub use stt::{MockTranscriber, SegmentTranscriber, WhisperApiClient, WhisperApiConfig};

// Progress and task surface
pub use progress::{ProgressTracker, RunPhase, RunStatus};
pub use tasks::TaskRegistry;

// Episode resolution
pub use feed::{Episode, fetch_episodes, select_episode};

// Error handling
pub use error::{PodscribeError, Result};

// Config
pub use config::Config;
