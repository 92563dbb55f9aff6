//! Speech-to-text adapters.

pub mod transcriber;
pub mod whisper_api;

pub use transcriber::{MockTranscriber, SegmentTranscriber};
pub use whisper_api::{WhisperApiClient, WhisperApiConfig};
