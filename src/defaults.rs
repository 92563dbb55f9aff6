//! Default configuration constants for podscribe.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Audio sample rate in Hz that all decoded audio is normalized to.
///
/// 16kHz mono is the standard input rate for speech recognition and keeps
/// segment WAV payloads small without hurting recognition quality.
pub const SAMPLE_RATE: u32 = 16000;

/// Hard per-request upload limit of the transcription API, in bytes (25 MB).
pub const API_UPLOAD_LIMIT_BYTES: u64 = 25 * 1024 * 1024;

/// Default per-segment byte budget (24 MB).
///
/// Sits below [`API_UPLOAD_LIMIT_BYTES`] so a segment never brushes against the
/// service's hard limit.
pub const MAX_SEGMENT_BYTES: u64 = 24 * 1024 * 1024;

/// Safety factor applied when converting the byte budget into a per-segment
/// sample budget.
///
/// Targets ~95% of the budget so container overhead never pushes an encoded
/// segment over the limit.
pub const SEGMENT_SAFETY_FACTOR: f64 = 0.95;

/// Size of a canonical PCM WAV header in bytes.
pub const WAV_HEADER_BYTES: u64 = 44;

/// Default transcription model name.
pub const DEFAULT_MODEL: &str = "whisper-1";

/// Default transcription endpoint (OpenAI-compatible).
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Maximum attempts per segment before the run fails with `TranscriptionFailed`.
pub const MAX_ATTEMPTS: u32 = 3;

/// Initial retry backoff in milliseconds; doubles on each failed attempt.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Number of episodes the CLI lists before truncating with a count.
pub const EPISODE_LIST_LIMIT: usize = 10;
