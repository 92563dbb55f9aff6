//! Error types for podscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PodscribeError {
    // Feed resolution errors
    #[error("Failed to fetch RSS feed: {message}")]
    FeedFetch { message: String },

    #[error("Failed to parse RSS feed: {message}")]
    FeedParse { message: String },

    #[error("No episodes with audio enclosures found in RSS feed")]
    FeedNoEpisodes,

    #[error("Episode index {index} not found. Available: 0-{}", .available.saturating_sub(1))]
    EpisodeNotFound { index: usize, available: usize },

    // Download errors
    #[error("Download failed: {message}")]
    Download { message: String },

    // Audio decode errors
    #[error("Failed to decode audio: {message}")]
    AudioDecode { message: String },

    // Segmentation errors
    #[error("Segment {index} is {size} bytes, exceeding the {budget} byte budget")]
    SegmentTooLarge { index: usize, size: u64, budget: u64 },

    // Transcription errors
    #[error("Transcription of segment {segment} failed: {message}")]
    TranscriptionFailed { segment: usize, message: String },

    #[error(
        "API key not configured. Set api.api_key in config or the OPENAI_API_KEY environment variable"
    )]
    MissingApiKey,

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl PodscribeError {
    /// The zero-based segment index this error concerns, if any.
    ///
    /// Used by the progress tracker to surface the failing segment in the
    /// terminal `Failed` status.
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            PodscribeError::SegmentTooLarge { index, .. } => Some(*index),
            PodscribeError::TranscriptionFailed { segment, .. } => Some(*segment),
            _ => None,
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, PodscribeError>;
