//! OpenAI-compatible transcription API client.
//!
//! Posts one segment per request as multipart form data and parses the
//! `verbose_json` response into timestamped fragments. The service is treated
//! as unreliable: network errors, 429 and 5xx responses are retried with
//! exponential backoff up to a bounded attempt count, then surfaced as
//! `TranscriptionFailed` carrying the segment index.

use crate::config::ApiConfig;
use crate::error::{PodscribeError, Result};
use crate::timeline::{AudioSegment, Fragment};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::transcriber::SegmentTranscriber;

/// Configuration for the remote transcription client.
#[derive(Debug, Clone)]
pub struct WhisperApiConfig {
    /// Full endpoint URL, e.g. `https://api.openai.com/v1/audio/transcriptions`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub language: Option<String>,
    /// Attempts per segment before giving up.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles per attempt.
    pub initial_backoff: Duration,
}

impl WhisperApiConfig {
    /// Build from app configuration.
    ///
    /// # Errors
    /// `MissingApiKey` if no key was configured or found in the environment.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let api_key = api
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(PodscribeError::MissingApiKey)?;

        Ok(Self {
            base_url: api.base_url.trim().trim_end_matches('/').to_string(),
            api_key,
            model: api.model.clone(),
            language: api.language.clone(),
            max_attempts: api.max_attempts.max(1),
            initial_backoff: Duration::from_millis(api.initial_backoff_ms),
        })
    }
}

/// Remote segment transcriber.
pub struct WhisperApiClient {
    http: reqwest::Client,
    config: WhisperApiConfig,
}

/// `verbose_json` response body.
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<ApiSegment>,
}

#[derive(Debug, Deserialize)]
struct ApiSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Whether a failed attempt is worth repeating.
enum ApiCallError {
    Retryable(String),
    Fatal(String),
}

impl WhisperApiClient {
    pub fn new(config: WhisperApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// One upload attempt, no retries.
    async fn request(&self, segment: &AudioSegment) -> std::result::Result<Vec<Fragment>, ApiCallError> {
        let part = reqwest::multipart::Part::bytes(segment.wav_bytes.clone())
            .file_name(format!("segment-{}.wav", segment.index))
            .mime_str("audio/wav")
            .map_err(|e| ApiCallError::Fatal(format!("invalid mime type: {e}")))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        if let Some(ref language) = self.config.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .http
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiCallError::Retryable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP {}: {}", status, truncate(&body, 200));
            return if is_retryable_status(status) {
                Err(ApiCallError::Retryable(message))
            } else {
                Err(ApiCallError::Fatal(message))
            };
        }

        let body: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| ApiCallError::Fatal(format!("invalid response body: {e}")))?;

        Ok(fragments_from_response(body, segment.duration))
    }
}

#[async_trait]
impl SegmentTranscriber for WhisperApiClient {
    async fn transcribe(&self, segment: &AudioSegment) -> Result<Vec<Fragment>> {
        let mut backoff = self.config.initial_backoff;
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_attempts {
            match self.request(segment).await {
                Ok(fragments) => return Ok(fragments),
                Err(ApiCallError::Fatal(message)) => {
                    return Err(PodscribeError::TranscriptionFailed {
                        segment: segment.index,
                        message,
                    });
                }
                Err(ApiCallError::Retryable(message)) => {
                    log::warn!(
                        "segment {}: attempt {}/{} failed: {}",
                        segment.index,
                        attempt,
                        self.config.max_attempts,
                        message
                    );
                    last_error = message;
                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(PodscribeError::TranscriptionFailed {
            segment: segment.index,
            message: format!(
                "gave up after {} attempts: {}",
                self.config.max_attempts, last_error
            ),
        })
    }
}

/// 429 and server errors are transient; everything else is caller error.
fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Map the response body to fragments.
///
/// If the service returned text without timestamped segments, synthesize a
/// single fragment spanning the whole segment so the timeline stays covered.
fn fragments_from_response(body: VerboseTranscription, segment_duration: f64) -> Vec<Fragment> {
    if !body.segments.is_empty() {
        return body
            .segments
            .into_iter()
            .map(|s| Fragment::new(s.start, s.end, s.text))
            .collect();
    }

    let text = body.text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    vec![Fragment::new(0.0, segment_duration, text)]
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
