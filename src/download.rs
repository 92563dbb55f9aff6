//! Streaming episode download.
//!
//! Streams the enclosure body chunk-by-chunk to a file inside the run's
//! temporary directory, reporting (downloaded, total) to a progress callback
//! after every chunk.

use crate::error::{PodscribeError, Result};
use futures_util::StreamExt;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Download `url` to `dest`, invoking `on_progress` with cumulative bytes and
/// the content length (when the server sends one).
pub async fn download_audio(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    mut on_progress: impl FnMut(u64, Option<u64>),
) -> Result<()> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PodscribeError::Download {
            message: format!("Failed to start download: {e}"),
        })?;

    if !response.status().is_success() {
        return Err(PodscribeError::Download {
            message: format!("HTTP {}", response.status()),
        });
    }

    let total = response.content_length();
    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(dest)
        .map_err(|e| PodscribeError::Download {
            message: format!("Failed to create output file: {e}"),
        })?;

    let mut downloaded: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| PodscribeError::Download {
            message: format!("Failed to read download chunk: {e}"),
        })?;

        file.write_all(&chunk).map_err(|e| PodscribeError::Download {
            message: format!("Failed to write to file: {e}"),
        })?;

        downloaded += chunk.len() as u64;
        on_progress(downloaded, total);
    }

    Ok(())
}

/// Derive a local filename for an enclosure URL, keeping its extension.
///
/// Falls back to `.mp3` when the URL path has no usable extension.
pub fn audio_filename_from_url(url: &str) -> String {
    let extension = reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            let path = u.path().to_string();
            let name = path.rsplit('/').next()?.to_string();
            let (_, ext) = name.rsplit_once('.')?;
            let ext = ext.to_ascii_lowercase();
            // Reject querystring-ish leftovers and absurd extensions
            (!ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
                .then_some(ext)
        })
        .unwrap_or_else(|| "mp3".to_string());

    format!("episode_audio.{extension}")
}
