//! Episode resolver: RSS feed parsing and episode selection.
//!
//! Keeps only feed items with an `audio/*` enclosure, in feed order (most
//! recent first for typical podcast feeds, matching the index the user sees).

use crate::error::{PodscribeError, Result};

/// One playable episode from a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// Position in the list of audio episodes, 0 = most recent.
    pub index: usize,
    pub title: String,
    pub published: Option<String>,
    pub audio_url: String,
    pub description: Option<String>,
}

/// Parse RSS XML into the list of audio episodes.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<Episode>> {
    let channel = rss::Channel::read_from(xml).map_err(|e| PodscribeError::FeedParse {
        message: e.to_string(),
    })?;

    let episodes: Vec<Episode> = channel
        .items()
        .iter()
        .filter_map(|item| {
            let enclosure = item.enclosure()?;
            if !enclosure.mime_type().starts_with("audio/") {
                return None;
            }
            Some((item, enclosure.url().to_string()))
        })
        .enumerate()
        .map(|(index, (item, audio_url))| Episode {
            index,
            title: item.title().unwrap_or("Untitled episode").to_string(),
            published: item.pub_date().map(str::to_string),
            audio_url,
            description: item.description().map(str::to_string),
        })
        .collect();

    if episodes.is_empty() {
        return Err(PodscribeError::FeedNoEpisodes);
    }

    Ok(episodes)
}

/// Fetch a feed URL and parse its audio episodes.
pub async fn fetch_episodes(client: &reqwest::Client, url: &str) -> Result<Vec<Episode>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PodscribeError::FeedFetch {
            message: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(PodscribeError::FeedFetch {
            message: format!("HTTP {}", response.status()),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| PodscribeError::FeedFetch {
            message: e.to_string(),
        })?;

    parse_feed(&body)
}

/// Select an episode by index.
pub fn select_episode(episodes: &[Episode], index: usize) -> Result<&Episode> {
    episodes
        .get(index)
        .ok_or(PodscribeError::EpisodeNotFound {
            index,
            available: episodes.len(),
        })
}
