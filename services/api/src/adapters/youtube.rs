//! services/api/src/adapters/youtube.rs
//!
//! This module contains the adapter for the YouTube Data API, which resolves
//! a lesson's video search query into embeddable videos. It implements the
//! `VideoSearchService` port from the `core` crate.

use async_trait::async_trait;
use coursecraft_core::domain::VideoResult;
use coursecraft_core::ports::{PortError, PortResult, VideoSearchService};
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// An adapter that implements `VideoSearchService` using the YouTube Data
/// API v3 search endpoint.
#[derive(Clone)]
pub struct YouTubeAdapter {
    http: Client,
    api_key: String,
    base_url: Option<String>,
}

impl YouTubeAdapter {
    pub fn new(http: Client, api_key: String, base_url: Option<String>) -> Self {
        Self {
            http,
            api_key,
            base_url,
        }
    }
}

//=========================================================================================
// Response shapes (only the fields we read)
//=========================================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    thumbnails: Thumbnails,
}

#[derive(Deserialize)]
struct Thumbnails {
    medium: Thumbnail,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

//=========================================================================================
// `VideoSearchService` Trait Implementation
//=========================================================================================

#[async_trait]
impl VideoSearchService for YouTubeAdapter {
    async fn search(&self, query: &str, max_results: u32) -> PortResult<Vec<VideoResult>> {
        let url = format!(
            "{}/youtube/v3/search",
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
        );

        let response = self
            .http
            .get(url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("videoEmbeddable", "true"),
                ("maxResults", &max_results.to_string()),
                ("key", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("YouTube request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "YouTube error [{status}]: {body}"
            )));
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("YouTube response was not JSON: {e}")))?;

        let videos = data
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let embed_url = format!("https://www.youtube.com/embed/{video_id}");
                Some(VideoResult {
                    video_id,
                    title: item.snippet.title,
                    thumbnail: item.snippet.thumbnails.medium.url,
                    channel_title: item.snippet.channel_title,
                    embed_url,
                })
            })
            .collect();

        Ok(videos)
    }
}
