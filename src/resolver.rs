use std::str::FromStr;
use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::ImportError;
use crate::model::VideoRef;

/// How a processing request selects its videos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// One explicit video id
    VideoId,
    /// Free-text search, relevance order
    Query,
    /// All videos of a channel, newest first
    Channel,
}

impl FromStr for SearchMode {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SearchMode::VideoId),
            "query" => Ok(SearchMode::Query),
            "channel" | "channel_id" => Ok(SearchMode::Channel),
            other => Err(ImportError::NotFound(format!("Invalid search mode: {}", other))),
        }
    }
}

/// Resolves a search mode and argument into an ordered list of videos via
/// the YouTube Data API.
pub struct VideoResolver {
    client: Client,
    api_key: String,
    base_url: String,
    max_results: u32,
}

impl VideoResolver {
    pub fn new(config: &AppConfig) -> Result<Self, ImportError> {
        let api_key = config.youtube_api_key().ok_or_else(|| {
            config::ConfigError::Message(
                "YOUTUBE_API_KEY not found in config or environment".to_string(),
            )
        })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.youtube.connect_timeout_secs))
            .timeout(Duration::from_secs(config.youtube.read_timeout_secs))
            .build()?;

        Ok(VideoResolver {
            client,
            api_key,
            base_url: config.youtube.api_base_url.clone(),
            max_results: config.youtube.max_results,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, max_results: u32) -> Self {
        VideoResolver {
            client: Client::new(),
            api_key,
            base_url,
            max_results,
        }
    }

    /// Resolve `arg` under `mode` into (video id, title) pairs. Order is the
    /// search service's: relevance for queries, publish date descending for
    /// channels.
    pub async fn resolve(&self, mode: SearchMode, arg: &str) -> Result<Vec<VideoRef>, ImportError> {
        let videos = match mode {
            SearchMode::VideoId => self.video_by_id(arg).await?,
            SearchMode::Query => self.search_by_query(arg).await?,
            SearchMode::Channel => self.search_by_channel(arg).await?,
        };
        info!("Resolved {} video(s) for {:?} search", videos.len(), mode);
        Ok(videos)
    }

    /// Fetch metadata for one explicit video id; zero or one result.
    pub async fn video_by_id(&self, video_id: &str) -> Result<Vec<VideoRef>, ImportError> {
        let url = format!("{}/videos", self.base_url);
        let response: VideoListResponse = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| VideoRef {
                video_id: item.id,
                title: item.snippet.title,
            })
            .collect())
    }

    /// Free-text search; empty items is a valid empty result.
    pub async fn search_by_query(&self, query: &str) -> Result<Vec<VideoRef>, ImportError> {
        debug!("Searching videos for query '{}'", query);
        let url = format!("{}/search", self.base_url);
        let max_results = self.max_results.to_string();
        let response: SearchResponse = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(collect_search_items(response))
    }

    /// All videos of a channel, ordered by publish date descending.
    pub async fn search_by_channel(&self, channel_id: &str) -> Result<Vec<VideoRef>, ImportError> {
        debug!("Listing videos for channel '{}'", channel_id);
        let url = format!("{}/search", self.base_url);
        let max_results = self.max_results.to_string();
        let response: SearchResponse = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(collect_search_items(response))
    }

    /// Resolve a vanity handle (e.g. '@yooxicman') to a channel id. A handle
    /// with zero matches is a deterministic lookup miss, never retried.
    pub async fn channel_id_for_handle(&self, handle: &str) -> Result<String, ImportError> {
        let url = format!("{}/channels", self.base_url);
        let response: ChannelListResponse = self
            .client
            .get(&url)
            .query(&[
                ("part", "id"),
                ("forHandle", handle.trim_start_matches('@')),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(|item| item.id)
            .ok_or_else(|| ImportError::NotFound(format!("Channel not found for handle: {}", handle)))
    }
}

fn collect_search_items(response: SearchResponse) -> Vec<VideoRef> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            item.id.video_id.map(|video_id| VideoRef {
                video_id,
                title: item.snippet.title,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn resolver(server: &Server) -> VideoResolver {
        VideoResolver::with_base_url("fake_api_key".to_string(), server.url(), 50)
    }

    #[test]
    fn test_mode_parsing_rejects_unknown_modes() {
        assert_eq!("id".parse::<SearchMode>().unwrap(), SearchMode::VideoId);
        assert_eq!("query".parse::<SearchMode>().unwrap(), SearchMode::Query);
        assert_eq!("channel".parse::<SearchMode>().unwrap(), SearchMode::Channel);

        let err = "playlist".parse::<SearchMode>().unwrap_err();
        assert!(matches!(err, ImportError::NotFound(_)));
        assert!(err.to_string().contains("playlist"));
    }

    #[tokio::test]
    async fn test_search_by_query_returns_pairs_in_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("q".into(), "garlic pasta".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "items": [
                        {"id": {"videoId": "video1"}, "snippet": {"title": "Title 1"}},
                        {"id": {"videoId": "video2"}, "snippet": {"title": "Title 2"}}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let videos = resolver(&server)
            .search_by_query("garlic pasta")
            .await
            .unwrap();

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].video_id, "video1");
        assert_eq!(videos[0].title, "Title 1");
        assert_eq!(videos[1].video_id, "video2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_with_no_items_is_a_valid_empty_result() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let videos = resolver(&server).search_by_query("nothing").await.unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn test_video_by_id_returns_single_pair() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/videos")
            .match_query(Matcher::UrlEncoded("id".into(), "abc123".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": [{"id": "abc123", "snippet": {"title": "Garlic Pasta"}}]}"#)
            .create_async()
            .await;

        let videos = resolver(&server).video_by_id("abc123").await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "abc123");
        assert_eq!(videos[0].title, "Garlic Pasta");
    }

    #[tokio::test]
    async fn test_channel_search_requests_date_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("channelId".into(), "channel123".into()),
                Matcher::UrlEncoded("order".into(), "date".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": [{"id": {"videoId": "video1"}, "snippet": {"title": "Newest"}}]}"#)
            .create_async()
            .await;

        let videos = resolver(&server).search_by_channel("channel123").await.unwrap();
        assert_eq!(videos.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_handle_resolution_strips_at_sign() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/channels")
            .match_query(Matcher::UrlEncoded("forHandle".into(), "TestChannel".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": [{"id": "channel123"}]}"#)
            .create_async()
            .await;

        let channel_id = resolver(&server)
            .channel_id_for_handle("@TestChannel")
            .await
            .unwrap();

        assert_eq!(channel_id, "channel123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_handle_with_no_items_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/channels")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let err = resolver(&server)
            .channel_id_for_handle("@NoSuchChannel")
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::NotFound(_)));
        assert!(err.to_string().contains("@NoSuchChannel"));
    }
}
