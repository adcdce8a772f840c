use std::time::Duration;

use log::debug;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::ImportError;
use crate::model::{Transcript, TranscriptSnippet};
use crate::retry::RetryPolicy;

/// Fetches a single video's timestamped transcript.
///
/// One attempt walks the same path a browser does: load the watch page,
/// discover the caption track list embedded in it, then download and parse
/// the selected track's timedtext XML. A payload that cannot be parsed into
/// snippets is the transient class and is retried under the policy; caption
/// tracks being absent entirely, the language being unavailable, and
/// transport failures are all fatal on first occurrence.
pub struct TranscriptFetcher {
    client: Client,
    watch_base_url: String,
    language: String,
    policy: RetryPolicy,
}

impl TranscriptFetcher {
    pub fn new(config: &AppConfig) -> Result<Self, ImportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.youtube.connect_timeout_secs))
            .timeout(Duration::from_secs(config.youtube.read_timeout_secs))
            .build()?;

        Ok(TranscriptFetcher {
            client,
            watch_base_url: config.youtube.watch_base_url.clone(),
            language: config.youtube.language.clone(),
            policy: RetryPolicy::new(
                config.retry.fetch_attempts,
                Duration::from_millis(config.retry.fetch_delay_ms),
            ),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(watch_base_url: String, language: String, policy: RetryPolicy) -> Self {
        TranscriptFetcher {
            client: Client::new(),
            watch_base_url,
            language,
            policy,
        }
    }

    /// Fetch the transcript for `video_id`. Two outcomes: a transcript, or
    /// the last transient error once the retry budget is exhausted.
    pub async fn fetch(&self, video_id: &str) -> Result<Transcript, ImportError> {
        let label = format!("Fetching transcript for video {}", video_id);
        self.policy
            .run(&label, ImportError::is_transient, || self.fetch_once(video_id))
            .await
    }

    async fn fetch_once(&self, video_id: &str) -> Result<Transcript, ImportError> {
        let watch_url = format!("{}/watch?v={}", self.watch_base_url, video_id);
        let page = self.client.get(&watch_url).send().await?.text().await?;

        let tracks = extract_caption_tracks(&page)?;
        let track = select_track(&tracks, &self.language).ok_or_else(|| {
            ImportError::FatalFetch(format!(
                "No '{}' transcript available for video {}",
                self.language, video_id
            ))
        })?;
        debug!(
            "Selected caption track '{}' (generated: {}) for video {}",
            track.language_code,
            track.is_generated(),
            video_id
        );

        let body = self.client.get(&track.base_url).send().await?.text().await?;
        let snippets = parse_timedtext(&body)?;

        Ok(Transcript {
            video_id: video_id.to_string(),
            language_code: track.language_code.clone(),
            is_generated: track.is_generated(),
            snippets,
        })
    }
}

/// One entry of the caption track list embedded in a watch page
#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    /// "asr" marks an auto-generated track
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Locate and deserialize the `"captionTracks": [...]` array embedded in the
/// watch page. A page without the marker has no captions at all (fatal); a
/// marker followed by undecodable JSON is a malformed upstream response
/// (transient).
fn extract_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>, ImportError> {
    const MARKER: &str = "\"captionTracks\":";

    let start = page
        .find(MARKER)
        .ok_or_else(|| ImportError::FatalFetch("No captions available for this video".to_string()))?;
    let rest = &page[start + MARKER.len()..];

    // Deserialize just the array and ignore whatever follows it
    let mut deserializer = serde_json::Deserializer::from_str(rest);
    Vec::<CaptionTrack>::deserialize(&mut deserializer)
        .map_err(|e| ImportError::TransientFetch(format!("Defective caption track list: {}", e)))
}

/// Pick the track for the requested language, preferring a manually created
/// track over an auto-generated one.
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let in_language = || tracks.iter().filter(|t| t.language_code == language);
    in_language()
        .find(|t| !t.is_generated())
        .or_else(|| in_language().next())
}

/// Parse a timedtext XML body into ordered snippets. Document order is
/// start-time order; it is preserved as-is.
fn parse_timedtext(body: &str) -> Result<Vec<TranscriptSnippet>, ImportError> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("text").unwrap();

    let mut snippets = Vec::new();
    for element in document.select(&selector) {
        let start = parse_seconds(element.value().attr("start"))?;
        let duration = parse_seconds(element.value().attr("dur"))?;
        let raw: String = element.text().collect();
        let text = html_escape::decode_html_entities(&raw).trim().to_string();
        if text.is_empty() {
            continue;
        }
        snippets.push(TranscriptSnippet {
            text,
            start,
            duration,
        });
    }

    if snippets.is_empty() {
        return Err(ImportError::TransientFetch(
            "Caption payload contained no snippets".to_string(),
        ));
    }

    Ok(snippets)
}

fn parse_seconds(attr: Option<&str>) -> Result<f64, ImportError> {
    attr.and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| ImportError::TransientFetch("Malformed snippet timing".to_string()))
}
