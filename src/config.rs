use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// YouTube data API and caption source settings
    #[serde(default)]
    pub youtube: YoutubeConfig,
    /// Text-generation settings
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Retry budgets for the fetch and batch layers
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Settings for video resolution and transcript fetching
#[derive(Debug, Deserialize, Clone)]
pub struct YoutubeConfig {
    /// Data API key (can also be set via the YOUTUBE_API_KEY environment variable)
    pub api_key: Option<String>,
    /// Base URL of the data API (overridable for tests)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL of the watch pages the caption tracks are discovered on
    #[serde(default = "default_watch_base_url")]
    pub watch_base_url: String,
    /// Preferred transcript language code
    #[serde(default = "default_language")]
    pub language: String,
    /// Cap on resolved videos per request
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Connect timeout for resolver and caption requests, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Read timeout for resolver and caption requests, in seconds
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        YoutubeConfig {
            api_key: None,
            api_base_url: default_api_base_url(),
            watch_base_url: default_watch_base_url(),
            language: default_language(),
            max_results: default_max_results(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

/// Settings for the recipe-generation model
#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    /// API key (can also be set via the OPENAI_API_KEY environment variable)
    pub api_key: Option<String>,
    /// Base URL for the API endpoint (overridable for tests or proxies)
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature, balanced between creativity and accuracy
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Retry budgets. The fetch layer retries only the transient caption-parse
/// class with a fixed delay; the batch layer retries the whole fetch+flatten
/// unit with no added delay before degrading to an error record.
#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,
    #[serde(default = "default_batch_attempts")]
    pub batch_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            fetch_attempts: default_fetch_attempts(),
            fetch_delay_ms: default_fetch_delay_ms(),
            batch_attempts: default_batch_attempts(),
        }
    }
}

// Default value functions
fn default_api_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_watch_base_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_results() -> u32 {
    50
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_read_timeout_secs() -> u64 {
    60
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_fetch_delay_ms() -> u64 {
    500
}

fn default_batch_attempts() -> u32 {
    4
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with TUBECHEF__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: TUBECHEF__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: TUBECHEF__YOUTUBE__LANGUAGE
            .add_source(
                Environment::with_prefix("TUBECHEF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// YouTube API key from config or the conventional environment variable
    pub fn youtube_api_key(&self) -> Option<String> {
        self.youtube
            .api_key
            .clone()
            .or_else(|| std::env::var("YOUTUBE_API_KEY").ok())
    }

    /// OpenAI API key from config or the conventional environment variable
    pub fn openai_api_key(&self) -> Option<String> {
        self.openai
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}
