use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::{ImportError, ModelResponseError};
use crate::providers::TextModel;

pub struct OpenAiModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiModel {
    /// Create a model client from configuration, falling back to the
    /// OPENAI_API_KEY environment variable for the key
    pub fn new(config: &AppConfig) -> Result<Self, ImportError> {
        let api_key = config.openai_api_key().ok_or_else(|| {
            config::ConfigError::Message(
                "OPENAI_API_KEY not found in config or environment".to_string(),
            )
        })?;

        Ok(OpenAiModel {
            client: Client::new(),
            api_key,
            base_url: config.openai.base_url.clone(),
            model: config.openai.model.clone(),
            temperature: config.openai.temperature,
            max_tokens: config.openai.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAiModel {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[async_trait]
impl TextModel for OpenAiModel {
    fn model_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ImportError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": prompt}
                ],
                "response_format": {"type": "json_object"},
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        debug!("{:?}", body);

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default();
        if content.is_empty() {
            return Err(ModelResponseError::EmptyResponse.into());
        }

        Ok(content.to_string())
    }
}
