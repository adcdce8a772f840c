pub mod batch;
pub mod config;
pub mod error;
pub mod extractor;
pub mod model;
pub mod providers;
pub mod resolver;
pub mod retry;
pub mod transcript;

pub use batch::BatchProcessor;
pub use config::AppConfig;
pub use error::{ImportError, ModelResponseError};
pub use extractor::RecipeExtractor;
pub use model::{
    Ingredient, InstructionStep, NutritionalInfo, Recipe, Transcript, TranscriptRecord,
    TranscriptSnippet, VideoRef,
};
pub use resolver::{SearchMode, VideoResolver};
pub use retry::RetryPolicy;
pub use transcript::TranscriptFetcher;

use log::warn;

/// Resolve videos for `mode`/`arg` and fetch every transcript, one record per
/// resolved video.
pub async fn process_batch(
    config: &AppConfig,
    mode: SearchMode,
    arg: &str,
) -> Result<Vec<TranscriptRecord>, ImportError> {
    BatchProcessor::new(config)?.process(mode, arg).await
}

/// End-to-end pipeline for one explicit video id: resolve, fetch, flatten,
/// generate.
pub async fn import_recipe(config: &AppConfig, video_id: &str) -> Result<Recipe, ImportError> {
    let records = process_batch(config, SearchMode::VideoId, video_id).await?;
    let record = records.into_iter().next().ok_or_else(|| {
        ImportError::NotFound(format!("Video not found or no transcript available: {}", video_id))
    })?;

    RecipeExtractor::new(config)?.generate(&record).await
}

/// Search for videos and generate a recipe per result. A video whose
/// generation fails is skipped; only a batch that yields no recipe at all is
/// an error.
pub async fn scrape_query(config: &AppConfig, query: &str) -> Result<Vec<Recipe>, ImportError> {
    let records = process_batch(config, SearchMode::Query, query).await?;
    generate_all(config, records).await
}

/// Resolve a channel handle (or accept a raw channel id) and generate a
/// recipe per video on the channel.
pub async fn scrape_channel(config: &AppConfig, channel: &str) -> Result<Vec<Recipe>, ImportError> {
    let channel_id = if channel.starts_with('@') {
        VideoResolver::new(config)?
            .channel_id_for_handle(channel)
            .await?
    } else {
        channel.to_string()
    };

    let records = process_batch(config, SearchMode::Channel, &channel_id).await?;
    generate_all(config, records).await
}

async fn generate_all(
    config: &AppConfig,
    records: Vec<TranscriptRecord>,
) -> Result<Vec<Recipe>, ImportError> {
    let mut extractor = RecipeExtractor::new(config)?;

    let mut recipes = Vec::new();
    for record in &records {
        match extractor.generate(record).await {
            Ok(recipe) => recipes.push(recipe),
            Err(e) => warn!("Skipping video {}: {}", record.video_id, e),
        }
    }

    if recipes.is_empty() {
        return Err(ImportError::NotFound(
            "No recipes could be generated from the videos".to_string(),
        ));
    }
    Ok(recipes)
}
