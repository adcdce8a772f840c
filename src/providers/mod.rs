mod open_ai;
mod prompt;

pub use open_ai::OpenAiModel;
pub use prompt::{render_extraction_prompt, RECIPE_SYSTEM_PROMPT};

use async_trait::async_trait;

use crate::error::ImportError;

/// Seam over the text-generation service. One call submits a system
/// instruction and a rendered prompt and returns the raw text payload; all
/// recipe-level validation happens above this trait.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Name of the backing model service (e.g. "openai")
    fn model_name(&self) -> &str;

    /// Issue exactly one generation call requesting a JSON-object response
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ImportError>;
}
