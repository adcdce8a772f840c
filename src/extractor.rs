use log::{debug, info};
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{ImportError, ModelResponseError};
use crate::model::{Ingredient, InstructionStep, NutritionalInfo, Recipe, TranscriptRecord};
use crate::providers::{render_extraction_prompt, OpenAiModel, TextModel, RECIPE_SYSTEM_PROMPT};

/// Generates and validates recipes from flattened transcripts.
///
/// One generation call per record, never retried here: a malformed generation
/// is a terminal failure for that video, and a caller who wants another
/// attempt calls `generate` again. The most recent successful recipe is kept
/// in a single slot read by the guarded accessors.
pub struct RecipeExtractor {
    model: Box<dyn TextModel>,
    recipe: Option<Recipe>,
}

impl RecipeExtractor {
    pub fn new(config: &AppConfig) -> Result<Self, ImportError> {
        Ok(RecipeExtractor {
            model: Box::new(OpenAiModel::new(config)?),
            recipe: None,
        })
    }

    /// Build an extractor over any text model (used by tests)
    pub fn with_model(model: Box<dyn TextModel>) -> Self {
        RecipeExtractor {
            model,
            recipe: None,
        }
    }

    /// Generate a recipe from one transcript record.
    ///
    /// Blank transcript text is rejected before any network call. The raw
    /// response is validated in strict order; each stage has its own error so
    /// callers see a named failure, not a generic one.
    pub async fn generate(&mut self, record: &TranscriptRecord) -> Result<Recipe, ImportError> {
        if record.text.trim().is_empty() {
            return Err(ImportError::EmptyInput);
        }

        let prompt = render_extraction_prompt(&record.text);
        debug!(
            "Requesting recipe for video {} from {}",
            record.video_id,
            self.model.model_name()
        );
        let content = self.model.complete(RECIPE_SYSTEM_PROMPT, &prompt).await?;

        let recipe = validate_response(&content, &record.video_id)?;
        info!("Generated recipe '{}' for video {}", recipe.title, recipe.video_id);
        self.recipe = Some(recipe.clone());
        Ok(recipe)
    }

    /// The ingredients of the last generated recipe
    pub fn ingredients(&self) -> Result<&[Ingredient], ImportError> {
        Ok(&self.current()?.ingredients)
    }

    /// The instruction steps of the last generated recipe
    pub fn steps(&self) -> Result<&[InstructionStep], ImportError> {
        Ok(&self.current()?.steps)
    }

    pub fn servings(&self) -> Result<&str, ImportError> {
        self.optional_field("servings", |r| r.servings.as_deref())
    }

    pub fn prep_time(&self) -> Result<&str, ImportError> {
        self.optional_field("prep_time", |r| r.prep_time.as_deref())
    }

    pub fn cook_time(&self) -> Result<&str, ImportError> {
        self.optional_field("cook_time", |r| r.cook_time.as_deref())
    }

    pub fn nutritional_info(&self) -> Result<NutritionalInfo, ImportError> {
        self.current()?
            .nutritional_info
            .ok_or_else(|| ImportError::State("nutritional_info not set in recipe".to_string()))
    }

    fn current(&self) -> Result<&Recipe, ImportError> {
        self.recipe
            .as_ref()
            .ok_or_else(|| ImportError::State("Recipe not generated yet".to_string()))
    }

    fn optional_field<'a>(
        &'a self,
        name: &str,
        get: impl Fn(&'a Recipe) -> Option<&'a str>,
    ) -> Result<&'a str, ImportError> {
        get(self.current()?)
            .ok_or_else(|| ImportError::State(format!("{} not set in recipe", name)))
    }
}

/// Validate a raw generation payload and hydrate it into a `Recipe`.
///
/// Stages, in order: non-empty content, JSON object, required fields, step
/// shape, typed hydration with the record's video id injected. A single
/// invalid step rejects the whole response.
pub fn validate_response(content: &str, video_id: &str) -> Result<Recipe, ImportError> {
    if content.trim().is_empty() {
        return Err(ModelResponseError::EmptyResponse.into());
    }

    let mut value: Value = serde_json::from_str(content)
        .map_err(|e| ModelResponseError::InvalidJson(e.to_string()))?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| ModelResponseError::InvalidJson("expected a JSON object".to_string()))?;

    for field in ["title", "ingredients", "steps"] {
        if !object.contains_key(field) {
            return Err(ModelResponseError::MissingField(field.to_string()).into());
        }
    }

    let steps = object["steps"]
        .as_array()
        .ok_or_else(|| ModelResponseError::InvalidStep("'steps' must be an array".to_string()))?;
    for step in steps {
        let step_object = step.as_object().ok_or_else(|| {
            ModelResponseError::InvalidStep("each step must be an object".to_string())
        })?;
        if !step_object.get("step_number").is_some_and(Value::is_i64) {
            return Err(ModelResponseError::InvalidStep(
                "step_number must be an integer".to_string(),
            )
            .into());
        }
        if !step_object.get("description").is_some_and(Value::is_string) {
            return Err(ModelResponseError::InvalidStep(
                "description must be a string".to_string(),
            )
            .into());
        }
    }

    object.insert("video_id".to_string(), Value::String(video_id.to_string()));

    let recipe: Recipe = serde_json::from_value(value)
        .map_err(|e| ModelResponseError::Structure(e.to_string()))?;
    Ok(recipe)
}
