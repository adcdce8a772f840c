use serde::{Deserialize, Serialize};

/// A resolved video: the identifier plus the title reported by the search
/// service. Produced by the resolver, consumed by the batch processor.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRef {
    pub video_id: String,
    pub title: String,
}

/// One timestamped caption fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSnippet {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// A fetched transcript. Snippets are ordered by start time as delivered by
/// the caption source and are never reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub language_code: String,
    pub is_generated: bool,
    pub snippets: Vec<TranscriptSnippet>,
}

impl Transcript {
    /// Collapse the transcript into a flat record for extraction, joining
    /// snippet texts in order with each one terminated by a separator.
    pub fn flatten(&self, title: &str) -> TranscriptRecord {
        let mut text = String::new();
        for snippet in &self.snippets {
            text.push_str(&snippet.text);
            text.push_str(". ");
        }

        TranscriptRecord {
            title: title.to_string(),
            video_id: self.video_id.clone(),
            language_code: self.language_code.clone(),
            is_generated: self.is_generated,
            text,
            error: None,
        }
    }
}

/// The unit handed to recipe extraction: one per resolved video, whether or
/// not its transcript could be fetched. A failed video gets the same shape
/// with the error marker set and empty text, so downstream code never has to
/// branch on type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub title: String,
    pub video_id: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub is_generated: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptRecord {
    /// Placeholder record for a video whose retry budget is exhausted
    pub fn failed(title: &str, video_id: &str) -> Self {
        TranscriptRecord {
            title: title.to_string(),
            video_id: video_id.to_string(),
            language_code: String::new(),
            is_generated: false,
            text: String::new(),
            error: Some("Failed to fetch transcript".to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub step_number: i64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionalInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A validated recipe. `video_id` is the join key back to the transcript the
/// recipe was generated from. Optional fields are either fully present or
/// fully absent; absent ones are skipped in the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub video_id: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<InstructionStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionalInfo>,
}
