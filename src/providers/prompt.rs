/// The system instruction for recipe extraction.
///
/// Embedded from `recipe_system.txt` at compile time using `include_str!`,
/// making it easy to edit without dealing with Rust string syntax.
pub const RECIPE_SYSTEM_PROMPT: &str = include_str!("recipe_system.txt");

/// The user-prompt template with a `{transcript}` slot for the flattened
/// transcript text.
pub const RECIPE_EXTRACTION_TEMPLATE: &str = include_str!("recipe_extraction.txt");

/// Render the extraction prompt for one transcript
pub fn render_extraction_prompt(transcript: &str) -> String {
    RECIPE_EXTRACTION_TEMPLATE.replace("{transcript}", transcript)
}
