use thiserror::Error;

/// Errors that can occur while turning videos into recipes
#[derive(Error, Debug)]
pub enum ImportError {
    /// Malformed caption payload from the transcript source; the one class
    /// the fetch layer retries
    #[error("Transient transcript error: {0}")]
    TransientFetch(String),

    /// Any other transcript failure, never retried at the fetch layer
    #[error("Failed to fetch transcript: {0}")]
    FatalFetch(String),

    /// HTTP transport failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Lookup resolved to nothing: unknown handle, unknown search mode,
    /// or a missing required argument
    #[error("Not found: {0}")]
    NotFound(String),

    /// Blank or whitespace-only transcript text
    #[error("Transcript cannot be empty or whitespace")]
    EmptyInput,

    /// The generation response failed validation
    #[error("Invalid model response: {0}")]
    ModelResponse(#[from] ModelResponseError),

    /// Accessor called before a recipe was generated, or on an unset field
    #[error("Invalid state: {0}")]
    State(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ImportError {
    /// Retry predicate used by the fetch-layer policy. Only the narrow
    /// malformed-caption class is a known-transient upstream glitch;
    /// everything else propagates on first occurrence.
    pub fn is_transient(&self) -> bool {
        matches!(self, ImportError::TransientFetch(_))
    }
}

/// Validation failures for the text-generation response, in the order the
/// validation ladder checks them
#[derive(Error, Debug)]
pub enum ModelResponseError {
    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Response is not a JSON object: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid step: {0}")]
    InvalidStep(String),

    #[error("Response does not match the recipe schema: {0}")]
    Structure(String),
}
