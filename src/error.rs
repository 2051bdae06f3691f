use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API key not configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("LLM request failed: {0}")]
    Provider(String),
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("model returned malformed output: {0}")]
    MalformedOutput(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// True when an upstream failure message reports an overloaded or unavailable model.
pub fn is_overloaded(message: &str) -> bool {
    message.contains("503") || message.to_ascii_lowercase().contains("overloaded")
}
