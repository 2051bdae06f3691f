use crate::error::ParameterError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Link value carried by synthetic search results that point nowhere.
pub const PLACEHOLDER_LINK: &str = "#";

pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_TOP_P: f64 = 0.3;
pub const DEFAULT_TOP_K: u32 = 20;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Caller-supplied sampling overrides. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl ModelParameters {
    /// Checks every present field against the range the model accepts.
    pub fn validate(&self) -> Result<(), ParameterError> {
        check_range("temperature", self.temperature, 0.0, 1.0)?;
        check_range("topP", self.top_p, 0.0, 1.0)?;
        check_range("topK", self.top_k.map(f64::from), 1.0, 100.0)?;
        check_range(
            "maxOutputTokens",
            self.max_output_tokens.map(f64::from),
            1.0,
            8192.0,
        )?;
        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), ParameterError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(ParameterError::OutOfRange {
            field,
            min,
            max,
            value: v,
        }),
        _ => Ok(()),
    }
}

/// Fully resolved sampling configuration handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl GenerationConfig {
    /// Merges overrides onto the defaults field by field; absent fields keep the default.
    pub fn resolve(overrides: Option<&ModelParameters>) -> Self {
        let defaults = Self::default();
        let Some(overrides) = overrides else {
            return defaults;
        };
        Self {
            temperature: overrides.temperature.unwrap_or(defaults.temperature),
            top_p: overrides.top_p.unwrap_or(defaults.top_p),
            top_k: overrides.top_k.unwrap_or(defaults.top_k),
            max_output_tokens: overrides.max_output_tokens.unwrap_or(defaults.max_output_tokens),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Formal,
    Empathetic,
    Friendly,
    Humorous,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Formal,
        Tone::Empathetic,
        Tone::Friendly,
        Tone::Humorous,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Formal => "formal",
            Tone::Empathetic => "empathetic",
            Tone::Friendly => "friendly",
            Tone::Humorous => "humorous",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteInput {
    pub text: String,
    pub output_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ModelParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutput {
    /// The rewritten text of the energy audit report.
    pub rewritten_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandInput {
    pub text: String,
    pub output_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ModelParameters>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandOutput {
    pub expanded_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeInput {
    pub report_section: String,
    pub output_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ModelParameters>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeOutput {
    /// A concise summary of the report section.
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeToneInput {
    pub report_text: String,
    pub tone: Tone,
    pub output_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ModelParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeToneOutput {
    /// The energy audit report text with the modified tone.
    pub modified_report_text: String,
}

fn default_num_results() -> u32 {
    5
}

fn default_language_code() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchInput {
    pub query: String,
    #[serde(default = "default_num_results")]
    pub num_results: u32,
    #[serde(default = "default_language_code")]
    pub language_code: String,
}

impl WebSearchInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            num_results: default_num_results(),
            language_code: default_language_code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResultItem {
    /// The title of the search result.
    pub title: String,
    /// A clickable link to the result (full URL or site homepage).
    pub link: String,
    /// A relevant snippet from the search result content.
    pub snippet: String,
}

impl SearchResultItem {
    pub fn has_real_link(&self) -> bool {
        let link = self.link.trim();
        !link.is_empty() && link != PLACEHOLDER_LINK
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WebSearchOutput {
    /// Search results in provider order.
    pub results: Vec<SearchResultItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchInput {
    pub input_text: String,
    pub output_language: String,
}

pub type DeepResearchOutput = WebSearchOutput;
