//! Language-model seam.
//!
//! Flows talk to a [`LanguageModel`]: a prompt, the JSON schema the reply must
//! follow, the resolved sampling config and, for deep research, the search
//! tool the model may call. [`GeminiModel`] is the production backend.

mod gemini;
mod structured;

pub use gemini::{GeminiModel, DEFAULT_MODEL};
pub use structured::{output_schema, parse_structured, strip_code_fences};

use crate::error::LlmError;
use crate::models::GenerationConfig;
use crate::tools::WebSearch;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub output_schema: String,
    pub config: GenerationConfig,
    pub search_tool: Option<WebSearch>,
}

impl GenerateRequest {
    pub fn new(prompt: String, output_schema: String, config: GenerationConfig) -> Self {
        Self {
            prompt,
            output_schema,
            config,
            search_tool: None,
        }
    }

    pub fn with_search_tool(mut self, search: WebSearch) -> Self {
        self.search_tool = Some(search);
        self
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model's final text reply.
    async fn generate(&self, request: GenerateRequest) -> Result<String, LlmError>;
}
