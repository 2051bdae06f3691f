//! Prompt flows.
//!
//! Rewrite and change-tone propagate model failures to the caller. Expand,
//! summarize and deep research absorb them and return an empty value.

mod change_tone;
mod deep_research;
mod expand;
mod rewrite;
mod summarize;

pub use change_tone::change_tone;
pub use deep_research::{deep_research, RESEARCH_RESULT_COUNT};
pub use expand::{expand, WARNING_MARKER};
pub use rewrite::rewrite;
pub use summarize::summarize;

use crate::error::FlowError;
use crate::llm::{output_schema, parse_structured, GenerateRequest, LanguageModel};
use crate::models::GenerationConfig;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

async fn generate_structured<T>(
    model: &dyn LanguageModel,
    prompt: String,
    config: GenerationConfig,
) -> Result<T, FlowError>
where
    T: DeserializeOwned + JsonSchema,
{
    let request = GenerateRequest::new(prompt, output_schema::<T>(), config);
    let raw = model.generate(request).await?;
    parse_structured(&raw)
}
