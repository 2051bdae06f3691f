use super::generate_structured;
use crate::error::FlowError;
use crate::llm::LanguageModel;
use crate::models::{GenerationConfig, RewriteInput, RewriteOutput};
use tracing::{info, instrument};

fn build_prompt(input: &RewriteInput) -> String {
    format!(
        r#"You are an expert in writing energy audit reports. Please rewrite the following text to improve its clarity and professionalism, while maintaining the original meaning.
Generate the response in the following language: {}

Text to rewrite:
{}"#,
        input.output_language, input.text
    )
}

/// Rewrites report text for clarity. Model failures propagate.
#[instrument(skip_all, fields(language = %input.output_language))]
pub async fn rewrite(
    model: &dyn LanguageModel,
    input: RewriteInput,
) -> Result<RewriteOutput, FlowError> {
    info!("Rewriting {} characters", input.text.len());
    let config = GenerationConfig::resolve(input.config.as_ref());
    generate_structured(model, build_prompt(&input), config).await
}
