use super::generate_structured;
use crate::error::FlowError;
use crate::llm::LanguageModel;
use crate::models::{ChangeToneInput, ChangeToneOutput, GenerationConfig};
use tracing::{info, instrument};

fn build_prompt(input: &ChangeToneInput) -> String {
    format!(
        r#"You are an expert writing assistant. You will be provided with an energy audit report, a desired tone, and a desired output language.
You will rewrite the energy audit report to match the tone and language requested.

Report Text:
{}

Tone: {}
Output Language: {}

Rewrite the above report text accordingly."#,
        input.report_text, input.tone, input.output_language
    )
}

/// Rewrites report text in the requested tone. Model failures propagate.
#[instrument(skip_all, fields(tone = %input.tone, language = %input.output_language))]
pub async fn change_tone(
    model: &dyn LanguageModel,
    input: ChangeToneInput,
) -> Result<ChangeToneOutput, FlowError> {
    info!("Changing tone of {} characters", input.report_text.len());
    let config = GenerationConfig::resolve(input.config.as_ref());
    generate_structured(model, build_prompt(&input), config).await
}
