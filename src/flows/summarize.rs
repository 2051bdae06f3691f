use super::generate_structured;
use crate::llm::LanguageModel;
use crate::models::{GenerationConfig, SummarizeInput, SummarizeOutput};
use tracing::{info, instrument, warn};

fn build_prompt(input: &SummarizeInput) -> String {
    format!(
        r#"You are an expert energy auditor. Please provide a concise summary of the following section of an energy audit report.
Generate the response in the following language: {}.

Report Section:
{}"#,
        input.output_language, input.report_section
    )
}

/// Summarizes a report section. Never fails: errors yield an empty summary.
#[instrument(skip_all, fields(language = %input.output_language))]
pub async fn summarize(model: &dyn LanguageModel, input: SummarizeInput) -> SummarizeOutput {
    info!("Summarizing {} characters", input.report_section.len());
    let config = GenerationConfig::resolve(input.config.as_ref());
    match generate_structured(model, build_prompt(&input), config).await {
        Ok(output) => output,
        Err(e) => {
            warn!("Summarize failed, returning empty summary: {}", e);
            SummarizeOutput::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelParameters;
    use crate::llm::testing::ScriptedModel;

    fn input() -> SummarizeInput {
        SummarizeInput {
            report_section: "Chiller plant runs 24/7 at constant speed; VSD retrofit proposed.".into(),
            output_language: "vn".into(),
            config: Some(ModelParameters {
                max_output_tokens: Some(256),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn returns_summary() {
        let model =
            ScriptedModel::replying(r#"{"summary":"Đề xuất lắp biến tần cho hệ thống chiller."}"#);
        let output = summarize(&model, input()).await;
        assert_eq!(output.summary, "Đề xuất lắp biến tần cho hệ thống chiller.");

        let request = model.last_request();
        assert!(request.prompt.contains("following language: vn"));
        assert!(request.prompt.contains("Chiller plant"));
        assert_eq!(request.config.max_output_tokens, 256);
    }

    #[tokio::test]
    async fn model_error_yields_empty_summary() {
        let model = ScriptedModel::failing("503 overloaded");
        assert_eq!(summarize(&model, input()).await, SummarizeOutput { summary: String::new() });
    }

    #[tokio::test]
    async fn malformed_output_yields_empty_summary() {
        let model = ScriptedModel::replying(r#"{"summary":null}"#);
        assert_eq!(summarize(&model, input()).await.summary, "");
    }
}
