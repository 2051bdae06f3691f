use super::{GenerateRequest, LanguageModel};
use crate::error::LlmError;
use crate::models::GenerationConfig;
use async_trait::async_trait;
use rig::completion::Prompt;
use rig::prelude::*;
use rig::providers::gemini;
use serde_json::{json, Value};
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// One tool call plus the turn that reports its result.
const MAX_TOOL_TURNS: usize = 2;

/// Gemini backend built on rig's Gemini provider. A fresh agent is built per
/// request so each call carries its own sampling config and tools.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    api_key: Option<String>,
    model: String,
}

impl GeminiModel {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> Result<gemini::Client, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(LlmError::MissingApiKey)?;
        Ok(gemini::Client::new(api_key))
    }
}

fn preamble(output_schema: &str) -> String {
    format!(
        r#"You are a careful assistant that always answers with a single JSON object.
The JSON object must conform to this JSON schema:
{}

Respond with the JSON object only: no markdown fences, no commentary."#,
        output_schema
    )
}

/// rig reads `additional_params` as Gemini's `generationConfig` itself, so the
/// knobs sit at the top level.
fn generation_params(config: &GenerationConfig) -> Value {
    json!({
        "temperature": config.temperature,
        "topP": config.top_p,
        "topK": config.top_k,
        "maxOutputTokens": config.max_output_tokens,
    })
}

#[async_trait]
impl LanguageModel for GeminiModel {
    async fn generate(&self, request: GenerateRequest) -> Result<String, LlmError> {
        let client = self.client()?;
        debug!(model = %self.model, config = ?request.config, "Building Gemini agent");

        let builder = client
            .agent(&self.model)
            .preamble(&preamble(&request.output_schema))
            .temperature(request.config.temperature)
            .max_tokens(u64::from(request.config.max_output_tokens))
            .additional_params(generation_params(&request.config));

        let response = match request.search_tool {
            Some(search) => {
                let agent = builder.tool(search).build();
                agent.prompt(&request.prompt).multi_turn(MAX_TOOL_TURNS).await
            }
            None => {
                let agent = builder.build();
                agent.prompt(&request.prompt).await
            }
        }
        .map_err(|e| LlmError::Provider(e.to_string()))?;

        info!("Model replied with {} characters", response.len());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let model = GeminiModel::new(None, DEFAULT_MODEL);
        let request = GenerateRequest::new("hi".into(), "{}".into(), GenerationConfig::default());
        let err = model.generate(request).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));

        let empty = GeminiModel::new(Some(String::new()), DEFAULT_MODEL);
        let request = GenerateRequest::new("hi".into(), "{}".into(), GenerationConfig::default());
        assert!(matches!(empty.generate(request).await, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn generation_params_reach_gemini_config() {
        use rig::providers::gemini::completion::gemini_api_types::GenerationConfig as GeminiConfig;

        let config = GenerationConfig {
            temperature: 0.9,
            top_p: 0.7,
            top_k: 40,
            max_output_tokens: 1024,
        };
        let gemini: GeminiConfig = serde_json::from_value(generation_params(&config)).unwrap();
        assert_eq!(gemini.temperature, Some(0.9));
        assert_eq!(gemini.top_p, Some(0.7));
        assert_eq!(gemini.top_k.map(|k| k as i64), Some(40));
        assert_eq!(gemini.max_output_tokens.map(|t| t as u64), Some(1024));
    }

    #[test]
    fn generation_params_are_not_nested() {
        let params = generation_params(&GenerationConfig::default());
        assert!(params.get("generationConfig").is_none());
        assert_eq!(params["topP"], 0.3);
        assert_eq!(params["topK"], 20);
    }

    #[test]
    fn preamble_embeds_schema() {
        assert!(preamble("{\"type\":\"object\"}").contains("{\"type\":\"object\"}"));
    }
}
