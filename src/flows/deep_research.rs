use crate::llm::{output_schema, parse_structured, GenerateRequest, LanguageModel};
use crate::models::{DeepResearchInput, DeepResearchOutput, GenerationConfig, SearchResultItem};
use crate::tools::web_search::{WebSearch, TOOL_NAME};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Number of results the model is told to request from the search tool.
pub const RESEARCH_RESULT_COUNT: u32 = 5;

fn build_prompt(input: &DeepResearchInput) -> String {
    format!(
        r#"You are an expert AI research assistant. Your primary task is to find highly relevant online resources based on the user's provided text.

1. Analyze the input: identify the core subject, key topics, and important keywords of the input text.
2. Formulate an effective query: construct a concise search query for the '{tool}' tool that targets the most essential concepts. Do not pass the entire input text. For example, for text about "energy savings from LED lighting in commercial buildings", a good query is "LED lighting energy efficiency commercial buildings".
3. Use the tool: invoke '{tool}' once with your query, "numResults": {count} and "languageCode": "{language}".
4. Format the output: put the results returned by the tool into the "results" field of your final answer, unchanged. If the tool returns no results, return an empty array.

Input Text to Analyze:
{text}

Desired Language for Search Results: {language}"#,
        tool = TOOL_NAME,
        count = RESEARCH_RESULT_COUNT,
        language = input.output_language,
        text = input.input_text
    )
}

/// Pulls the result list out of the model's final reply. Anything other than
/// an object with a `results` array yields no results; malformed entries and
/// placeholder links are skipped.
fn extract_results(raw: &str) -> Vec<SearchResultItem> {
    let value: Value = match parse_structured(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Unparseable research output: {}", e);
            return Vec::new();
        }
    };
    let Some(Value::Array(entries)) = value.get("results") else {
        warn!("Research output has no results array");
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<SearchResultItem>(entry.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("Skipping malformed research entry: {}", e);
                None
            }
        })
        .filter(|item| {
            let real = item.has_real_link();
            if !real {
                warn!("Dropping placeholder result: {} ({})", item.title, item.snippet);
            }
            real
        })
        .collect()
}

/// Lets the model search the web for documents related to `input_text`.
/// Never fails: every failure yields an empty result list.
#[instrument(skip_all, fields(language = %input.output_language))]
pub async fn deep_research(
    model: &dyn LanguageModel,
    search: &WebSearch,
    input: DeepResearchInput,
) -> DeepResearchOutput {
    info!("Starting deep research on {} characters", input.input_text.len());
    let request = GenerateRequest::new(
        build_prompt(&input),
        output_schema::<DeepResearchOutput>(),
        GenerationConfig::default(),
    )
    .with_search_tool(search.clone());

    let raw = match model.generate(request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Deep research failed, returning no results: {}", e);
            return DeepResearchOutput::default();
        }
    };

    let results = extract_results(&raw);
    info!("Deep research produced {} results", results.len());
    DeepResearchOutput { results }
}
