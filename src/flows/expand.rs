//! Expand flow with an energy-audit relevance gate.
//!
//! The model reports whether the input is energy-audit related next to the
//! expansion itself; the warning header is composed here so that related
//! input never carries it and unrelated input always does.

use super::generate_structured;
use crate::i18n::{t, Language, Message};
use crate::llm::LanguageModel;
use crate::models::{ExpandInput, ExpandOutput, GenerationConfig};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Bold-italic markup wrapped around the off-topic warning.
pub const WARNING_MARKER: &str = "***";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ExpandDraft {
    /// Whether the original text is related to energy auditing.
    energy_related: bool,
    /// The off-topic warning translated into the output language, when asked for.
    #[serde(default)]
    translated_warning: Option<String>,
    /// The expanded text with added details and suggestions, without any warning.
    expanded_text: String,
}

fn warning_instructions(output_language: &str) -> String {
    match Language::parse(output_language) {
        Some(_) => "Leave \"translatedWarning\" empty.".to_string(),
        None => format!(
            "Translate the following warning into {} and put it in \"translatedWarning\": \"{}\"",
            output_language,
            t(Message::OffTopicWarning, Language::English)
        ),
    }
}

fn build_prompt(input: &ExpandInput) -> String {
    format!(
        r#"You are a senior energy consultant with extensive experience in practical energy-saving solutions.
First, judge whether the original text is related to energy auditing (energy use, efficiency measures, building systems, utilities, savings or audit findings) and report it in "energyRelated".
Then expand the text by adding relevant details, suggestions, and context based on your expertise, and put the expansion in "expandedText". Expand it even if it is unrelated. Do not add any warning to "expandedText".
{}
Generate the response in the following language: {}.

Original Text: {}"#,
        warning_instructions(&input.output_language),
        input.output_language,
        input.text
    )
}

/// Splits a leading `***header***` off `text`, returning the header and the rest.
fn leading_header(text: &str) -> Option<(&str, &str)> {
    let rest = text.trim_start().strip_prefix(WARNING_MARKER)?;
    let end = rest.find(WARNING_MARKER)?;
    Some((rest[..end].trim(), rest[end + WARNING_MARKER.len()..].trim_start()))
}

fn is_known_warning(header: &str, translated: Option<&str>) -> bool {
    let matches =
        |warning: &str| header.eq_ignore_ascii_case(warning.trim().trim_matches('*').trim());
    [Language::English, Language::Vietnamese]
        .into_iter()
        .any(|language| matches(t(Message::OffTopicWarning, language)))
        || translated.is_some_and(|w| !w.trim().is_empty() && matches(w))
}

/// Drops a warning header the model produced on its own. For unrelated text
/// any leading header goes, since the fixed warning replaces it; related text
/// only loses a header that is one of the known warnings.
fn strip_leading_warning<'a>(
    text: &'a str,
    energy_related: bool,
    translated: Option<&str>,
) -> &'a str {
    let trimmed = text.trim_start();
    match leading_header(trimmed) {
        Some((header, rest)) if !energy_related || is_known_warning(header, translated) => rest,
        _ => trimmed,
    }
}

fn compose(draft: ExpandDraft, output_language: &str) -> Option<String> {
    let body = strip_leading_warning(
        &draft.expanded_text,
        draft.energy_related,
        draft.translated_warning.as_deref(),
    )
    .trim_end();
    if body.is_empty() {
        return None;
    }
    if draft.energy_related {
        return Some(body.to_string());
    }
    let warning = match Language::parse(output_language) {
        Some(language) => t(Message::OffTopicWarning, language).to_string(),
        None => draft
            .translated_warning
            .map(|w| w.trim().trim_matches('*').trim().to_string())
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| t(Message::OffTopicWarning, Language::English).to_string()),
    };
    Some(format!("{m}{w}{m}\n\n{b}", m = WARNING_MARKER, w = warning, b = body))
}

/// Expands report text. Never fails: any model or parse failure yields an empty expansion.
#[instrument(skip_all, fields(language = %input.output_language))]
pub async fn expand(model: &dyn LanguageModel, input: ExpandInput) -> ExpandOutput {
    info!("Expanding {} characters", input.text.len());
    let config = GenerationConfig::resolve(input.config.as_ref());
    let prompt = build_prompt(&input);
    let draft = match generate_structured::<ExpandDraft>(model, prompt, config).await {
        Ok(draft) => draft,
        Err(e) => {
            warn!("Expand failed, returning empty text: {}", e);
            return ExpandOutput::default();
        }
    };
    if !draft.energy_related {
        info!("Input judged unrelated to energy auditing");
    }
    match compose(draft, &input.output_language) {
        Some(expanded_text) => ExpandOutput { expanded_text },
        None => {
            warn!("Model returned an empty expansion");
            ExpandOutput::default()
        }
    }
}
