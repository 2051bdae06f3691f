use crate::error::FlowError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

/// JSON schema of `T`, pretty-printed for inclusion in a prompt.
pub fn output_schema<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Removes a surrounding markdown fence (```json ... ```) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (`json`, `JSON`, ...) on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a model reply into `T`, tolerating code fences and prose around the object.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, FlowError> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(FlowError::MalformedOutput("empty reply".to_string()));
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
                return Err(FlowError::MalformedOutput(first_err.to_string()));
            };
            if end <= start {
                return Err(FlowError::MalformedOutput(first_err.to_string()));
            }
            serde_json::from_str(&text[start..=end])
                .map_err(|e| FlowError::MalformedOutput(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummarizeOutput;

    #[test]
    fn strips_fences_with_and_without_language() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn parses_fenced_and_wrapped_objects() {
        let fenced: SummarizeOutput =
            parse_structured("```json\n{\"summary\":\"short\"}\n```").unwrap();
        assert_eq!(fenced.summary, "short");

        let wrapped: SummarizeOutput =
            parse_structured("Here is the result: {\"summary\":\"short\"} Hope it helps.").unwrap();
        assert_eq!(wrapped.summary, "short");
    }

    #[test]
    fn rejects_missing_fields_and_empty_replies() {
        assert!(parse_structured::<SummarizeOutput>("{\"other\":1}").is_err());
        assert!(parse_structured::<SummarizeOutput>("   ").is_err());
        assert!(parse_structured::<SummarizeOutput>("no json here").is_err());
    }

    #[test]
    fn schema_names_output_fields() {
        let schema = output_schema::<SummarizeOutput>();
        assert!(schema.contains("\"summary\""));
    }
}
