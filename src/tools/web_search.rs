//! Google Custom Search tool.
//!
//! Every failure mode (missing credentials, non-2xx, transport or parse errors)
//! surfaces as [`SearchOutcome::SoftFailure`], which renders to a single
//! placeholder result. Callers, including the LLM through the rig [`Tool`]
//! impl, always receive a well-formed result list.

use crate::i18n::{t_code, Message};
use crate::models::{SearchResultItem, WebSearchInput, WebSearchOutput, PLACEHOLDER_LINK};
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub const TOOL_NAME: &str = "performWebSearch";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The provider rejects `num` outside 1..=10.
const PROVIDER_MAX_RESULTS: u32 = 10;
const MISSING_FIELD: &str = "N/A";

/// How a provider link is presented in the normalized result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkMode {
    /// The result URL as returned by the provider.
    #[default]
    Full,
    /// Scheme and host only, e.g. `https://example.com`.
    Homepage,
}

impl FromStr for LinkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "url" => Ok(LinkMode::Full),
            "homepage" | "host" => Ok(LinkMode::Homepage),
            other => Err(format!("expected `full` or `homepage`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub endpoint: String,
    pub link_mode: LinkMode,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            link_mode: LinkMode::Full,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchFailure {
    MissingApiKey,
    MissingEngineId,
    Http { status: u16, detail: Option<String> },
    Transport(String),
}

impl SearchFailure {
    fn placeholder(&self, language_code: &str) -> SearchResultItem {
        let (title, snippet) = match self {
            SearchFailure::MissingApiKey => (
                t_code(Message::SearchApiKeyMissingTitle, language_code),
                t_code(Message::SearchApiKeyMissingDetail, language_code).to_string(),
            ),
            SearchFailure::MissingEngineId => (
                t_code(Message::SearchEngineIdMissingTitle, language_code),
                t_code(Message::SearchEngineIdMissingDetail, language_code).to_string(),
            ),
            SearchFailure::Http { status, detail } => {
                let mut snippet =
                    format!("{} {}.", t_code(Message::SearchFailedStatus, language_code), status);
                if let Some(detail) = detail {
                    let label = t_code(Message::SearchFailedDetail, language_code);
                    snippet.push_str(&format!(" {} {}", label, detail));
                }
                (t_code(Message::SearchFailedTitle, language_code), snippet)
            }
            SearchFailure::Transport(message) => (
                t_code(Message::SearchExecutionTitle, language_code),
                format!("{} {}", t_code(Message::SearchExecutionDetail, language_code), message),
            ),
        };
        SearchResultItem {
            title: title.to_string(),
            link: PLACEHOLDER_LINK.to_string(),
            snippet,
        }
    }
}

/// Result of one search: real results, or a failure that still renders as a valid list.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Vec<SearchResultItem>),
    SoftFailure(SearchFailure),
}

impl SearchOutcome {
    pub fn is_soft_failure(&self) -> bool {
        matches!(self, SearchOutcome::SoftFailure(_))
    }

    pub fn into_output(self, language_code: &str) -> WebSearchOutput {
        let results = match self {
            SearchOutcome::Found(results) => results,
            SearchOutcome::SoftFailure(failure) => vec![failure.placeholder(language_code)],
        };
        WebSearchOutput { results }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Option<Vec<CseItem>>,
}

/// One item of the provider's `items` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CseItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub html_snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CseErrorBody {
    error: Option<CseErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct CseErrorDetail {
    message: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reduces a URL to `scheme://host[:port]`. Returns `None` for unparseable or host-less links.
pub fn homepage(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Maps provider items to results, drops entries without a usable link and keeps
/// at most `num_results` in provider order.
pub fn normalize_items(
    items: Vec<CseItem>,
    num_results: usize,
    link_mode: LinkMode,
) -> Vec<SearchResultItem> {
    items
        .into_iter()
        .map(|item| {
            let link = non_empty(item.link).unwrap_or_else(|| PLACEHOLDER_LINK.to_string());
            let link = match link_mode {
                LinkMode::Full => link,
                LinkMode::Homepage => homepage(&link).unwrap_or_default(),
            };
            SearchResultItem {
                title: non_empty(item.title).unwrap_or_else(|| MISSING_FIELD.to_string()),
                link,
                snippet: non_empty(item.snippet)
                    .or_else(|| non_empty(item.html_snippet))
                    .unwrap_or_else(|| MISSING_FIELD.to_string()),
            }
        })
        .filter(SearchResultItem::has_real_link)
        .take(num_results)
        .collect()
}

fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<CseErrorBody>(body)
        .ok()?
        .error?
        .message
        .filter(|m| !m.is_empty())
}

#[derive(Debug, Clone)]
pub struct WebSearch {
    settings: Arc<SearchSettings>,
    client: reqwest::Client,
}

impl WebSearch {
    pub fn new(settings: SearchSettings) -> Self {
        Self::with_client(settings, reqwest::Client::new())
    }

    pub fn with_client(settings: SearchSettings, client: reqwest::Client) -> Self {
        Self {
            settings: Arc::new(settings),
            client,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    fn request_url(
        &self,
        input: &WebSearchInput,
        api_key: &str,
        engine_id: &str,
    ) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.settings.endpoint)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("key", api_key)
                .append_pair("cx", engine_id)
                .append_pair("q", &input.query)
                .append_pair("num", &input.num_results.clamp(1, PROVIDER_MAX_RESULTS).to_string());
            if input.language_code != "en" {
                query.append_pair("lr", &format!("lang_{}", input.language_code));
            }
        }
        Ok(url)
    }

    #[instrument(
        skip(self, input),
        fields(
            query = %input.query,
            num_results = input.num_results,
            language = %input.language_code
        )
    )]
    pub async fn search(&self, input: &WebSearchInput) -> SearchOutcome {
        let Some(api_key) = self.settings.api_key.as_deref().filter(|k| !k.is_empty()) else {
            error!("SEARCH_API_KEY is not configured");
            return SearchOutcome::SoftFailure(SearchFailure::MissingApiKey);
        };
        let Some(engine_id) = self.settings.engine_id.as_deref().filter(|k| !k.is_empty()) else {
            error!("SEARCH_ENGINE_ID is not configured");
            return SearchOutcome::SoftFailure(SearchFailure::MissingEngineId);
        };

        let url = match self.request_url(input, api_key, engine_id) {
            Ok(url) => url,
            Err(e) => {
                error!("Invalid search endpoint {}: {}", self.settings.endpoint, e);
                return SearchOutcome::SoftFailure(SearchFailure::Transport(e.to_string()));
            }
        };

        let response = match self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let e = e.without_url();
                error!("Search request failed: {}", e);
                return SearchOutcome::SoftFailure(SearchFailure::Transport(e.to_string()));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let e = e.without_url();
                error!("Failed to read search response: {}", e);
                return SearchOutcome::SoftFailure(SearchFailure::Transport(e.to_string()));
            }
        };
        debug!("Search response status {}: {}", status, body);

        if !status.is_success() {
            warn!("Search provider returned {}", status);
            return SearchOutcome::SoftFailure(SearchFailure::Http {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let parsed: CseResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!("Failed to parse search response: {}", e);
                let message = format!("invalid response body: {}", e);
                return SearchOutcome::SoftFailure(SearchFailure::Transport(message));
            }
        };

        let items = parsed.items.unwrap_or_default();
        if items.is_empty() {
            info!("No items found in search response");
            return SearchOutcome::Found(Vec::new());
        }

        let results = normalize_items(items, input.num_results as usize, self.settings.link_mode);
        info!("Search returned {} results", results.len());
        SearchOutcome::Found(results)
    }

    /// Runs a search and renders the outcome, localized for the query's language.
    pub async fn perform(&self, input: WebSearchInput) -> WebSearchOutput {
        self.search(&input).await.into_output(&input.language_code)
    }
}

impl Tool for WebSearch {
    const NAME: &'static str = TOOL_NAME;

    type Error = Infallible;
    type Args = WebSearchInput;
    type Output = WebSearchOutput;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Performs a web search using the Google Custom Search JSON API and returns a list of relevant documents with titles, links, and snippets. Use this tool to find information on the internet for a given query.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query string."
                    },
                    "numResults": {
                        "type": "integer",
                        "description": "Number of search results to return (default 5)."
                    },
                    "languageCode": {
                        "type": "string",
                        "description": "Language code for search results (e.g. \"en\", \"vn\")."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let language_code = args.language_code.clone();
        // reqwest futures are not Sync; run the request on its own task.
        let search = self.clone();
        match tokio::spawn(async move { search.perform(args).await }).await {
            Ok(output) => Ok(output),
            Err(e) => Ok(SearchOutcome::SoftFailure(SearchFailure::Transport(e.to_string()))
                .into_output(&language_code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str, snippet: &str) -> CseItem {
        CseItem {
            title: Some(title.to_string()),
            link: Some(link.to_string()),
            snippet: Some(snippet.to_string()),
            html_snippet: None,
        }
    }

    #[test]
    fn normalize_truncates_in_provider_order() {
        let items = (0..8)
            .map(|i| item(&format!("Result {}", i), &format!("https://site{}.org/page", i), "s"))
            .collect();
        let results = normalize_items(items, 5, LinkMode::Full);
        assert_eq!(results.len(), 5);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.title, format!("Result {}", i));
            assert_eq!(result.link, format!("https://site{}.org/page", i));
        }
    }

    #[test]
    fn normalize_applies_fallbacks() {
        let items = vec![
            CseItem {
                title: None,
                link: Some("https://a.org".into()),
                snippet: None,
                html_snippet: Some("<b>html</b>".into()),
            },
            CseItem {
                title: Some(String::new()),
                link: Some("https://b.org".into()),
                ..Default::default()
            },
        ];
        let results = normalize_items(items, 5, LinkMode::Full);
        assert_eq!(results[0].title, "N/A");
        assert_eq!(results[0].snippet, "<b>html</b>");
        assert_eq!(results[1].title, "N/A");
        assert_eq!(results[1].snippet, "N/A");
    }

    #[test]
    fn normalize_drops_missing_and_placeholder_links() {
        let items = vec![
            item("no link", "", "s"),
            item("placeholder", "#", "s"),
            CseItem {
                title: Some("absent".into()),
                ..Default::default()
            },
            item("kept", "https://kept.org/x", "s"),
        ];
        let results = normalize_items(items, 5, LinkMode::Full);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "kept");
    }

    #[test]
    fn homepage_mode_reduces_links() {
        let items = vec![
            item("a", "https://www.energy.gov/eere/buildings?ref=1", "s"),
            item("b", "http://localhost:8080/path", "s"),
            item("c", "not a url", "s"),
        ];
        let results = normalize_items(items, 5, LinkMode::Homepage);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link, "https://www.energy.gov");
        assert_eq!(results[1].link, "http://localhost:8080");
    }

    #[test]
    fn link_mode_parses() {
        assert_eq!("homepage".parse::<LinkMode>().unwrap(), LinkMode::Homepage);
        assert_eq!("FULL".parse::<LinkMode>().unwrap(), LinkMode::Full);
        assert!("both".parse::<LinkMode>().is_err());
    }

    #[test]
    fn http_failure_includes_provider_message() {
        let outcome = SearchOutcome::SoftFailure(SearchFailure::Http {
            status: 403,
            detail: error_detail(r#"{"error":{"code":403,"message":"API key not valid"}}"#),
        });
        let output = outcome.into_output("en");
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].link, PLACEHOLDER_LINK);
        assert_eq!(
            output.results[0].snippet,
            "Search request failed with status code 403. Details: API key not valid"
        );
    }

    #[test]
    fn http_failure_without_json_uses_status_only() {
        assert_eq!(error_detail("<html>Bad Gateway</html>"), None);
        let failure = SearchFailure::Http {
            status: 502,
            detail: None,
        };
        let output = SearchOutcome::SoftFailure(failure).into_output("vn");
        assert_eq!(output.results[0].title, "Lỗi khi tìm kiếm trên Web");
        assert_eq!(output.results[0].snippet, "Yêu cầu tìm kiếm thất bại với mã lỗi 502.");
    }

    #[tokio::test]
    async fn missing_api_key_is_a_soft_failure() {
        let search = WebSearch::new(SearchSettings {
            engine_id: Some("cx".into()),
            ..Default::default()
        });
        let outcome = search.search(&WebSearchInput::new("LED retrofit")).await;
        assert_eq!(outcome, SearchOutcome::SoftFailure(SearchFailure::MissingApiKey));

        let output = outcome.into_output("en");
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].link, PLACEHOLDER_LINK);
        assert!(output.results[0].snippet.contains("SEARCH_API_KEY"));
    }

    #[tokio::test]
    async fn missing_engine_id_is_a_soft_failure() {
        let search = WebSearch::new(SearchSettings {
            api_key: Some("key".into()),
            ..Default::default()
        });
        let outcome = search.search(&WebSearchInput::new("LED retrofit")).await;
        assert_eq!(outcome, SearchOutcome::SoftFailure(SearchFailure::MissingEngineId));
    }

    #[test]
    fn request_url_adds_language_restriction_for_non_english() {
        let search = WebSearch::new(SearchSettings::default());
        let mut input = WebSearchInput::new("LED lighting efficiency");
        let url = search.request_url(&input, "k", "cx").unwrap();
        assert!(!url.query_pairs().any(|(k, _)| k == "lr"));

        input.language_code = "vn".into();
        input.num_results = 25;
        let url = search.request_url(&input, "k", "cx").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("lr".into(), "lang_vn".into())));
        assert!(pairs.contains(&("num".into(), "10".into())));
        assert!(pairs.contains(&("q".into(), "LED lighting efficiency".into())));
    }

    #[tokio::test]
    async fn tool_definition_uses_tool_name() {
        let search = WebSearch::new(SearchSettings::default());
        let definition = search.definition(String::new()).await;
        assert_eq!(definition.name, TOOL_NAME);
        assert_eq!(definition.parameters["required"][0], "query");
    }
}
