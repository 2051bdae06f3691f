use crate::error::ConfigError;
use crate::llm::DEFAULT_MODEL;
use crate::tools::web_search::{LinkMode, SearchSettings, DEFAULT_SEARCH_ENDPOINT};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_FILTER: &str = "energy_audit_assistant=debug,graph_flow=info,tower_http=info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub search: SearchSettings,
    pub bind_addr: SocketAddr,
}

/// Loads the first of `.env.local` / `.env` found in `dir`. Returns the loaded path.
pub fn load_dotenv(dir: &Path) -> Option<PathBuf> {
    [".env.local", ".env"]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .and_then(|path| dotenvy::from_path(&path).ok().map(|_| path))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let link_mode = match var("SEARCH_LINK_MODE") {
            Some(raw) => raw.parse::<LinkMode>().map_err(|reason| ConfigError::Invalid {
                var: "SEARCH_LINK_MODE",
                reason,
            })?,
            None => LinkMode::default(),
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        Ok(Self {
            llm_api_key: var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")),
            llm_model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            search: SearchSettings {
                api_key: var("SEARCH_API_KEY"),
                engine_id: var("SEARCH_ENGINE_ID"),
                endpoint: var("SEARCH_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
                link_mode,
            },
            bind_addr,
        })
    }

    /// Names of missing settings that degrade, but do not stop, the service.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.llm_api_key.is_none() {
            missing.push("GEMINI_API_KEY");
        }
        if self.search.api_key.is_none() {
            missing.push("SEARCH_API_KEY");
        }
        if self.search.engine_id.is_none() {
            missing.push("SEARCH_ENGINE_ID");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.llm_model, DEFAULT_MODEL);
        assert_eq!(config.search.endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert_eq!(config.search.link_mode, LinkMode::Full);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(
            config.missing_settings(),
            vec!["GEMINI_API_KEY", "SEARCH_API_KEY", "SEARCH_ENGINE_ID"]
        );
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("LLM_MODEL", "gemini-2.0-flash"),
            ("SEARCH_API_KEY", "s-key"),
            ("SEARCH_ENGINE_ID", "cx-1"),
            ("SEARCH_ENDPOINT", "http://127.0.0.1:9000/search"),
            ("SEARCH_LINK_MODE", "homepage"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(config.llm_api_key.as_deref(), Some("g-key"));
        assert_eq!(config.llm_model, "gemini-2.0-flash");
        assert_eq!(config.search.api_key.as_deref(), Some("s-key"));
        assert_eq!(config.search.engine_id.as_deref(), Some("cx-1"));
        assert_eq!(config.search.endpoint, "http://127.0.0.1:9000/search");
        assert_eq!(config.search.link_mode, LinkMode::Homepage);
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.missing_settings().is_empty());
    }

    #[test]
    fn gemini_key_wins_and_blank_values_are_unset() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "primary"),
            ("GOOGLE_API_KEY", "secondary"),
            ("SEARCH_API_KEY", "   "),
        ])
        .unwrap();
        assert_eq!(config.llm_api_key.as_deref(), Some("primary"));
        assert!(config.search.api_key.is_none());
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = config_from(&[("SEARCH_LINK_MODE", "sometimes")]).unwrap_err();
        assert!(err.to_string().contains("SEARCH_LINK_MODE"));
        let err = config_from(&[("BIND_ADDR", "localhost")]).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }
}
