//! Energy-audit writing assistant: LLM prompt flows (rewrite, expand,
//! summarize, change tone, deep research) and a Google Custom Search tool,
//! served over HTTP.

pub mod config;
pub mod error;
pub mod flows;
pub mod i18n;
pub mod llm;
pub mod models;
pub mod server;
pub mod tasks;
pub mod tools;
