pub mod web_search;

pub use web_search::{LinkMode, SearchFailure, SearchOutcome, SearchSettings, WebSearch};
