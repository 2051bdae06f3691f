//! graph-flow wiring: one task per flow in a single `audit_assistant` graph.
//!
//! A request session starts at the task of the requested operation, finds its
//! JSON input under [`REQUEST_KEY`] and leaves its JSON output under
//! [`RESPONSE_KEY`]. Every task ends the session.

mod flow_task;

pub use flow_task::FlowTask;

use crate::llm::LanguageModel;
use crate::tools::WebSearch;
use graph_flow::{Graph, GraphBuilder};
use std::fmt;
use std::sync::Arc;

pub const GRAPH_NAME: &str = "audit_assistant";
pub const REQUEST_KEY: &str = "request";
pub const RESPONSE_KEY: &str = "response";
pub const TASK_TIMES_KEY: &str = "task_times";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Rewrite,
    Expand,
    Summarize,
    ChangeTone,
    DeepResearch,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Rewrite,
        Operation::Expand,
        Operation::Summarize,
        Operation::ChangeTone,
        Operation::DeepResearch,
    ];

    pub fn task_id(self) -> &'static str {
        match self {
            Operation::Rewrite => "rewrite",
            Operation::Expand => "expand",
            Operation::Summarize => "summarize",
            Operation::ChangeTone => "change_tone",
            Operation::DeepResearch => "deep_research",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_id())
    }
}

/// Remote collaborators shared by every task.
pub struct Backends {
    pub model: Arc<dyn LanguageModel>,
    pub search: WebSearch,
}

pub fn build_graph(backends: Arc<Backends>) -> Graph {
    Operation::ALL
        .into_iter()
        .fold(GraphBuilder::new(GRAPH_NAME), |builder, operation| {
            builder.add_task(Arc::new(FlowTask::new(operation, backends.clone())))
        })
        .build()
}
