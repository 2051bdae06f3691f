//! HTTP surface: one route per flow plus direct access to the search tool.

use crate::config::AppConfig;
use crate::error::is_overloaded;
use crate::i18n::{t_code, Message};
use crate::llm::{GeminiModel, LanguageModel};
use crate::models::{
    ChangeToneInput, DeepResearchInput, ExpandInput, ModelParameters, RewriteInput,
    SummarizeInput, WebSearchInput, WebSearchOutput,
};
use crate::tasks::{build_graph, Backends, Operation, REQUEST_KEY, RESPONSE_KEY, TASK_TIMES_KEY};
use crate::tools::WebSearch;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use graph_flow::{ExecutionStatus, FlowRunner, InMemorySessionStorage, Session, SessionStorage};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    runner: Arc<FlowRunner>,
    storage: Arc<dyn SessionStorage>,
    search: WebSearch,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let model = GeminiModel::new(config.llm_api_key.clone(), config.llm_model.clone());
        Self::with_backends(Arc::new(model), WebSearch::new(config.search.clone()))
    }

    pub fn with_backends(model: Arc<dyn LanguageModel>, search: WebSearch) -> Self {
        let backends = Arc::new(Backends {
            model,
            search: search.clone(),
        });
        let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
        let graph = Arc::new(build_graph(backends));
        let runner = Arc::new(FlowRunner::new(graph, storage.clone()));
        Self { runner, storage, search }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/flows/rewrite", post(run_flow::<RewriteInput>))
        .route("/flows/expand", post(run_flow::<ExpandInput>))
        .route("/flows/summarize", post(run_flow::<SummarizeInput>))
        .route("/flows/change-tone", post(run_flow::<ChangeToneInput>))
        .route("/flows/deep-research", post(run_flow::<DeepResearchInput>))
        .route("/tools/web-search", post(web_search))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Caller-side view of a flow request.
pub trait FlowRequest: Serialize + DeserializeOwned + Send + Sync + 'static {
    const OPERATION: Operation;

    fn output_language(&self) -> &str;
    fn source_text(&self) -> &str;

    fn parameters(&self) -> Option<&ModelParameters> {
        None
    }

    /// Message pair shown when the source text is blank.
    fn missing_text_messages() -> (Message, Message) {
        (Message::InputRequired, Message::InputRequiredDetail)
    }
}

impl FlowRequest for RewriteInput {
    const OPERATION: Operation = Operation::Rewrite;

    fn output_language(&self) -> &str {
        &self.output_language
    }
    fn source_text(&self) -> &str {
        &self.text
    }
    fn parameters(&self) -> Option<&ModelParameters> {
        self.config.as_ref()
    }
}

impl FlowRequest for ExpandInput {
    const OPERATION: Operation = Operation::Expand;

    fn output_language(&self) -> &str {
        &self.output_language
    }
    fn source_text(&self) -> &str {
        &self.text
    }
    fn parameters(&self) -> Option<&ModelParameters> {
        self.config.as_ref()
    }
}

impl FlowRequest for SummarizeInput {
    const OPERATION: Operation = Operation::Summarize;

    fn output_language(&self) -> &str {
        &self.output_language
    }
    fn source_text(&self) -> &str {
        &self.report_section
    }
    fn parameters(&self) -> Option<&ModelParameters> {
        self.config.as_ref()
    }
}

impl FlowRequest for ChangeToneInput {
    const OPERATION: Operation = Operation::ChangeTone;

    fn output_language(&self) -> &str {
        &self.output_language
    }
    fn source_text(&self) -> &str {
        &self.report_text
    }
    fn parameters(&self) -> Option<&ModelParameters> {
        self.config.as_ref()
    }
}

impl FlowRequest for DeepResearchInput {
    const OPERATION: Operation = Operation::DeepResearch;

    fn output_language(&self) -> &str {
        &self.output_language
    }
    fn source_text(&self) -> &str {
        &self.input_text
    }
    fn missing_text_messages() -> (Message, Message) {
        (Message::GeneratedTextRequired, Message::GeneratedTextRequiredDetail)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    pub session_id: String,
    pub total_time_ms: u64,
    pub task_times: HashMap<String, u64>,
    #[serde(flatten)]
    pub output: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                message: message.into(),
            },
        }
    }

    fn internal(language: &str, message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            t_code(Message::ErrorOccurred, language),
            message,
        )
    }

    /// Maps a propagated flow failure, singling out an overloaded model.
    fn from_flow_failure(language: &str, message: String) -> Self {
        if is_overloaded(&message) {
            Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                t_code(Message::ErrorOccurred, language),
                t_code(Message::AiServiceOverloaded, language),
            )
        } else {
            Self::internal(language, message)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

async fn health() -> &'static str {
    "OK"
}

fn validate<R: FlowRequest>(request: &R) -> Result<(), ApiError> {
    let language = request.output_language();
    if request.source_text().trim().is_empty() {
        let (title, detail) = R::missing_text_messages();
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            t_code(title, language),
            t_code(detail, language),
        ));
    }
    if let Some(parameters) = request.parameters() {
        parameters.validate().map_err(|e| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                t_code(Message::InvalidParameters, language),
                e.to_string(),
            )
        })?;
    }
    Ok(())
}

#[instrument(skip_all, fields(operation = %R::OPERATION))]
async fn run_flow<R: FlowRequest>(
    State(state): State<AppState>,
    Json(request): Json<R>,
) -> Result<Json<FlowResponse>, ApiError> {
    validate(&request)?;

    let start_time = std::time::Instant::now();
    let language = request.output_language().to_string();
    let session_id = Uuid::new_v4().to_string();
    info!("Starting {} session {}", R::OPERATION, session_id);

    let payload = serde_json::to_value(&request)
        .map_err(|e| ApiError::internal(&language, e.to_string()))?;
    let session = Session::new_from_task(session_id.clone(), R::OPERATION.task_id());
    session.context.set(REQUEST_KEY, payload).await;
    state
        .storage
        .save(session)
        .await
        .map_err(|e| ApiError::internal(&language, e.to_string()))?;

    let outcome = drive_session(&state, &session_id, &language).await;
    let collected = match outcome {
        Ok(()) => collect_response(&state, &session_id, &language).await,
        Err(e) => Err(e),
    };
    if let Err(e) = state.storage.delete(&session_id).await {
        warn!("Failed to delete session {}: {}", session_id, e);
    }
    let (output, task_times) = collected?;

    let total_time_ms = start_time.elapsed().as_millis() as u64;
    info!("{} completed in {}ms", R::OPERATION, total_time_ms);
    Ok(Json(FlowResponse {
        session_id,
        total_time_ms,
        task_times,
        output,
    }))
}

async fn drive_session(state: &AppState, session_id: &str, language: &str) -> Result<(), ApiError> {
    loop {
        let result = state.runner.run(session_id).await.map_err(|e| {
            error!("Workflow error: {}", e);
            ApiError::from_flow_failure(language, e.to_string())
        })?;

        match &result.status {
            ExecutionStatus::Completed => return Ok(()),
            ExecutionStatus::Paused { next_task_id, .. } => {
                info!("Workflow paused, next task: {}", next_task_id);
                continue;
            }
            ExecutionStatus::Error(e) => {
                error!("Workflow error: {}", e);
                return Err(ApiError::from_flow_failure(language, e.to_string()));
            }
            _ => {
                error!("Workflow stopped waiting for input");
                return Err(ApiError::internal(language, "workflow stopped unexpectedly"));
            }
        }
    }
}

async fn collect_response(
    state: &AppState,
    session_id: &str,
    language: &str,
) -> Result<(Map<String, Value>, HashMap<String, u64>), ApiError> {
    let session = state
        .storage
        .get(session_id)
        .await
        .map_err(|e| ApiError::internal(language, e.to_string()))?
        .ok_or_else(|| ApiError::internal(language, "session not found"))?;

    let output: Map<String, Value> = session
        .context
        .get(RESPONSE_KEY)
        .await
        .ok_or_else(|| ApiError::internal(language, "flow produced no response"))?;
    let task_times = session.context.get(TASK_TIMES_KEY).await.unwrap_or_default();
    Ok((output, task_times))
}

async fn web_search(
    State(state): State<AppState>,
    Json(input): Json<WebSearchInput>,
) -> Json<WebSearchOutput> {
    Json(state.search.perform(input).await)
}
