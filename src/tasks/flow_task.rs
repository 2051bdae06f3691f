use super::{Backends, Operation, REQUEST_KEY, RESPONSE_KEY, TASK_TIMES_KEY};
use crate::flows;
use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct FlowTask {
    operation: Operation,
    backends: Arc<Backends>,
}

impl FlowTask {
    pub fn new(operation: Operation, backends: Arc<Backends>) -> Self {
        Self { operation, backends }
    }

    async fn execute(&self, request: Value) -> Result<Value, GraphError> {
        let model = self.backends.model.as_ref();
        match self.operation {
            Operation::Rewrite => {
                let output = flows::rewrite(model, decode(request)?)
                    .await
                    .map_err(|e| GraphError::Other(e.into()))?;
                encode(output)
            }
            Operation::Expand => encode(flows::expand(model, decode(request)?).await),
            Operation::Summarize => encode(flows::summarize(model, decode(request)?).await),
            Operation::ChangeTone => {
                let output = flows::change_tone(model, decode(request)?)
                    .await
                    .map_err(|e| GraphError::Other(e.into()))?;
                encode(output)
            }
            Operation::DeepResearch => {
                encode(flows::deep_research(model, &self.backends.search, decode(request)?).await)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(request: Value) -> Result<T, GraphError> {
    serde_json::from_value(request)
        .map_err(|e| GraphError::ContextError(format!("Invalid flow request: {}", e)))
}

fn encode<T: Serialize>(output: T) -> Result<Value, GraphError> {
    serde_json::to_value(output).map_err(|e| GraphError::Other(e.into()))
}

#[async_trait]
impl Task for FlowTask {
    fn id(&self) -> &str {
        self.operation.task_id()
    }

    #[instrument(skip(self, context), fields(task = %self.operation))]
    async fn run(&self, context: Context) -> Result<TaskResult, GraphError> {
        let start_time = std::time::Instant::now();
        info!("Starting {} task", self.operation);

        let request: Value = context
            .get(REQUEST_KEY)
            .await
            .ok_or_else(|| GraphError::ContextError("Flow request not found".to_string()))?;

        let response = self.execute(request).await?;
        context.set(RESPONSE_KEY, response).await;

        let elapsed = start_time.elapsed().as_millis() as u64;
        let mut task_times: HashMap<String, u64> =
            context.get(TASK_TIMES_KEY).await.unwrap_or_default();
        task_times.insert(self.operation.task_id().to_string(), elapsed);
        context.set(TASK_TIMES_KEY, task_times).await;

        info!("{} task finished in {}ms", self.operation, elapsed);
        Ok(TaskResult::new(
            Some(format!("{} completed", self.operation)),
            NextAction::End,
        ))
    }
}
