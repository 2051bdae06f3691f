#![allow(dead_code)]

use async_trait::async_trait;
use energy_audit_assistant::error::LlmError;
use energy_audit_assistant::llm::{GenerateRequest, LanguageModel};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Stand-in for Gemini: replays queued replies and records requests.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        let model = Self::default();
        model.replies.lock().unwrap().push_back(Ok(reply.into()));
        model
    }

    pub fn failing(message: &str) -> Self {
        let model = Self::default();
        model
            .replies
            .lock()
            .unwrap()
            .push_back(Err(LlmError::Provider(message.to_string())));
        model
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> GenerateRequest {
        self.requests.lock().unwrap().last().cloned().expect("model was never called")
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: GenerateRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Provider("no scripted reply".to_string())))
    }
}
