//! Scripted in-memory inference service shared by the integration tests.

use async_trait::async_trait;
use photo_enhancer::inference::{InferenceService, ModelRef};
use photo_enhancer::inference_errors::InferenceError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Returns a canned result per model and records every call
#[derive(Default)]
pub struct FakeInference {
    responses: HashMap<String, Result<Value, InferenceError>>,
    calls: Mutex<Vec<(String, Value)>>,
}

#[allow(dead_code)]
impl FakeInference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, model: &str, output: Value) -> Self {
        self.responses.insert(model.to_string(), Ok(output));
        self
    }

    pub fn with_failure(mut self, model: &str, error: InferenceError) -> Self {
        self.responses.insert(model.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceService for FakeInference {
    async fn run(&self, model: &ModelRef, input: Value) -> Result<Value, InferenceError> {
        let key = model.to_string();
        self.calls.lock().unwrap().push((key.clone(), input));
        self.responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(InferenceError::InvalidModel(key)))
    }
}
