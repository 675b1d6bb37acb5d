//! # Replicate Client Module
//!
//! [`InferenceService`] implementation backed by the Replicate HTTP API.
//!
//! A run resolves the model version (latest published one unless pinned),
//! creates a prediction asking the server to hold the request open until it
//! finishes, then polls the prediction until it reaches a terminal status.

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ReplicateConfig;
use crate::inference::{InferenceService, ModelRef};
use crate::inference_errors::{redact_bot_tokens, InferenceError};

/// Lifecycle states reported for a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionMetrics {
    pub predict_time: Option<f64>,
}

/// A prediction as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub metrics: Option<PredictionMetrics>,
}

#[derive(Debug, Deserialize)]
struct ModelVersion {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    latest_version: Option<ModelVersion>,
}

#[derive(Debug, Clone)]
pub struct ReplicateClient {
    http: reqwest::Client,
    api_url: String,
    api_token: String,
    poll_interval: Duration,
}

impl ReplicateClient {
    pub fn new(config: &ReplicateConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Resolve the latest published version id of a model
    pub async fn latest_version(&self, model: &ModelRef) -> Result<String, InferenceError> {
        let url = format!("{}/models/{}/{}", self.api_url, model.owner, model.name);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let model_info: ModelInfo = parse_response(response).await?;

        model_info
            .latest_version
            .map(|version| version.id)
            .ok_or_else(|| InferenceError::NoPublishedVersion(model.to_string()))
    }

    pub async fn create_prediction(
        &self,
        version: &str,
        input: Value,
    ) -> Result<Prediction, InferenceError> {
        let response = self
            .http
            .post(format!("{}/predictions", self.api_url))
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&json!({ "version": version, "input": input }))
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn get_prediction(&self, id: &str) -> Result<Prediction, InferenceError> {
        let response = self
            .http
            .get(format!("{}/predictions/{}", self.api_url, id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        parse_response(response).await
    }

    /// Poll until the prediction finishes and return its output
    pub async fn wait_for_output(&self, mut prediction: Prediction) -> Result<Value, InferenceError> {
        while !prediction.status.is_terminal() {
            debug!(prediction_id = %prediction.id, status = ?prediction.status, "Prediction still running");
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.get_prediction(&prediction.id).await?;
        }

        match prediction.status {
            PredictionStatus::Succeeded => {
                info!(
                    prediction_id = %prediction.id,
                    predict_time = ?prediction.metrics.as_ref().and_then(|m| m.predict_time),
                    "Prediction succeeded"
                );
                prediction
                    .output
                    .filter(|output| !output.is_null())
                    .ok_or(InferenceError::MissingOutput(prediction.id))
            }
            PredictionStatus::Canceled => Err(InferenceError::Canceled(prediction.id)),
            _ => {
                let detail = redact_bot_tokens(&match prediction.error {
                    Some(Value::String(message)) => message,
                    Some(Value::Null) | None => "unknown error".to_string(),
                    Some(other) => other.to_string(),
                });
                warn!(prediction_id = %prediction.id, error = %detail, "Prediction failed");
                Err(InferenceError::PredictionFailed {
                    id: prediction.id,
                    detail,
                })
            }
        }
    }
}

#[async_trait]
impl InferenceService for ReplicateClient {
    async fn run(&self, model: &ModelRef, input: Value) -> Result<Value, InferenceError> {
        let version = match &model.version {
            Some(version) => version.clone(),
            None => self.latest_version(model).await?,
        };

        debug!(model = %model, version = %version, "Creating prediction");
        let prediction = self.create_prediction(&version, input).await?;
        self.wait_for_output(prediction).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, InferenceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InferenceError::Api {
            status: status.as_u16(),
            detail: redact_bot_tokens(&api_error_detail(&body)),
        });
    }

    Ok(response.json::<T>().await?)
}

/// Extract the human readable part of an API error body
pub fn api_error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
