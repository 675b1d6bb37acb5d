//! # Inference Module
//!
//! The boundary to the hosted model runner. Models are addressed by
//! `owner/name[:version]` references and invoked with named input fields;
//! whatever a model returns is handed back untouched as JSON.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::inference_errors::InferenceError;

static MODEL_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9_.-]*)/([A-Za-z0-9][A-Za-z0-9_.-]*)(?::([A-Za-z0-9]+))?$")
        .expect("model reference pattern is valid")
});

/// A model hosted on the inference service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    /// Pinned version id; the latest published version is used when absent
    pub version: Option<String>,
}

impl ModelRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl FromStr for ModelRef {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = MODEL_REF_PATTERN
            .captures(s.trim())
            .ok_or_else(|| InferenceError::InvalidModel(s.to_string()))?;

        Ok(Self {
            owner: caps[1].to_string(),
            name: caps[2].to_string(),
            version: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}/{}:{}", self.owner, self.name, version),
            None => write!(f, "{}/{}", self.owner, self.name),
        }
    }
}

/// Runs a named model against JSON input
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn run(&self, model: &ModelRef, input: Value) -> Result<Value, InferenceError>;
}
