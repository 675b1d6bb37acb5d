//! # Enhancement Pipeline
//!
//! Upscales an image with the configured upscaling model, then tries to
//! repair faces in the upscaled result. Restoration is optional: when it
//! fails, the upscaled image is returned instead.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EnhancementConfig;
use crate::inference::InferenceService;
use crate::inference_errors::{redact_bot_tokens, EnhanceError};

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
    /// Raw model output, passed through unmodified
    pub output: Value,
    /// `false` when face restoration failed and `output` is the upscaled image
    pub restored: bool,
}

pub struct Enhancer {
    inference: Arc<dyn InferenceService>,
    config: EnhancementConfig,
}

impl Enhancer {
    pub fn new(inference: Arc<dyn InferenceService>, config: EnhancementConfig) -> Self {
        Self { inference, config }
    }

    pub fn config(&self) -> &EnhancementConfig {
        &self.config
    }

    /// Run the upscale + face restoration pipeline on a retrievable image URL
    pub async fn enhance(&self, image_url: &str) -> Result<Enhancement, EnhanceError> {
        let upscaled = self
            .inference
            .run(
                &self.config.upscale_model,
                json!({ "image": image_url, "scale": self.config.scale }),
            )
            .await
            .map_err(EnhanceError::Upscale)?;

        info!(model = %self.config.upscale_model, "Upscaling completed");

        match self
            .inference
            .run(&self.config.restore_model, json!({ "img": upscaled.clone() }))
            .await
        {
            Ok(restored) => {
                info!(model = %self.config.restore_model, "Face restoration completed");
                Ok(Enhancement {
                    output: restored,
                    restored: true,
                })
            }
            Err(e) => {
                warn!(
                    model = %self.config.restore_model,
                    error = %redact_bot_tokens(&e.to_string()),
                    "Face restoration failed, falling back to upscaled image"
                );
                Ok(Enhancement {
                    output: upscaled,
                    restored: false,
                })
            }
        }
    }
}
