//! # Inference Error Types Module
//!
//! This module defines the error types raised while talking to the remote
//! inference service and while running the enhancement pipeline on top of it.

use regex::Regex;
use std::sync::LazyLock;

// `bot<id>:<secret>` as it appears in Bot API file and method URLs
static BOT_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"bot\d+(?::|%3[Aa])[A-Za-z0-9_-]+").expect("bot token pattern is valid")
});

/// Replace Telegram bot tokens in error text before it is logged or shown
///
/// Model errors may echo their input, which includes the file download URL.
pub fn redact_bot_tokens(text: &str) -> String {
    BOT_TOKEN_PATTERN
        .replace_all(text, "bot<redacted>")
        .into_owned()
}

/// Errors returned by an [`InferenceService`](crate::inference::InferenceService)
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Transport-level failure (connection, TLS, body decoding)
    Http(String),
    /// The service answered with a non-success status code
    Api { status: u16, detail: String },
    /// A model reference could not be parsed
    InvalidModel(String),
    /// The model exists but has no published version to run
    NoPublishedVersion(String),
    /// The prediction ran and reported a failure
    PredictionFailed { id: String, detail: String },
    /// The prediction was canceled before producing output
    Canceled(String),
    /// The prediction succeeded without any output
    MissingOutput(String),
    /// The output shape cannot be turned into an image
    UnexpectedOutput(String),
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::Http(msg) => write!(f, "HTTP error: {msg}"),
            InferenceError::Api { status, detail } => {
                write!(f, "Inference API error (status {status}): {detail}")
            }
            InferenceError::InvalidModel(model) => write!(f, "Invalid model reference: {model}"),
            InferenceError::NoPublishedVersion(model) => {
                write!(f, "Model {model} has no published version")
            }
            InferenceError::PredictionFailed { id, detail } => {
                write!(f, "Prediction {id} failed: {detail}")
            }
            InferenceError::Canceled(id) => write!(f, "Prediction {id} was canceled"),
            InferenceError::MissingOutput(id) => write!(f, "Prediction {id} returned no output"),
            InferenceError::UnexpectedOutput(msg) => write!(f, "Unexpected model output: {msg}"),
        }
    }
}

impl std::error::Error for InferenceError {}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        InferenceError::Http(err.to_string())
    }
}

/// Errors surfaced by the enhancement pipeline
///
/// Only the upscaling stage can fail the pipeline; face restoration failures
/// are recovered inside [`Enhancer::enhance`](crate::enhancer::Enhancer::enhance).
#[derive(Debug, Clone, PartialEq)]
pub enum EnhanceError {
    Upscale(InferenceError),
}

impl std::fmt::Display for EnhanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnhanceError::Upscale(err) => write!(f, "Upscaling call failed: {err}"),
        }
    }
}

impl std::error::Error for EnhanceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upscale_error_carries_inner_detail() {
        let err = EnhanceError::Upscale(InferenceError::Api {
            status: 402,
            detail: "Monthly spend limit reached".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Upscaling call failed: Inference API error (status 402): Monthly spend limit reached"
        );
    }

    #[test]
    fn test_redact_bot_tokens_in_file_url() {
        let detail = "cannot identify image file 'https://api.telegram.org/file/bot123456:AAH-x_9z/photos/file_1.jpg'";
        assert_eq!(
            redact_bot_tokens(detail),
            "cannot identify image file 'https://api.telegram.org/file/bot<redacted>/photos/file_1.jpg'"
        );
    }

    #[test]
    fn test_redact_bot_tokens_url_encoded() {
        assert_eq!(
            redact_bot_tokens("image=https%3A%2F%2Fapi.telegram.org%2Ffile%2Fbot123456%3AAAH-x_9z%2Fa.jpg"),
            "image=https%3A%2F%2Fapi.telegram.org%2Ffile%2Fbot<redacted>%2Fa.jpg"
        );
    }

    #[test]
    fn test_redact_leaves_other_text_alone() {
        let detail = "Prediction p1 failed: CUDA out of memory (robot 42)";
        assert_eq!(redact_bot_tokens(detail), detail);
    }

    #[test]
    fn test_prediction_failure_message() {
        let err = InferenceError::PredictionFailed {
            id: "abc".to_string(),
            detail: "CUDA out of memory".to_string(),
        };
        assert_eq!(err.to_string(), "Prediction abc failed: CUDA out of memory");
    }
}
