//! Conversion of raw model output into something Telegram can send as a photo.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Url;
use serde_json::Value;
use teloxide::types::InputFile;

use crate::inference_errors::InferenceError;

const UPLOAD_FILE_NAME: &str = "enhanced.png";

/// An enhanced image, either hosted remotely or held in memory
#[derive(Debug, Clone, PartialEq)]
pub enum EnhancedImage {
    Url(Url),
    Bytes(Vec<u8>),
}

impl EnhancedImage {
    /// Interpret a model output
    ///
    /// Accepts an `http(s)` URL string, a base64 `data:` URI, or a list whose
    /// last convertible entry is used.
    pub fn from_output(output: &Value) -> Result<Self, InferenceError> {
        match output {
            Value::String(s) => Self::from_str_output(s),
            Value::Array(items) => items
                .iter()
                .rev()
                .find_map(|item| Self::from_output(item).ok())
                .ok_or_else(|| InferenceError::UnexpectedOutput("no image in output list".to_string())),
            other => Err(InferenceError::UnexpectedOutput(format!(
                "expected an image URL, got {}",
                json_kind(other)
            ))),
        }
    }

    fn from_str_output(s: &str) -> Result<Self, InferenceError> {
        if let Some(rest) = s.strip_prefix("data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| InferenceError::UnexpectedOutput("malformed data URI".to_string()))?;
            if !header.ends_with(";base64") {
                return Err(InferenceError::UnexpectedOutput(
                    "data URI is not base64 encoded".to_string(),
                ));
            }
            let bytes = STANDARD
                .decode(payload)
                .map_err(|e| InferenceError::UnexpectedOutput(e.to_string()))?;
            return Ok(EnhancedImage::Bytes(bytes));
        }

        let url = Url::parse(s).map_err(|e| InferenceError::UnexpectedOutput(format!("{s}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(EnhancedImage::Url(url)),
            scheme => Err(InferenceError::UnexpectedOutput(format!(
                "unsupported URL scheme {scheme}"
            ))),
        }
    }

    pub fn into_input_file(self) -> InputFile {
        match self {
            EnhancedImage::Url(url) => InputFile::url(url),
            EnhancedImage::Bytes(bytes) => InputFile::memory(bytes).file_name(UPLOAD_FILE_NAME),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_output() {
        let image = EnhancedImage::from_output(&json!("https://replicate.delivery/pbxt/out.png")).unwrap();
        assert_eq!(
            image,
            EnhancedImage::Url(Url::parse("https://replicate.delivery/pbxt/out.png").unwrap())
        );
    }

    #[test]
    fn test_data_uri_output() {
        let image = EnhancedImage::from_output(&json!("data:image/png;base64,iVBORw0K")).unwrap();
        assert_eq!(image, EnhancedImage::Bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a]));
    }

    #[test]
    fn test_list_output_uses_last_image() {
        let image = EnhancedImage::from_output(&json!([
            "https://replicate.delivery/a.png",
            "https://replicate.delivery/b.png",
            null
        ]))
        .unwrap();
        assert_eq!(
            image,
            EnhancedImage::Url(Url::parse("https://replicate.delivery/b.png").unwrap())
        );
    }

    #[test]
    fn test_rejects_non_image_output() {
        for output in [json!(null), json!(42), json!({"image": "x"}), json!([]), json!("not a url")] {
            assert!(
                matches!(
                    EnhancedImage::from_output(&output),
                    Err(InferenceError::UnexpectedOutput(_))
                ),
                "expected {output} to be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(EnhancedImage::from_output(&json!("file:///etc/passwd")).is_err());
    }
}
