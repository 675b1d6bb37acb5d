//! # Enhancement Pipeline Tests
//!
//! Upscale → face restoration ordering, fallback and failure propagation.

use photo_enhancer::config::EnhancementConfig;
use photo_enhancer::enhancer::Enhancer;
use photo_enhancer::inference::ModelRef;
use photo_enhancer::inference_errors::{EnhanceError, InferenceError};
use serde_json::json;
use std::sync::Arc;

mod common;
use common::FakeInference;

const UPSCALE: &str = "nightmareai/real-esrgan";
const RESTORE: &str = "tencentarc/gfpgan";
const SOURCE_URL: &str = "https://api.telegram.org/file/bot123:ABC/photos/file_1.jpg";

fn enhancer(fake: Arc<FakeInference>) -> Enhancer {
    Enhancer::new(fake, EnhancementConfig::default())
}

#[tokio::test]
async fn test_restored_output_wins_when_both_stages_succeed() {
    let fake = Arc::new(
        FakeInference::new()
            .with_output(UPSCALE, json!("https://replicate.delivery/upscaled.png"))
            .with_output(RESTORE, json!("https://replicate.delivery/restored.png")),
    );

    let enhancement = enhancer(fake.clone()).enhance(SOURCE_URL).await.unwrap();

    assert_eq!(enhancement.output, json!("https://replicate.delivery/restored.png"));
    assert!(enhancement.restored);

    let calls = fake.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], (UPSCALE.to_string(), json!({ "image": SOURCE_URL, "scale": 4 })));
    assert_eq!(
        calls[1],
        (RESTORE.to_string(), json!({ "img": "https://replicate.delivery/upscaled.png" }))
    );
}

#[tokio::test]
async fn test_restoration_failure_falls_back_to_upscaled_output() {
    let fake = Arc::new(
        FakeInference::new()
            .with_output(UPSCALE, json!("https://replicate.delivery/upscaled.png"))
            .with_failure(
                RESTORE,
                InferenceError::PredictionFailed {
                    id: "p2".to_string(),
                    detail: "no face detected".to_string(),
                },
            ),
    );

    let enhancement = enhancer(fake.clone()).enhance(SOURCE_URL).await.unwrap();

    assert_eq!(enhancement.output, json!("https://replicate.delivery/upscaled.png"));
    assert!(!enhancement.restored);
    assert_eq!(fake.calls().len(), 2);
}

#[tokio::test]
async fn test_upscale_failure_aborts_pipeline() {
    let fake = Arc::new(
        FakeInference::new()
            .with_failure(
                UPSCALE,
                InferenceError::Api {
                    status: 429,
                    detail: "Request was throttled".to_string(),
                },
            )
            .with_output(RESTORE, json!("https://replicate.delivery/restored.png")),
    );

    let err = enhancer(fake.clone()).enhance(SOURCE_URL).await.unwrap_err();

    assert!(matches!(err, EnhanceError::Upscale(InferenceError::Api { status: 429, .. })));
    assert!(err.to_string().contains("Request was throttled"));
    // Restoration must not run without an upscaled image
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn test_upscaled_output_is_passed_through_unmodified() {
    let upscaled = json!(["https://replicate.delivery/a.png", "https://replicate.delivery/b.png"]);
    let fake = Arc::new(
        FakeInference::new()
            .with_output(UPSCALE, upscaled.clone())
            .with_failure(RESTORE, InferenceError::Canceled("p2".to_string())),
    );

    let enhancement = enhancer(fake.clone()).enhance(SOURCE_URL).await.unwrap();

    assert_eq!(fake.calls()[1].1, json!({ "img": upscaled.clone() }));
    assert_eq!(enhancement.output, upscaled);
}

#[tokio::test]
async fn test_custom_models_are_used() {
    let config = EnhancementConfig {
        upscale_model: ModelRef::new("xinntao", "realesrgan").with_version("1b976a4d"),
        restore_model: ModelRef::new("sczhou", "codeformer"),
        scale: 4,
    };
    let fake = Arc::new(
        FakeInference::new()
            .with_output("xinntao/realesrgan:1b976a4d", json!("https://replicate.delivery/u.png"))
            .with_output("sczhou/codeformer", json!("https://replicate.delivery/r.png")),
    );

    let enhancement = Enhancer::new(fake.clone(), config)
        .enhance(SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(enhancement.output, json!("https://replicate.delivery/r.png"));
    assert_eq!(fake.calls()[0].0, "xinntao/realesrgan:1b976a4d");
}
