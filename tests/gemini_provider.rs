use base64::{engine::general_purpose, Engine as _};
use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use educateurself::config::GeminiConfig;
use educateurself::error::AppError;
use educateurself::interfaces::assistant::{
    GroundingSource, ImageInput, StudyAssistant, ANALYSIS_FALLBACK_TEXT,
    NOTE_AUDIT_INSTRUCTION, SEARCH_FALLBACK_TEXT,
};
use educateurself::providers::gemini::GeminiProvider;

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(GeminiConfig {
        api_key: Some("test-key".to_string()),
        base_url: Some(server.base_url()),
        search_model: Some("search-model".to_string()),
        vision_model: Some("vision-model".to_string()),
        timeout_secs: Some(5),
    })
    .expect("build gemini provider")
}

#[tokio::test]
async fn grounded_search_sends_search_tool_and_collects_sources() {
    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/search-model:generateContent")
                .header("x-goog-api-key", "test-key")
                .json_body(json!({
                    "contents": [{"role": "user", "parts": [{"text": "Who chairs the 16th Finance Commission?"}]}],
                    "tools": [{"googleSearch": {}}]
                }));
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Arvind Panagariya."}]},
                    "groundingMetadata": {"groundingChunks": [
                        {"web": {"uri": "https://fincomindia.nic.in", "title": "Finance Commission"}},
                        {"web": {"title": "dangling"}}
                    ]}
                }]
            }));
        })
        .await;

    let answer = provider(&server)
        .grounded_search("Who chairs the 16th Finance Commission?")
        .await
        .expect("search succeeds");

    assert_eq!(answer.text, "Arvind Panagariya.");
    assert_eq!(
        answer.sources,
        vec![GroundingSource {
            title: Some("Finance Commission".to_string()),
            uri: "https://fincomindia.nic.in".to_string(),
        }]
    );
    generate.assert_calls(1);
}

#[tokio::test]
async fn grounded_search_without_text_uses_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/search-model:generateContent");
            then.status(200).json_body(json!({"candidates": []}));
        })
        .await;

    let answer = provider(&server).grounded_search("anything").await.unwrap();

    assert_eq!(answer.text, SEARCH_FALLBACK_TEXT);
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn analyze_image_sends_inline_data_with_sniffed_mime() {
    let server = MockServer::start_async().await;
    let bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 7, 7];
    let encoded = general_purpose::STANDARD.encode(&bytes);
    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/vision-model:generateContent")
                .header("x-goog-api-key", "test-key")
                .json_body(json!({
                    "contents": [{"role": "user", "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": encoded}},
                        {"text": NOTE_AUDIT_INSTRUCTION}
                    ]}]
                }));
            then.status(200).json_body(json!({
                "candidates": [{"content": {"parts": [{"text": "Dates in section 2 are wrong."}]}}]
            }));
        })
        .await;

    let report = provider(&server)
        .analyze_image(&ImageInput::from_bytes(bytes), NOTE_AUDIT_INSTRUCTION)
        .await
        .expect("analysis succeeds");

    assert_eq!(report, "Dates in section 2 are wrong.");
    generate.assert_calls(1);
}

#[tokio::test]
async fn analyze_image_without_text_uses_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/vision-model:generateContent");
            then.status(200).json_body(json!({
                "candidates": [{"content": {"parts": [{"text": "hidden", "thought": true}]}}]
            }));
        })
        .await;

    let report = provider(&server)
        .analyze_image(&ImageInput::from_bytes(vec![1, 2, 3]), NOTE_AUDIT_INSTRUCTION)
        .await
        .unwrap();

    assert_eq!(report, ANALYSIS_FALLBACK_TEXT);
}

#[tokio::test]
async fn provider_rejection_is_an_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/search-model:generateContent");
            then.status(429).body("quota exhausted");
        })
        .await;

    let err = provider(&server).grounded_search("query").await.unwrap_err();

    match err {
        AppError::Http(message) => assert!(message.contains("429"), "{message}"),
        other => panic!("expected http error, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_rejection_body_is_truncated() {
    let server = MockServer::start_async().await;
    let page = format!("<html>{}</html>", "gateway noise ".repeat(200));
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/vision-model:generateContent");
            then.status(502).body(page.clone());
        })
        .await;

    let err = provider(&server)
        .analyze_image(&ImageInput::from_bytes(vec![1]), NOTE_AUDIT_INSTRUCTION)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("502"), "{message}");
    assert!(message.ends_with('…'), "{message}");
    assert!(message.chars().count() < 400, "{}", message.len());
}

#[tokio::test]
async fn undecodable_body_is_a_serialization_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/vision-model:generateContent");
            then.status(200).body("not json");
        })
        .await;

    let err = provider(&server)
        .analyze_image(&ImageInput::from_bytes(vec![1]), NOTE_AUDIT_INSTRUCTION)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Serialization(_)), "{err:?}");
}
