use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::GeminiConfig;
use crate::error::{AppError, Result};
use crate::interfaces::assistant::{
    GroundedAnswer, GroundingSource, ImageInput, StudyAssistant, ANALYSIS_FALLBACK_TEXT,
    SEARCH_FALLBACK_TEXT,
};

/// How much of a rejected response body is kept in the error shown to the user.
const ERROR_BODY_PREVIEW_CHARS: usize = 300;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
    /// Set on reasoning parts, which are not part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    /// Base64 encoded bytes.
    data: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize, Debug, Clone, Default)]
struct GoogleSearch {}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    fn grounding_sources(&self) -> Vec<GroundingSource> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.grounding_metadata.as_ref())
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .filter_map(|web| {
                        let uri = web.uri.as_deref()?.trim();
                        (!uri.is_empty()).then(|| GroundingSource {
                            title: web.title.clone(),
                            uri: uri.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn user_content(parts: Vec<Part>) -> Content {
    Content {
        role: Some("user".to_string()),
        parts,
    }
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        ..Part::default()
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()
            .map_err(|e| AppError::Config(format!("gemini client: {e}")))?;
        Ok(Self { client, config })
    }

    #[instrument(name = "gemini_generate", skip(self, request))]
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let api_key = self.config.resolve_api_key().ok_or_else(|| {
            AppError::Config("Gemini API key missing; set GEMINI_API_KEY".to_string())
        })?;
        let url = format!("{}/models/{model}:generateContent", self.config.base_url());
        debug!(model, "gemini generateContent");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Gemini transport failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Http(format!("Gemini read failed: {e}")))?;

        if !status.is_success() {
            warn!(model, status = status.as_u16(), "gemini request rejected");
            return Err(AppError::Http(format!(
                "Gemini request failed ({status}): {}",
                body_preview(&body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::Serialization(format!("Gemini decode failed: {e}")))
    }
}

fn body_preview(body: &str) -> String {
    let body = body.trim();
    let mut chars = body.chars();
    let preview: String = chars.by_ref().take(ERROR_BODY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}…")
    } else {
        preview
    }
}

#[async_trait]
impl StudyAssistant for GeminiProvider {
    async fn grounded_search(&self, query: &str) -> Result<GroundedAnswer> {
        let request = GenerateContentRequest {
            contents: vec![user_content(vec![text_part(query)])],
            tools: Some(vec![Tool {
                google_search: GoogleSearch::default(),
            }]),
        };
        let response = self.generate(&self.config.search_model(), &request).await?;

        let sources = response.grounding_sources();
        let text = response
            .first_text()
            .unwrap_or_else(|| SEARCH_FALLBACK_TEXT.to_string());
        debug!(sources = sources.len(), "grounded search answered");
        Ok(GroundedAnswer { text, sources })
    }

    async fn analyze_image(&self, image: &ImageInput, instruction: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![user_content(vec![
                Part {
                    inline_data: Some(Blob {
                        mime_type: image.mime_type.clone(),
                        data: general_purpose::STANDARD.encode(&image.bytes),
                    }),
                    ..Part::default()
                },
                text_part(instruction),
            ])],
            tools: None,
        };
        let response = self.generate(&self.config.vision_model(), &request).await?;
        Ok(response
            .first_text()
            .unwrap_or_else(|| ANALYSIS_FALLBACK_TEXT.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_request_enables_google_search() {
        let request = GenerateContentRequest {
            contents: vec![user_content(vec![text_part("RBI repo rate")])],
            tools: Some(vec![Tool {
                google_search: GoogleSearch::default(),
            }]),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "RBI repo rate"}]}],
                "tools": [{"googleSearch": {}}]
            })
        );
    }

    #[test]
    fn extracts_text_and_filters_sources_without_uri() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking", "thought": true},
                    {"text": "Repo rate "},
                    {"text": "is 6.5%."}
                ]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://rbi.org.in/a", "title": "RBI"}},
                    {"web": {"title": "no link"}},
                    {"web": {"uri": "https://pib.gov.in/b"}},
                    {}
                ]}
            }]
        }))
        .unwrap();

        assert_eq!(response.first_text().as_deref(), Some("Repo rate is 6.5%."));
        assert_eq!(
            response.grounding_sources(),
            vec![
                GroundingSource {
                    title: Some("RBI".to_string()),
                    uri: "https://rbi.org.in/a".to_string()
                },
                GroundingSource {
                    title: None,
                    uri: "https://pib.gov.in/b".to_string()
                },
            ]
        );
    }

    #[test]
    fn error_body_is_capped() {
        assert_eq!(body_preview("  quota exhausted \n"), "quota exhausted");

        let long = "é".repeat(ERROR_BODY_PREVIEW_CHARS + 50);
        let preview = body_preview(&long);
        assert_eq!(preview.chars().count(), ERROR_BODY_PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));

        let exact = "x".repeat(ERROR_BODY_PREVIEW_CHARS);
        assert_eq!(body_preview(&exact), exact);
    }

    #[test]
    fn missing_candidates_yield_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.first_text(), None);
        assert!(response.grounding_sources().is_empty());
    }
}
