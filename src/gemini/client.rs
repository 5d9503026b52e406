//! Thin HTTP client for the Gemini `generateContent` endpoint.
//!
//! - `generate_avatar` posts a composed payload and returns the bytes of the
//!   first image part in the response.
//! - Transport failures, quota exhaustion, upstream errors, and imageless
//!   responses are classified separately so the HTTP surface can map them.
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

fn error_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(message) = value.pointer("/error/message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }
    trimmed.chars().take(500).collect()
}

fn extract_image(response: GenerateContentResponse) -> AppResult<Vec<u8>> {
    for candidate in response.candidates.unwrap_or_default() {
        let parts = candidate.content.and_then(|c| c.parts).unwrap_or_default();
        for part in parts {
            match part {
                Part::InlineData { inline_data } if inline_data.mime_type.starts_with("image/") => {
                    return general_purpose::STANDARD
                        .decode(inline_data.data)
                        .map_err(|e| AppError::Upstream(format!("Undecodable image data: {}", e)));
                }
                Part::Text { text } => {
                    tracing::debug!("Model text part: {:.200}", text);
                }
                Part::InlineData { .. } => {}
            }
        }
    }
    Err(AppError::NoImageReturned)
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        GeminiClient { client: Client::new(), base_url: base, api_key, model }
    }

    /// Send one composed `generateContent` payload and return the generated
    /// image bytes. A single attempt is made per call.
    pub async fn generate_avatar(&self, payload: Value) -> AppResult<Vec<u8>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::info!("Requesting avatar generation from model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(AppError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Generation quota exceeded: {}", detail);
                return Err(AppError::QuotaExceeded);
            }
            return Err(AppError::Upstream(format!("status {}: {}", status, detail)));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(AppError::Network)?;
        extract_image(parsed)
    }
}
