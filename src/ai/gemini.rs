// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Google Gemini `generateContent` client
//!
//! Auth is the `x-goog-api-key` header; the key never appears in a URL. Only the first candidate's text parts
//! are used; no streaming, no tools.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::TextGenerator;
use crate::{OlhosError, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OlhosError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_start_matches("models/").to_string(),
            api_key,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| OlhosError::Adapter("Gemini API key is not configured".to_string()))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| OlhosError::Adapter(format!("Malformed Gemini response: {}", e)))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(OlhosError::Adapter("Gemini returned no text".to_string()));
    }
    Ok(text)
}

/// Prefer the API's own error message over the bare status line
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("Gemini returned status {}: {}", status, envelope.error.message),
        Err(_) => format!("Gemini returned status {}", status),
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let key = self.api_key()?;

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!("Sending request to Gemini: model={}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OlhosError::Adapter(error_message(status, &body)));
        }

        extract_text(&body)
    }

    async fn health_check(&self) -> Result<()> {
        let key = self.api_key()?;
        let url = format!("{}/models/{}", self.base_url, self.model);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, key)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| OlhosError::Adapter(format!("Cannot reach Gemini at {}: {}", self.base_url, e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OlhosError::Adapter(error_message(status, &body)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Briga entre dois indivíduos\n"},
                    {"text": "Nível de Risco: 3"}
                ]}
            }]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "Briga entre dois indivíduos\nNível de Risco: 3");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let err = extract_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap_err();
        assert!(matches!(err, OlhosError::Adapter(_)));
    }

    #[test]
    fn test_extract_text_malformed() {
        assert!(matches!(extract_text("<html>"), Err(OlhosError::Adapter(_))));
    }

    #[test]
    fn test_error_message_uses_api_message() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let msg = error_message(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert!(msg.contains("429"));
        assert!(msg.contains("Resource has been exhausted"));
    }

    #[tokio::test]
    async fn test_missing_key_is_adapter_error() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/v1beta/",
            "models/gemini-2.0-flash",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        let err = client.generate("oi").await.unwrap_err();
        assert!(matches!(err, OlhosError::Adapter(_)));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let client = GeminiClient::new(
            "http://127.0.0.1:1/v1beta",
            "gemini-2.0-flash",
            Some("SECRET-KEY-123".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.generate("oi").await.unwrap_err();
        assert!(matches!(err, OlhosError::Adapter(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"), "{}", err);

        let err = client.health_check().await.unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"), "{}", err);
    }
}
