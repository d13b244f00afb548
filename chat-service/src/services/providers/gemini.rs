//! Gemini AI provider implementation.
//!
//! Implements text generation using Google's Gemini `generateContent` API.

use super::{ProviderError, TextProvider};
use crate::config::GeminiSettings;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl From<&GeminiSettings> for GeminiConfig {
    fn from(settings: &GeminiSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base, self.config.model, method
        )
    }
}

/// Map a non-success response to a provider error.
fn classify_failure(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("API_KEY")
    {
        return ProviderError::InvalidCredentials(message);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited;
    }

    ProviderError::ApiError(format!("Gemini API error {}: {}", status, message))
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn complete(
        &self,
        prompt: &str,
        system_instruction: &str,
    ) -> Result<String, ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let request = GenerateContentRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: Some(system_instruction.to_string()),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &error_text));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ProviderError::ContentFiltered);
        }

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(text)
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::YOGA_TRAINER_INSTRUCTION;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

    fn provider(server: &MockServer, api_key: &str) -> GeminiTextProvider {
        GeminiTextProvider::new(GeminiConfig {
            api_key: api_key.to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_base: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn complete_sends_instruction_and_joins_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": YOGA_TRAINER_INSTRUCTION }] },
                "contents": [{ "role": "user", "parts": [{ "text": "How do I do a downward dog?" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Start on all fours. " }, { "text": "Lift your hips." }] },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 9 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = provider(&server, "test-key")
            .complete("How do I do a downward dog?", YOGA_TRAINER_INSTRUCTION)
            .await
            .unwrap();

        assert_eq!(answer, "Start on all fours. Lift your hips.");
    }

    #[tokio::test]
    async fn invalid_key_is_a_credential_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{ "reason": "API_KEY_INVALID" }]
                }
            })))
            .mount(&server)
            .await;

        let err = provider(&server, "bad-key")
            .complete("hello", YOGA_TRAINER_INSTRUCTION)
            .await
            .unwrap_err();

        assert!(err.is_credential_error());
        assert_eq!(
            err,
            ProviderError::InvalidCredentials(
                "API key not valid. Please pass a valid API key.".to_string()
            )
        );
    }

    #[tokio::test]
    async fn rate_limit_is_not_a_credential_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = provider(&server, "test-key")
            .complete("hello", YOGA_TRAINER_INSTRUCTION)
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::RateLimited);
        assert!(!err.is_credential_error());
    }

    #[tokio::test]
    async fn server_error_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
            .mount(&server)
            .await;

        let err = provider(&server, "test-key")
            .complete("hello", YOGA_TRAINER_INSTRUCTION)
            .await
            .unwrap_err();

        match err {
            ProviderError::ApiError(msg) => assert!(msg.contains("backend unavailable")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn safety_block_and_empty_candidates_are_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_partial_json(json!({ "contents": [{ "parts": [{ "text": "blocked" }] }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_partial_json(json!({ "contents": [{ "parts": [{ "text": "empty" }] }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let provider = provider(&server, "test-key");
        assert_eq!(
            provider.complete("blocked", YOGA_TRAINER_INSTRUCTION).await,
            Err(ProviderError::ContentFiltered)
        );
        assert_eq!(
            provider.complete("empty", YOGA_TRAINER_INSTRUCTION).await,
            Err(ProviderError::EmptyResponse)
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider(&server, "")
            .complete("hello", YOGA_TRAINER_INSTRUCTION)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
