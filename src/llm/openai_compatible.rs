// ABOUTME: OpenAI-compatible chat-completions client used by the AI coach
// ABOUTME: Bearer auth, configurable base URL/model/timeout, and error-body mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # `OpenAI`-Compatible Provider
//!
//! Talks to any endpoint implementing `POST {base_url}/chat/completions`: `OpenAI`
//! itself, Groq, Together, a local Ollama or vLLM server, and so on. Upstream
//! failures become `ExternalServiceError` (502) with the detail logged here; the
//! client only sees a short description.

use std::time::Duration;

use async_trait::async_trait;
use fitcoach_core::errors::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::config::LlmConfig;

/// Service label used in error messages
const SERVICE: &str = "LLM";

/// Connection establishment timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// OpenAI-compatible API request structure
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Message structure for OpenAI-compatible API
#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

/// OpenAI-compatible API response structure
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Connection settings for the provider
#[derive(Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Bearer key
    pub api_key: String,
    /// Model used when a request does not name one
    pub default_model: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompatibleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatibleConfig {
    /// Settings from server configuration; `None` when no API key is configured
    #[must_use]
    pub fn from_llm_config(config: &LlmConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref().filter(|key| !key.trim().is_empty())?;
        Some(Self {
            base_url: config.base_url.clone(),
            api_key: api_key.to_owned(),
            default_model: config.model.clone(),
            timeout: config.timeout(),
        })
    }
}

/// Chat-completions client
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: OpenAiCompatibleConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    fn transport_error(e: &reqwest::Error) -> AppError {
        error!(error = %e, "LLM request failed");
        if e.is_timeout() {
            AppError::external_service(SERVICE, "The AI coach timed out")
        } else if e.is_connect() {
            AppError::external_service(SERVICE, "Cannot reach the AI coach")
        } else {
            AppError::external_service(SERVICE, format!("Request failed: {e}"))
        }
    }

    /// Map a non-success response to an error
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let detail = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |parsed| {
                format!(
                    "{} ({})",
                    parsed.error.message,
                    parsed.error.error_type.as_deref().unwrap_or("unknown")
                )
            },
        );
        error!(status = %status, detail = %detail, "LLM API returned an error");

        match status.as_u16() {
            401 | 403 => AppError::external_service(SERVICE, "The AI coach rejected our credentials"),
            429 => AppError::external_service(
                SERVICE,
                "The AI coach is rate limited. Please try again shortly.",
            ),
            404 => AppError::external_service(SERVICE, "Configured model or endpoint not found"),
            _ => AppError::external_service(SERVICE, format!("API error ({status})")),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let body = OpenAiRequest {
            model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };
        debug!(messages = body.messages.len(), "Sending chat completion request");

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &text));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to parse chat completion response");
            AppError::external_service(SERVICE, "Unreadable response from the AI coach")
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE, "API returned no choices"))?;
        let content = choice.message.content.unwrap_or_default();

        debug!(
            chars = content.len(),
            finish_reason = ?choice.finish_reason,
            "Received chat completion"
        );

        Ok(ChatResponse {
            content,
            model: parsed.model.unwrap_or_else(|| model.to_owned()),
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> AppResult<bool> {
        let response = self
            .client
            .get(self.api_url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let healthy = response.status().is_success();
        if !healthy {
            warn!(status = %response.status(), "LLM health check failed");
        }
        Ok(healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_api_key() {
        let mut config = LlmConfig::default();
        assert!(OpenAiCompatibleConfig::from_llm_config(&config).is_none());

        config.api_key = Some("   ".to_owned());
        assert!(OpenAiCompatibleConfig::from_llm_config(&config).is_none());

        config.api_key = Some("sk-test".to_owned());
        let provider_config = OpenAiCompatibleConfig::from_llm_config(&config).unwrap();
        assert_eq!(provider_config.default_model, "gpt-4o-mini");
        assert!(!format!("{provider_config:?}").contains("sk-test"));
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
            base_url: "http://localhost:11434/v1/".to_owned(),
            api_key: "key".to_owned(),
            default_model: "llama3".to_owned(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(
            provider.api_url("chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_error_mapping() {
        let error = OpenAiCompatibleProvider::parse_error_response(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error"}}"#,
        );
        assert_eq!(error.http_status(), 502);

        let error = OpenAiCompatibleProvider::parse_error_response(
            reqwest::StatusCode::BAD_GATEWAY,
            "<html>upstream down</html>",
        );
        assert!(error.message.contains("502"));
    }
}
