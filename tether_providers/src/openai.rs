use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tether_core::{ChatMessage, CompletionGateway, GatewayError};
use tracing::{debug, info};

use crate::retry::{RetryPolicy, retry_with_backoff};

/// Connection settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ProviderSettings {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.deepseek.com";
    pub const DEFAULT_MODEL: &'static str = "deepseek-chat";

    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

/// `CompletionGateway` over `POST {base_url}/chat/completions`.
///
/// Works with DeepSeek, OpenAI and other services speaking the same API.
#[derive(Debug, Clone)]
pub struct OpenAiCompatProvider {
    client: Client,
    settings: ProviderSettings,
}

impl OpenAiCompatProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, GatewayError> {
        info!(
            "Creating completion provider: base_url={}, model={}",
            settings.base_url, settings.model
        );
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self { client, settings })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &Value) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(endpoint(&self.settings.base_url))
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        parse_completion(&body)
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn build_request(model: &str, messages: &[ChatMessage], max_tokens: u32) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
        .collect();

    json!({
        "model": model,
        "messages": messages,
        "max_tokens": max_tokens,
    })
}

fn parse_completion(response: &Value) -> Result<String, GatewayError> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| GatewayError::MalformedResponse("missing choices[0].message.content".into()))?;

    if let Some(usage) = response["usage"].as_object() {
        debug!(
            "Token usage: prompt={} completion={} total={}",
            usage.get("prompt_tokens").and_then(serde_json::Value::as_u64).unwrap_or(0),
            usage
                .get("completion_tokens")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0),
            usage.get("total_tokens").and_then(serde_json::Value::as_u64).unwrap_or(0),
        );
    }

    if content.trim().is_empty() {
        return Err(GatewayError::EmptyResponse);
    }

    Ok(content.to_string())
}

#[async_trait]
impl CompletionGateway for OpenAiCompatProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_output_tokens: u32,
    ) -> Result<String, GatewayError> {
        let request = build_request(&self.settings.model, messages, max_output_tokens);

        debug!(
            "Sending {} messages to {} (max_tokens={max_output_tokens})",
            messages.len(),
            self.settings.model
        );

        let content = retry_with_backoff(
            || self.try_send(&request),
            &self.settings.retry,
            GatewayError::is_retryable,
        )
        .await?;

        debug!("Received {} chars from {}", content.len(), self.settings.model);
        Ok(content)
    }
}
