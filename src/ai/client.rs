use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{config::AiConfig, error::ApiError};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Outbound boundary to the AI vision API. Both calls return the raw text of
/// the model's reply; turning that text into typed data is `parse`'s job.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Submit an image with the fixed analysis prompt.
    async fn analyze_image(&self, image: Bytes, media_type: &str) -> Result<String, ApiError>;

    /// Submit a plain text prompt.
    async fn complete(&self, prompt: &str) -> Result<String, ApiError>;
}

pub struct AnthropicClient {
    http: Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .build()
            .context("build ai http client")?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    /// One Messages API round trip. Any transport or protocol problem is
    /// `UpstreamUnavailable`; callers retry by resubmitting the request.
    async fn send(&self, content: Value) -> Result<String, ApiError> {
        let resp = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "messages": [{ "role": "user", "content": content }],
            }))
            .send()
            .await
            .map_err(|e| ApiError::UpstreamUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "ai api returned error status");
            return Err(ApiError::UpstreamUnavailable(format!(
                "status {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ApiError::UpstreamUnavailable(e.to_string()))?;
        body["content"][0]["text"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ApiError::UpstreamUnavailable("response contained no text block".into()))
    }
}

#[async_trait]
impl AiClient for AnthropicClient {
    async fn analyze_image(&self, image: Bytes, media_type: &str) -> Result<String, ApiError> {
        debug!(bytes = image.len(), media_type, "submitting meal photo for analysis");
        let data = STANDARD.encode(&image);
        self.send(json!([
            {
                "type": "image",
                "source": { "type": "base64", "media_type": media_type, "data": data },
            },
            { "type": "text", "text": super::prompts::ANALYZE_IMAGE },
        ]))
        .await
    }

    async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        self.send(json!([{ "type": "text", "text": prompt }])).await
    }
}
