//! Chat completions API client

use super::ModelClient;
use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::{MapperError, Result};
use indas_mapper_common::Prompt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        model: String,
        temperature: f32,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapperError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
            temperature,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.get_api_key()?,
            config.model.clone(),
            config.temperature,
            &config.base_url,
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

impl ModelClient for OpenAiClient {
    fn provider(&self) -> AiProvider {
        AiProvider::OpenAi
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MapperError::ApiCall(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MapperError::ApiCall(format!("HTTP {}: {}", status, body.trim())));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| MapperError::ApiCall(format!("invalid response body: {}", e)))?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| MapperError::ApiCall("empty response".into()))?;

        tracing::debug!(reply_len = content.len(), "chat completion received");
        Ok(content)
    }
}
