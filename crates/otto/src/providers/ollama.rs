use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::base::{Provider, Usage};
use super::configs::OllamaProviderConfig;
use super::utils::{messages_to_spec, ollama_response_to_message};
use crate::models::message::Message;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "qwen2.5-coder:7b";

pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let input_tokens = data
            .get("prompt_eval_count")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = data
            .get("eval_count")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        debug!(%url, model = %self.config.model, "posting chat request");

        let response = self.client.post(&url).json(&payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            _ => Err(anyhow!("Request failed: {}", response.status())),
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, messages: &[Message]) -> Result<(Message, Usage)> {
        let payload = json!({
            "model": self.config.model,
            "messages": messages_to_spec(messages),
            "stream": false,
        });

        let response = self.post(payload).await?;
        let message = ollama_response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}
