use anyhow::{Context, Result};
use std::env;

use super::ollama::{OLLAMA_HOST, OLLAMA_MODEL};
use super::openai::{OPENAI_HOST, OPENAI_MODEL};

/// Unified enum to wrap different provider configurations
pub enum ProviderConfig {
    Ollama(OllamaProviderConfig),
    OpenAi(OpenAiProviderConfig),
}

pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
}

impl OllamaProviderConfig {
    pub fn new(host: String, model: String) -> Self {
        Self { host, model }
    }

    pub fn from_env() -> Result<Self> {
        let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| OLLAMA_HOST.to_string());
        let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| OLLAMA_MODEL.to_string());
        Ok(Self::new(host, model))
    }
}

pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OpenAiProviderConfig {
    pub fn new(host: String, api_key: String, model: String) -> Self {
        Self {
            host,
            api_key,
            model,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        let host = env::var("OPENAI_HOST").unwrap_or_else(|_| OPENAI_HOST.to_string());
        let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| OPENAI_MODEL.to_string());
        Ok(Self::new(host, api_key, model))
    }
}
