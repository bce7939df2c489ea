use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for chat completion backends (Ollama, OpenAI-compatible, etc).
///
/// The full role-tagged transcript is sent every call; the backend returns
/// the next assistant message. Transport, retries and timeouts live behind
/// this boundary.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next assistant message for the given transcript
    async fn complete(&self, messages: &[Message]) -> Result<(Message, Usage)>;
}
