use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::models::message::Message;

/// Convert the internal messages to the `{role, content}` pairs every chat
/// completion backend accepts. Timestamps never go over the wire.
pub fn messages_to_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role,
                "content": message.content,
            })
        })
        .collect()
}

/// Pull the assistant text out of an ollama `/api/chat` response body.
///
/// Falls back to the bare `response` field some endpoints return for the
/// same content before giving up.
pub fn ollama_response_to_message(payload: &Value) -> Result<Message> {
    if let Some(text) = payload.pointer("/message/content").and_then(Value::as_str) {
        return Ok(Message::assistant(text));
    }
    if let Some(text) = payload.get("response").and_then(Value::as_str) {
        return Ok(Message::assistant(text));
    }
    Err(anyhow!("no assistant content in response: {}", payload))
}

/// Pull the assistant text out of an OpenAI-style chat completion body,
/// tolerating proxies that flatten the choices array away.
pub fn openai_response_to_message(payload: &Value) -> Result<Message> {
    if let Some(text) = payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return Ok(Message::assistant(text));
    }
    if let Some(text) = payload.get("content").and_then(Value::as_str) {
        return Ok(Message::assistant(text));
    }
    Err(anyhow!("no assistant content in response: {}", payload))
}
