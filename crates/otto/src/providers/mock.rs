use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::providers::base::{Provider, Usage};

/// A mock provider that returns pre-configured responses for testing and
/// records every transcript it is sent, so tests can assert on what the
/// model would have seen.
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The transcripts received so far, one per `complete` call
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Shared handle for asserting after the provider has been boxed away
    pub fn recorder(&self) -> Arc<Mutex<Vec<Vec<Message>>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, messages: &[Message]) -> Result<(Message, Usage)> {
        self.calls.lock().unwrap().push(messages.to_vec());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok((Message::assistant(""), Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
