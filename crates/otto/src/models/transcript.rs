use super::message::Message;

/// The ordered conversation state for a single run. Messages are appended,
/// never reordered or pruned, and the whole sequence is replayed to the
/// model every round.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
