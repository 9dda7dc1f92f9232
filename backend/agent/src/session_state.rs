//! Caller-owned conversation state.

use streamchat_core::ChatMessage;
use uuid::Uuid;

/// Whether a conversation keeps its exchanges between turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Every turn is sent on its own, like a single command-line request.
    Stateless,
    /// Completed exchanges are appended and sent (trimmed) on later turns.
    #[default]
    Retained,
}

/// One conversation. Owned and passed in by the caller on every turn.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: Uuid,
    pub mode: HistoryMode,
    /// Instructions sent ahead of the transcript on every turn.
    pub instructions: Vec<ChatMessage>,
    /// Full, untrimmed user/assistant transcript.
    pub transcript: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(mode: HistoryMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            instructions: Vec::new(),
            transcript: Vec::new(),
        }
    }

    pub fn with_instruction(mut self, message: ChatMessage) -> Self {
        self.instructions.push(message);
        self
    }

    /// Prior messages to send before the next user message.
    pub fn history(&self) -> Vec<ChatMessage> {
        match self.mode {
            HistoryMode::Stateless => self.instructions.clone(),
            HistoryMode::Retained => self
                .instructions
                .iter()
                .chain(&self.transcript)
                .cloned()
                .collect(),
        }
    }

    /// Append a completed exchange. No-op for stateless conversations.
    pub fn record_exchange(&mut self, user: ChatMessage, assistant: ChatMessage) {
        if self.mode == HistoryMode::Retained {
            self.transcript.push(user);
            self.transcript.push(assistant);
        }
    }

    /// Forget the transcript; instructions stay.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Number of completed exchanges in the transcript.
    pub fn turns(&self) -> usize {
        self.transcript.len() / 2
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(HistoryMode::default())
    }
}
