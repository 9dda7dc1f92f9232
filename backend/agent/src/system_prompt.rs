//! Instruction message sent ahead of every request.

use streamchat_core::{ChatMessage, Role};

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Be concise and clear in your responses.";

pub struct PromptBuilder {
    text: String,
    role: Role,
}

impl PromptBuilder {
    /// A developer-role prompt, as chat-completions servers expect by default.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Developer,
        }
    }

    /// Send as `system` instead, for servers that predate the developer role.
    pub fn as_system(mut self) -> Self {
        self.role = Role::System;
        self
    }

    /// `None` when the prompt is blank.
    pub fn build(self) -> Option<ChatMessage> {
        let text = self.text.trim();
        if text.is_empty() {
            None
        } else {
            Some(ChatMessage::new(self.role, text))
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_developer_role() {
        let msg = PromptBuilder::default().build().unwrap();
        assert_eq!(msg.role, Role::Developer);
        assert_eq!(msg.content, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn blank_prompt_builds_nothing() {
        assert!(PromptBuilder::new("   ").build().is_none());
        assert_eq!(
            PromptBuilder::new(" hi ").as_system().build(),
            Some(ChatMessage::system("hi"))
        );
    }
}
