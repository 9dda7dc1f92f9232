//! One chat turn: trim, send, stream, record.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tracing::{debug, error, info, instrument};

use streamchat_core::{ChatError, ChatMessage, ChatProvider, HistoryPolicy, Reply};

use crate::context_window::ContextWindow;
use crate::session_state::Conversation;

/// Drives turns against a provider. Holds no conversation state itself.
pub struct ChatRunner {
    pub provider: Arc<dyn ChatProvider>,
    pub policy: HistoryPolicy,
}

impl ChatRunner {
    pub fn new(provider: Arc<dyn ChatProvider>, policy: HistoryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Message list for the next request: trimmed history plus the new
    /// user message.
    ///
    /// The new message is appended after trimming so a pair-aligned history
    /// still starts with a user turn and the message itself is never dropped.
    pub fn prepare(&self, conversation: &Conversation, user: &ChatMessage) -> Vec<ChatMessage> {
        let window = ContextWindow::build(&conversation.history(), &self.policy);
        if window.dropped > 0 {
            info!(
                dropped = window.dropped,
                kept = window.messages.len(),
                estimated_tokens = window.token_count,
                "Trimmed conversation history"
            );
        }
        let mut messages = window.messages;
        messages.push(user.clone());
        messages
    }

    /// Run one turn, handing each fragment to `on_fragment` as it arrives.
    ///
    /// On success the exchange is recorded in `conversation` (retained mode
    /// only). On error the conversation is left exactly as it was.
    #[instrument(skip_all, fields(conversation = %conversation.id, provider = self.provider.name()))]
    pub async fn send<F>(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
        mut on_fragment: F,
    ) -> Result<Reply, ChatError>
    where
        F: FnMut(&str),
    {
        let start = Instant::now();
        let user = ChatMessage::user(user_text);
        let messages = self.prepare(conversation, &user);
        debug!(messages = messages.len(), "Starting turn");

        let mut stream = self.provider.stream_chat(&messages).await.inspect_err(|err| {
            error!(error = %err, "Turn failed before streaming");
        })?;

        let mut reply = Reply::default();
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    on_fragment(&fragment);
                    reply.push(&fragment);
                }
                Err(err) => {
                    error!(
                        error = %err,
                        received = reply.fragments,
                        "Stream failed; discarding partial reply"
                    );
                    return Err(err);
                }
            }
        }

        info!(
            fragments = reply.fragments,
            chars = reply.text.chars().count(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Turn completed"
        );
        conversation.record_exchange(user, ChatMessage::assistant(reply.text.clone()));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_state::HistoryMode;
    use streamchat_core::Role;
    use streamchat_provider::MockProvider;

    fn runner(provider: Arc<MockProvider>, policy: HistoryPolicy) -> ChatRunner {
        ChatRunner::new(provider, policy)
    }

    #[tokio::test]
    async fn retained_turn_records_exchange() {
        let provider = Arc::new(MockProvider::new("mock").with_fragments(["Hi", " there"]));
        let runner = runner(provider.clone(), HistoryPolicy::default());
        let mut conversation =
            Conversation::default().with_instruction(ChatMessage::developer("be brief"));

        let mut seen = Vec::new();
        let reply = runner
            .send(&mut conversation, "hello", |f| seen.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["Hi", " there"]);
        assert_eq!(reply.text, "Hi there");
        assert_eq!(
            conversation.transcript,
            vec![ChatMessage::user("hello"), ChatMessage::assistant("Hi there")]
        );

        let sent = provider.requests().await;
        assert_eq!(
            sent[0],
            vec![ChatMessage::developer("be brief"), ChatMessage::user("hello")]
        );
    }

    #[tokio::test]
    async fn second_turn_carries_history() {
        let provider = Arc::new(MockProvider::new("mock").with_fragments(["ok"]));
        let runner = runner(provider.clone(), HistoryPolicy::default());
        let mut conversation = Conversation::default();

        runner.send(&mut conversation, "one", |_| {}).await.unwrap();
        runner.send(&mut conversation, "two", |_| {}).await.unwrap();

        let sent = provider.requests().await;
        assert_eq!(sent[1].len(), 3);
        assert_eq!(sent[1][0], ChatMessage::user("one"));
        assert_eq!(sent[1][2], ChatMessage::user("two"));
        assert_eq!(conversation.turns(), 2);
    }

    #[tokio::test]
    async fn stateless_turns_send_only_new_message() {
        let provider = Arc::new(MockProvider::new("mock").with_fragments(["ok"]));
        let runner = runner(provider.clone(), HistoryPolicy::default());
        let mut conversation = Conversation::new(HistoryMode::Stateless);

        runner.send(&mut conversation, "one", |_| {}).await.unwrap();
        runner.send(&mut conversation, "two", |_| {}).await.unwrap();

        let sent = provider.requests().await;
        assert_eq!(sent[1], vec![ChatMessage::user("two")]);
        assert!(conversation.transcript.is_empty());
    }

    #[tokio::test]
    async fn history_is_trimmed_before_new_message() {
        let provider = Arc::new(MockProvider::new("mock").with_fragments(["ok"]));
        let policy = HistoryPolicy {
            max_messages: 2,
            max_tokens: 100_000,
        };
        let runner = runner(provider.clone(), policy);
        let mut conversation = Conversation::default();
        for i in 0..3 {
            conversation.record_exchange(
                ChatMessage::user(format!("q{i}")),
                ChatMessage::assistant(format!("a{i}")),
            );
        }

        runner.send(&mut conversation, "latest", |_| {}).await.unwrap();

        let sent = &provider.requests().await[0];
        let contents: Vec<_> = sent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q2", "a2", "latest"]);
        assert_eq!(sent[0].role, Role::User);
        // the stored transcript is never trimmed
        assert_eq!(conversation.turns(), 4);
    }

    #[tokio::test]
    async fn http_error_leaves_history_untouched() {
        let provider = Arc::new(MockProvider::new("mock").with_status(500, "server overloaded"));
        let runner = runner(provider, HistoryPolicy::default());
        let mut conversation = Conversation::default();
        conversation.record_exchange(ChatMessage::user("q"), ChatMessage::assistant("a"));

        let err = runner
            .send(&mut conversation, "again", |_| panic!("no fragments expected"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("server overloaded"));
        assert_eq!(conversation.turns(), 1);
    }

    #[tokio::test]
    async fn broken_stream_discards_partial_reply() {
        let provider = Arc::new(
            MockProvider::new("mock")
                .with_lines([r#"data: {"choices":[{"delta":{"content":"half"}}]}"#, ""])
                .with_broken_stream(),
        );
        let runner = runner(provider, HistoryPolicy::default());
        let mut conversation = Conversation::default();

        let mut seen = String::new();
        let result = runner
            .send(&mut conversation, "q", |f| seen.push_str(f))
            .await;
        assert!(matches!(result, Err(ChatError::Stream(_))));
        assert_eq!(seen, "half");
        assert!(conversation.transcript.is_empty());
    }
}
