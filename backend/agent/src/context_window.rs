//! History trimming and token estimation.
//!
//! Developer/system messages are never dropped. User/assistant messages are
//! dropped oldest first and two at a time so a reply never loses the turn it
//! answers.

use streamchat_core::{ChatMessage, HistoryPolicy};

/// Coarse token estimate: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

fn total_tokens<'a>(messages: impl IntoIterator<Item = &'a ChatMessage>) -> usize {
    messages.into_iter().map(|m| estimate_tokens(&m.content)).sum()
}

/// Reduce `messages` to at most `max_messages` conversation entries and, where
/// possible, at most `max_tokens` estimated tokens.
///
/// Retained instructions come first in their original order, followed by the
/// surviving conversation in its original order. The token budget never
/// drops the conversation below its last two entries.
pub fn trim(messages: &[ChatMessage], max_messages: usize, max_tokens: usize) -> Vec<ChatMessage> {
    let (retained, mut conversation): (Vec<ChatMessage>, Vec<ChatMessage>) = messages
        .iter()
        .cloned()
        .partition(|m| m.role.is_instruction());

    if conversation.len() > max_messages {
        let keep = max_messages - max_messages % 2;
        conversation.drain(..conversation.len() - keep);
    }

    let retained_tokens = total_tokens(&retained);
    let mut total = retained_tokens + total_tokens(&conversation);
    while total > max_tokens && conversation.len() > 2 {
        conversation.drain(..2);
        total = retained_tokens + total_tokens(&conversation);
    }

    retained.into_iter().chain(conversation).collect()
}

/// A trimmed view of a transcript, ready to send.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    pub messages: Vec<ChatMessage>,
    pub token_count: usize,
    /// Conversation entries left out of `messages`.
    pub dropped: usize,
}

impl ContextWindow {
    pub fn build(transcript: &[ChatMessage], policy: &HistoryPolicy) -> Self {
        let messages = trim(transcript, policy.max_messages, policy.max_tokens);
        let token_count = total_tokens(&messages);
        let dropped = transcript.len() - messages.len();
        Self {
            messages,
            token_count,
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamchat_core::Role;

    fn exchange(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .flat_map(|i| {
                [
                    ChatMessage::user(format!("question {i}")),
                    ChatMessage::assistant(format!("answer {i}")),
                ]
            })
            .collect()
    }

    #[test]
    fn estimate_is_floor_of_quarter_length() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdefghi"), 2);
        // characters, not bytes
        assert_eq!(estimate_tokens("éééé"), 1);
    }

    #[test]
    fn max_messages_keeps_last_four() {
        let mut messages = vec![ChatMessage::system("rules"), ChatMessage::developer("style")];
        messages.extend(exchange(3));
        assert_eq!(messages.len(), 8);

        let trimmed = trim(&messages, 4, 100_000);
        assert_eq!(trimmed.len(), 6);
        assert_eq!(trimmed[0], ChatMessage::system("rules"));
        assert_eq!(trimmed[1], ChatMessage::developer("style"));
        assert_eq!(&trimmed[2..], &messages[4..]);
    }

    #[test]
    fn odd_max_messages_rounds_down_to_pairs() {
        let messages = exchange(4);
        let trimmed = trim(&messages, 5, 100_000);
        assert_eq!(trimmed.len(), 4);
        assert_eq!(trimmed[0].role, Role::User);
        assert_eq!(trimmed[0].content, "question 2");
    }

    #[test]
    fn retained_messages_keep_relative_order_when_interleaved() {
        let messages = vec![
            ChatMessage::user("u0"),
            ChatMessage::system("s0"),
            ChatMessage::assistant("a0"),
            ChatMessage::developer("d0"),
        ];
        let trimmed = trim(&messages, 10, 100_000);
        let contents: Vec<_> = trimmed.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["s0", "d0", "u0", "a0"]);
    }

    #[test]
    fn token_budget_drops_oldest_pairs() {
        let long = "x".repeat(400); // 100 tokens
        let messages = vec![
            ChatMessage::system("s"),
            ChatMessage::user(long.clone()),
            ChatMessage::assistant(long.clone()),
            ChatMessage::user("recent question"),
            ChatMessage::assistant("recent answer"),
        ];
        let trimmed = trim(&messages, 100, 50);
        assert_eq!(trimmed.len(), 3);
        assert_eq!(trimmed[1].content, "recent question");
        assert_eq!(trimmed[2].content, "recent answer");
    }

    #[test]
    fn token_budget_never_goes_below_one_pair() {
        let long = "y".repeat(4000);
        let messages = vec![
            ChatMessage::developer(long.clone()),
            ChatMessage::user(long.clone()),
            ChatMessage::assistant(long),
        ];
        let trimmed = trim(&messages, 10, 1);
        assert_eq!(trimmed.len(), 3);
    }

    #[test]
    fn alternating_input_never_starts_with_assistant() {
        for pairs in 0..6 {
            let messages = exchange(pairs);
            for max_messages in 0..14 {
                for max_tokens in [0, 3, 10, 1000] {
                    let trimmed = trim(&messages, max_messages, max_tokens);
                    if let Some(first) = trimmed.first() {
                        assert_eq!(first.role, Role::User, "{pairs} {max_messages} {max_tokens}");
                    }
                    assert!(trimmed.len() % 2 == 0);
                }
            }
        }
    }

    #[test]
    fn under_limits_is_unchanged() {
        let messages = exchange(2);
        assert_eq!(trim(&messages, 10, 1000), messages);
    }

    #[test]
    fn context_window_reports_drops_and_tokens() {
        let mut messages = vec![ChatMessage::system("abcd")];
        messages.extend(exchange(3));
        let window = ContextWindow::build(
            &messages,
            &HistoryPolicy {
                max_messages: 2,
                max_tokens: 10_000,
            },
        );
        assert_eq!(window.messages.len(), 3);
        assert_eq!(window.dropped, 4);
        assert_eq!(
            window.token_count,
            estimate_tokens("abcd") + estimate_tokens("question 2") + estimate_tokens("answer 2")
        );
    }
}
