//! Interpretation of one SSE payload from a chat-completions stream.

use serde::Deserialize;
use tracing::debug;

use streamchat_core::FragmentFilter;

/// Payload that ends the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Streaming chat-completion chunk; only the fields we read.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// What a payload means for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `[DONE]`: stop decoding.
    Done,
    /// Text to hand to the caller.
    Fragment(String),
    /// Nothing to emit: heartbeat, control chunk, malformed JSON or a
    /// filtered fragment.
    Skip,
}

pub fn interpret_payload(payload: &str, filter: &FragmentFilter) -> Payload {
    if payload == DONE_SENTINEL {
        return Payload::Done;
    }

    let chunk: ChatCompletionChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(err) => {
            debug!(error = %err, len = payload.len(), "Skipping unparseable SSE payload");
            return Payload::Skip;
        }
    };

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Payload::Skip;
    };
    if let Some(reason) = &choice.finish_reason {
        debug!(finish_reason = %reason, "Choice finished");
    }

    match choice.delta.and_then(|d| d.content) {
        Some(text) if !text.is_empty() => {
            if filter.allows(&text) {
                Payload::Fragment(text)
            } else {
                debug!(fragment = %text, "Dropping filtered fragment");
                Payload::Skip
            }
        }
        _ => Payload::Skip,
    }
}
