use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::error::ChatError;
use crate::message::ChatMessage;
use crate::types::Reply;

/// Lazy sequence of reply fragments for one request.
///
/// Ends after `[DONE]` or when the connection closes. An `Err` item is
/// terminal: nothing follows it.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// A chat-completions backend that streams its replies.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name (e.g., "openai-compat", "mock").
    fn name(&self) -> &str;

    /// Issue one request and return its fragments as they arrive.
    ///
    /// Connection and HTTP status failures are returned as `Err` before any
    /// fragment is produced.
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentStream, ChatError>;

    /// Issue one request and wait for the whole reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Reply, ChatError> {
        let mut stream = self.stream_chat(messages).await?;
        let mut reply = Reply::default();
        while let Some(fragment) = stream.next().await {
            reply.push(&fragment?);
        }
        Ok(reply)
    }
}
