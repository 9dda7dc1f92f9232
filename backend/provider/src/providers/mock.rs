use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use streamchat_core::{ChatError, ChatMessage, ChatProvider, FragmentFilter, FragmentStream};

use crate::decode::decode_stream;

/// A provider that replays canned SSE lines instead of calling a server.
///
/// Every request is recorded so tests can inspect what would have been sent.
pub struct MockProvider {
    name: String,
    lines: Vec<String>,
    status: Option<(u16, String)>,
    break_after_lines: bool,
    filter: FragmentFilter,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
            status: None,
            break_after_lines: false,
            filter: FragmentFilter::default(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Raw SSE lines, terminators stripped.
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Well-formed `data:` events for each fragment followed by `[DONE]`.
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines = Vec::new();
        for fragment in fragments {
            let chunk = serde_json::json!({"choices": [{"delta": {"content": fragment.as_ref()}}]});
            lines.push(format!("data: {chunk}"));
            lines.push(String::new());
        }
        lines.push("data: [DONE]".to_string());
        lines.push(String::new());
        self.with_lines(lines)
    }

    /// Answer every request with this HTTP status instead of a stream.
    pub fn with_status(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status = Some((status, body.into()));
        self
    }

    /// Drop the connection after the canned lines instead of closing cleanly.
    pub fn with_broken_stream(mut self) -> Self {
        self.break_after_lines = true;
        self
    }

    pub fn with_filter(mut self, filter: FragmentFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Message lists received so far, oldest first.
    pub async fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentStream, ChatError> {
        self.requests.lock().await.push(messages.to_vec());

        if let Some((status, body)) = &self.status {
            return Err(ChatError::HttpStatus {
                status: *status,
                body: body.clone(),
            });
        }

        let mut lines: Vec<Result<String, ChatError>> =
            self.lines.iter().cloned().map(Ok).collect();
        if self.break_after_lines {
            lines.push(Err(ChatError::Stream("connection reset by peer".into())));
        }
        Ok(Box::pin(decode_stream(stream::iter(lines), self.filter.clone())))
    }
}
