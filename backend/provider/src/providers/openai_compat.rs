use std::time::Instant;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use streamchat_core::{ChatConfig, ChatError, ChatMessage, ChatProvider, FragmentStream};

use crate::decode::decode_stream;
use crate::lines::into_lines;

/// Streaming client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiCompatProvider {
    client: Client,
    config: ChatConfig,
}

/// Body of a streaming chat-completions request.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub max_completion_tokens: u32,
}

impl OpenAiCompatProvider {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        if config.endpoint.trim().is_empty() {
            return Err(ChatError::Config("endpoint is empty".into()));
        }
        // No idle connections are kept: every turn behaves like a fresh request.
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn request_body<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages,
            stream: true,
            max_completion_tokens: self.config.max_completion_tokens,
        }
    }

    /// JSON body that [`stream_chat`](ChatProvider::stream_chat) would send.
    pub fn request_preview(&self, messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::to_value(self.request_body(messages)).unwrap_or_default()
    }
}

fn request_error(err: reqwest::Error, url: &str) -> ChatError {
    if err.is_timeout() {
        if err.is_connect() {
            ChatError::ConnectTimeout { url: url.to_string() }
        } else {
            ChatError::ReadTimeout
        }
    } else if err.is_connect() {
        ChatError::Connection(format!("could not connect to {url}: {err}"))
    } else {
        ChatError::Connection(err.to_string())
    }
}

fn body_error(err: reqwest::Error) -> ChatError {
    if err.is_timeout() {
        ChatError::ReadTimeout
    } else {
        ChatError::Stream(err.to_string())
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentStream, ChatError> {
        let start = Instant::now();
        let url = &self.config.endpoint;

        info!(
            model = %self.config.model,
            endpoint = %url,
            messages = messages.len(),
            max_completion_tokens = self.config.max_completion_tokens,
            "Sending chat request"
        );

        let mut request = self
            .client
            .post(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .json(&self.request_body(messages));
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            let err = request_error(e, url);
            error!(error = %err, "Chat request failed");
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Chat endpoint returned error status");
            return Err(ChatError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Response headers received; streaming body"
        );

        let chunks = Box::pin(response.bytes_stream().map_err(body_error));
        let lines = Box::pin(into_lines(chunks));
        Ok(Box::pin(decode_stream(
            lines,
            self.config.fragment_filter.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let provider = OpenAiCompatProvider::new(
            ChatConfig::new("http://localhost:9/v1/chat/completions", "m")
                .with_max_completion_tokens(64),
        )
        .unwrap();
        let messages = vec![ChatMessage::developer("be brief"), ChatMessage::user("hi")];
        let body = provider.request_preview(&messages);
        assert_eq!(body["model"], "m");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_completion_tokens"], 64);
        assert_eq!(body["messages"][0]["role"], "developer");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn preview_never_contains_token() {
        let provider = OpenAiCompatProvider::new(
            ChatConfig::new("http://localhost:9/v1/chat/completions", "m").with_token("sk-hidden"),
        )
        .unwrap();
        let body = provider.request_preview(&[ChatMessage::user("hi")]);
        assert!(!body.to_string().contains("sk-hidden"));
    }

    #[test]
    fn rejects_empty_endpoint() {
        let result = OpenAiCompatProvider::new(ChatConfig::new("  ", "m"));
        assert!(matches!(result, Err(ChatError::Config(_))));
    }
}
