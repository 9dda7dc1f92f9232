use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Placeholder fragment some servers emit ahead of real content.
pub const PLACEHOLDER_FRAGMENT: &str = "first chunk";

/// Connection settings for one chat-completions endpoint.
///
/// Passed explicitly into each provider so several configurations can
/// coexist in one process.
#[derive(Clone)]
pub struct ChatConfig {
    /// Full URL of the chat-completions endpoint.
    pub endpoint: String,
    pub model: String,
    /// Static bearer token, sent as `Authorization: Bearer <token>`.
    pub token: Option<String>,
    pub max_completion_tokens: u32,
    pub connect_timeout: Duration,
    /// Longest wait for any single read, headers or body. A reply may stream
    /// for longer as long as chunks keep arriving.
    pub read_timeout: Duration,
    pub fragment_filter: FragmentFilter,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/v1/chat/completions".to_string(),
            model: "casperhansen/llama-3.3-70b-instruct-awq".to_string(),
            token: None,
            max_completion_tokens: 40,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
            fragment_filter: FragmentFilter::default(),
        }
    }
}

impl ChatConfig {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_max_completion_tokens(mut self, max: u32) -> Self {
        self.max_completion_tokens = max;
        self
    }

    pub fn with_fragment_filter(mut self, filter: FragmentFilter) -> Self {
        self.fragment_filter = filter;
        self
    }
}

// Keeps the bearer token out of `{:?}` output.
impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("max_completion_tokens", &self.max_completion_tokens)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("fragment_filter", &self.fragment_filter)
            .finish()
    }
}

/// Which decoded fragments are dropped before reaching the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentFilter {
    suppressed: Vec<String>,
}

impl FragmentFilter {
    /// Pass every fragment through.
    pub fn none() -> Self {
        Self::default()
    }

    /// Drop the `"first chunk"` placeholder.
    pub fn placeholder() -> Self {
        Self::none().suppress(PLACEHOLDER_FRAGMENT)
    }

    pub fn suppress(mut self, fragment: impl Into<String>) -> Self {
        self.suppressed.push(fragment.into());
        self
    }

    pub fn allows(&self, fragment: &str) -> bool {
        !self.suppressed.iter().any(|s| s == fragment)
    }
}

/// Limits applied to conversation history before each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPolicy {
    pub max_messages: usize,
    pub max_tokens: usize,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            max_messages: 20,
            max_tokens: 3000,
        }
    }
}

/// Aggregated result of one streamed request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub fragments: usize,
}

impl Reply {
    pub fn push(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        self.fragments += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
