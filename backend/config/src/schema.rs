//! streamchat configuration schema, typed for serde YAML/JSON.
//!
//! Every field is optional in the file; `defaults::apply_all_defaults` fills
//! the gaps before the config is used.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use streamchat_core::{ChatConfig, FragmentFilter, HistoryPolicy};

use crate::defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_ENDPOINT, DEFAULT_HISTORY_MAX_MESSAGES,
    DEFAULT_HISTORY_MAX_TOKENS, DEFAULT_MAX_COMPLETION_TOKENS, DEFAULT_MODEL,
    DEFAULT_READ_TIMEOUT_SECS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChatConfig {
    /// Full chat-completions URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Static bearer token; usually `${STREAMCHAT_TOKEN}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,

    /// Sent as a developer message ahead of every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Role of the system prompt: "developer" or "system" for servers that
    /// predate the developer role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<TimeoutConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// "retained" | "stateless"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_messages: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfig {
    /// Drop the "first chunk" placeholder some servers emit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_placeholder: Option<bool>,
    /// Further exact fragments to drop
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppress: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rotated JSON log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversion into runtime values
// ---------------------------------------------------------------------------

impl StreamChatConfig {
    pub fn to_chat_config(&self) -> ChatConfig {
        let timeouts = self.timeouts.clone().unwrap_or_default();
        let stream = self.stream.clone().unwrap_or_default();

        let mut filter = if stream.filter_placeholder.unwrap_or(false) {
            FragmentFilter::placeholder()
        } else {
            FragmentFilter::none()
        };
        for fragment in stream.suppress {
            filter = filter.suppress(fragment);
        }

        ChatConfig {
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            token: self.token.clone().filter(|t| !t.is_empty()),
            max_completion_tokens: self
                .max_completion_tokens
                .unwrap_or(DEFAULT_MAX_COMPLETION_TOKENS),
            connect_timeout: Duration::from_secs(
                timeouts.connect_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            read_timeout: Duration::from_secs(
                timeouts.read_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
            ),
            fragment_filter: filter,
        }
    }

    pub fn history_policy(&self) -> HistoryPolicy {
        let history = self.history.clone().unwrap_or_default();
        HistoryPolicy {
            max_messages: history.max_messages.unwrap_or(DEFAULT_HISTORY_MAX_MESSAGES),
            max_tokens: history.max_tokens.unwrap_or(DEFAULT_HISTORY_MAX_TOKENS),
        }
    }

    /// Whether the system prompt goes out with the `system` role.
    pub fn uses_system_role(&self) -> bool {
        self.system_role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("system"))
    }

    pub fn is_stateless(&self) -> bool {
        self.history
            .as_ref()
            .and_then(|h| h.mode.as_deref())
            .is_some_and(|m| m.eq_ignore_ascii_case("stateless"))
    }
}
