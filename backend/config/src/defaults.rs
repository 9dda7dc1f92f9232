//! Config defaults: applies default values to a parsed config.

use crate::schema::{HistoryConfig, LoggingConfig, StreamChatConfig, StreamConfig, TimeoutConfig};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "casperhansen/llama-3.3-70b-instruct-awq";

/// Default `max_completion_tokens` per request.
pub const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 40;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Be concise and clear in your responses.";

pub const DEFAULT_SYSTEM_ROLE: &str = "developer";

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_HISTORY_MAX_MESSAGES: usize = 20;

/// Estimated-token budget for the history sent with each request.
pub const DEFAULT_HISTORY_MAX_TOKENS: usize = 3000;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: StreamChatConfig) -> StreamChatConfig {
    let config = apply_endpoint_defaults(config);
    let config = apply_timeout_defaults(config);
    let config = apply_history_defaults(config);
    let config = apply_stream_defaults(config);
    apply_logging_defaults(config)
}

fn apply_endpoint_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    config.endpoint.get_or_insert_with(|| DEFAULT_ENDPOINT.to_string());
    config.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    config
        .max_completion_tokens
        .get_or_insert(DEFAULT_MAX_COMPLETION_TOKENS);
    config
        .system_prompt
        .get_or_insert_with(|| DEFAULT_SYSTEM_PROMPT.to_string());
    config
        .system_role
        .get_or_insert_with(|| DEFAULT_SYSTEM_ROLE.to_string());
    config
}

fn apply_timeout_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    let timeouts = config.timeouts.get_or_insert_with(TimeoutConfig::default);
    timeouts.connect_secs.get_or_insert(DEFAULT_CONNECT_TIMEOUT_SECS);
    timeouts.read_secs.get_or_insert(DEFAULT_READ_TIMEOUT_SECS);
    config
}

fn apply_history_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    let history = config.history.get_or_insert_with(HistoryConfig::default);
    history.mode.get_or_insert_with(|| "retained".to_string());
    history.max_messages.get_or_insert(DEFAULT_HISTORY_MAX_MESSAGES);
    history.max_tokens.get_or_insert(DEFAULT_HISTORY_MAX_TOKENS);
    config
}

/// Placeholder filtering stays off unless asked for.
fn apply_stream_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    let stream = config.stream.get_or_insert_with(StreamConfig::default);
    stream.filter_placeholder.get_or_insert(false);
    config
}

fn apply_logging_defaults(mut config: StreamChatConfig) -> StreamChatConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}
