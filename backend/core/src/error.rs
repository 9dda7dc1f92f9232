use thiserror::Error;

/// Top-level error type for a streamchat request.
///
/// Malformed SSE payloads never show up here; the decoder skips them. What
/// remains is what ends a request early.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("connection timeout: could not connect to {url}")]
    ConnectTimeout { url: String },

    #[error("read timeout: server took too long to respond")]
    ReadTimeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}\n{body}")]
    HttpStatus { status: u16, body: String },

    #[error("stream error: {0}")]
    Stream(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// True for failures that came from the network or the remote server
    /// rather than from local setup.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChatError::ConnectTimeout { .. }
                | ChatError::ReadTimeout
                | ChatError::Connection(_)
                | ChatError::HttpStatus { .. }
                | ChatError::Stream(_)
        )
    }

    /// HTTP status code, if the server answered with a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
