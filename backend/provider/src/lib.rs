//! Streaming transport for streamchat.
//!
//! - `lines`: byte chunks to lines
//! - `sse`: lines to SSE events
//! - `chunk`: SSE payloads to reply fragments
//! - `decode`: the sync and async drivers tying those together
//! - `providers`: the HTTP provider and a scripted mock

pub mod chunk;
pub mod decode;
pub mod lines;
pub mod providers;
pub mod sse;

pub use chunk::{interpret_payload, Payload, DONE_SENTINEL};
pub use decode::{decode_lines, decode_stream, Fragments, StreamEnd};
pub use lines::{into_lines, LineSplitter};
pub use providers::{MockProvider, OpenAiCompatProvider};
pub use sse::{SseDecoder, SseEvent};
