//! streamchat conversation layer
//!
//! History trimming, caller-owned conversation state, and the per-turn runner
//! that ties them to a `ChatProvider`.

pub mod chat_loop;
pub mod context_window;
pub mod session_state;
pub mod system_prompt;

pub use chat_loop::ChatRunner;
pub use context_window::{estimate_tokens, trim, ContextWindow};
pub use session_state::{Conversation, HistoryMode};
pub use system_prompt::{PromptBuilder, DEFAULT_SYSTEM_PROMPT};
