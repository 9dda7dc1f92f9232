pub mod mock;
pub mod openai_compat;

pub use mock::MockProvider;
pub use openai_compat::{ChatRequest, OpenAiCompatProvider};
