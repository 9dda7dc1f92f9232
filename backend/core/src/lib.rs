pub mod error;
pub mod message;
pub mod traits;
pub mod types;

pub use error::ChatError;
pub use message::{ChatMessage, Role};
pub use traits::{ChatProvider, FragmentStream};
pub use types::{ChatConfig, FragmentFilter, HistoryPolicy, Reply, PLACEHOLDER_FRAGMENT};
