/// Session management module - Gateway

mod mode;
mod resolver;
mod store;

pub use mode::ChatMode;
pub use resolver::ModeResolver;
pub use store::{ConversationStore, Session};
