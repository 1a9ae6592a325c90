/// Runtime module - Gateway

mod chat;
mod non_interactive;
mod orchestrator;

pub use chat::{ChatOutcome, ChatService};
pub use non_interactive::{ExecutionMetadata, NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::Orchestrator;
