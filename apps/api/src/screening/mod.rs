pub mod handlers;
pub mod language;
pub mod pipeline;
pub mod prompts;
