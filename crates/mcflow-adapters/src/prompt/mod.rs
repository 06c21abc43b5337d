//! Non-interactive [`Prompt`](mcflow_core::application::ports::Prompt) implementations.

mod scripted;

pub use scripted::{Answer, ScriptedPrompt};
