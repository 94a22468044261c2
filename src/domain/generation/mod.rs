//! Answer generation domain
//!
//! The generator trait plus the pure helpers that shape what it receives:
//! a bounded, rendered conversation history and the assembled evidence context.

mod context;
mod generator;
mod history;

pub use context::render_context;
pub use generator::AnswerGenerator;
pub use history::{render_chat_history, HISTORY_WINDOW, NO_PREVIOUS_CONVERSATION};

#[cfg(test)]
pub use generator::mock::MockAnswerGenerator;
