//! Terminal input and output for the `mydoc` binary.
pub mod chat;
pub mod console;

pub use chat::{next_question, ChatInput};
pub use console::{render_json, render_result, ConsoleObserver};
