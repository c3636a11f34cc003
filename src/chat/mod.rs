//! YourPal chat assistant: one live conversation plus an archived history.

pub mod controller;
pub mod history;
pub mod message;

#[cfg(feature = "desktop")]
pub(crate) mod commands;

pub use controller::{ChatController, ChatSink, ChatSnapshot};
pub use history::ChatHistoryEntry;
pub use message::{ChatDocument, ChatMessage, ChatRole, DOCUMENT_PLACEHOLDER};
