//! SQLite persistence for notes and archived chat sessions.
//!
//! The connection lives on a dedicated worker thread; repositories add
//! typed methods on [`Database`] that ship closures to it.

mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use repositories::MAX_ARCHIVED_SESSIONS;
