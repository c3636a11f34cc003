mod chat_sessions;
mod notes;

pub use chat_sessions::MAX_ARCHIVED_SESSIONS;
