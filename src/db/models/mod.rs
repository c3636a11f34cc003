pub mod chat_session;
pub mod note;

pub use chat_session::ChatSessionRecord;
pub use note::Note;
