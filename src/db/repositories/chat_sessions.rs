use anyhow::{anyhow, Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::ChatSessionRecord};

/// Older sessions beyond this count are dropped on archive.
pub const MAX_ARCHIVED_SESSIONS: i64 = 20;

const SELECT_COLUMNS: &str = "SELECT id, messages_json, document_name, archived_at FROM chat_sessions";

fn row_to_session(row: &Row) -> Result<ChatSessionRecord> {
    let messages_json: String = row.get("messages_json")?;
    let archived_at: String = row.get("archived_at")?;
    Ok(ChatSessionRecord {
        id: row.get("id")?,
        messages: serde_json::from_str(&messages_json)
            .context("failed to decode archived chat messages")?,
        document_name: row.get("document_name")?,
        archived_at: parse_datetime(&archived_at, "archived_at")?,
    })
}

impl Database {
    /// Stores a finished conversation and prunes the history down to
    /// [`MAX_ARCHIVED_SESSIONS`] within the same DB task.
    pub async fn archive_chat_session(&self, session: &ChatSessionRecord) -> Result<()> {
        let record = session.clone();
        let messages_json =
            serde_json::to_string(&record.messages).context("failed to encode chat messages")?;
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO chat_sessions (id, messages_json, document_name, archived_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.id,
                    messages_json,
                    record.document_name,
                    record.archived_at.to_rfc3339(),
                ],
            )
            .context("failed to archive chat session")?;
            tx.execute(
                "DELETE FROM chat_sessions WHERE rowid NOT IN (
                     SELECT rowid FROM chat_sessions ORDER BY rowid DESC LIMIT ?1
                 )",
                params![MAX_ARCHIVED_SESSIONS],
            )
            .context("failed to prune chat history")?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Archived sessions, newest first.
    pub async fn list_chat_sessions(&self) -> Result<Vec<ChatSessionRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY rowid DESC"))?;
            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    pub async fn get_chat_session(&self, session_id: &str) -> Result<ChatSessionRecord> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
            let found = stmt
                .query_row(params![session_id], |row| Ok(row_to_session(row)))
                .optional()?;
            match found {
                Some(record) => record,
                None => Err(anyhow!("Chat session {session_id} not found")),
            }
        })
        .await
    }
}
