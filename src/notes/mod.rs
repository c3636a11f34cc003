//! Notepad: free-form notes persisted in SQLite.

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::db::{models::Note, Database};

#[cfg(feature = "desktop")]
pub(crate) mod commands;

#[derive(Clone)]
pub struct Notepad {
    db: Database,
}

impl Notepad {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Saves the trimmed body. A blank body is ignored and returns `None`.
    pub async fn save(&self, body: &str) -> Result<Option<Note>> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(None);
        }

        let note = Note {
            id: Uuid::new_v4().to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.db.insert_note(&note).await?;
        log::info!("Saved note {}", note.id);
        Ok(Some(note))
    }

    pub async fn list(&self) -> Result<Vec<Note>> {
        self.db.list_notes().await
    }

    pub async fn delete(&self, note_id: &str) -> Result<bool> {
        self.db.delete_note(note_id).await
    }
}
