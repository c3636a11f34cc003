use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::Note};

fn row_to_note(row: &Row) -> Result<Note> {
    let created_at: String = row.get("created_at")?;
    Ok(Note {
        id: row.get("id")?,
        body: row.get("body")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_note(&self, note: &Note) -> Result<()> {
        let record = note.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO notes (id, body, created_at) VALUES (?1, ?2, ?3)",
                params![record.id, record.body, record.created_at.to_rfc3339()],
            )
            .context("failed to insert note")?;
            Ok(())
        })
        .await
    }

    /// All notes, oldest first.
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, body, created_at FROM notes ORDER BY rowid ASC")?;
            let mut rows = stmt.query([])?;
            let mut notes = Vec::new();
            while let Some(row) = rows.next()? {
                notes.push(row_to_note(row)?);
            }
            Ok(notes)
        })
        .await
    }

    /// Returns whether a note was removed.
    pub async fn delete_note(&self, note_id: &str) -> Result<bool> {
        let note_id = note_id.to_string();
        self.execute(move |conn| {
            let affected = conn
                .execute("DELETE FROM notes WHERE id = ?1", params![note_id])
                .context("failed to delete note")?;
            Ok(affected > 0)
        })
        .await
    }
}
