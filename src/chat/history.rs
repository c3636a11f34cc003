use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::ChatSessionRecord;

use super::ChatMessage;

pub const PREVIEW_CHARS: usize = 60;

/// One row of the history side panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryEntry {
    pub id: String,
    pub label: String,
    pub preview: String,
    pub document_name: Option<String>,
    pub archived_at: DateTime<Utc>,
}

/// Message contents joined by spaces, cut to [`PREVIEW_CHARS`] characters
/// with a trailing `...` when anything was cut.
pub fn preview(messages: &[ChatMessage]) -> String {
    let joined = messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut chars = joined.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// `records` must be newest first; the newest session gets the highest number.
pub fn history_entries(records: &[ChatSessionRecord]) -> Vec<ChatHistoryEntry> {
    let total = records.len();
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| ChatHistoryEntry {
            id: record.id.clone(),
            label: format!("Session {}", total - idx),
            preview: preview(&record.messages),
            document_name: record.document_name.clone(),
            archived_at: record.archived_at,
        })
        .collect()
}
