use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// An archived chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionRecord {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub document_name: Option<String>,
    pub archived_at: DateTime<Utc>,
}
