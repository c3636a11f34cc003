use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved note, shown in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
