use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle};
use uuid::Uuid;

use crate::{
    db::{models::ChatSessionRecord, Database},
    generation::TextGenerator,
};

use super::{
    history::{history_entries, ChatHistoryEntry},
    ChatDocument, ChatMessage,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

pub trait ChatSink: Send + Sync + 'static {
    fn chat_changed(&self, snapshot: &ChatSnapshot);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub messages: Vec<ChatMessage>,
    pub loading: bool,
    pub error: Option<String>,
    pub document: Option<ChatDocument>,
}

#[derive(Default)]
struct ChatState {
    snapshot: ChatSnapshot,
    /// Bumped whenever the visible conversation is swapped out, so replies
    /// for the previous one are dropped.
    conversation: u64,
    in_flight: usize,
}

#[derive(Clone)]
pub struct ChatController {
    state: Arc<Mutex<ChatState>>,
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn ChatSink>,
    db: Database,
}

impl ChatController {
    pub fn new(generator: Arc<dyn TextGenerator>, sink: Arc<dyn ChatSink>, db: Database) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChatState::default())),
            generator,
            sink,
            db,
        }
    }

    pub async fn snapshot(&self) -> ChatSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    fn publish(&self, snapshot: ChatSnapshot) {
        self.sink.chat_changed(&snapshot);
    }

    /// Appends the user's message and asks for a reply. Blank input is
    /// ignored and returns `None`.
    pub async fn send(&self, input: &str) -> Option<JoinHandle<()>> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let (transcript, conversation, snapshot) = {
            let mut state = self.state.lock().await;
            state.snapshot.messages.push(ChatMessage::user(input));
            state.snapshot.loading = true;
            state.snapshot.error = None;
            state.in_flight += 1;
            (
                state.snapshot.messages.clone(),
                state.conversation,
                state.snapshot.clone(),
            )
        };
        self.publish(snapshot);

        let controller = self.clone();
        Some(tokio::spawn(async move {
            let result = controller.generator.reply(&transcript).await;

            let snapshot = {
                let mut state = controller.state.lock().await;
                if state.conversation != conversation {
                    log_debug!("dropping reply for a conversation that was replaced");
                    return;
                }
                state.in_flight = state.in_flight.saturating_sub(1);
                state.snapshot.loading = state.in_flight > 0;
                match result {
                    Ok(reply) => state.snapshot.messages.push(ChatMessage::ai(reply)),
                    Err(err) => {
                        log_warn!("chat reply failed: {}", err);
                        state.snapshot.error = Some(err.to_string());
                    }
                }
                state.snapshot.clone()
            };
            controller.publish(snapshot);
        }))
    }

    pub async fn attach_document(&self, name: &str) -> Option<ChatDocument> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let (document, snapshot) = {
            let mut state = self.state.lock().await;
            let document = ChatDocument::attached(name);
            state.snapshot.document = Some(document.clone());
            (document, state.snapshot.clone())
        };
        self.publish(snapshot);
        Some(document)
    }

    pub async fn remove_document(&self) -> bool {
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.snapshot.document.take().is_none() {
                return false;
            }
            state.snapshot.clone()
        };
        self.publish(snapshot);
        true
    }

    /// Archives the current conversation (when it has any messages) and
    /// starts an empty one. Returns the archived session id.
    ///
    /// Holds the state lock across the archive write. On failure the
    /// conversation is left untouched.
    pub async fn new_chat(&self) -> Result<Option<String>> {
        let (archived_id, snapshot) = {
            let mut state = self.state.lock().await;

            let archived_id = if state.snapshot.messages.is_empty() {
                None
            } else {
                let record = ChatSessionRecord {
                    id: Uuid::new_v4().to_string(),
                    messages: state.snapshot.messages.clone(),
                    document_name: state.snapshot.document.as_ref().map(|doc| doc.name.clone()),
                    archived_at: Utc::now(),
                };
                self.db.archive_chat_session(&record).await?;
                log_info!("archived chat session {}", record.id);
                Some(record.id)
            };

            state.snapshot = ChatSnapshot::default();
            state.conversation += 1;
            state.in_flight = 0;
            (archived_id, state.snapshot.clone())
        };
        self.publish(snapshot);
        Ok(archived_id)
    }

    pub async fn history(&self) -> Result<Vec<ChatHistoryEntry>> {
        let records = self.db.list_chat_sessions().await?;
        Ok(history_entries(&records))
    }

    /// Loads an archived conversation back into view. The current one is
    /// replaced without being archived.
    pub async fn restore(&self, session_id: &str) -> Result<ChatSnapshot> {
        let record = self.db.get_chat_session(session_id).await?;

        let snapshot = {
            let mut state = self.state.lock().await;
            state.conversation += 1;
            state.in_flight = 0;
            state.snapshot = ChatSnapshot {
                messages: record.messages,
                loading: false,
                error: None,
                document: record.document_name.map(ChatDocument::attached),
            };
            state.snapshot.clone()
        };
        self.publish(snapshot.clone());
        Ok(snapshot)
    }
}
