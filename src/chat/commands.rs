use tauri::State;

use crate::{
    chat::{ChatController, ChatDocument, ChatHistoryEntry, ChatSnapshot},
    AppState,
};

fn controller_from_state(state: &State<'_, AppState>) -> ChatController {
    state.chat.clone()
}

#[tauri::command]
pub async fn get_chat(state: State<'_, AppState>) -> Result<ChatSnapshot, String> {
    Ok(controller_from_state(&state).snapshot().await)
}

/// Returns whether a message was sent.
#[tauri::command]
pub async fn send_chat_message(state: State<'_, AppState>, input: String) -> Result<bool, String> {
    Ok(controller_from_state(&state).send(&input).await.is_some())
}

#[tauri::command]
pub async fn attach_chat_document(
    state: State<'_, AppState>,
    name: String,
) -> Result<Option<ChatDocument>, String> {
    Ok(controller_from_state(&state).attach_document(&name).await)
}

#[tauri::command]
pub async fn remove_chat_document(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(controller_from_state(&state).remove_document().await)
}

#[tauri::command]
pub async fn new_chat(state: State<'_, AppState>) -> Result<Option<String>, String> {
    controller_from_state(&state)
        .new_chat()
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_chat_history(state: State<'_, AppState>) -> Result<Vec<ChatHistoryEntry>, String> {
    controller_from_state(&state)
        .history()
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn restore_chat(
    state: State<'_, AppState>,
    session_id: String,
) -> Result<ChatSnapshot, String> {
    controller_from_state(&state)
        .restore(&session_id)
        .await
        .map_err(|e| e.to_string())
}
