use tauri::State;

use crate::{db::models::Note, AppState};

#[tauri::command]
pub async fn save_note(state: State<'_, AppState>, body: String) -> Result<Option<Note>, String> {
    state.notes.save(&body).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn list_notes(state: State<'_, AppState>) -> Result<Vec<Note>, String> {
    state.notes.list().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_note(state: State<'_, AppState>, note_id: String) -> Result<bool, String> {
    state.notes.delete(&note_id).await.map_err(|e| e.to_string())
}
