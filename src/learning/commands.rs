use tauri::State;

use crate::{
    learning::{view::entry_module_id, LearningModuleView, QuizAction, QuizView},
    AppState,
};

#[tauri::command]
pub fn get_learning_module(
    state: State<'_, AppState>,
    course_id: String,
    module_id: String,
) -> Result<LearningModuleView, String> {
    state
        .learning
        .open_module(&course_id, &module_id)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_entry_module(
    state: State<'_, AppState>,
    course_id: String,
) -> Result<Option<String>, String> {
    Ok(entry_module_id(&state.catalog, &course_id))
}

#[tauri::command]
pub async fn get_quiz(
    state: State<'_, AppState>,
    course_id: String,
    module_id: String,
) -> Result<QuizView, String> {
    state
        .learning
        .quiz(&course_id, &module_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn apply_quiz_action(
    state: State<'_, AppState>,
    course_id: String,
    module_id: String,
    action: QuizAction,
) -> Result<QuizView, String> {
    state
        .learning
        .apply(&course_id, &module_id, action)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn restart_quiz(
    state: State<'_, AppState>,
    course_id: String,
    module_id: String,
) -> Result<QuizView, String> {
    state
        .learning
        .restart(&course_id, &module_id)
        .await
        .map_err(|e| e.to_string())
}
