use tauri::State;

use crate::{
    auth::{AuthSnapshot, Profile, ProfileForm},
    AppState,
};

#[tauri::command]
pub async fn get_auth_state(state: State<'_, AppState>) -> Result<AuthSnapshot, String> {
    Ok(state.auth.current().await)
}

#[tauri::command]
pub async fn sign_in(
    state: State<'_, AppState>,
    email: String,
    password: String,
) -> Result<AuthSnapshot, String> {
    state
        .auth
        .sign_in(&email, &password)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn sign_up(
    state: State<'_, AppState>,
    email: String,
    password: String,
) -> Result<AuthSnapshot, String> {
    state
        .auth
        .sign_up(&email, &password)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn sign_out(state: State<'_, AppState>) -> Result<(), String> {
    state.auth.sign_out().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_profile(state: State<'_, AppState>, form: ProfileForm) -> Result<Profile, String> {
    state
        .auth
        .save_profile(&form)
        .await
        .map_err(|e| e.to_string())
}
