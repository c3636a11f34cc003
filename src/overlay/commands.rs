use tauri::State;

use crate::{
    overlay::{Affordance, Doubt, OverlayController, OverlayFrame, Rect, SelectionReport},
    AppState,
};

fn controller_from_state(state: &State<'_, AppState>) -> OverlayController {
    state.overlay.clone()
}

#[tauri::command]
pub async fn get_overlay(state: State<'_, AppState>) -> Result<OverlayFrame, String> {
    Ok(controller_from_state(&state).snapshot().await)
}

#[tauri::command]
pub async fn capture_selection(
    state: State<'_, AppState>,
    selection: SelectionReport,
) -> Result<Option<Affordance>, String> {
    Ok(controller_from_state(&state)
        .capture_selection(selection)
        .await)
}

#[tauri::command]
pub async fn confirm_affordance(
    state: State<'_, AppState>,
    affordance_id: String,
) -> Result<Option<Doubt>, String> {
    Ok(controller_from_state(&state)
        .confirm_affordance(&affordance_id)
        .await)
}

#[tauri::command]
pub async fn dismiss_affordance(state: State<'_, AppState>) -> Result<bool, String> {
    Ok(controller_from_state(&state).dismiss_affordance().await)
}

#[tauri::command]
pub async fn open_doubt(
    state: State<'_, AppState>,
    selected_text: String,
    anchor: Option<Rect>,
) -> Result<Option<Doubt>, String> {
    Ok(controller_from_state(&state)
        .open_doubt(&selected_text, anchor)
        .await)
}

#[tauri::command]
pub async fn update_doubt_query(
    state: State<'_, AppState>,
    doubt_id: String,
    query: String,
) -> Result<bool, String> {
    Ok(controller_from_state(&state)
        .update_query(&doubt_id, query)
        .await)
}

/// Returns whether a generation request was started; the answer arrives as
/// an `overlay-updated` event.
#[tauri::command]
pub async fn submit_doubt_query(
    state: State<'_, AppState>,
    doubt_id: String,
) -> Result<bool, String> {
    Ok(controller_from_state(&state)
        .submit_query(&doubt_id)
        .await
        .is_some())
}

#[tauri::command]
pub async fn close_doubt(state: State<'_, AppState>, doubt_id: String) -> Result<bool, String> {
    Ok(controller_from_state(&state).close_doubt(&doubt_id).await)
}

#[tauri::command]
pub async fn close_overlay(state: State<'_, AppState>) -> Result<(), String> {
    controller_from_state(&state).close_all().await;
    Ok(())
}

#[tauri::command]
pub async fn set_overlay_viewport(
    state: State<'_, AppState>,
    width: f64,
    height: f64,
) -> Result<(), String> {
    controller_from_state(&state)
        .set_viewport(width, height)
        .await;
    Ok(())
}

#[tauri::command]
pub async fn report_popup_bounds(
    state: State<'_, AppState>,
    doubt_id: String,
    bounds: Rect,
) -> Result<bool, String> {
    Ok(controller_from_state(&state)
        .report_popup_bounds(&doubt_id, bounds)
        .await)
}
