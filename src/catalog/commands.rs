use tauri::State;

use crate::{
    catalog::{
        search::{CourseSummary, SearchResults},
        Course,
    },
    AppState,
};

#[tauri::command]
pub fn list_courses(state: State<'_, AppState>) -> Result<Vec<CourseSummary>, String> {
    Ok(state
        .catalog
        .courses()
        .iter()
        .map(CourseSummary::from)
        .collect())
}

#[tauri::command]
pub fn get_course(state: State<'_, AppState>, course_id: String) -> Result<Course, String> {
    state
        .catalog
        .course(&course_id)
        .cloned()
        .ok_or_else(|| format!("Course '{course_id}' not found"))
}

#[tauri::command]
pub fn search_courses(
    state: State<'_, AppState>,
    query: String,
    limit: Option<usize>,
) -> Result<SearchResults, String> {
    Ok(state.catalog.search(&query, limit))
}

#[tauri::command]
pub fn get_trending_topics(state: State<'_, AppState>) -> Result<Vec<String>, String> {
    Ok(state.catalog.trending_topics().to_vec())
}
