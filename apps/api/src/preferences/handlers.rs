use std::sync::Arc;

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::preferences::{PreferenceStore, Preferences, PreferencesPatch, ReadingPatch, RootStyling};
use crate::state::AppState;

/// Store writes hit the filesystem, so mutations run on the blocking pool.
async fn blocking<F>(store: Arc<PreferenceStore>, f: F) -> Result<Preferences, AppError>
where
    F: FnOnce(&PreferenceStore) -> Preferences + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// GET /api/v1/preferences
pub async fn handle_get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.preferences.snapshot())
}

/// PATCH /api/v1/preferences
pub async fn handle_update_preferences(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Json<Preferences>, AppError> {
    let updated = blocking(state.preferences.clone(), move |s| s.update(patch)).await?;
    Ok(Json(updated))
}

/// PATCH /api/v1/preferences/reading
pub async fn handle_update_reading(
    State(state): State<AppState>,
    Json(patch): Json<ReadingPatch>,
) -> Result<Json<Preferences>, AppError> {
    let updated = blocking(state.preferences.clone(), move |s| s.update_reading(patch)).await?;
    Ok(Json(updated))
}

/// POST /api/v1/preferences/reading/reset
pub async fn handle_reset_reading(
    State(state): State<AppState>,
) -> Result<Json<Preferences>, AppError> {
    let updated = blocking(state.preferences.clone(), |s| s.reset_reading()).await?;
    Ok(Json(updated))
}

/// GET /api/v1/preferences/styles
pub async fn handle_get_styles(State(state): State<AppState>) -> Json<RootStyling> {
    Json(RootStyling::from(&state.preferences.snapshot()))
}
