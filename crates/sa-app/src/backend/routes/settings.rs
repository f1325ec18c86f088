use std::sync::Arc;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use crate::backend::state::AppState;
use crate::error::AppError;
use crate::settings::ApiKeys;

/// Saved keys, masked
pub async fn api_keys(State(state): State<Arc<AppState>>) -> Result<Json<ApiKeys>, AppError> {
    Ok(Json(state.settings.api_keys().await?.masked()))
}

pub async fn update_api_keys(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ApiKeys>, JsonRejection>,
) -> Result<Json<ApiKeys>, AppError> {
    let Json(patch) = payload?;
    Ok(Json(state.settings.update_api_keys(patch).await?.masked()))
}
