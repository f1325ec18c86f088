use std::sync::Arc;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use crate::backend::state::AppState;
use crate::error::AppError;
use crate::prompts::{NewPrompt, Prompt};

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Prompt>>, AppError> {
    Ok(Json(state.prompts.list().await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPrompt>, JsonRejection>,
) -> Result<(StatusCode, Json<Prompt>), AppError> {
    let Json(new) = payload?;
    new.validate().map_err(AppError::Validation)?;

    Ok((StatusCode::CREATED, Json(state.prompts.create(new).await?)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.prompts.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
