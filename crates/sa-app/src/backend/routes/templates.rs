use std::sync::Arc;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use crate::backend::state::AppState;
use crate::error::AppError;
use crate::templates::{NewTemplate, Template};

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Template>>, AppError> {
    Ok(Json(state.templates.list().await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Template>, AppError> {
    state
        .templates
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("template {id} not found")))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTemplate>, JsonRejection>,
) -> Result<(StatusCode, Json<Template>), AppError> {
    let Json(new) = payload?;
    new.validate().map_err(AppError::Validation)?;

    Ok((StatusCode::CREATED, Json(state.templates.create(new).await?)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.templates.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
