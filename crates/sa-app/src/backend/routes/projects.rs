use std::sync::Arc;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use crate::backend::state::AppState;
use crate::error::AppError;
use crate::projects::{NewProject, Project, ProjectPatch};

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("project {id} not found"))
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.projects.list().await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    state.projects.get(&id).await?.map(Json).ok_or_else(|| not_found(&id))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let Json(new) = payload?;
    new.validate().map_err(AppError::Validation)?;

    let project = state.projects.create(new).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectPatch>, JsonRejection>,
) -> Result<Json<Project>, AppError> {
    let Json(patch) = payload?;
    patch.validate().map_err(AppError::Validation)?;

    state.projects.update(&id, patch).await?.map(Json).ok_or_else(|| not_found(&id))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.projects.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
