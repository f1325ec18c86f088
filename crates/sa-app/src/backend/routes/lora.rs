use std::sync::Arc;
use anyhow::Context;
use axum::Json;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use serde_json::Value;
use crate::backend::schemas::{MessageResponse, TrainRequest, TrainResponse};
use crate::backend::state::AppState;
use crate::error::AppError;
use crate::training::job::TrainingJob;
use crate::uploads::UploadDir;

const IMAGES_FIELD: &str = "images";
const CONFIG_FIELD: &str = "trainingConfig";

/// Accepts `multipart/form-data` with `images` files, or JSON naming `imagePaths`
pub async fn train(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<TrainResponse>), AppError> {
    let (image_paths, training_config) = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state).await?;
        store_upload(&state.uploads, multipart).await?
    } else {
        let Json(body) = Json::<TrainRequest>::from_request(request, &state).await?;
        (body.image_paths, body.training_config)
    };

    if image_paths.is_empty() {
        return Err(AppError::Validation("No images uploaded for LoRA training".to_string()));
    }

    let training_job_id = state.training.create(image_paths, training_config).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TrainResponse {
            message: "LoRA training started".to_string(),
            training_job_id,
        }),
    ))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

/// Saves every `images` part and reads an optional `trainingConfig` part.
/// The config is parsed as JSON when possible and kept as text otherwise.
async fn store_upload(uploads: &UploadDir, mut multipart: Multipart) -> Result<(Vec<String>, Value), AppError> {
    let mut image_paths = Vec::new();
    let mut training_config = Value::Null;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGES_FIELD) => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                let path = uploads
                    .save(file_name.as_deref(), &bytes)
                    .await
                    .context("failed to store uploaded image")?;
                image_paths.push(path.to_string_lossy().into_owned());
            }
            Some(CONFIG_FIELD) => {
                let text = field.text().await?;
                training_config = match serde_json::from_str(&text) {
                    Ok(value) => value,
                    Err(_) => Value::String(text),
                };
            }
            _ => {}
        }
    }

    Ok((image_paths, training_config))
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrainingJob>, AppError> {
    state
        .training
        .status(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("training job {id} not found")))
}

pub async fn models(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TrainingJob>>, AppError> {
    Ok(Json(state.training.list_completed().await?))
}

pub async fn delete_model(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.training.delete(&id).await?;
    Ok(Json(MessageResponse::new("LoRA model deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_multipart() {
        let mut headers = HeaderMap::new();
        assert!(!is_multipart(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_multipart(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=xyz"),
        );
        assert!(is_multipart(&headers));
    }
}
