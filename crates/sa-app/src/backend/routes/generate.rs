use std::sync::Arc;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use crate::backend::schemas::{
    GenerationSubmitted, ImageStatusResponse, StoryRequest, StoryResponse, VideoGenerateRequest,
    VideoStatusResponse,
};
use crate::backend::state::AppState;
use crate::error::AppError;
use crate::generator::SeedImage;
use crate::generator::provider::VideoRequest;

#[derive(Default)]
struct ImageForm {
    prompt: Option<String>,
    is_public: bool,
    model_id: Option<String>,
    seed: Option<SeedImage>,
}

async fn read_image_form(mut multipart: Multipart) -> Result<ImageForm, AppError> {
    let mut form = ImageForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("image.png").to_string();
                let bytes = field.bytes().await.map_err(|e| AppError::Validation(e.body_text()))?;
                if !bytes.is_empty() {
                    form.seed = Some(SeedImage { bytes: bytes.to_vec(), filename });
                }
            }
            "prompt" | "isPublic" | "modelId" => {
                let text = field.text().await.map_err(|e| AppError::Validation(e.body_text()))?;
                match name.as_str() {
                    "prompt" => form.prompt = Some(text),
                    "isPublic" => form.is_public = text.trim().eq_ignore_ascii_case("true"),
                    _ => form.model_id = Some(text).filter(|id| !id.trim().is_empty()),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<GenerationSubmitted>, AppError> {
    let form = read_image_form(multipart).await?;
    let prompt = form
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("prompt is required".to_string()))?;

    let generation_id = state
        .generator
        .generate_image(prompt, form.is_public, form.model_id.as_deref(), form.seed)
        .await?;

    Ok(Json(GenerationSubmitted {
        message: "Image generation requested, poll for status".to_string(),
        generation_id,
    }))
}

pub async fn image_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ImageStatusResponse>, AppError> {
    let job = state.generator.image_status(&id).await?;
    Ok(Json(job.into()))
}

pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StoryRequest>, JsonRejection>,
) -> Result<Json<StoryResponse>, AppError> {
    let Json(request) = payload?;
    let keywords: Vec<String> = request
        .keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return Err(AppError::Validation("keywords must be a non-empty array".to_string()));
    }

    let story_prompt = state.generator.generate_story_prompt(&keywords).await?;
    Ok(Json(StoryResponse { story_prompt }))
}

pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoGenerateRequest>, JsonRejection>,
) -> Result<Json<GenerationSubmitted>, AppError> {
    let Json(body) = payload?;
    let image_id = body
        .image_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("imageId is required".to_string()))?;

    let mut request = VideoRequest::new(image_id);
    if let Some(prompt) = body.prompt {
        request.prompt = prompt;
    }
    if let Some(is_public) = body.is_public {
        request.is_public = is_public;
    }
    if let Some(resolution) = body.resolution.filter(|r| !r.is_empty()) {
        request.resolution = resolution;
    }
    if let Some(interpolation) = body.frame_interpolation {
        request.frame_interpolation = interpolation;
    }
    if let Some(enhance) = body.prompt_enhance {
        request.prompt_enhance = enhance;
    }

    let generation_id = state.generator.generate_video_from_image(request).await?;
    Ok(Json(GenerationSubmitted {
        message: "Video generation requested, poll for status".to_string(),
        generation_id,
    }))
}

pub async fn video_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VideoStatusResponse>, AppError> {
    let job = state.generator.video_status(&id).await?;
    Ok(Json(job.into()))
}
