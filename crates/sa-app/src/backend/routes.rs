use std::sync::Arc;
use axum::Router;
use axum::routing::{get, post};
use crate::backend::state::AppState;

mod export;
mod generate;
mod lora;
mod projects;
mod prompts;
mod settings;
mod templates;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/generate/image", post(generate::generate_image))
        .route("/api/generate/status/{id}", get(generate::image_status))
        .route("/api/generate/story", post(generate::generate_story))
        .route("/api/generate/video", post(generate::generate_video))
        .route("/api/generate/video-status/{id}", get(generate::video_status))
        .route("/api/export/image-sequence", post(export::image_sequence))
        .route("/api/export/video", post(export::video))
        .route("/api/export/download/{filename}", get(export::download))
        .route("/api/lora/train", post(lora::train))
        .route("/api/lora/status/{id}", get(lora::status))
        .route("/api/lora/models", get(lora::models))
        .route("/api/lora/models/{id}", axum::routing::delete(lora::delete_model))
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/{id}",
            get(projects::get).patch(projects::update).delete(projects::delete),
        )
        .route("/api/templates", get(templates::list).post(templates::create))
        .route("/api/templates/{id}", get(templates::get).delete(templates::delete))
        .route("/api/prompts", get(prompts::list).post(prompts::create))
        .route("/api/prompts/{id}", axum::routing::delete(prompts::delete))
        .route(
            "/api/settings/api-keys",
            get(settings::api_keys).patch(settings::update_api_keys),
        )
}
