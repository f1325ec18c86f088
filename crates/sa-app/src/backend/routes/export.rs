use std::sync::Arc;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use tokio_util::io::ReaderStream;
use tracing::info;
use crate::backend::schemas::{ExportResponse, ImageSequenceRequest, VideoExportRequest};
use crate::backend::state::AppState;
use crate::error::AppError;

pub async fn image_sequence(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImageSequenceRequest>, JsonRejection>,
) -> Result<Json<ExportResponse>, AppError> {
    let Json(request) = payload?;
    let artifact = state.exports.export_image_sequence(&request.scenes).await?;

    info!(export_id = %artifact.id, scenes = artifact.staged_scenes, "Image sequence ready");
    Ok(Json(ExportResponse { success: true, download_url: artifact.download_url }))
}

pub async fn video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoExportRequest>, JsonRejection>,
) -> Result<Json<ExportResponse>, AppError> {
    let Json(request) = payload?;
    let artifact = state.exports.export_video(&request.scenes, &request.options).await?;

    info!(export_id = %artifact.id, file = %artifact.file_name, "Video ready");
    Ok(Json(ExportResponse { success: true, download_url: artifact.download_url }))
}

pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let path = state.exports.artifact_path(&filename).await?;
    let file = tokio::fs::File::open(&path).await.map_err(sa_export::ExportError::from)?;
    let length = file.metadata().await.map_err(sa_export::ExportError::from)?.len();

    let headers = [
        (header::CONTENT_TYPE, content_type(&filename).to_string()),
        (header::CONTENT_LENGTH, length.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))))
}

fn content_type(filename: &str) -> &'static str {
    let extension = filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("zip") => "application/zip",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("abc.zip"), "application/zip");
        assert_eq!(content_type("abc.MP4"), "video/mp4");
        assert_eq!(content_type("abc"), "application/octet-stream");
    }
}
