use serde::{Deserialize, Serialize};
use serde_json::Value;
use sa_core::{GenerationJob, GenerationStatus, Scene};
use sa_export::VideoOptions;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSubmitted {
    pub message: String,
    pub generation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageStatusResponse {
    pub status: GenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<GenerationJob> for ImageStatusResponse {
    fn from(job: GenerationJob) -> Self {
        Self { status: job.status, image_url: job.result_url }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatusResponse {
    pub status: GenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl From<GenerationJob> for VideoStatusResponse {
    fn from(job: GenerationJob) -> Self {
        Self { status: job.status, video_url: job.result_url }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub story_prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerateRequest {
    pub image_id: Option<String>,
    pub prompt: Option<String>,
    pub is_public: Option<bool>,
    pub resolution: Option<String>,
    pub frame_interpolation: Option<bool>,
    pub prompt_enhance: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSequenceRequest {
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoExportRequest {
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub options: VideoOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub success: bool,
    pub download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRequest {
    #[serde(default)]
    pub image_paths: Vec<String>,
    #[serde(default)]
    pub training_config: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainResponse {
    pub message: String,
    pub training_job_id: String,
}
