use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{provider} request failed: {detail}")]
    Upstream { provider: String, detail: String },
    #[error("seed image upload failed: {0}")]
    Upload(String),
    #[error("unsupported AI provider: {0}")]
    UnsupportedProvider(String),
}

impl GenerationError {
    pub fn upstream(provider: &str, detail: impl ToString) -> Self {
        Self::Upstream {
            provider: provider.to_string(),
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub is_public: bool,
    pub model_id: String,
    /// Switches the request to image-to-image
    pub seed_image_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoRequest {
    pub image_id: String,
    pub prompt: String,
    pub is_public: bool,
    pub resolution: String,
    pub frame_interpolation: bool,
    pub prompt_enhance: bool,
}

impl VideoRequest {
    pub fn new(image_id: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            prompt: String::new(),
            is_public: false,
            resolution: "RESOLUTION_480".to_string(),
            frame_interpolation: true,
            prompt_enhance: true,
        }
    }
}

/// One generative-AI backend's image and video capabilities.
///
/// Polls are single non-blocking checks: `Ok(None)` means the job is still
/// running, `Ok(Some(url))` that it finished.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn upload_seed_image(&self, bytes: Vec<u8>, filename: &str) -> Result<String, GenerationError>;

    async fn submit_image(&self, request: &ImageRequest) -> Result<String, GenerationError>;

    async fn poll_image(&self, job_id: &str) -> Result<Option<String>, GenerationError>;

    async fn submit_video(&self, request: &VideoRequest) -> Result<String, GenerationError>;

    async fn poll_video(&self, job_id: &str) -> Result<Option<String>, GenerationError>;
}

/// Text generation backend for story prompts
#[async_trait]
pub trait StoryWriter: Send + Sync {
    async fn write_story(&self, keywords: &[String]) -> Result<String, GenerationError>;
}
