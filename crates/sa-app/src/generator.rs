use std::sync::Arc;
use tracing::{debug, info, warn};
use sa_core::{GenerationJob, GenerationKind, ImageModel};
use crate::config::AppConfig;
use crate::generator::leonardo::LeonardoProvider;
use crate::generator::openai::OpenAiStoryWriter;
use crate::generator::provider::{GenerationError, GenerationProvider, ImageRequest, StoryWriter, VideoRequest};

pub mod leonardo;
pub mod openai;
pub mod provider;

/// Uploaded reference image for image-to-image generation
#[derive(Debug, Clone)]
pub struct SeedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
}

enum ProviderSlot {
    Ready(Arc<dyn GenerationProvider>),
    Unsupported(String),
}

/// Front door for every generative-AI operation.
///
/// The provider is chosen once at construction. An unknown provider name is
/// kept so that every call reports it rather than failing startup.
pub struct Generator {
    provider: ProviderSlot,
    writer: Arc<dyn StoryWriter>,
}

impl Generator {
    pub fn new(provider: Arc<dyn GenerationProvider>, writer: Arc<dyn StoryWriter>) -> Self {
        Self {
            provider: ProviderSlot::Ready(provider),
            writer,
        }
    }

    pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Self {
        let writer: Arc<dyn StoryWriter> =
            Arc::new(OpenAiStoryWriter::new(client.clone(), config.openai.clone()));

        let provider = match config.provider.to_ascii_uppercase().as_str() {
            "LEONARDO" => {
                info!(provider = "leonardo", "Generation provider selected");
                ProviderSlot::Ready(Arc::new(LeonardoProvider::new(client, config.leonardo.clone())))
            }
            _ => {
                warn!(provider = %config.provider, "No adapter for configured AI provider");
                ProviderSlot::Unsupported(config.provider.clone())
            }
        };

        Self { provider, writer }
    }

    pub fn unsupported(name: impl Into<String>, writer: Arc<dyn StoryWriter>) -> Self {
        Self {
            provider: ProviderSlot::Unsupported(name.into()),
            writer,
        }
    }

    fn provider(&self) -> Result<&Arc<dyn GenerationProvider>, GenerationError> {
        match &self.provider {
            ProviderSlot::Ready(provider) => Ok(provider),
            ProviderSlot::Unsupported(name) => Err(GenerationError::UnsupportedProvider(name.clone())),
        }
    }

    /// Submit an image job, uploading the seed first when one is given
    pub async fn generate_image(
        &self,
        prompt: String,
        is_public: bool,
        model_id: Option<&str>,
        seed: Option<SeedImage>,
    ) -> Result<String, GenerationError> {
        let provider = self.provider()?;

        let seed_image_id = match seed {
            Some(seed) => Some(provider.upload_seed_image(seed.bytes, &seed.filename).await?),
            None => None,
        };

        let request = ImageRequest {
            prompt,
            is_public,
            model_id: ImageModel::resolve_id(model_id),
            seed_image_id,
        };

        let job_id = provider.submit_image(&request).await?;
        info!(job_id = %job_id, image_to_image = request.seed_image_id.is_some(), "Image generation submitted");
        Ok(job_id)
    }

    pub async fn image_status(&self, job_id: &str) -> Result<GenerationJob, GenerationError> {
        let url = self.provider()?.poll_image(job_id).await?;
        debug!(job_id, complete = url.is_some(), "Polled image job");
        Ok(GenerationJob::from_poll(job_id, GenerationKind::Image, url))
    }

    pub async fn upload_seed_image(&self, bytes: Vec<u8>, filename: &str) -> Result<String, GenerationError> {
        self.provider()?.upload_seed_image(bytes, filename).await
    }

    pub async fn generate_story_prompt(&self, keywords: &[String]) -> Result<String, GenerationError> {
        self.writer.write_story(keywords).await
    }

    pub async fn generate_video_from_image(&self, request: VideoRequest) -> Result<String, GenerationError> {
        let job_id = self.provider()?.submit_video(&request).await?;
        info!(job_id = %job_id, image_id = %request.image_id, "Video generation submitted");
        Ok(job_id)
    }

    pub async fn video_status(&self, job_id: &str) -> Result<GenerationJob, GenerationError> {
        let url = self.provider()?.poll_video(job_id).await?;
        debug!(job_id, complete = url.is_some(), "Polled video job");
        Ok(GenerationJob::from_poll(job_id, GenerationKind::Video, url))
    }
}
