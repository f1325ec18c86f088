use std::sync::Arc;
use anyhow::Context;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::info;
use sa_export::{AssetFetcher, ExportAssembler, FfmpegEncoder};
use crate::config::AppConfig;
use crate::db;
use crate::generator::Generator;
use crate::projects::ProjectStore;
use crate::prompts::PromptStore;
use crate::settings::SettingsStore;
use crate::templates::TemplateStore;
use crate::training::TrainingStore;
use crate::uploads::UploadDir;

pub struct AppState {
    pub generator: Generator,
    pub exports: ExportAssembler,
    pub training: TrainingStore,
    pub uploads: UploadDir,
    pub projects: ProjectStore,
    pub templates: TemplateStore,
    pub prompts: PromptStore,
    pub settings: SettingsStore,
    /// Empty allows any origin
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// Document stores share `database`. Any origin is allowed.
    pub fn new(
        generator: Generator,
        exports: ExportAssembler,
        training: TrainingStore,
        uploads: UploadDir,
        database: Surreal<Db>,
    ) -> Self {
        Self {
            generator,
            exports,
            training,
            uploads,
            projects: ProjectStore::new(database.clone()),
            templates: TemplateStore::new(database.clone()),
            prompts: PromptStore::new(database.clone()),
            settings: SettingsStore::new(database),
            cors_origins: Vec::new(),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Wire up every service from configuration
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::new();

        tokio::fs::create_dir_all(&config.temp_dir)
            .await
            .with_context(|| format!("failed to create {}", config.temp_dir.display()))?;

        let database = db::connect(&config.db_path).await?;
        info!(
            temp_dir = %config.temp_dir.display(),
            upload_dir = %config.upload_dir.display(),
            ffmpeg = %config.ffmpeg_path.display(),
            "Services configured"
        );

        let state = Self::new(
            Generator::from_config(config, client.clone()),
            ExportAssembler::new(
                config.temp_dir.clone(),
                AssetFetcher::new(client),
                Arc::new(FfmpegEncoder::new(config.ffmpeg_path.clone())),
            ),
            TrainingStore::new(database.clone(), config.lora_completion),
            UploadDir::new(config.upload_dir.clone()),
            database,
        );
        Ok(state.with_cors_origins(config.cors_allowed_origins.clone()))
    }
}
