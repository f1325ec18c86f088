use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use sa_core::Scene;
use crate::archive::zip_files;
use crate::command::{concat_list, FfmpegCommand, RenderPlan, FRAME_LIST};
use crate::encoder::VideoEncoder;
use crate::error::ExportError;
use crate::fetch::{audio_extension, AssetFetcher};
use crate::options::{VideoOptions, DURATION_BASIS};
use crate::scratch::ScratchDir;

/// Route artifacts are served from
pub const DOWNLOAD_ROUTE: &str = "/api/export/download";

/// A finished export, complete on disk before it is handed out
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    pub id: Uuid,
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub download_url: String,
    pub staged_scenes: usize,
    /// Only set for rendered videos
    pub render: Option<RenderPlan>,
}

impl ExportArtifact {
    fn new(id: Uuid, file_name: String, path: PathBuf, staged_scenes: usize) -> Self {
        Self {
            id,
            download_url: format!("{DOWNLOAD_ROUTE}/{file_name}"),
            file_name,
            path,
            staged_scenes,
            render: None,
        }
    }
}

pub struct ExportAssembler {
    temp_root: PathBuf,
    fetcher: AssetFetcher,
    encoder: Arc<dyn VideoEncoder>,
}

impl ExportAssembler {
    pub fn new(temp_root: impl Into<PathBuf>, fetcher: AssetFetcher, encoder: Arc<dyn VideoEncoder>) -> Self {
        Self {
            temp_root: temp_root.into(),
            fetcher,
            encoder,
        }
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Fetch every scene image and package them into `<id>.zip`
    pub async fn export_image_sequence(&self, scenes: &[Scene]) -> Result<ExportArtifact, ExportError> {
        ensure_scenes(scenes)?;

        let mut scratch = ScratchDir::create(&self.temp_root).await?;
        let id = scratch.id();
        let output = self.temp_root.join(format!("{id}.zip"));
        info!(export_id = %id, scene_count = scenes.len(), "starting image sequence export");

        let result = self.package_sequence(&mut scratch, scenes, &output).await;
        scratch.cleanup().await;

        match result {
            Ok(staged) => {
                info!(export_id = %id, staged, "image sequence export finished");
                Ok(ExportArtifact::new(id, format!("{id}.zip"), output, staged))
            }
            Err(e) => {
                error!(export_id = %id, scene_count = scenes.len(), error = %e, "image sequence export failed");
                discard_partial(&output).await;
                Err(e)
            }
        }
    }

    async fn package_sequence(
        &self,
        scratch: &mut ScratchDir,
        scenes: &[Scene],
        output: &Path,
    ) -> Result<usize, ExportError> {
        let staged = self.stage_scenes(scratch, scenes).await?;
        zip_files(staged, output.to_path_buf()).await
    }

    /// Fetch every scene image and render them into `<id>.<format>`
    pub async fn export_video(&self, scenes: &[Scene], options: &VideoOptions) -> Result<ExportArtifact, ExportError> {
        ensure_scenes(scenes)?;
        options.validate()?;

        let mut scratch = ScratchDir::create(&self.temp_root).await?;
        let id = scratch.id();
        let file_name = format!("{id}.{}", options.format);
        let output = self.temp_root.join(&file_name);
        info!(
            export_id = %id,
            scene_count = scenes.len(),
            fps = options.fps,
            resolution = options.resolution.name(),
            "starting video export"
        );

        let result = self.render_video(&mut scratch, scenes, options, &output).await;
        scratch.cleanup().await;

        match result {
            Ok((staged, plan)) => {
                info!(export_id = %id, staged, duration = plan.total_duration, "video export finished");
                let mut artifact = ExportArtifact::new(id, file_name, output, staged);
                artifact.render = Some(plan);
                Ok(artifact)
            }
            Err(e) => {
                error!(export_id = %id, scene_count = scenes.len(), error = %e, "video export failed");
                discard_partial(&output).await;
                Err(e)
            }
        }
    }

    async fn render_video(
        &self,
        scratch: &mut ScratchDir,
        scenes: &[Scene],
        options: &VideoOptions,
        output: &Path,
    ) -> Result<(usize, RenderPlan), ExportError> {
        let staged = self.stage_scenes(scratch, scenes).await?;
        if staged.is_empty() {
            return Err(ExportError::Validation("no scene has an image to render".into()));
        }

        let audio = match options.audio_url() {
            Some(url) => self.stage_audio(scratch, url).await,
            None => None,
        };

        let frame_list = scratch.track(FRAME_LIST);
        fs::write(&frame_list, concat_list(&staged, options.duration)).await?;

        let (width, height) = options.resolution.dimensions();
        let plan = RenderPlan {
            frame_list,
            fps: options.fps,
            audio,
            width,
            height,
            total_duration: DURATION_BASIS.total_duration(options.duration, scenes.len(), staged.len()),
            output: output.to_path_buf(),
        };

        let command = FfmpegCommand::render(&plan);
        self.encoder.encode(&command).await?;

        Ok((staged.len(), plan))
    }

    /// Download scene images in request order as `scene_<position>.jpg`.
    /// Scenes without an image are skipped, keeping the remaining positions.
    async fn stage_scenes(&self, scratch: &mut ScratchDir, scenes: &[Scene]) -> Result<Vec<PathBuf>, ExportError> {
        let mut staged = Vec::with_capacity(scenes.len());

        for (index, scene) in scenes.iter().enumerate() {
            let Some(url) = scene.asset_url() else {
                debug!(export_id = %scratch.id(), position = index + 1, "scene has no image, skipping");
                continue;
            };

            let path = scratch.track(&Scene::staged_file_name(index));
            self.fetcher.fetch_to(url, &path).await?;
            staged.push(path);
        }

        Ok(staged)
    }

    /// Audio is optional; a failed download degrades to a silent video
    async fn stage_audio(&self, scratch: &mut ScratchDir, url: &str) -> Option<PathBuf> {
        let name = format!("audio_{}.{}", Uuid::new_v4(), audio_extension(url));
        let path = scratch.track(&name);

        match self.fetcher.fetch_to(url, &path).await {
            Ok(_) => {
                debug!(export_id = %scratch.id(), path = %path.display(), "audio staged");
                Some(path)
            }
            Err(e) => {
                warn!(export_id = %scratch.id(), error = %e, "audio download failed, rendering without audio");
                None
            }
        }
    }

    /// Resolve a download file name to an artifact inside the temp root
    pub async fn artifact_path(&self, file_name: &str) -> Result<PathBuf, ExportError> {
        if file_name.is_empty()
            || file_name.starts_with('.')
            || file_name.contains(['/', '\\'])
            || file_name.contains("..")
        {
            return Err(ExportError::NotFound(file_name.to_string()));
        }

        let path = self.temp_root.join(file_name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(ExportError::NotFound(file_name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ExportError::NotFound(file_name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

fn ensure_scenes(scenes: &[Scene]) -> Result<(), ExportError> {
    if scenes.is_empty() {
        return Err(ExportError::Validation("scenes must be a non-empty array".into()));
    }
    Ok(())
}

async fn discard_partial(output: &Path) {
    match fs::remove_file(output).await {
        Ok(()) => debug!(path = %output.display(), "removed partial artifact"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %output.display(), error = %e, "failed to remove partial artifact"),
    }
}
