use serde::{Deserialize, Serialize};
use sa_core::Resolution;
use crate::error::ExportError;

/// Which scene count the total video duration is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBasis {
    /// Every scene in the request counts, staged or not
    RequestedScenes,
    /// Only scenes whose image was actually staged count
    StagedScenes,
}

/// Scenes without an image are skipped while staging but still count
/// towards the rendered duration.
pub const DURATION_BASIS: DurationBasis = DurationBasis::RequestedScenes;

impl DurationBasis {
    pub fn total_duration(&self, per_scene: f64, requested: usize, staged: usize) -> f64 {
        let scenes = match self {
            Self::RequestedScenes => requested,
            Self::StagedScenes => staged,
        };
        per_scene * scenes as f64
    }
}

fn default_fps() -> u32 {
    30
}

fn default_duration() -> f64 {
    3.0
}

fn default_format() -> String {
    "mp4".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoOptions {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Seconds per scene
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            duration: default_duration(),
            resolution: Resolution::default(),
            format: default_format(),
            audio_url: None,
        }
    }
}

impl VideoOptions {
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.fps == 0 {
            return Err(ExportError::Validation("fps must be greater than zero".into()));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ExportError::Validation("duration must be a positive number of seconds".into()));
        }
        // The format becomes the artifact's file extension.
        if self.format.is_empty()
            || self.format.len() > 8
            || !self.format.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ExportError::Validation(format!("unsupported format '{}'", self.format)));
        }
        Ok(())
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let options: VideoOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, VideoOptions::default());
        assert_eq!(options.fps, 30);
        assert_eq!(options.duration, 3.0);
        assert_eq!(options.resolution, Resolution::FullHd1080);
        assert_eq!(options.format, "mp4");
        assert!(options.audio_url().is_none());
    }

    #[test]
    fn test_unknown_resolution_falls_back() {
        let options: VideoOptions = serde_json::from_str(r#"{"resolution":"8k","audioUrl":""}"#).unwrap();
        assert_eq!(options.resolution, Resolution::FullHd1080);
        assert!(options.audio_url().is_none());
    }

    #[test]
    fn test_duration_counts_requested_scenes() {
        assert_eq!(DURATION_BASIS, DurationBasis::RequestedScenes);
        assert_eq!(DURATION_BASIS.total_duration(3.0, 4, 2), 12.0);
        assert_eq!(DurationBasis::StagedScenes.total_duration(3.0, 4, 2), 6.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_format = VideoOptions { format: "../mp4".into(), ..Default::default() };
        assert!(bad_format.validate().is_err());

        let zero_fps = VideoOptions { fps: 0, ..Default::default() };
        assert!(zero_fps.validate().is_err());

        let negative = VideoOptions { duration: -1.0, ..Default::default() };
        assert!(negative.validate().is_err());

        assert!(VideoOptions::default().validate().is_ok());
    }
}
