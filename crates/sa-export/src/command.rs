use std::fmt::Write;
use std::path::{Path, PathBuf};
use serde::Serialize;

/// Name of the concat list written next to the staged scenes
pub const FRAME_LIST: &str = "frames.txt";

/// Everything the encoder needs to render one export
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenderPlan {
    /// ffconcat list naming the staged `scene_<n>.jpg` files in position order
    pub frame_list: PathBuf,
    pub fps: u32,
    pub audio: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    /// Seconds
    pub total_duration: f64,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegInput {
    pub options: Vec<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    pub inputs: Vec<FfmpegInput>,
    pub output: PathBuf,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub preset: Option<String>,
    pub extra_args: Vec<String>,
}

impl FfmpegCommand {
    /// Staged stills (plus optional audio track) to H.264
    pub fn render(plan: &RenderPlan) -> Self {
        let mut inputs = vec![FfmpegInput {
            options: vec![
                "-f".to_string(),
                "concat".to_string(),
                "-safe".to_string(),
                "0".to_string(),
            ],
            path: plan.frame_list.clone(),
        }];

        let mut extra_args = vec![
            "-r".to_string(),
            plan.fps.to_string(),
            "-vf".to_string(),
            format!("scale={}:{}", plan.width, plan.height),
            "-t".to_string(),
            plan.total_duration.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-crf".to_string(),
            "23".to_string(),
        ];

        let audio_codec = match &plan.audio {
            Some(audio) => {
                inputs.push(FfmpegInput {
                    options: Vec::new(),
                    path: audio.clone(),
                });
                extra_args.extend([
                    "-b:a".to_string(),
                    "128k".to_string(),
                    "-map".to_string(),
                    "0:v:0".to_string(),
                    "-map".to_string(),
                    format!("{}:a:0", inputs.len() - 1),
                ]);
                Some("aac".to_string())
            }
            None => None,
        };

        Self {
            inputs,
            output: plan.output.clone(),
            video_codec: Some("libx264".to_string()),
            audio_codec,
            preset: Some("medium".to_string()),
            extra_args,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];

        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().into_owned());
        }

        if let Some(codec) = &self.video_codec {
            args.push("-c:v".to_string());
            args.push(codec.clone());
        }

        if let Some(codec) = &self.audio_codec {
            args.push("-c:a".to_string());
            args.push(codec.clone());
        }

        if let Some(preset) = &self.preset {
            args.push("-preset".to_string());
            args.push(preset.clone());
        }

        args.extend(self.extra_args.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());

        args
    }

    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }
}

/// ffconcat script showing each frame for `seconds_each`.
///
/// Entries are file names relative to the list, so positions skipped while
/// staging simply do not appear. The last frame is repeated because the
/// concat demuxer ignores the duration of the final entry.
pub fn concat_list(frames: &[PathBuf], seconds_each: f64) -> String {
    let mut list = String::from("ffconcat version 1.0\n");

    for frame in frames {
        let _ = writeln!(list, "file '{}'", escape_entry(frame));
        let _ = writeln!(list, "duration {seconds_each}");
    }
    if let Some(last) = frames.last() {
        let _ = writeln!(list, "file '{}'", escape_entry(last));
    }

    list
}

fn escape_entry(frame: &Path) -> String {
    let name = frame
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.replace('\'', "'\\''")
}
