use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use crate::command::FfmpegCommand;
use crate::error::EncodeError;

/// Lines of encoder stderr kept in a failure report
const STDERR_TAIL_LINES: usize = 20;

#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Run the command to completion. The output file is only valid on `Ok`.
    async fn encode(&self, command: &FfmpegCommand) -> Result<(), EncodeError>;
}

/// Runs the external `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn encode(&self, command: &FfmpegCommand) -> Result<(), EncodeError> {
        let args = command.to_args();
        debug!(binary = %self.binary.display(), ?args, "spawning encoder");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => EncodeError::BinaryNotFound(self.binary.display().to_string()),
                _ => EncodeError::Spawn(e),
            })?;

        if !output.status.success() {
            return Err(EncodeError::ProcessFailed {
                exit_code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        info!(output = %command.output.display(), "encoder finished");
        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RenderPlan;

    fn command() -> FfmpegCommand {
        FfmpegCommand::render(&RenderPlan {
            frame_list: PathBuf::from("frames.txt"),
            fps: 30,
            audio: None,
            width: 1280,
            height: 720,
            total_duration: 3.0,
            output: PathBuf::from("out.mp4"),
        })
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let encoder = FfmpegEncoder::new("/nonexistent/bin/ffmpeg-missing");
        let err = encoder.encode(&command()).await.unwrap_err();
        assert!(matches!(err, EncodeError::BinaryNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let encoder = FfmpegEncoder::new("false");
        let err = encoder.encode(&command()).await.unwrap_err();
        assert!(matches!(err, EncodeError::ProcessFailed { exit_code: Some(1), .. }));
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(stderr.as_bytes());
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 49"));
    }
}
