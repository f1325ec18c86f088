//! Export pipeline: stages scene assets into a scratch directory, then
//! packages them as a zip archive or renders them into a video with ffmpeg.

pub mod archive;
pub mod assembler;
pub mod command;
pub mod encoder;
pub mod error;
pub mod fetch;
pub mod options;
pub mod scratch;

pub use assembler::{ExportArtifact, ExportAssembler, DOWNLOAD_ROUTE};
pub use command::{concat_list, FfmpegCommand, RenderPlan, FRAME_LIST};
pub use encoder::{FfmpegEncoder, VideoEncoder};
pub use error::{EncodeError, ExportError, FetchError};
pub use fetch::AssetFetcher;
pub use options::{DurationBasis, VideoOptions, DURATION_BASIS};
pub use scratch::ScratchDir;
