use std::path::PathBuf;

use thiserror::Error;

/// Rejections detected before any background work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid or unsupported URL")]
    InvalidUrl,

    #[error("Please choose an output folder")]
    MissingOutputDir,

    #[error("Output folder does not exist: {}", .0.display())]
    OutputDirNotFound(PathBuf),

    #[error("Output path is not a folder: {}", .0.display())]
    OutputDirNotDirectory(PathBuf),

    #[error("Output folder is read-only: {}", .0.display())]
    OutputDirReadOnly(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ResolutionFailed,
    BotDetection,
    Unavailable,
    Network,
    Forbidden,
    RateLimited,
    Cancelled,
    Other,
}

/// Terminal failure of one download attempt, carrying user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DownloadFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl DownloadFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn resolution_failed() -> Self {
        Self::new(
            FailureKind::ResolutionFailed,
            "Could not extract the stream link from the StreamYard page.\n\n\
             Try:\n\
             1. Check that the video is still available\n\
             2. Copy the .m3u8 or .mp4 link manually (F12 -> Network) and paste it instead",
        )
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "Download cancelled")
    }
}
