use std::path::{Path, PathBuf};

use super::error::{DownloadFailure, InputError};
use super::url::{normalize, ValidatedUrl};
use crate::utils::sanitize_filename;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFormat {
    /// MP4 video with merged audio.
    #[default]
    Video,
    /// MP3 audio only.
    Audio,
}

impl MediaFormat {
    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Video => "mp4",
            MediaFormat::Audio => "mp3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaFormat::Video => "MP4",
            MediaFormat::Audio => "MP3",
        }
    }
}

/// One committed download. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    url: ValidatedUrl,
    output_dir: PathBuf,
    format: MediaFormat,
    file_stem: Option<String>,
}

impl DownloadRequest {
    /// Validate user input synchronously. Errors here never reach a worker.
    pub fn new(
        raw_url: &str,
        output_dir: impl AsRef<Path>,
        format: MediaFormat,
        custom_name: Option<&str>,
    ) -> Result<Self, InputError> {
        let url = normalize(raw_url).ok_or(InputError::InvalidUrl)?;

        let output_dir = output_dir.as_ref();
        if output_dir.as_os_str().is_empty() {
            return Err(InputError::MissingOutputDir);
        }
        let metadata = std::fs::metadata(output_dir)
            .map_err(|_| InputError::OutputDirNotFound(output_dir.to_path_buf()))?;
        if !metadata.is_dir() {
            return Err(InputError::OutputDirNotDirectory(output_dir.to_path_buf()));
        }
        if metadata.permissions().readonly() {
            return Err(InputError::OutputDirReadOnly(output_dir.to_path_buf()));
        }

        let file_stem = custom_name
            .map(sanitize_filename)
            .filter(|name| !name.is_empty());

        Ok(Self {
            url,
            output_dir: output_dir.to_path_buf(),
            format,
            file_stem,
        })
    }

    pub fn url(&self) -> &ValidatedUrl {
        &self.url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn format(&self) -> MediaFormat {
        self.format
    }

    pub fn file_stem(&self) -> Option<&str> {
        self.file_stem.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success(PathBuf),
    Failure(DownloadFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 0..=100, never decreasing within one request.
    pub percent: u8,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    Resolving,
    Extracting,
    Completed,
    Failed,
}
