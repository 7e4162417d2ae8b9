use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{MediaFormat, ValidatedUrl};

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One progress record as printed by yt-dlp's progress template.
/// Absent fields come through as `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawProgress {
    #[serde(default)]
    pub status: String,
    pub downloaded_bytes: Option<f64>,
    pub total_bytes: Option<f64>,
    pub total_bytes_estimate: Option<f64>,
    /// Bytes per second.
    pub speed: Option<f64>,
    /// Seconds.
    pub eta: Option<f64>,
}

/// What the extractor is asked to fetch. The URL may differ from the
/// request's when a stream was resolved first.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub url: ValidatedUrl,
    pub output_dir: PathBuf,
    pub format: MediaFormat,
    pub file_stem: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub title: Option<String>,
    pub file_path: PathBuf,
}

/// Configuration for the yt-dlp extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub program: PathBuf,
    pub ffmpeg_location: Option<PathBuf>,
    pub retries: u32,
    pub fragment_retries: u32,
    pub socket_timeout_secs: u32,
    pub user_agent: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            ffmpeg_location: None,
            retries: 10,
            fragment_retries: 10,
            socket_timeout_secs: 30,
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}

/// Configuration for the watch-page resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_progress_fields_deserialize_as_none() {
        let raw: RawProgress =
            serde_json::from_str(r#"{"status": "downloading", "downloaded_bytes": 1024}"#).unwrap();
        assert_eq!(raw.status, "downloading");
        assert_eq!(raw.downloaded_bytes, Some(1024.0));
        assert_eq!(raw.total_bytes, None);
        assert_eq!(raw.eta, None);
    }

    #[test]
    fn null_progress_fields_deserialize_as_none() {
        let raw: RawProgress = serde_json::from_str(
            r#"{"status": "downloading", "downloaded_bytes": 10, "total_bytes": null, "speed": null}"#,
        )
        .unwrap();
        assert_eq!(raw.total_bytes, None);
        assert_eq!(raw.speed, None);
    }
}
