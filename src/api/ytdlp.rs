use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::models::{ExtractionJob, ExtractionResult, ExtractorConfig, RawProgress};
use crate::domain::MediaFormat;
use crate::utils::sanitize_filename;

const PROGRESS_MARKER: &str = "__progress__";
const TITLE_MARKER: &str = "__title__";
const FILEPATH_MARKER: &str = "__filepath__";

const VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";
const YOUTUBE_EXTRACTOR_ARGS: &str = "youtube:player_client=android,ios,web;skip=hls,dash";

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Failed to start yt-dlp: {0}")]
    Spawn(#[source] io::Error),

    #[error("{message}")]
    Failed { message: String },

    #[error("I/O error while running yt-dlp: {0}")]
    Io(#[from] io::Error),

    #[error("Download cancelled")]
    Cancelled,
}

/// Downloads (and optionally transcodes) one media URL.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    async fn extract(
        &self,
        job: &ExtractionJob,
        cancel: &CancellationToken,
        on_progress: &mut (dyn FnMut(RawProgress) + Send),
    ) -> Result<ExtractionResult, ExtractorError>;
}

#[derive(Clone)]
pub struct YtDlpExtractor {
    config: ExtractorConfig,
}

impl YtDlpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(
        &self,
        job: &ExtractionJob,
        cancel: &CancellationToken,
        on_progress: &mut (dyn FnMut(RawProgress) + Send),
    ) -> Result<ExtractionResult, ExtractorError> {
        let args = build_args(&self.config, job);
        tracing::info!(
            program = %self.config.program.display(),
            url = %job.url,
            format = job.format.label(),
            "starting yt-dlp"
        );

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ExtractorError::Spawn)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("failed to capture yt-dlp stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("failed to capture yt-dlp stderr"))?;

        let stderr_reader = tokio::spawn(async move {
            let mut collected = Vec::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                collected.push(line);
            }
            collected
        });

        let mut title = None;
        let mut file_path = None;

        let status = {
            let mut lines = BufReader::new(stdout).lines();
            let reading = async {
                while let Some(line) = lines.next_line().await? {
                    match parse_output_line(&line) {
                        Some(OutputLine::Progress(progress)) => on_progress(progress),
                        Some(OutputLine::Title(value)) => title = Some(value),
                        Some(OutputLine::FilePath(value)) => file_path = Some(value),
                        None => tracing::debug!(line = %line, "yt-dlp output"),
                    }
                }
                child.wait().await
            };

            tokio::select! {
                status = reading => status?,
                _ = cancel.cancelled() => {
                    // Dropping the child kills the process.
                    tracing::info!(url = %job.url, "yt-dlp cancelled");
                    return Err(ExtractorError::Cancelled);
                }
            }
        };

        let stderr_lines = stderr_reader.await.unwrap_or_default();

        if !status.success() {
            let message = summarize_stderr(&stderr_lines).unwrap_or_else(|| {
                format!("yt-dlp exited with code {}", status.code().unwrap_or(-1))
            });
            tracing::warn!(url = %job.url, error = %message, "yt-dlp failed");
            return Err(ExtractorError::Failed { message });
        }

        let file_path = file_path.unwrap_or_else(|| fallback_path(job, title.as_deref()));
        tracing::info!(path = %file_path.display(), "yt-dlp finished");

        Ok(ExtractionResult { title, file_path })
    }
}

#[derive(Debug, PartialEq)]
enum OutputLine {
    Progress(RawProgress),
    Title(String),
    FilePath(PathBuf),
}

fn parse_output_line(line: &str) -> Option<OutputLine> {
    let line = line.trim();
    if let Some(json) = line.strip_prefix(PROGRESS_MARKER) {
        return match serde_json::from_str(json) {
            Ok(progress) => Some(OutputLine::Progress(progress)),
            Err(e) => {
                tracing::debug!(error = %e, "unreadable progress line");
                None
            }
        };
    }
    if let Some(title) = line.strip_prefix(TITLE_MARKER) {
        return Some(OutputLine::Title(title.to_string()));
    }
    line.strip_prefix(FILEPATH_MARKER)
        .filter(|path| !path.is_empty() && *path != "NA")
        .map(|path| OutputLine::FilePath(PathBuf::from(path)))
}

/// `ERROR:` lines if yt-dlp printed any, else the last non-empty line.
fn summarize_stderr(lines: &[String]) -> Option<String> {
    let errors: Vec<&str> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| line.starts_with("ERROR:"))
        .collect();
    if !errors.is_empty() {
        return Some(errors.join("\n"));
    }

    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .next_back()
        .map(str::to_string)
}

fn output_template(job: &ExtractionJob) -> String {
    let stem = match &job.file_stem {
        Some(stem) => stem.replace('%', "%%"),
        None => "%(title)s".to_string(),
    };
    job.output_dir
        .join(format!("{stem}.%(ext)s"))
        .to_string_lossy()
        .into_owned()
}

/// Where the file most likely ended up when yt-dlp did not print it.
fn fallback_path(job: &ExtractionJob, title: Option<&str>) -> PathBuf {
    let stem = job
        .file_stem
        .clone()
        .or_else(|| title.map(sanitize_filename))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "download".to_string());
    job.output_dir
        .join(format!("{stem}.{}", job.format.extension()))
}

fn build_args(config: &ExtractorConfig, job: &ExtractionJob) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--no-playlist".into(),
        "--newline".into(),
        "--progress".into(),
        "--no-warnings".into(),
        "--progress-template".into(),
        format!(
            "download:{PROGRESS_MARKER}%(progress.{{status,downloaded_bytes,total_bytes,total_bytes_estimate,speed,eta}})j"
        ),
        "--print".into(),
        format!("after_move:{TITLE_MARKER}%(title)s"),
        "--print".into(),
        format!("after_move:{FILEPATH_MARKER}%(filepath)s"),
        "--retries".into(),
        config.retries.to_string(),
        "--fragment-retries".into(),
        config.fragment_retries.to_string(),
        "--socket-timeout".into(),
        config.socket_timeout_secs.to_string(),
        "--extractor-args".into(),
        YOUTUBE_EXTRACTOR_ARGS.into(),
        "--user-agent".into(),
        config.user_agent.clone(),
        "--add-headers".into(),
        "Accept:text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into(),
        "--add-headers".into(),
        "Accept-Language:en-us,en;q=0.5".into(),
        "--add-headers".into(),
        "Sec-Fetch-Mode:navigate".into(),
    ];

    if let Some(ffmpeg) = &config.ffmpeg_location {
        args.push("--ffmpeg-location".into());
        args.push(ffmpeg.to_string_lossy().into_owned());
    }

    match job.format {
        MediaFormat::Video => args.extend([
            "-f".into(),
            VIDEO_FORMAT.into(),
            "--merge-output-format".into(),
            "mp4".into(),
        ]),
        MediaFormat::Audio => args.extend([
            "-f".into(),
            "bestaudio".into(),
            "-x".into(),
            "--audio-format".into(),
            "mp3".into(),
            "--audio-quality".into(),
            "0".into(),
        ]),
    }

    args.push("-o".into());
    args.push(output_template(job));
    args.push("--".into());
    args.push(job.url.to_string());
    args
}
