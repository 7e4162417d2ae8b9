use iced::{
    widget::{button, column, progress_bar, radio, row, scrollable, text, text_input, Space},
    Element, Length,
};

use crate::application::DownloadEvent;
use crate::domain::{DownloadOutcome, DownloadPhase, MediaFormat};

const MAX_LOG_LINES: usize = 500;

/// Main view state
pub struct DownloadView {
    pub url: String,
    pub output_dir: String,
    pub file_name: String,
    pub format: MediaFormat,
    /// 0.0 to 100.0
    pub progress: f32,
    pub status_message: String,
    pub log: Vec<String>,
    pub phase: DownloadPhase,
    pub is_downloading: bool,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            output_dir: String::new(),
            file_name: String::new(),
            format: MediaFormat::Video,
            progress: 0.0,
            status_message: "Paste a video link to download".to_string(),
            log: Vec::new(),
            phase: DownloadPhase::Idle,
            is_downloading: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    OutputDirChanged(String),
    FileNameChanged(String),
    FormatSelected(MediaFormat),
    BrowsePressed,
    DownloadPressed,
    CancelPressed,
}

impl DownloadView {
    pub fn new(output_dir: String) -> Self {
        let mut view = Self {
            output_dir,
            ..Self::default()
        };
        view.push_log("Application started. Ready to download!");
        view
    }

    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => self.url = url,
            DownloadMessage::OutputDirChanged(dir) => self.output_dir = dir,
            DownloadMessage::FileNameChanged(name) => self.file_name = name,
            DownloadMessage::FormatSelected(format) => self.format = format,
            DownloadMessage::BrowsePressed
            | DownloadMessage::DownloadPressed
            | DownloadMessage::CancelPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(format!("• {}", line.into()));
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
    }

    pub fn begin_download(&mut self, url: &str) {
        self.is_downloading = true;
        self.phase = DownloadPhase::Idle;
        self.progress = 0.0;
        self.status_message = "Starting...".to_string();
        self.push_log("=".repeat(50));
        self.push_log(format!("Starting download: {}", self.format.label()));
        self.push_log(format!("URL: {url}"));
    }

    pub fn record_event(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Status { phase, message } => {
                self.phase = phase;
                self.push_log(message);
            }
            DownloadEvent::Progress(progress) => {
                self.progress = f32::from(progress.percent);
                self.status_message = progress.status;
            }
            DownloadEvent::Finished(outcome) => {
                self.is_downloading = false;
                match outcome {
                    DownloadOutcome::Success(path) => {
                        self.phase = DownloadPhase::Completed;
                        self.progress = 100.0;
                        self.status_message = format!("Saved: {}", path.display());
                        self.push_log(format!("Download complete! File saved to:\n{}", path.display()));
                    }
                    DownloadOutcome::Failure(failure) => {
                        self.phase = DownloadPhase::Failed;
                        self.progress = 0.0;
                        self.status_message = "Download failed".to_string();
                        self.push_log(failure.message);
                    }
                }
            }
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let idle = !self.is_downloading;

        let download_label = match self.phase {
            _ if idle => "Start download",
            DownloadPhase::Resolving => "Resolving stream...",
            _ => "Downloading...",
        };

        let log = scrollable(
            column(
                self.log
                    .iter()
                    .map(|line| Element::from(text(line.as_str()).size(12))),
            )
            .spacing(2),
        )
        .height(Length::Fixed(150.0));

        column![
            text("Video/Audio Downloader").size(32),
            text("Download videos as MP4 or extract MP3 audio (YouTube, StreamYard and more)")
                .size(14),
            Space::new().height(Length::Fixed(10.0)),
            text("Video URL:").size(16),
            text_input(
                "https://www.youtube.com/watch?v=... or https://streamyard.com/watch/...",
                &self.url
            )
            .on_input(DownloadMessage::UrlChanged)
            .padding(10),
            text("Destination folder:").size(16),
            row![
                text_input("Folder", &self.output_dir)
                    .on_input(DownloadMessage::OutputDirChanged)
                    .padding(10),
                button("Browse")
                    .on_press_maybe(idle.then_some(DownloadMessage::BrowsePressed))
                    .padding([10, 20]),
            ]
            .spacing(10),
            text("File name (optional):").size(16),
            text_input("Leave empty to use the video title", &self.file_name)
                .on_input(DownloadMessage::FileNameChanged)
                .padding(10),
            text("Format:").size(16),
            radio(
                "MP4 video (best quality)",
                MediaFormat::Video,
                Some(self.format),
                DownloadMessage::FormatSelected
            ),
            radio(
                "MP3 audio (audio only, best quality)",
                MediaFormat::Audio,
                Some(self.format),
                DownloadMessage::FormatSelected
            ),
            Space::new().height(Length::Fixed(10.0)),
            progress_bar(0.0..=100.0, self.progress),
            text(&self.status_message).size(14),
            row![
                button(download_label)
                    .on_press_maybe(idle.then_some(DownloadMessage::DownloadPressed))
                    .padding([10, 20]),
                button("Cancel")
                    .on_press_maybe(self.is_downloading.then_some(DownloadMessage::CancelPressed))
                    .padding([10, 20]),
            ]
            .spacing(10),
            text("Activity log:").size(14),
            log,
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DownloadFailure, FailureKind, ProgressEvent};
    use std::path::PathBuf;

    #[test]
    fn field_messages_update_state() {
        let mut view = DownloadView::new("/downloads".to_string());
        view.update(DownloadMessage::UrlChanged("https://youtu.be/x".into()));
        view.update(DownloadMessage::FormatSelected(MediaFormat::Audio));
        view.update(DownloadMessage::FileNameChanged("song".into()));
        assert_eq!(view.url, "https://youtu.be/x");
        assert_eq!(view.format, MediaFormat::Audio);
        assert_eq!(view.file_name, "song");
        assert_eq!(view.output_dir, "/downloads");
    }

    #[test]
    fn log_is_bounded() {
        let mut view = DownloadView::default();
        for i in 0..(MAX_LOG_LINES + 20) {
            view.push_log(format!("line {i}"));
        }
        assert_eq!(view.log.len(), MAX_LOG_LINES);
        assert_eq!(view.log.last().map(String::as_str), Some("• line 519"));
    }

    #[test]
    fn finished_event_re_enables_downloads() {
        let mut view = DownloadView::default();
        view.begin_download("https://youtu.be/x");
        assert!(view.is_downloading);

        view.record_event(DownloadEvent::Status {
            phase: DownloadPhase::Extracting,
            message: "Starting MP4 video download...".into(),
        });
        view.record_event(DownloadEvent::Progress(ProgressEvent {
            percent: 40,
            status: "Downloading: 40%".into(),
        }));
        assert_eq!(view.progress, 40.0);
        assert_eq!(view.phase, DownloadPhase::Extracting);

        view.record_event(DownloadEvent::Finished(DownloadOutcome::Success(
            PathBuf::from("/downloads/clip.mp4"),
        )));
        assert!(!view.is_downloading);
        assert_eq!(view.phase, DownloadPhase::Completed);
        assert_eq!(view.progress, 100.0);
    }

    #[test]
    fn failure_resets_progress_and_logs_message() {
        let mut view = DownloadView::default();
        view.begin_download("https://youtu.be/x");
        view.progress = 70.0;

        view.record_event(DownloadEvent::Finished(DownloadOutcome::Failure(
            DownloadFailure::new(FailureKind::Network, "Network problem"),
        )));
        assert!(!view.is_downloading);
        assert_eq!(view.phase, DownloadPhase::Failed);
        assert_eq!(view.progress, 0.0);
        assert_eq!(view.log.last().map(String::as_str), Some("• Network problem"));
    }
}
