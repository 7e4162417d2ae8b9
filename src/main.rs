mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use std::sync::Arc;

use iced::window;
use tracing_subscriber::EnvFilter;

use crate::api::{PageScanResolver, YtDlpExtractor};
use crate::application::DownloadCoordinator;
use crate::config::AppConfig;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();

    // Downloads run here; iced keeps its own executor for the UI.
    let runtime = tokio::runtime::Runtime::new().map_err(iced::Error::ExecutorCreationFailed)?;

    let coordinator = DownloadCoordinator::new(
        Arc::new(YtDlpExtractor::new(config.extractor.clone())),
        Arc::new(PageScanResolver::new(config.resolver.clone())),
        runtime.handle().clone(),
        config.resolver.timeout,
    );
    let output_dir = config.default_output_dir.clone();

    tracing::info!(
        yt_dlp = %config.extractor.program.display(),
        output_dir = %output_dir.display(),
        "starting downloader"
    );

    iced::application(
        move || app::DownloadApp::new(coordinator.clone(), output_dir.clone()),
        app::update,
        app::view,
    )
    .title("Video/Audio Downloader - MP4 & MP3")
    .window(window::Settings {
        min_size: Some(iced::Size::new(700.0, 600.0)),
        ..Default::default()
    })
    .run()
}
