use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedSender};
use futures::{stream::BoxStream, StreamExt};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use super::failure::classify_failure;
use super::progress::ProgressTracker;
use crate::{
    api::{ExtractionJob, ExtractorError, MediaExtractor, RawProgress, StreamResolver},
    domain::{
        classify, DownloadFailure, DownloadOutcome, DownloadPhase, DownloadRequest, FailureKind,
        MediaFormat, PlatformKind, ProgressEvent,
    },
};

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Status {
        phase: DownloadPhase,
        message: String,
    },
    Progress(ProgressEvent),
    /// Always the last event of a run, sent exactly once.
    Finished(DownloadOutcome),
}

/// Requests that a running download stop at the next opportunity.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    extractor: Arc<dyn MediaExtractor>,
    resolver: Arc<dyn StreamResolver>,
    runtime: Handle,
    resolve_budget: Duration,
}

impl DownloadCoordinator {
    pub fn new(
        extractor: Arc<dyn MediaExtractor>,
        resolver: Arc<dyn StreamResolver>,
        runtime: Handle,
        resolve_budget: Duration,
    ) -> Self {
        Self {
            extractor,
            resolver,
            runtime,
            resolve_budget,
        }
    }

    /// Queue one download on the background runtime and return at once.
    ///
    /// The stream yields status and progress events and ends with a single
    /// [`DownloadEvent::Finished`], whatever happens inside the worker.
    pub fn start(
        &self,
        request: DownloadRequest,
    ) -> (CancelHandle, BoxStream<'static, DownloadEvent>) {
        let (events, receiver) = mpsc::unbounded();
        let cancel = CancellationToken::new();

        let worker = Worker {
            extractor: self.extractor.clone(),
            resolver: self.resolver.clone(),
            resolve_budget: self.resolve_budget,
            cancel: cancel.clone(),
            events: events.clone(),
        };

        tracing::info!(
            url = %request.url(),
            format = request.format().label(),
            dir = %request.output_dir().display(),
            "download queued"
        );

        let runtime = self.runtime.clone();
        self.runtime.spawn(async move {
            let outcome = match runtime.spawn(worker.run(request)).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "download worker crashed");
                    DownloadOutcome::Failure(DownloadFailure::new(
                        FailureKind::Other,
                        format!("Unexpected internal error: {e}"),
                    ))
                }
            };

            match &outcome {
                DownloadOutcome::Success(path) => {
                    tracing::info!(path = %path.display(), "download finished")
                }
                DownloadOutcome::Failure(failure) => {
                    tracing::warn!(kind = ?failure.kind, "download failed")
                }
            }

            let _ = events.unbounded_send(DownloadEvent::Finished(outcome));
        });

        (CancelHandle(cancel), receiver.boxed())
    }
}

struct Worker {
    extractor: Arc<dyn MediaExtractor>,
    resolver: Arc<dyn StreamResolver>,
    resolve_budget: Duration,
    cancel: CancellationToken,
    events: UnboundedSender<DownloadEvent>,
}

impl Worker {
    async fn run(self, request: DownloadRequest) -> DownloadOutcome {
        let mut target = request.url().clone();

        if classify(&target) == PlatformKind::StreamResolutionRequired {
            if self.cancel.is_cancelled() {
                return DownloadOutcome::Failure(DownloadFailure::cancelled());
            }
            self.status(
                DownloadPhase::Resolving,
                "StreamYard link detected! Extracting the stream URL...",
            );

            let resolving = tokio::time::timeout(
                self.resolve_budget,
                self.resolver.resolve(&target, self.resolve_budget),
            );
            let resolved = tokio::select! {
                result = resolving => result.ok().flatten(),
                _ = self.cancel.cancelled() => {
                    tracing::info!(url = %target, "stream resolution cancelled");
                    return DownloadOutcome::Failure(DownloadFailure::cancelled());
                }
            };

            match resolved {
                Some(url) => {
                    let preview: String = url.as_str().chars().take(60).collect();
                    self.status(
                        DownloadPhase::Resolving,
                        format!("Stream URL extracted: {preview}..."),
                    );
                    target = url;
                }
                None => return DownloadOutcome::Failure(DownloadFailure::resolution_failed()),
            }
        }

        if self.cancel.is_cancelled() {
            return DownloadOutcome::Failure(DownloadFailure::cancelled());
        }

        let format = request.format();
        self.status(
            DownloadPhase::Extracting,
            match format {
                MediaFormat::Video => "Starting MP4 video download...",
                MediaFormat::Audio => "Starting MP3 audio extraction...",
            },
        );

        let job = ExtractionJob {
            url: target,
            output_dir: request.output_dir().to_path_buf(),
            format,
            file_stem: request.file_stem().map(str::to_string),
        };

        let mut tracker = ProgressTracker::default();
        let events = self.events.clone();
        let mut on_progress = move |raw: RawProgress| {
            if let Some(event) = tracker.observe(&raw) {
                let _ = events.unbounded_send(DownloadEvent::Progress(event));
            }
        };

        match self
            .extractor
            .extract(&job, &self.cancel, &mut on_progress)
            .await
        {
            Ok(result) => {
                tracing::info!(title = ?result.title, "extraction complete");
                DownloadOutcome::Success(final_path(result.file_path, format))
            }
            Err(ExtractorError::Cancelled) => DownloadOutcome::Failure(DownloadFailure::cancelled()),
            Err(e) => DownloadOutcome::Failure(classify_failure(&e.to_string())),
        }
    }

    fn status(&self, phase: DownloadPhase, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(?phase, "{message}");
        let _ = self
            .events
            .unbounded_send(DownloadEvent::Status { phase, message });
    }
}

/// Audio is transcoded after download, so the extension on disk changes.
fn final_path(path: PathBuf, format: MediaFormat) -> PathBuf {
    let is_mp3 = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
    match format {
        MediaFormat::Audio if !is_mp3 => path.with_extension("mp3"),
        _ => path,
    }
}
