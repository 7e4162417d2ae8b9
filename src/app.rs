use crate::application::{CancelHandle, DownloadCoordinator, DownloadEvent};
use crate::domain::DownloadRequest;
use crate::ui::{DownloadMessage, DownloadView};
use futures::StreamExt;
use iced::Task;
use std::path::PathBuf;

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    // Present only while a run is in flight
    cancel: Option<CancelHandle>,
}

impl DownloadApp {
    pub fn new(coordinator: DownloadCoordinator, output_dir: PathBuf) -> Self {
        Self {
            view: DownloadView::new(output_dir.display().to_string()),
            coordinator,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    FolderSelected(Option<PathBuf>),
    /// Status, progress and the final outcome from the background worker
    Download(DownloadEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::BrowsePressed => {
                    let start_dir = PathBuf::from(app.view.output_dir.trim());
                    return Task::perform(
                        async move {
                            rfd::AsyncFileDialog::new()
                                .set_title("Select destination folder")
                                .set_directory(start_dir)
                                .pick_folder()
                                .await
                                .map(|handle| handle.path().to_path_buf())
                        },
                        Message::FolderSelected,
                    );
                }
                DownloadMessage::DownloadPressed => return start_download(app),
                DownloadMessage::CancelPressed => {
                    if let Some(cancel) = &app.cancel {
                        cancel.cancel();
                        app.view.status_message = "Cancelling...".to_string();
                    }
                }
                _ => {}
            }
        }
        Message::FolderSelected(Some(path)) => {
            app.view.output_dir = path.display().to_string();
            app.view
                .push_log(format!("Destination folder changed to: {}", path.display()));
        }
        Message::FolderSelected(None) => {
            // User cancelled dialog
        }
        Message::Download(event) => {
            if matches!(event, DownloadEvent::Finished(_)) {
                app.cancel = None;
            }
            app.view.record_event(event);
        }
    }
    Task::none()
}

fn start_download(app: &mut DownloadApp) -> Task<Message> {
    if app.view.is_downloading {
        return Task::none();
    }

    let custom_name = app.view.file_name.trim();
    let request = DownloadRequest::new(
        &app.view.url,
        app.view.output_dir.trim(),
        app.view.format,
        (!custom_name.is_empty()).then_some(custom_name),
    );

    match request {
        Ok(request) => {
            app.view.begin_download(request.url().as_str());
            let (cancel, events) = app.coordinator.start(request);
            app.cancel = Some(cancel);
            Task::stream(events.map(Message::Download))
        }
        Err(e) => {
            app.view.status_message = e.to_string();
            app.view.push_log(format!("Warning: {e}"));
            Task::none()
        }
    }
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
