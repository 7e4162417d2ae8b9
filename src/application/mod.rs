pub mod download_coordinator;
pub mod failure;
pub mod progress;

pub use download_coordinator::{CancelHandle, DownloadCoordinator, DownloadEvent};
