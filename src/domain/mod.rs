pub mod error;
pub mod model;
pub mod platform;
pub mod url;

pub use error::{DownloadFailure, FailureKind};
pub use model::{DownloadOutcome, DownloadPhase, DownloadRequest, MediaFormat, ProgressEvent};
pub use platform::{classify, PlatformKind};
pub use url::{normalize, ValidatedUrl};
