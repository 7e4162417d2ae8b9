pub mod models;
pub mod resolver;
pub mod ytdlp;

pub use models::{ExtractionJob, ExtractorConfig, RawProgress, ResolverConfig};
pub use resolver::{PageScanResolver, StreamResolver};
pub use ytdlp::{ExtractorError, MediaExtractor, YtDlpExtractor};
