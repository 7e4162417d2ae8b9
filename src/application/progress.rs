use crate::api::RawProgress;
use crate::domain::ProgressEvent;

/// Map one extractor progress record to a UI event.
///
/// Only `downloading` and `finished` records produce events. `finished`
/// means the raw stream is on disk; post-processing (merging, transcoding)
/// may still run without further updates, hence the "processing" line.
pub fn report(raw: &RawProgress) -> Option<ProgressEvent> {
    match raw.status.as_str() {
        "downloading" => {
            let speed = format_speed(raw.speed);
            let eta = format_eta(raw.eta);
            let event = match percent(raw) {
                Some(percent) => ProgressEvent {
                    percent,
                    status: format!("Downloading: {percent}% | Speed: {speed} | ETA: {eta}"),
                },
                None => ProgressEvent {
                    percent: 0,
                    status: format!("Downloading... | Speed: {speed} | ETA: {eta}"),
                },
            };
            Some(event)
        }
        "finished" => Some(ProgressEvent {
            percent: 100,
            status: "Download complete! Processing file...".to_string(),
        }),
        _ => None,
    }
}

/// `None` when neither a total nor an estimate is known.
fn percent(raw: &RawProgress) -> Option<u8> {
    let downloaded = raw.downloaded_bytes?;
    let total = raw
        .total_bytes
        .filter(|total| *total > 0.0)
        .or_else(|| raw.total_bytes_estimate.filter(|total| *total > 0.0))?;

    let ratio = (downloaded / total * 100.0).clamp(0.0, 100.0);
    Some(ratio as u8)
}

fn format_speed(speed: Option<f64>) -> String {
    match speed {
        Some(bytes_per_sec) if bytes_per_sec > 0.0 => {
            format!("{:.2} MB/s", bytes_per_sec / 1024.0 / 1024.0)
        }
        _ => "N/A".to_string(),
    }
}

fn format_eta(eta: Option<f64>) -> String {
    match eta {
        Some(secs) if secs > 0.0 => format!("{}s", secs.round() as u64),
        _ => "N/A".to_string(),
    }
}

/// Keeps reported percent from going backwards within one request. Merged
/// video downloads fetch two streams and the raw percentage restarts.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    high_water: u8,
}

impl ProgressTracker {
    pub fn observe(&mut self, raw: &RawProgress) -> Option<ProgressEvent> {
        let mut event = report(raw)?;
        event.percent = event.percent.max(self.high_water);
        self.high_water = event.percent;
        Some(event)
    }
}
