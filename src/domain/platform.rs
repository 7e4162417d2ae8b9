use super::url::ValidatedUrl;

/// Watch pages on this host are interactive players, not fetchable media.
pub const STREAMING_PLATFORM: &str = "streamyard.com";

/// Substrings showing the URL already points at a media resource.
const DIRECT_MEDIA_MARKERS: &[&str] = &[".m3u8", ".mp4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Standard,
    StreamResolutionRequired,
}

pub fn classify(url: &ValidatedUrl) -> PlatformKind {
    let on_platform = url.host_lowercase().contains(STREAMING_PLATFORM);
    let lower = url.as_str().to_ascii_lowercase();
    let already_direct = DIRECT_MEDIA_MARKERS
        .iter()
        .any(|marker| lower.contains(marker));

    if on_platform && !already_direct {
        PlatformKind::StreamResolutionRequired
    } else {
        PlatformKind::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::url::normalize;

    fn kind(raw: &str) -> PlatformKind {
        classify(&normalize(raw).unwrap())
    }

    #[test]
    fn streaming_watch_page_needs_resolution() {
        assert_eq!(
            kind("https://streamyard.com/watch/x7Ab9QpZ"),
            PlatformKind::StreamResolutionRequired
        );
        assert_eq!(
            kind("https://StreamYard.com/watch/x7Ab9QpZ"),
            PlatformKind::StreamResolutionRequired
        );
    }

    #[test]
    fn direct_media_links_are_standard() {
        assert_eq!(
            kind("https://streamyard.com/watch/x7Ab9QpZ/VOD.mp4"),
            PlatformKind::Standard
        );
        assert_eq!(
            kind("https://streamyard.com/hls/x7Ab9QpZ/index.M3U8"),
            PlatformKind::Standard
        );
    }

    #[test]
    fn other_hosts_are_standard() {
        assert_eq!(
            kind("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            PlatformKind::Standard
        );
        // Only the host counts, not a mention in the query.
        assert_eq!(
            kind("https://example.com/?ref=streamyard.com"),
            PlatformKind::Standard
        );
    }
}
