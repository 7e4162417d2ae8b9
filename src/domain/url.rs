use std::fmt;

/// Hosts the downloader is known to work with. Anything else is still
/// accepted, yt-dlp supports far more sites than this.
const KNOWN_PLATFORMS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "m.youtube.com",
    "streamyard.com",
    "vimeo.com",
    "dailymotion.com",
    "twitch.tv",
    "facebook.com",
    "instagram.com",
];

/// Clipboard/autofill corruptions where a truncated host runs straight into a
/// second full URL. Each entry is (corrupted fragment, start of the real URL).
const DUPLICATED_PREFIXES: &[(&str, &str)] = &[
    ("https://www.youtube.cohttps://", "https://www.youtube.com/"),
    ("http://www.youtube.cohttp://", "http://"),
    ("https://youtu.behttps://", "https://"),
    ("http://youtu.behttp://", "http://"),
];

/// A URL that passed [`normalize`]: starts with `http://` or `https://` and
/// carries no control characters. Says nothing about reachability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedUrl(String);

impl ValidatedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased host, or the whole lower-cased URL when it does not parse.
    pub fn host_lowercase(&self) -> String {
        url::Url::parse(&self.0)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
            .unwrap_or_else(|| self.0.to_ascii_lowercase())
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clean up pasted text into a usable URL, or `None` if it is not one.
pub fn normalize(raw: &str) -> Option<ValidatedUrl> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut url: String = trimmed.chars().filter(|c| !c.is_control()).collect();

    for (corrupted, fragment) in DUPLICATED_PREFIXES {
        if let Some(start) = repaired_start(&url, corrupted, fragment) {
            url.replace_range(..start, "");
        }
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return None;
    }

    if !is_known_platform(&url) {
        tracing::warn!(url = %url, "domain may not be supported");
    }

    Some(ValidatedUrl(url))
}

/// Byte offset where the real URL begins, if `corrupted` occurs and the real
/// fragment actually appears again after it.
fn repaired_start(url: &str, corrupted: &str, fragment: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets aligned with `url`.
    let lower = url.to_ascii_lowercase();
    let at = lower.rfind(corrupted)?;
    let search_from = at + 1;
    let offset = lower[search_from..].find(fragment)?;
    Some(search_from + offset)
}

pub fn is_known_platform(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    KNOWN_PLATFORMS.iter().any(|domain| lower.contains(domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> Option<String> {
        normalize(raw).map(|url| url.as_str().to_string())
    }

    #[test]
    fn rejects_empty_and_non_http_input() {
        assert_eq!(norm(""), None);
        assert_eq!(norm("   \t\n"), None);
        assert_eq!(norm("not-a-url"), None);
        assert_eq!(norm("ftp://example.com/video.mp4"), None);
        assert_eq!(norm("www.youtube.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn repairs_duplicated_youtube_prefix() {
        assert_eq!(
            norm("https://www.youtube.cohttps://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
        assert_eq!(
            norm("http://www.youtube.cohttp://www.youtube.com/watch?v=abc").as_deref(),
            Some("http://www.youtube.com/watch?v=abc")
        );
        assert_eq!(
            norm("https://youtu.behttps://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
        assert_eq!(
            norm("http://youtu.behttp://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("http://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn repair_is_case_insensitive() {
        assert_eq!(
            norm("https://WWW.YouTube.cohttps://www.youtube.com/watch?v=x").as_deref(),
            Some("https://www.youtube.com/watch?v=x")
        );
    }

    #[test]
    fn repeated_corruption_is_repaired_in_one_pass() {
        let raw = "https://youtu.behttps://youtu.behttps://youtu.be/dQw4w9WgXcQ";
        assert_eq!(norm(raw).as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
    }

    #[test]
    fn corrupted_fragment_without_second_url_is_left_alone() {
        // Nothing to repair to, the original text survives the prefix check.
        let raw = "https://www.youtube.cohttps://";
        assert_eq!(norm(raw).as_deref(), Some(raw));
    }

    #[test]
    fn strips_whitespace_and_control_characters() {
        assert_eq!(
            norm("  https://www.youtube.com/watch?v=dQw4w9WgXcQ  ").as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
        assert_eq!(
            norm("https://www.youtube.com/watch?v=dQw4w9WgXcQ\n").as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
        assert_eq!(
            norm("https://www.you\ttube.com/watch?v=\r\ndQw4w9WgXcQ").as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn unknown_hosts_are_accepted() {
        assert_eq!(
            norm("https://example.org/some/video").as_deref(),
            Some("https://example.org/some/video")
        );
        assert!(!is_known_platform("https://example.org/some/video"));
        assert!(is_known_platform("https://VIMEO.com/12345"));
    }

    #[test]
    fn normalizing_is_idempotent() {
        let inputs = [
            "https://youtu.be/dQw4w9WgXcQ",
            "  https://www.youtube.cohttps://www.youtube.com/watch?v=dQw4w9WgXcQ\n",
            "https://youtu.behttps://youtu.behttps://youtu.be/x",
            "https://streamyard.com/watch/AbCdEf",
            "http://example.com/?redirect=http://other.example/",
        ];
        for input in inputs {
            let once = normalize(input).unwrap();
            let twice = normalize(once.as_str()).unwrap();
            assert_eq!(once, twice, "input: {input:?}");
        }
        assert_eq!(
            norm("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn host_is_lowercased() {
        let url = normalize("https://StreamYard.com/watch/abc").unwrap();
        assert_eq!(url.host_lowercase(), "streamyard.com");
    }
}
