use crate::domain::{DownloadFailure, FailureKind};

struct FailureRule {
    kind: FailureKind,
    phrases: &'static [&'static str],
    advice: &'static str,
}

/// Evaluated in order against the lower-cased error text; first match wins.
/// Best effort only: extractor wording changes between releases.
const RULES: &[FailureRule] = &[
    FailureRule {
        kind: FailureKind::BotDetection,
        phrases: &["not a bot", "sign in to confirm", "captcha", "bot detection"],
        advice: "The site asked to confirm you are not a bot.\n\n\
                 Try:\n\
                 1. Wait a few minutes and try again\n\
                 2. Update yt-dlp to the latest version\n\
                 3. Open the video in a browser once, then retry",
    },
    FailureRule {
        kind: FailureKind::Unavailable,
        phrases: &[
            "private video",
            "video unavailable",
            "video is not available",
            "not available in your country",
            "made this video available in your country",
            "has been removed",
            "members-only",
            "this video is private",
        ],
        advice: "The video is private, removed or not available in your region.\n\n\
                 Check that the link opens in a browser without signing in.",
    },
    FailureRule {
        kind: FailureKind::Network,
        phrases: &[
            "timed out",
            "timeout",
            "connection refused",
            "connection reset",
            "network is unreachable",
            "name or service not known",
            "temporary failure in name resolution",
            "getaddrinfo failed",
            "failed to resolve",
        ],
        advice: "Network problem while downloading.\n\n\
                 Check your internet connection and try again.",
    },
    FailureRule {
        kind: FailureKind::Forbidden,
        phrases: &["http error 403", "403: forbidden", "forbidden"],
        advice: "Access denied by the server (HTTP 403).\n\n\
                 Try:\n\
                 1. Update yt-dlp to the latest version\n\
                 2. Wait a moment and try again",
    },
    FailureRule {
        kind: FailureKind::RateLimited,
        phrases: &["http error 429", "too many requests"],
        advice: "Too many requests (HTTP 429). The site is rate limiting you.\n\n\
                 Wait several minutes before trying again.",
    },
];

/// Turn raw extractor error text into a failure with remediation advice.
/// The raw text is always kept for diagnosis.
pub fn classify_failure(error_text: &str) -> DownloadFailure {
    let details = error_text.trim();
    let lower = details.to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.phrases.iter().any(|phrase| lower.contains(phrase)))
        .map(|rule| DownloadFailure::new(rule.kind, format!("{}\n\nDetails: {details}", rule.advice)))
        .unwrap_or_else(|| {
            DownloadFailure::new(
                FailureKind::Other,
                format!("Error during download:\n{details}"),
            )
        })
}
