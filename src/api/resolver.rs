use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;

use super::models::ResolverConfig;
use crate::domain::{normalize, ValidatedUrl};

/// Substrings that mark a URL as a likely media/CDN resource.
const MEDIA_HINTS: &[&str] = &["vod.mp4", "vod-", ".mp4", "cloudfront.net", "akamai", "cdn"];

#[derive(Error, Debug)]
enum ResolveError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("No media URL found on page")]
    NoCandidate,
}

/// Turns an interactive watch page into a directly downloadable media URL.
/// `None` is an ordinary outcome, not a fault.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    async fn resolve(&self, page_url: &ValidatedUrl, budget: Duration) -> Option<ValidatedUrl>;
}

/// Fetches the watch page and scans its markup and embedded JSON for media links.
#[derive(Clone)]
pub struct PageScanResolver {
    config: ResolverConfig,
}

impl PageScanResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    async fn scan(
        &self,
        page_url: &ValidatedUrl,
        budget: Duration,
    ) -> Result<ValidatedUrl, ResolveError> {
        let client = Client::builder()
            .user_agent(&self.config.user_agent)
            .timeout(budget)
            .build()?;

        let html = client
            .get(page_url.as_str())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let candidates = extract_urls(&html);
        tracing::debug!(count = candidates.len(), "scanned watch page");

        pick_media_url(&candidates)
            .and_then(normalize)
            .ok_or(ResolveError::NoCandidate)
    }
}

impl Default for PageScanResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

#[async_trait]
impl StreamResolver for PageScanResolver {
    async fn resolve(&self, page_url: &ValidatedUrl, budget: Duration) -> Option<ValidatedUrl> {
        match self.scan(page_url, budget).await {
            Ok(url) => {
                tracing::info!(page = %page_url, media = %url, "resolved stream");
                Some(url)
            }
            Err(e) => {
                tracing::warn!(page = %page_url, error = %e, "stream resolution failed");
                None
            }
        }
    }
}

fn extract_urls(html: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r#"https?://[^\s"'<>\\)]+"#) else {
        return Vec::new();
    };

    // Undo JSON and HTML escaping so embedded player config yields plain URLs.
    let unescaped = html
        .replace("\\/", "/")
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("&amp;", "&");

    re.find_iter(&unescaped)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// First candidate mentioning `vod`, else the first plausible media link.
fn pick_media_url(candidates: &[String]) -> Option<&str> {
    let matching: Vec<&str> = candidates
        .iter()
        .map(String::as_str)
        .filter(|url| {
            let lower = url.to_ascii_lowercase();
            MEDIA_HINTS.iter().any(|hint| lower.contains(hint))
                && (lower.ends_with(".mp4") || lower.contains("vod"))
        })
        .collect();

    matching
        .iter()
        .find(|url| url.to_ascii_lowercase().contains("vod"))
        .or_else(|| matching.first())
        .copied()
}
