use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api::{ExtractorConfig, ResolverConfig};

/// Application settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub extractor: ExtractorConfig,
    pub resolver: ResolverConfig,
    pub default_output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            resolver: ResolverConfig::default(),
            default_output_dir: default_output_dir(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(program) = get("SVD_YT_DLP") {
            config.extractor.program = PathBuf::from(program);
        }
        if let Some(ffmpeg) = get("SVD_FFMPEG") {
            config.extractor.ffmpeg_location = Some(PathBuf::from(ffmpeg));
        }
        if let Some(retries) = parse_number(&get, "SVD_RETRIES") {
            config.extractor.retries = retries;
        }
        if let Some(retries) = parse_number(&get, "SVD_FRAGMENT_RETRIES") {
            config.extractor.fragment_retries = retries;
        }
        if let Some(secs) = parse_number(&get, "SVD_SOCKET_TIMEOUT") {
            config.extractor.socket_timeout_secs = secs;
        }
        if let Some(secs) = parse_number::<u64>(&get, "SVD_RESOLVE_TIMEOUT") {
            config.resolver.timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = get("SVD_OUTPUT_DIR") {
            config.default_output_dir = PathBuf::from(dir);
        }

        config
    }
}

fn parse_number<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring invalid number, using default");
            None
        }
    }
}

fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.extractor.program, PathBuf::from("yt-dlp"));
        assert_eq!(config.extractor.ffmpeg_location, None);
        assert_eq!(config.extractor.retries, 10);
        assert_eq!(config.extractor.fragment_retries, 10);
        assert_eq!(config.extractor.socket_timeout_secs, 30);
        assert_eq!(config.resolver.timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("SVD_YT_DLP", "/opt/bin/yt-dlp"),
            ("SVD_FFMPEG", "/opt/ffmpeg"),
            ("SVD_RETRIES", "3"),
            ("SVD_FRAGMENT_RETRIES", " 5 "),
            ("SVD_SOCKET_TIMEOUT", "12"),
            ("SVD_RESOLVE_TIMEOUT", "45"),
            ("SVD_OUTPUT_DIR", "/tmp/videos"),
        ]);
        assert_eq!(config.extractor.program, PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(config.extractor.ffmpeg_location, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(config.extractor.retries, 3);
        assert_eq!(config.extractor.fragment_retries, 5);
        assert_eq!(config.extractor.socket_timeout_secs, 12);
        assert_eq!(config.resolver.timeout, Duration::from_secs(45));
        assert_eq!(config.default_output_dir, PathBuf::from("/tmp/videos"));
    }

    #[test]
    fn invalid_or_blank_values_keep_defaults() {
        let config = config_from(&[
            ("SVD_RETRIES", "many"),
            ("SVD_RESOLVE_TIMEOUT", "-1"),
            ("SVD_YT_DLP", "   "),
        ]);
        assert_eq!(config.extractor.retries, 10);
        assert_eq!(config.resolver.timeout, Duration::from_secs(30));
        assert_eq!(config.extractor.program, PathBuf::from("yt-dlp"));
    }
}
