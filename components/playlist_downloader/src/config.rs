// components/playlist_downloader/src/config.rs
use crate::error::{Error, Result};
use crate::types::FormatSelector;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 5;

static PLAYLIST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(music\.)?youtube\.com/playlist\?list=([a-zA-Z0-9_-]+)")
        .expect("playlist url pattern is valid")
});

/// Extract the playlist id from a playlist URL.
///
/// The URL must start with `http` and look like
/// `https://(www.|music.)youtube.com/playlist?list=<id>`.
pub fn playlist_id(url: &str) -> Option<&str> {
    if !url.starts_with("http") {
        return None;
    }
    PLAYLIST_URL
        .captures(url)
        .and_then(|captures| captures.get(4))
        .map(|id| id.as_str())
}

/// Run configuration, built once at startup and passed down by reference
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub playlist_id: String,
    pub concurrency: usize,
    pub selector: FormatSelector,
    pub destination: PathBuf,
    /// Fail a task when no chunk arrives within this bound
    pub stall_timeout: Option<Duration>,
}

impl Config {
    pub fn new(
        url: impl Into<String>,
        concurrency: i64,
        selector: FormatSelector,
        destination: impl Into<PathBuf>,
    ) -> Result<Self> {
        let url = url.into();
        let playlist_id = playlist_id(&url)
            .ok_or_else(|| Error::configuration(format!("unknown URL format: {url}")))?
            .to_string();
        let concurrency = validate_concurrency(concurrency)?;

        Ok(Self {
            url,
            playlist_id,
            concurrency,
            selector,
            destination: destination.into(),
            stall_timeout: None,
        })
    }

    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout = timeout;
        self
    }
}

pub(crate) fn validate_concurrency(concurrency: i64) -> Result<usize> {
    if concurrency < 1 {
        return Err(Error::configuration(format!(
            "concurrency must be at least 1, got {concurrency}"
        )));
    }
    usize::try_from(concurrency)
        .map_err(|_| Error::configuration(format!("concurrency {concurrency} is too large")))
}
