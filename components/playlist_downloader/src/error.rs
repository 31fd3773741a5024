// components/playlist_downloader/src/error.rs
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by one of the external collaborators (yt-dlp, the stubs).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("{command} failed: {stderr}")]
    Process { command: String, stderr: String },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn process(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        SourceError::Process {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

/// Failure of a single download task. Never aborts other tasks.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to download '{title}' ({item_id})")]
    Retrieval {
        item_id: String,
        title: String,
        #[source]
        source: SourceError,
    },

    #[error("failed to write {} for item {item_id}", path.display())]
    Storage {
        item_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data received for item {item_id} within {timeout:?}")]
    Stalled { item_id: String, timeout: Duration },
}

impl DownloadError {
    pub fn item_id(&self) -> &str {
        match self {
            DownloadError::Retrieval { item_id, .. }
            | DownloadError::Storage { item_id, .. }
            | DownloadError::Stalled { item_id, .. } => item_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("failed to resolve playlist {playlist_id}")]
    PlaylistResolution {
        playlist_id: String,
        #[source]
        source: SourceError,
    },

    #[error("download backend unavailable")]
    Unavailable(#[source] SourceError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl Error {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Error::Configuration(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_is_available_for_every_task_failure() {
        let retrieval = DownloadError::Retrieval {
            item_id: "abc".to_string(),
            title: "Song".to_string(),
            source: SourceError::process("yt-dlp", "boom"),
        };
        let stalled = DownloadError::Stalled {
            item_id: "def".to_string(),
            timeout: Duration::from_secs(3),
        };

        assert_eq!(retrieval.item_id(), "abc");
        assert_eq!(stalled.item_id(), "def");
    }

    #[test]
    fn retrieval_error_names_the_title() {
        let error = DownloadError::Retrieval {
            item_id: "abc".to_string(),
            title: "Song".to_string(),
            source: SourceError::process("yt-dlp", "boom"),
        };
        assert_eq!(error.to_string(), "failed to download 'Song' (abc)");
    }
}
