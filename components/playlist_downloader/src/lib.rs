// components/playlist_downloader/src/lib.rs
mod config;
mod error;
mod orchestrator;
mod progress;
mod source;
mod storage;
mod task;
mod types;
mod utils;
mod ytdlp;

use std::sync::Arc;

pub use config::{playlist_id, Config, DEFAULT_CONCURRENCY};
pub use error::{DownloadError, Error, Result, SourceError};
pub use orchestrator::{Orchestrator, RunResult};
pub use progress::{Phase, ProgressBoard, ProgressTracker, RowHandle};
pub use source::{ChunkStream, MediaSource, MediaStream, PlaylistResolver};
pub use storage::{FileStorage, Sink, Storage};
pub use task::{DownloadTask, TaskContext, TaskState};
pub use types::{FormatSelector, MediaFilter, MediaQuality, PlaylistItem};
pub use utils::{format_size, sanitize_filename};
pub use ytdlp::YtDlp;

/// Scripted collaborators for exercising a downloader without yt-dlp
#[cfg(any(test, feature = "test-utils"))]
pub mod stub {
    pub use crate::source::stub::{PlaylistStub, Script, SourceStub};
    pub use crate::storage::stub::FullDisk;
}

/// Resolves a playlist and downloads its items into the configured directory
pub struct PlaylistDownloader {
    config: Config,
    resolver: Arc<dyn PlaylistResolver + Send + Sync>,
    orchestrator: Orchestrator,
}

impl PlaylistDownloader {
    /// Create a downloader backed by yt-dlp, writing to the local filesystem
    pub async fn new(config: Config, board: Arc<ProgressBoard>) -> Result<Self> {
        let ytdlp = Arc::new(YtDlp);
        Self::new_with_backend(config, ytdlp.clone(), ytdlp, Arc::new(FileStorage), board).await
    }

    /// Create a downloader with specific collaborator implementations
    pub async fn new_with_backend(
        config: Config,
        resolver: Arc<dyn PlaylistResolver + Send + Sync>,
        source: Arc<dyn MediaSource + Send + Sync>,
        storage: Arc<dyn Storage + Send + Sync>,
        board: Arc<ProgressBoard>,
    ) -> Result<Self> {
        resolver
            .check_available()
            .await
            .map_err(Error::Unavailable)?;
        source.check_available().await.map_err(Error::Unavailable)?;

        let orchestrator = Orchestrator::from_config(&config, source, storage, board);
        Ok(Self {
            config,
            resolver,
            orchestrator,
        })
    }

    pub fn board(&self) -> &ProgressBoard {
        self.orchestrator.board()
    }

    /// Fetch the playlist entries, in playlist order
    pub async fn resolve(&self) -> Result<Vec<PlaylistItem>> {
        let playlist_id = &self.config.playlist_id;
        tracing::info!("Resolving playlist {}", playlist_id);
        self.resolver
            .resolve(playlist_id)
            .await
            .map_err(|source| Error::PlaylistResolution {
                playlist_id: playlist_id.clone(),
                source,
            })
    }

    /// Download `items` with the configured concurrency
    pub async fn download(&self, items: Vec<PlaylistItem>) -> Result<RunResult> {
        let result = self
            .orchestrator
            .run(items, self.config.concurrency, &self.config.destination)
            .await;
        self.board().finish();
        result
    }
}
