// components/playlist_downloader/src/task.rs
use crate::error::{DownloadError, SourceError};
use crate::progress::{ProgressBoard, ProgressTracker, RowHandle};
use crate::source::MediaSource;
use crate::storage::Storage;
use crate::types::{FormatSelector, PlaylistItem};
use crate::utils::media_filename;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Active,
    Succeeded,
    Failed,
}

/// Everything a task needs besides its own item
pub struct TaskContext<'a> {
    pub source: &'a (dyn MediaSource + Send + Sync),
    pub storage: &'a (dyn Storage + Send + Sync),
    pub board: &'a ProgressBoard,
    pub selector: FormatSelector,
    pub stall_timeout: Option<Duration>,
}

/// Streams one playlist item into storage, reporting progress on every chunk.
///
/// Only the worker running the task mutates it.
#[derive(Debug)]
pub struct DownloadTask {
    item: PlaylistItem,
    state: TaskState,
    bytes_read: u64,
    total_bytes: Option<u64>,
    tracker: ProgressTracker,
    row: Option<RowHandle>,
}

impl DownloadTask {
    pub fn new(item: PlaylistItem) -> Self {
        let tracker = ProgressTracker::new(&item.title);
        Self {
            item,
            state: TaskState::Pending,
            bytes_read: 0,
            total_bytes: None,
            tracker,
            row: None,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Destination file for this item inside `destination_dir`
    pub fn destination(&self, destination_dir: &Path, selector: &FormatSelector) -> PathBuf {
        destination_dir.join(media_filename(
            &self.item.title,
            &self.item.id,
            selector.extension(),
        ))
    }

    /// Move from Pending to Active and put the tracker on the board
    pub fn activate(&mut self, board: &ProgressBoard) {
        if self.state != TaskState::Pending {
            return;
        }
        self.state = TaskState::Active;
        self.row = Some(board.register(&self.tracker));
    }

    /// Account for one received chunk.
    ///
    /// A declared total smaller than what actually arrived is raised to the
    /// bytes read, so `bytes_read <= total_bytes` always holds.
    pub fn record_chunk(&mut self, len: u64) {
        self.bytes_read = self.bytes_read.saturating_add(len);
        if let Some(total) = self.total_bytes {
            if self.bytes_read > total {
                self.total_bytes = Some(self.bytes_read);
            }
        }
        self.tracker.update(self.bytes_read, self.total_bytes);
    }

    fn publish(&self, board: &ProgressBoard) {
        if let Some(row) = self.row {
            board.publish(row, &self.tracker);
        }
    }

    /// Download the item into `destination_dir`, returning the written path.
    ///
    /// Failures are not retried and any partially written file is left in place.
    pub async fn execute(
        &mut self,
        ctx: &TaskContext<'_>,
        destination_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        self.activate(ctx.board);
        let path = self.destination(destination_dir, &ctx.selector);
        tracing::info!("Downloading '{}' to {}", self.item.title, path.display());

        match self.transfer(ctx, &path).await {
            Ok(()) => {
                self.state = TaskState::Succeeded;
                self.tracker.set_terminal(true);
                self.publish(ctx.board);
                tracing::info!(
                    "Finished '{}' ({} bytes)",
                    self.item.title,
                    self.bytes_read
                );
                Ok(path)
            }
            Err(error) => {
                self.state = TaskState::Failed;
                self.tracker.set_terminal(false);
                self.publish(ctx.board);
                let cause = std::error::Error::source(&error)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                tracing::error!("Error downloading '{}': {} {}", self.item.title, error, cause);
                Err(error)
            }
        }
    }

    async fn transfer(&mut self, ctx: &TaskContext<'_>, path: &Path) -> Result<(), DownloadError> {
        let stream = ctx
            .source
            .open(&self.item.id, &ctx.selector)
            .await
            .map_err(|source| self.retrieval_error(source))?;

        self.total_bytes = stream.total_bytes;
        self.tracker.update(self.bytes_read, self.total_bytes);
        self.publish(ctx.board);

        let mut sink = ctx
            .storage
            .create(path)
            .await
            .map_err(|source| self.storage_error(path, source))?;
        let mut chunks = stream.chunks;

        loop {
            let next = match ctx.stall_timeout {
                Some(timeout) => tokio::time::timeout(timeout, chunks.next())
                    .await
                    .map_err(|_| DownloadError::Stalled {
                        item_id: self.item.id.clone(),
                        timeout,
                    })?,
                None => chunks.next().await,
            };
            let Some(chunk) = next else {
                break;
            };

            let chunk = chunk.map_err(|source| self.retrieval_error(source))?;
            sink.write_chunk(&chunk)
                .await
                .map_err(|source| self.storage_error(path, source))?;
            self.record_chunk(chunk.len() as u64);
            self.publish(ctx.board);
        }

        sink.finish()
            .await
            .map_err(|source| self.storage_error(path, source))
    }

    fn retrieval_error(&self, source: SourceError) -> DownloadError {
        DownloadError::Retrieval {
            item_id: self.item.id.clone(),
            title: self.item.title.clone(),
            source,
        }
    }

    fn storage_error(&self, path: &Path, source: std::io::Error) -> DownloadError {
        DownloadError::Storage {
            item_id: self.item.id.clone(),
            path: path.to_path_buf(),
            source,
        }
    }
}
