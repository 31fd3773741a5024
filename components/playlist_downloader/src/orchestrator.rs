// components/playlist_downloader/src/orchestrator.rs
use crate::config::Config;
use crate::error::{DownloadError, Error, Result};
use crate::progress::ProgressBoard;
use crate::source::MediaSource;
use crate::storage::Storage;
use crate::task::{DownloadTask, TaskContext};
use crate::types::{FormatSelector, PlaylistItem};
use futures::{future, stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one run over a playlist
#[derive(Debug)]
pub struct RunResult {
    pub succeeded: u64,
    pub failed: u64,
    /// Items never started because a failure had already been observed
    pub skipped: u64,
    pub destination: PathBuf,
    pub first_error: Option<DownloadError>,
}

impl RunResult {
    fn new(destination: &Path) -> Self {
        Self {
            succeeded: 0,
            failed: 0,
            skipped: 0,
            destination: destination.to_path_buf(),
            first_error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.first_error.is_none()
    }

    /// Number of files written, or the first task failure
    pub fn into_result(self) -> Result<u64> {
        match self.first_error {
            None => Ok(self.succeeded),
            Some(error) => Err(Error::Download(error)),
        }
    }
}

/// Runs download tasks on a bounded pool.
///
/// At most `concurrency` tasks are active at once. After the first failure no
/// further items are admitted, but tasks already running finish normally.
pub struct Orchestrator {
    source: Arc<dyn MediaSource + Send + Sync>,
    storage: Arc<dyn Storage + Send + Sync>,
    board: Arc<ProgressBoard>,
    selector: FormatSelector,
    stall_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn MediaSource + Send + Sync>,
        storage: Arc<dyn Storage + Send + Sync>,
        board: Arc<ProgressBoard>,
    ) -> Self {
        Self {
            source,
            storage,
            board,
            selector: FormatSelector::default(),
            stall_timeout: None,
        }
    }

    pub fn from_config(
        config: &Config,
        source: Arc<dyn MediaSource + Send + Sync>,
        storage: Arc<dyn Storage + Send + Sync>,
        board: Arc<ProgressBoard>,
    ) -> Self {
        Self::new(source, storage, board)
            .with_selector(config.selector)
            .with_stall_timeout(config.stall_timeout)
    }

    pub fn with_selector(mut self, selector: FormatSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout = timeout;
        self
    }

    pub fn board(&self) -> &ProgressBoard {
        &self.board
    }

    pub async fn run(
        &self,
        items: Vec<PlaylistItem>,
        concurrency: usize,
        destination: &Path,
    ) -> Result<RunResult> {
        if concurrency == 0 {
            return Err(Error::configuration("concurrency must be at least 1"));
        }

        let total = items.len() as u64;
        tracing::info!(
            "Downloading {} items to {} with {} workers",
            total,
            destination.display(),
            concurrency
        );

        let ctx = TaskContext {
            source: self.source.as_ref(),
            storage: self.storage.as_ref(),
            board: &self.board,
            selector: self.selector,
            stall_timeout: self.stall_timeout,
        };
        let failure_seen = AtomicBool::new(false);
        let mut result = RunResult::new(destination);

        // Items are pulled one at a time as slots free up, so the flag is
        // checked at admission.
        let mut outcomes = stream::iter(items)
            .take_while(|_| future::ready(!failure_seen.load(Ordering::SeqCst)))
            .map(|item| {
                let ctx = &ctx;
                async move {
                    let mut task = DownloadTask::new(item);
                    task.execute(ctx, destination).await
                }
            })
            .buffer_unordered(concurrency);

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(_) => result.succeeded += 1,
                Err(error) => {
                    result.failed += 1;
                    if result.first_error.is_none() {
                        failure_seen.store(true, Ordering::SeqCst);
                        tracing::warn!(
                            "Item {} failed, no further items will be started",
                            error.item_id()
                        );
                        result.first_error = Some(error);
                    }
                }
            }
            self.board.render();
        }

        result.skipped = total - result.succeeded - result.failed;
        tracing::info!(
            "Run finished: {} succeeded, {} failed, {} skipped",
            result.succeeded,
            result.failed,
            result.skipped
        );
        Ok(result)
    }
}
