// components/playlist_downloader/src/source.rs
use crate::error::SourceError;
use crate::types::{FormatSelector, PlaylistItem};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

pub type ChunkStream = BoxStream<'static, Result<Bytes, SourceError>>;

/// Incremental byte source for one media item
pub struct MediaStream {
    /// Declared size, if the source knows it up front
    pub total_bytes: Option<u64>,
    pub chunks: ChunkStream,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("total_bytes", &self.total_bytes)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait PlaylistResolver {
    /// Check if the resolver is available and has all required dependencies
    async fn check_available(&self) -> Result<(), SourceError>;

    /// Fetch the ordered entries of a playlist
    async fn resolve(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>, SourceError>;
}

#[async_trait]
pub trait MediaSource {
    async fn check_available(&self) -> Result<(), SourceError>;

    /// Open a byte stream for one item in the requested format
    async fn open(&self, item_id: &str, selector: &FormatSelector)
        -> Result<MediaStream, SourceError>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod stub {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    pub struct PlaylistStub {
        pub items: Vec<PlaylistItem>,
        pub fail: bool,
    }

    impl PlaylistStub {
        pub fn with_items(items: Vec<PlaylistItem>) -> Self {
            Self { items, fail: false }
        }

        pub fn failing() -> Self {
            Self {
                items: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl PlaylistResolver for PlaylistStub {
        async fn check_available(&self) -> Result<(), SourceError> {
            Ok(())
        }

        async fn resolve(&self, _playlist_id: &str) -> Result<Vec<PlaylistItem>, SourceError> {
            if self.fail {
                return Err(SourceError::process("stub", "playlist is private"));
            }
            Ok(self.items.clone())
        }
    }

    /// How the stub serves one item
    #[derive(Clone, Default)]
    pub struct Script {
        pub chunks: Vec<usize>,
        pub declared: Option<u64>,
        /// Yield an error instead of the chunk at this index
        pub fail_at: Option<usize>,
        /// Wait for a permit after the last chunk before ending the stream
        pub gate: Option<Arc<Semaphore>>,
        /// Never end the stream after the last chunk
        pub hang: bool,
        /// Refuse to open the stream at all
        pub refuse: bool,
    }

    impl Script {
        pub fn chunks(chunks: Vec<usize>) -> Self {
            let total = chunks.iter().sum::<usize>() as u64;
            Self {
                chunks,
                declared: Some(total),
                ..Self::default()
            }
        }

        pub fn undeclared(mut self) -> Self {
            self.declared = None;
            self
        }

        pub fn declared(mut self, total: u64) -> Self {
            self.declared = Some(total);
            self
        }

        pub fn failing_at(mut self, index: usize) -> Self {
            self.fail_at = Some(index);
            self
        }

        pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }

        pub fn hanging(mut self) -> Self {
            self.hang = true;
            self
        }

        pub fn refused() -> Self {
            Self {
                refuse: true,
                ..Self::default()
            }
        }
    }

    struct ActiveGuard(Arc<AtomicUsize>);

    impl Drop for ActiveGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Scripted media source that records which items were opened and how many
    /// streams were alive at once
    #[derive(Default)]
    pub struct SourceStub {
        scripts: HashMap<String, Script>,
        default_script: Script,
        pub opened: Mutex<Vec<String>>,
        pub active: Arc<AtomicUsize>,
        pub max_active: AtomicUsize,
    }

    impl SourceStub {
        pub fn new(default_script: Script) -> Self {
            Self {
                default_script,
                ..Self::default()
            }
        }

        pub fn with_script(mut self, item_id: &str, script: Script) -> Self {
            self.scripts.insert(item_id.to_string(), script);
            self
        }

        pub fn opened(&self) -> Vec<String> {
            self.opened.lock().clone()
        }

        pub fn active(&self) -> usize {
            self.active.load(Ordering::SeqCst)
        }

        pub fn max_active(&self) -> usize {
            self.max_active.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaSource for SourceStub {
        async fn check_available(&self) -> Result<(), SourceError> {
            Ok(())
        }

        async fn open(
            &self,
            item_id: &str,
            _selector: &FormatSelector,
        ) -> Result<MediaStream, SourceError> {
            let script = self
                .scripts
                .get(item_id)
                .cloned()
                .unwrap_or_else(|| self.default_script.clone());
            if script.refuse {
                return Err(SourceError::process("stub", "video unavailable"));
            }

            self.opened.lock().push(item_id.to_string());
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);
            let guard = ActiveGuard(Arc::clone(&self.active));

            let Script {
                chunks,
                declared,
                fail_at,
                gate,
                hang,
                ..
            } = script;

            let chunks = async_stream::stream! {
                let _guard = guard;
                for (index, size) in chunks.into_iter().enumerate() {
                    tokio::task::yield_now().await;
                    if fail_at == Some(index) {
                        yield Err(SourceError::process("stub", "connection reset"));
                        return;
                    }
                    yield Ok(Bytes::from(vec![b'x'; size]));
                }
                if let Some(gate) = gate {
                    if let Ok(permit) = gate.acquire().await {
                        permit.forget();
                    }
                }
                if hang {
                    futures::future::pending::<()>().await;
                }
            };

            Ok(MediaStream {
                total_bytes: declared,
                chunks: Box::pin(chunks),
            })
        }
    }
}
