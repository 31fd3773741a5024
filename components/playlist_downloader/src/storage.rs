// components/playlist_downloader/src/storage.rs
use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Destination for a downloaded byte stream
#[async_trait]
pub trait Storage {
    async fn create(&self, path: &Path) -> io::Result<Box<dyn Sink + Send>>;
}

#[async_trait]
pub trait Sink {
    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Flush everything written so far to durable storage
    async fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Writes straight to the local filesystem
pub struct FileStorage;

#[async_trait]
impl Storage for FileStorage {
    async fn create(&self, path: &Path) -> io::Result<Box<dyn Sink + Send>> {
        let file = File::create(path).await?;
        Ok(Box::new(FileSink {
            writer: BufWriter::new(file),
        }))
    }
}

struct FileSink {
    writer: BufWriter<File>,
}

#[async_trait]
impl Sink for FileSink {
    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.writer.write_all(chunk).await
    }

    async fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.writer.flush().await?;
        self.writer.get_ref().sync_all().await
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod stub {
    use super::*;

    /// Storage whose sinks reject every write
    pub struct FullDisk;

    #[async_trait]
    impl Storage for FullDisk {
        async fn create(&self, _path: &Path) -> io::Result<Box<dyn Sink + Send>> {
            Ok(Box::new(FullDiskSink))
        }
    }

    struct FullDiskSink;

    #[async_trait]
    impl Sink for FullDiskSink {
        async fn write_chunk(&mut self, _chunk: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
        }

        async fn finish(self: Box<Self>) -> io::Result<()> {
            Ok(())
        }
    }
}
