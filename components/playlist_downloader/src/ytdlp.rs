// components/playlist_downloader/src/ytdlp.rs
use crate::error::SourceError;
use crate::source::{ChunkStream, MediaSource, MediaStream, PlaylistResolver};
use crate::types::{FormatSelector, PlaylistItem};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;

const BINARY: &str = "yt-dlp";

/// Playlist resolution and media retrieval backed by the `yt-dlp` executable
pub struct YtDlp;

fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={playlist_id}")
}

fn video_url(item_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={item_id}")
}

fn format_args(selector: &FormatSelector) -> Vec<String> {
    let mut args = vec!["--format".to_string(), selector.format_spec()];
    if let Some(key) = selector.sort_key() {
        args.push("--format-sort".to_string());
        args.push(key.to_string());
    }
    args
}

/// Read stderr alongside stdout so a chatty process never blocks on a full pipe
fn drain_stderr(stderr: Option<ChildStderr>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut captured = Vec::new();
        if let Some(mut stderr) = stderr {
            if let Err(e) = stderr.read_to_end(&mut captured).await {
                tracing::debug!("Failed to read {} stderr: {}", BINARY, e);
            }
        }
        String::from_utf8_lossy(&captured).trim().to_string()
    })
}

/// Stream the stdout of a spawned process, failing with its stderr when it
/// exits unsuccessfully
fn stdout_chunks(mut child: Child) -> Result<ChunkStream, SourceError> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SourceError::process(BINARY, "stdout was not captured"))?;
    let stderr = drain_stderr(child.stderr.take());

    let chunks = async_stream::stream! {
        let mut reader = ReaderStream::new(stdout);
        while let Some(chunk) = reader.next().await {
            match chunk {
                Ok(bytes) => {
                    yield Ok(bytes);
                }
                Err(e) => {
                    yield Err(SourceError::Io(e));
                    return;
                }
            }
        }
        match child.wait().await {
            Ok(status) if status.success() => {}
            Ok(_) => {
                let stderr = stderr.await.unwrap_or_default();
                yield Err(SourceError::process(BINARY, stderr));
            }
            Err(e) => {
                yield Err(SourceError::Io(e));
            }
        }
    };
    Ok(Box::pin(chunks))
}

fn check_binary() -> Result<(), SourceError> {
    which::which(BINARY)
        .map(|_| ())
        .map_err(|_| SourceError::DependencyNotFound(BINARY))
}

impl YtDlp {
    /// Size of the selected format as reported by yt-dlp, if it knows one
    async fn declared_size(
        &self,
        url: &str,
        selector: &FormatSelector,
    ) -> Result<Option<u64>, SourceError> {
        let output = Command::new(BINARY)
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-warnings")
            .args(format_args(selector))
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            return Err(SourceError::process(
                BINARY,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        let meta: YtDlpFormat = serde_json::from_slice(&output.stdout)
            .map_err(|e| SourceError::InvalidMetadata(e.to_string()))?;
        Ok(meta.size())
    }
}

#[async_trait]
impl PlaylistResolver for YtDlp {
    async fn check_available(&self) -> Result<(), SourceError> {
        check_binary()
    }

    async fn resolve(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>, SourceError> {
        let output = Command::new(BINARY)
            .arg("--flat-playlist")
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .arg(playlist_url(playlist_id))
            .output()
            .await?;

        if !output.status.success() {
            return Err(SourceError::process(
                BINARY,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        let playlist: YtDlpPlaylist = serde_json::from_slice(&output.stdout)
            .map_err(|e| SourceError::InvalidMetadata(e.to_string()))?;
        tracing::debug!(
            "Playlist {} has {} entries",
            playlist_id,
            playlist.entries.len()
        );

        Ok(playlist.into_items())
    }
}

#[async_trait]
impl MediaSource for YtDlp {
    async fn check_available(&self) -> Result<(), SourceError> {
        check_binary()
    }

    async fn open(
        &self,
        item_id: &str,
        selector: &FormatSelector,
    ) -> Result<MediaStream, SourceError> {
        let url = video_url(item_id);
        let total_bytes = self.declared_size(&url, selector).await?;
        tracing::debug!("Opening {} ({:?} bytes declared)", url, total_bytes);

        let child = Command::new(BINARY)
            .args(format_args(selector))
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("--no-part")
            .arg("--output")
            .arg("-")
            .arg(&url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        Ok(MediaStream {
            total_bytes,
            chunks: stdout_chunks(child)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpPlaylist {
    #[serde(default)]
    entries: Vec<YtDlpEntry>,
}

#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    id: String,
    title: Option<String>,
}

impl YtDlpPlaylist {
    fn into_items(self) -> Vec<PlaylistItem> {
        self.entries
            .into_iter()
            .map(|entry| {
                let title = entry.title.unwrap_or_else(|| entry.id.clone());
                PlaylistItem::new(entry.id, title)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
}

impl YtDlpFormat {
    fn size(&self) -> Option<u64> {
        self.filesize
            .or(self.filesize_approx)
            .filter(|size| *size > 0.0)
            .map(|size| size.round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MediaFilter, MediaQuality};
    use assert_matches::assert_matches;

    #[test]
    fn playlist_json_keeps_entry_order() {
        let json = r#"{
            "id": "PLabc",
            "title": "Mix",
            "entries": [
                {"id": "aaa", "title": "First"},
                {"id": "bbb", "title": null},
                {"id": "ccc", "title": "Third"}
            ]
        }"#;
        let playlist: YtDlpPlaylist = serde_json::from_str(json).unwrap();

        assert_eq!(
            playlist.into_items(),
            vec![
                PlaylistItem::new("aaa", "First"),
                PlaylistItem::new("bbb", "bbb"),
                PlaylistItem::new("ccc", "Third"),
            ]
        );
    }

    #[test]
    fn playlist_without_entries_is_empty() {
        let playlist: YtDlpPlaylist = serde_json::from_str(r#"{"id": "PLabc"}"#).unwrap();
        assert!(playlist.into_items().is_empty());
    }

    #[test]
    fn exact_size_wins_over_estimate() {
        let meta: YtDlpFormat =
            serde_json::from_str(r#"{"filesize": 1200, "filesize_approx": 1000}"#).unwrap();
        assert_eq!(meta.size(), Some(1200));

        let meta: YtDlpFormat =
            serde_json::from_str(r#"{"filesize": null, "filesize_approx": 1000.4}"#).unwrap();
        assert_eq!(meta.size(), Some(1000));

        let meta: YtDlpFormat = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(meta.size(), None);
    }

    #[cfg(unix)]
    fn shell(script: &str) -> Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn large_stderr_does_not_block_stdout() {
        let child = shell("yes error | head -c 200000 >&2; printf hello");
        let chunks = stdout_chunks(child).unwrap();

        let collected: Vec<_> =
            tokio::time::timeout(std::time::Duration::from_secs(10), chunks.collect())
                .await
                .expect("stream did not finish");

        let bytes: Vec<u8> = collected
            .into_iter()
            .flat_map(|chunk| chunk.unwrap().to_vec())
            .collect();
        assert_eq!(bytes, b"hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_exit_reports_stderr() {
        let child = shell("printf partial; echo 'Video unavailable' >&2; exit 1");
        let collected: Vec<_> = stdout_chunks(child).unwrap().collect().await;

        assert_eq!(collected.len(), 2);
        assert_matches!(
            collected.last(),
            Some(Err(SourceError::Process { stderr, .. })) if stderr == "Video unavailable"
        );
    }

    #[test]
    fn format_args_include_sort_only_when_needed() {
        let audio = FormatSelector::new(MediaFilter::AudioOnly, MediaQuality::HighestAudio);
        assert_eq!(format_args(&audio), ["--format", "ba", "--format-sort", "abr"]);

        let any = FormatSelector::new(MediaFilter::AudioAndVideo, MediaQuality::Lowest);
        assert_eq!(format_args(&any), ["--format", "w"]);
    }
}
