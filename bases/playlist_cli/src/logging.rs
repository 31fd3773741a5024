// bases/playlist_cli/src/logging.rs
use playlist_downloader::ProgressBoard;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Log sink that clears the progress rows while a line goes to stderr
#[derive(Clone)]
pub struct BoardWriter {
    board: Arc<ProgressBoard>,
}

impl BoardWriter {
    pub fn new(board: Arc<ProgressBoard>) -> Self {
        Self { board }
    }
}

impl Write for BoardWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.board.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.board.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for BoardWriter {
    type Writer = BoardWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(board: Arc<ProgressBoard>, verbose: bool) {
    let default_filter = if verbose {
        "yaph=info,playlist_downloader=info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(BoardWriter::new(board))
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
