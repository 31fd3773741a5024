// bases/playlist_cli/src/args.rs
use clap::Parser;
use playlist_downloader::{Config, FormatSelector, MediaFilter, MediaQuality, DEFAULT_CONCURRENCY};
use std::path::PathBuf;
use std::time::Duration;

/// Download every item of a YouTube playlist in parallel
#[derive(Parser, Debug)]
#[command(name = "yaph", author, version, about, long_about = None)]
pub struct Args {
    /// Playlist URL (https://www.youtube.com/playlist?list=<id>)
    pub url: String,

    /// Number of downloads to run at once
    #[arg(short = 't', long, default_value_t = DEFAULT_CONCURRENCY as i64, allow_negative_numbers = true)]
    pub threads: i64,

    /// Streams to download: audioandvideo, video, videoonly, audio, audioonly
    #[arg(short = 'f', long, default_value = "audioandvideo")]
    pub filter: MediaFilter,

    /// Quality to pick: highestaudio, highestvideo, lowestaudio, lowestvideo, highest, lowest
    #[arg(short = 'q', long, default_value = "highestaudio")]
    pub quality: MediaQuality,

    /// Directory to store downloaded files
    #[arg(short = 'o', long, default_value = "./")]
    pub output: PathBuf,

    /// Fail a download when no data arrives for this many seconds
    #[arg(long, value_name = "SECS")]
    pub stall_timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the run configuration, rejecting bad URLs and thread counts
    pub fn to_config(&self, destination: PathBuf) -> playlist_downloader::Result<Config> {
        let config = Config::new(
            self.url.clone(),
            self.threads,
            FormatSelector::new(self.filter, self.quality),
            destination,
        )?;
        Ok(config.with_stall_timeout(self.stall_timeout.map(Duration::from_secs)))
    }
}
