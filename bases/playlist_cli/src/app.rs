// bases/playlist_cli/src/app.rs
use crate::args::Args;
use crate::output::OutputHandler;
use crate::prompt::confirm_create;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use playlist_downloader::{playlist_id, Config, PlaylistDownloader, ProgressBoard};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

/// How a run ended when no error escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Aborted,
}

pub struct App {
    args: Args,
    output: OutputHandler,
    board: Arc<ProgressBoard>,
}

impl App {
    pub fn new(args: Args, board: Arc<ProgressBoard>) -> Self {
        let output = OutputHandler::new(args.verbose);
        Self {
            args,
            output,
            board,
        }
    }

    pub async fn run(&self) -> Result<Outcome> {
        let stdin = std::io::stdin();
        self.run_with_input(&mut stdin.lock(), &mut std::io::stdout())
            .await
    }

    pub async fn run_with_input(
        &self,
        input: &mut impl BufRead,
        prompt_out: &mut impl Write,
    ) -> Result<Outcome> {
        let Some(config) = self.prepare(input, prompt_out)? else {
            return Ok(Outcome::Aborted);
        };
        let downloader = PlaylistDownloader::new(config, Arc::clone(&self.board)).await?;
        self.download(&downloader).await
    }

    /// Check the URL and the destination. `None` means the user backed out.
    fn prepare(
        &self,
        input: &mut impl BufRead,
        prompt_out: &mut impl Write,
    ) -> Result<Option<Config>> {
        if playlist_id(&self.args.url).is_none() {
            self.output.print_unknown_url(&self.args.url);
            return Ok(None);
        }

        let destination = std::path::absolute(&self.args.output)
            .wrap_err_with(|| format!("invalid output path {}", self.args.output.display()))?;
        if !self.prepare_destination(&destination, input, prompt_out)? {
            self.output.print_exiting();
            return Ok(None);
        }

        Ok(Some(self.args.to_config(destination)?))
    }

    async fn download(&self, downloader: &PlaylistDownloader) -> Result<Outcome> {
        self.output.print_resolving(&self.args.url);
        let items = downloader.resolve().await?;
        self.output.print_found(items.len());

        let result = downloader.download(items).await?;
        if result.is_success() {
            self.output
                .print_download_complete(&result, &self.args.output);
        } else {
            self.output.print_download_failed(&result);
        }
        result.into_result()?;

        Ok(Outcome::Completed)
    }

    /// Make sure the destination exists, asking before creating it
    fn prepare_destination(
        &self,
        destination: &Path,
        input: &mut impl BufRead,
        prompt_out: &mut impl Write,
    ) -> Result<bool> {
        if destination.exists() {
            return Ok(true);
        }

        if !confirm_create(destination, input, prompt_out)? {
            return Ok(false);
        }

        std::fs::create_dir_all(destination).wrap_err_with(|| {
            format!(
                "An error occurred while creating the directory {}",
                destination.display()
            )
        })?;
        self.output.print_directory_created(destination);
        Ok(true)
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}
