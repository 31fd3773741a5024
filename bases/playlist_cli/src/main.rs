// bases/playlist_cli/src/main.rs
mod app;
mod args;
mod logging;
mod output;
mod prompt;

use app::{App, Outcome};
use args::Args;
use clap::error::ErrorKind;
use clap::Parser;
use color_eyre::Result;
use playlist_downloader::ProgressBoard;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(error) => {
            let code = match error.kind() {
                ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            error.print()?;
            std::process::exit(code);
        }
    };

    let board = Arc::new(ProgressBoard::new());
    logging::init(Arc::clone(&board), args.verbose);

    let app = App::new(args, board);
    match app.run().await {
        Ok(Outcome::Completed) => Ok(()),
        Ok(Outcome::Aborted) => std::process::exit(1),
        Err(error) => {
            app.print_error(&error);
            std::process::exit(1);
        }
    }
}
