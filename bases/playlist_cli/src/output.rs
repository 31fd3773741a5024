// bases/playlist_cli/src/output.rs
use playlist_downloader::RunResult;
use std::path::Path;

const RED: &str = "\x1B[31m";
const GREEN: &str = "\x1B[32m";
const RESET: &str = "\x1B[0m";

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_unknown_url(&self, url: &str) {
        println!("Unknown URL format:{RED} {url} {RESET} please try again.");
    }

    pub fn print_directory_created(&self, path: &Path) {
        println!("Directory {} has been created.", path.display());
    }

    pub fn print_exiting(&self) {
        println!("Exiting...");
    }

    pub fn print_resolving(&self, url: &str) {
        println!("Getting playlist");
        if self.verbose {
            println!("Source: {}", url);
        }
    }

    pub fn print_found(&self, count: usize) {
        println!("found {} items in playlist", count);
    }

    pub fn print_download_complete(&self, result: &RunResult, output: &Path) {
        println!(
            "\n{GREEN}Download complete!{RESET} {} Files saved at: {}",
            result.succeeded,
            output.display()
        );
        if self.verbose {
            println!("Destination: {}", result.destination.display());
        }
    }

    pub fn print_download_failed(&self, result: &RunResult) {
        println!(
            "\n{} succeeded, {} failed, {} not started",
            result.succeeded, result.failed, result.skipped
        );
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}
