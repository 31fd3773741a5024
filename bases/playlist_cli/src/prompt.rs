// bases/playlist_cli/src/prompt.rs
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Ask whether a missing directory should be created. Only `y` confirms.
pub fn confirm_create(
    directory: &Path,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    write!(
        output,
        "The directory {} does not exist. Do you want to create it? (y/n) ",
        directory.display()
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim_end_matches(['\r', '\n']) == "y")
}
