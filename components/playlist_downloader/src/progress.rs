// components/playlist_downloader/src/progress.rs
//! Per-item progress state and the shared multi-row display.
//!
//! A [`ProgressTracker`] is owned by the task downloading the item. The task
//! publishes snapshots of it to the [`ProgressBoard`], which keeps one row per
//! registered tracker in creation order. Rows stay visible once their task
//! reaches a terminal state.

use crate::utils::{fit_label, percent, sanitize_filename, truncate, SizeUnit, LABEL_WIDTH};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;
use std::io::{self, IsTerminal};

const STARTING_PREFIX: &str = "Starting ";
const ERROR_PREFIX: &str = "Error downloading ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Downloading,
    Done,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    title: String,
    phase: Phase,
    label: String,
    bytes_read: u64,
    total_bytes: Option<u64>,
    percent: Option<u8>,
    size_label: String,
    read_label: String,
}

impl ProgressTracker {
    /// Rows show the title the way it ends up in the file name
    pub fn new(title: impl AsRef<str>) -> Self {
        let title = sanitize_filename(title.as_ref());
        let label = fit_label(
            &format!("{STARTING_PREFIX}{}", truncate(&title, LABEL_WIDTH - STARTING_PREFIX.len())),
            LABEL_WIDTH,
        );
        Self {
            title,
            phase: Phase::Starting,
            label,
            bytes_read: 0,
            total_bytes: None,
            percent: Some(0),
            size_label: "0MB".to_string(),
            read_label: "0".to_string(),
        }
    }

    /// Record the bytes read so far. An unknown total switches the row to a
    /// plain byte counter without percentage.
    pub fn update(&mut self, bytes_read: u64, total_bytes: Option<u64>) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = Phase::Downloading;
        self.label = fit_label(&self.title, LABEL_WIDTH);
        self.bytes_read = bytes_read;
        self.total_bytes = total_bytes;

        match total_bytes {
            Some(total) => {
                let unit = SizeUnit::for_bytes(total);
                self.percent = Some(percent(bytes_read, total));
                self.size_label = unit.format(total);
                self.read_label = unit.scale(bytes_read).to_string();
            }
            None => {
                let unit = SizeUnit::for_bytes(bytes_read);
                self.percent = None;
                self.size_label = "?".to_string();
                self.read_label = unit.format(bytes_read);
            }
        }
    }

    pub fn set_terminal(&mut self, succeeded: bool) {
        if self.phase.is_terminal() {
            return;
        }
        if succeeded {
            let total = self.total_bytes.unwrap_or(self.bytes_read);
            let unit = SizeUnit::for_bytes(total);
            self.phase = Phase::Done;
            self.label = fit_label(&self.title, LABEL_WIDTH);
            self.percent = Some(100);
            self.size_label = unit.format(total);
            self.read_label = unit.scale(self.bytes_read).to_string();
        } else {
            self.phase = Phase::Failed;
            self.label = fit_label(
                &format!("{ERROR_PREFIX}{}", truncate(&self.title, LABEL_WIDTH - ERROR_PREFIX.len())),
                LABEL_WIDTH,
            );
            self.percent = Some(0);
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    pub fn percent(&self) -> Option<u8> {
        self.percent
    }

    pub fn size_label(&self) -> &str {
        &self.size_label
    }

    /// Percentage without the sign, `--` while the total is unknown
    pub fn percent_label(&self) -> String {
        self.percent
            .map_or_else(|| "--".to_string(), |p| p.to_string())
    }

    /// Bytes read over size, e.g. `3/5MB`
    pub fn transfer(&self) -> String {
        format!("{}/{}", self.read_label, self.size_label)
    }

    pub fn line(&self) -> String {
        format!(
            "{} {}% | {}",
            self.label,
            self.percent_label(),
            self.transfer()
        )
    }
}

/// Row identifier handed out by [`ProgressBoard::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle(usize);

struct Row {
    tracker: ProgressTracker,
    bar: ProgressBar,
    percent_shown: bool,
}

impl Row {
    fn new(tracker: ProgressTracker, bar: ProgressBar) -> Self {
        let percent_shown = tracker.percent().is_some();
        bar.set_style(style(percent_shown));
        let row = Self {
            tracker,
            bar,
            percent_shown,
        };
        row.draw();
        row
    }

    fn update(&mut self, tracker: &ProgressTracker) {
        self.tracker.clone_from(tracker);
        let percent_shown = tracker.percent().is_some();
        if percent_shown != self.percent_shown {
            self.percent_shown = percent_shown;
            self.bar.set_style(style(percent_shown));
        }
        self.draw();
    }

    fn draw(&self) {
        self.bar.set_prefix(self.tracker.label().to_string());
        self.bar
            .set_position(u64::from(self.tracker.percent().unwrap_or(0)));
        self.bar.set_message(self.tracker.transfer());
    }
}

fn style(percent_shown: bool) -> ProgressStyle {
    let template = if percent_shown {
        "{prefix} [{bar:40}] {pos}% | ETA: {eta} | {msg}"
    } else {
        "{prefix} [{bar:40}] --% | ETA: {eta} | {msg}"
    };
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░ ")
}

/// Multi-row live display, one row per registered tracker.
///
/// Appending, publishing and rendering all go through one lock, so a render
/// always sees every row in a consistent state.
pub struct ProgressBoard {
    multi: MultiProgress,
    rows: Mutex<Vec<Row>>,
}

impl ProgressBoard {
    /// Draw on stdout when it is a terminal, otherwise keep the rows in memory only
    pub fn new() -> Self {
        if io::stdout().is_terminal() {
            Self::with_draw_target(ProgressDrawTarget::stdout())
        } else {
            Self::hidden()
        }
    }

    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, tracker: &ProgressTracker) -> RowHandle {
        let mut rows = self.rows.lock();
        let bar = self.multi.add(ProgressBar::new(100));
        rows.push(Row::new(tracker.clone(), bar));
        RowHandle(rows.len() - 1)
    }

    /// Replace the stored state of one row and redraw it
    pub fn publish(&self, handle: RowHandle, tracker: &ProgressTracker) {
        let mut rows = self.rows.lock();
        if let Some(row) = rows.get_mut(handle.0) {
            row.update(tracker);
        }
    }

    /// Redraw every row and return their text, in creation order
    pub fn render(&self) -> Vec<String> {
        let rows = self.rows.lock();
        rows.iter()
            .map(|row| {
                row.draw();
                row.tracker.line()
            })
            .collect()
    }

    /// Run `f` with the rows cleared from the terminal, then redraw them.
    ///
    /// Anything written to the terminal while the bars are live has to go
    /// through here.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.multi.suspend(f)
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self, handle: RowHandle) -> Option<ProgressTracker> {
        self.rows.lock().get(handle.0).map(|row| row.tracker.clone())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// Stop redrawing; rows stay on screen as they are
    pub fn finish(&self) {
        let rows = self.rows.lock();
        for row in rows.iter() {
            row.draw();
            row.bar.abandon();
        }
    }
}

impl Default for ProgressBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn new_tracker_shows_starting_label() {
        let tracker = ProgressTracker::new("My Song");
        assert_eq!(tracker.phase(), Phase::Starting);
        assert!(tracker.label().starts_with("Starting My Song"));
        assert_eq!(tracker.label().chars().count(), LABEL_WIDTH);
    }

    #[test]
    fn long_titles_are_truncated_to_row_width() {
        let title = "A very long title that keeps going well past the row width";
        let mut tracker = ProgressTracker::new(title);
        assert_eq!(tracker.label().chars().count(), LABEL_WIDTH);

        tracker.update(10, Some(100));
        assert_eq!(tracker.label(), &title[..LABEL_WIDTH]);
    }

    #[test]
    fn update_with_known_total() {
        let mut tracker = ProgressTracker::new("Song");
        tracker.update(2_500_000, Some(5_000_000));

        assert_eq!(tracker.phase(), Phase::Downloading);
        assert_eq!(tracker.percent(), Some(50));
        assert_eq!(tracker.size_label(), "5MB");
        assert_eq!(tracker.percent_label(), "50");
        assert_eq!(tracker.transfer(), "3/5MB");
    }

    #[test]
    fn unknown_total_falls_back_to_byte_counter() {
        let mut tracker = ProgressTracker::new("Song");
        tracker.update(500_000, None);

        assert_eq!(tracker.percent(), None);
        assert_eq!(tracker.line(), format!("{} --% | 500KB/?", fit_label("Song", LABEL_WIDTH)));
    }

    #[test]
    fn success_sets_full_percentage() {
        let mut tracker = ProgressTracker::new("Song");
        tracker.update(700_000, None);
        tracker.set_terminal(true);

        assert_eq!(tracker.phase(), Phase::Done);
        assert_eq!(tracker.percent(), Some(100));
        assert_eq!(tracker.size_label(), "700KB");
    }

    #[test]
    fn failure_shows_error_label() {
        let mut tracker = ProgressTracker::new("Some rather long song title");
        tracker.update(10, Some(100));
        tracker.set_terminal(false);

        assert_eq!(tracker.phase(), Phase::Failed);
        assert!(tracker.label().starts_with("Error downloading Some rather long "));
        assert_eq!(tracker.label().chars().count(), LABEL_WIDTH);
    }

    #[test]
    fn terminal_state_is_final() {
        let mut tracker = ProgressTracker::new("Song");
        tracker.set_terminal(false);
        tracker.update(50, Some(100));
        tracker.set_terminal(true);

        assert_eq!(tracker.phase(), Phase::Failed);
    }

    #[test]
    fn labels_show_the_sanitized_title() {
        let mut tracker = ProgressTracker::new("AC/DC: Live?");
        assert!(tracker.label().starts_with("Starting AC_DC_ Live_"));

        tracker.update(1, Some(2));
        assert!(tracker.label().starts_with("AC_DC_ Live_ "));
        assert_eq!(tracker.title(), "AC_DC_ Live_");
    }

    #[test]
    fn suspend_returns_the_closure_result_and_keeps_rows() {
        let board = ProgressBoard::hidden();
        board.register(&ProgressTracker::new("first"));

        let written = board.suspend(|| 42);

        assert_eq!(written, 42);
        assert_eq!(board.render().len(), 1);
    }

    #[test]
    fn row_switches_style_when_total_becomes_unknown() {
        let board = ProgressBoard::hidden();
        let mut tracker = ProgressTracker::new("Song");
        let handle = board.register(&tracker);

        tracker.update(2_000, None);
        board.publish(handle, &tracker);

        assert!(board.render()[0].ends_with("--% | 2KB/?"));
        assert_eq!(board.snapshot(handle).and_then(|t| t.percent()), None);
    }

    #[test]
    fn rows_keep_creation_order() {
        let board = ProgressBoard::hidden();
        let first = ProgressTracker::new("first");
        let second = ProgressTracker::new("second");
        let h1 = board.register(&first);
        let h2 = board.register(&second);

        let mut second = second;
        second.update(1, Some(1));
        second.set_terminal(true);
        board.publish(h2, &second);

        let lines = board.render();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Starting first"));
        assert!(lines[1].starts_with("second"));
        assert_eq!(board.snapshot(h1), Some(first));
        assert_eq!(board.snapshot(h2).map(|t| t.phase()), Some(Phase::Done));
    }

    #[test]
    fn concurrent_publishers_never_tear_rows() {
        let board = Arc::new(ProgressBoard::hidden());
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let board = Arc::clone(&board);
                std::thread::spawn(move || {
                    let mut tracker = ProgressTracker::new(format!("item {i}"));
                    let handle = board.register(&tracker);
                    for read in (0..=1_000u64).step_by(100) {
                        tracker.update(read, Some(1_000));
                        board.publish(handle, &tracker);
                        let lines = board.render();
                        assert!(lines.len() <= 8);
                        assert!(lines.iter().all(|line| line.contains("% | ")));
                    }
                    tracker.set_terminal(true);
                    board.publish(handle, &tracker);
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        let lines = board.render();
        assert_eq!(lines.len(), 8);
        assert!(lines.iter().all(|line| line.contains("100% | 1/1KB")));
    }
}
