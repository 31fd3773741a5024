// components/playlist_downloader/src/utils.rs
use std::path::PathBuf;

/// Width every progress row label is padded or truncated to
pub const LABEL_WIDTH: usize = 35;

/// Replace characters that are illegal in file names, one for one
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// File name for a downloaded item: sanitized title plus container extension.
/// Falls back to the item id when the title is blank.
pub fn media_filename(title: &str, item_id: &str, extension: &str) -> PathBuf {
    let stem = if title.trim().is_empty() {
        sanitize_filename(item_id)
    } else {
        sanitize_filename(title)
    };
    PathBuf::from(format!("{stem}.{extension}"))
}

/// First `width` characters of `text`, padded with spaces to exactly `width`
pub fn fit_label(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:<width$}")
}

/// First `width` characters of `text`, without padding
pub fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Display unit for byte counts, chosen from decimal thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    KB,
    MB,
    GB,
}

impl SizeUnit {
    pub fn for_bytes(bytes: u64) -> Self {
        if bytes < 1_000_000 {
            SizeUnit::KB
        } else if bytes < 1_000_000_000 {
            SizeUnit::MB
        } else {
            SizeUnit::GB
        }
    }

    pub fn divisor(&self) -> u64 {
        match self {
            SizeUnit::KB => 1_000,
            SizeUnit::MB => 1_000_000,
            SizeUnit::GB => 1_000_000_000,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
        }
    }

    /// `bytes` in this unit, rounded to the nearest whole number
    pub fn scale(&self, bytes: u64) -> u64 {
        let divisor = self.divisor();
        (bytes + divisor / 2) / divisor
    }

    pub fn format(&self, bytes: u64) -> String {
        format!("{}{}", self.scale(bytes), self.suffix())
    }
}

/// Human readable size, e.g. `500KB`, `5MB`, `5GB`
pub fn format_size(bytes: u64) -> String {
    SizeUnit::for_bytes(bytes).format(bytes)
}

/// `ceil(read / total * 100)`, clamped to 0..=100. A zero total reads as 0%.
pub fn percent(read: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let scaled = (u128::from(read) * 100).div_ceil(u128::from(total));
    scaled.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename(r#"a test/file:with*invalid?chars"#),
            "a test_file_with_invalid_chars"
        );
    }

    #[test]
    fn sanitizing_replaces_each_character_once() {
        assert_eq!(sanitize_filename("Song: Part 1/2?"), "Song_ Part 1_2_");
        assert_eq!(sanitize_filename(r#"\/:*?"<>|"#), "_________");
    }

    #[rstest]
    #[case("Song: Part 1/2?")]
    #[case(r#"<weird> "quoted" | piped"#)]
    #[case("plain title")]
    #[case("")]
    fn sanitizing_is_idempotent(#[case] title: &str) {
        let once = sanitize_filename(title);
        assert_eq!(sanitize_filename(&once), once);
    }

    #[test]
    fn media_filename_appends_extension() {
        assert_eq!(
            media_filename("Song: Part 1/2?", "abc", "mp3"),
            PathBuf::from("Song_ Part 1_2_.mp3")
        );
    }

    #[test]
    fn blank_title_falls_back_to_item_id() {
        assert_eq!(media_filename("   ", "abc", "mp4"), PathBuf::from("abc.mp4"));
    }

    #[rstest]
    #[case(500_000, "500KB")]
    #[case(999_499, "999KB")]
    #[case(1_000_000, "1MB")]
    #[case(5_000_000, "5MB")]
    #[case(1_000_000_000, "1GB")]
    #[case(5_000_000_000, "5GB")]
    #[case(0, "0KB")]
    fn size_labels(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_size(bytes), expected);
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(SizeUnit::for_bytes(999_999), SizeUnit::KB);
        assert_eq!(SizeUnit::for_bytes(1_000_000), SizeUnit::MB);
        assert_eq!(SizeUnit::for_bytes(999_999_999), SizeUnit::MB);
        assert_eq!(SizeUnit::for_bytes(1_000_000_000), SizeUnit::GB);
    }

    #[rstest]
    #[case(0, 100, 0)]
    #[case(1, 1000, 1)]
    #[case(500, 1000, 50)]
    #[case(999, 1000, 100)]
    #[case(1000, 1000, 100)]
    #[case(2000, 1000, 100)]
    #[case(10, 0, 0)]
    fn percent_rounds_up_and_clamps(#[case] read: u64, #[case] total: u64, #[case] expected: u8) {
        assert_eq!(percent(read, total), expected);
    }

    #[test]
    fn labels_are_fixed_width() {
        assert_eq!(fit_label("short", 10), "short     ");
        assert_eq!(fit_label("exactly ten", 10), "exactly te");
        assert_eq!(fit_label("ünïcödé", 4).chars().count(), 4);
    }
}
